// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::common::is_empty_dir;
use super::common::Tree;
use secure_create::secure_create;
use secure_create::Error;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

const RUN_TIME: Duration = Duration::from_secs(3);
const MAX_RUN_TIME: Duration = Duration::from_secs(60);

/// Repeatedly replaces `work` with a junction to `evil` and back until `stop`
/// is set. Returns the number of junctions created.
fn spawn_swapper(work: PathBuf, evil: PathBuf, stop: Arc<AtomicBool>) -> JoinHandle<u64> {
    std::thread::spawn(move || {
        let mut swaps = 0u64;
        while !stop.load(Ordering::Relaxed) {
            let _ = if junction::exists(&work).unwrap_or(false) {
                std::fs::remove_dir(&work)
            } else {
                std::fs::remove_dir_all(&work)
            };
            if junction::create(&evil, &work).is_ok() {
                swaps += 1;
            }
            std::thread::yield_now();
            let _ = std::fs::remove_dir(&work);
            let _ = std::fs::create_dir(&work);
            std::thread::yield_now();
        }
        swaps
    })
}

/// Swaps a directory for a junction and back while files are created under
/// it. No file may ever land in the junction target.
#[test_log::test]
fn junction_swap_race() {
    let tree = Tree::new();
    let work = tree.path("work");
    std::fs::create_dir(&work).unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let swapper = spawn_swapper(work.clone(), tree.evil(), stop.clone());

    let mut created = 0u64;
    let mut rejected = 0u64;
    let mut other = 0u64;
    let start = Instant::now();
    let mut i = 0u64;
    // Run for at least RUN_TIME, and longer if either outcome has not been
    // seen yet.
    while start.elapsed() < RUN_TIME
        || ((created == 0 || rejected == 0) && start.elapsed() < MAX_RUN_TIME)
    {
        match secure_create(work.join(format!("f{i}"))) {
            Ok(file) => {
                drop(file);
                created += 1;
            }
            Err(Error::ReparseEncountered { .. }) => rejected += 1,
            Err(err) => {
                tracing::trace!(error = %err, "create lost the race");
                other += 1;
            }
        }
        i += 1;
    }
    stop.store(true, Ordering::Relaxed);
    let swaps = swapper.join().unwrap();

    tracing::info!(created, rejected, other, swaps, "race finished");
    assert!(swaps > 0, "the directory was never replaced by a junction");
    assert!(created > 0, "no create succeeded");
    assert!(rejected > 0, "no create saw the junction");
    assert!(is_empty_dir(&tree.evil()));

    let _ = std::fs::remove_dir(&work);
}

/// The same race against an ordinary create, which follows the junction. This
/// shows the swapping above is a real attack.
#[test_log::test]
fn junction_swap_race_redirects_plain_create() {
    let tree = Tree::new();
    let work = tree.path("work");
    std::fs::create_dir(&work).unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let swapper = spawn_swapper(work.clone(), tree.evil(), stop.clone());

    let redirected = tree.evil().join("file.txt");
    let start = Instant::now();
    while !redirected.exists() && start.elapsed() < MAX_RUN_TIME {
        if let Ok(file) = std::fs::File::create(work.join("file.txt")) {
            drop(file);
        }
    }
    stop.store(true, Ordering::Relaxed);
    swapper.join().unwrap();

    tracing::info!(elapsed = ?start.elapsed(), "race finished");
    assert!(redirected.exists(), "the create was never redirected");

    let _ = std::fs::remove_dir(&work);
}
