// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::common::is_empty_dir;
use super::common::Tree;
use secure_create::secure_create;
use secure_create::Error;

#[test_log::test]
fn junction_ancestor_is_rejected() {
    let tree = Tree::new();
    let link = tree.path("link");
    junction::create(tree.evil(), &link).unwrap();

    let err = secure_create(link.join("file.txt")).unwrap_err();
    assert!(err.is_reparse(), "{err:?}");
    assert!(is_empty_dir(&tree.evil()));
}

#[test_log::test]
fn nested_junction_ancestor_is_rejected() {
    let tree = Tree::new();
    let link = tree.safe().join("link");
    junction::create(tree.evil(), &link).unwrap();
    std::fs::create_dir(tree.evil().join("sub")).unwrap();

    let err = secure_create(link.join("sub").join("file.txt")).unwrap_err();
    assert!(err.is_reparse(), "{err:?}");
    assert!(is_empty_dir(&tree.evil().join("sub")));
}

#[test_log::test]
fn symlink_ancestor_is_rejected() {
    let tree = Tree::new();
    let link = tree.path("link");
    if let Err(err) = std::os::windows::fs::symlink_dir(tree.evil(), &link) {
        // Needs developer mode or the create symbolic link privilege.
        tracing::warn!(error = %err, "cannot create symbolic links, skipping");
        return;
    }

    let err = secure_create(link.join("file.txt")).unwrap_err();
    assert!(err.is_reparse(), "{err:?}");
    assert!(!link.join("file.txt").exists());
    assert!(is_empty_dir(&tree.evil()));
}

#[test_log::test]
fn junction_leaf_is_not_followed() {
    let tree = Tree::new();
    let link = tree.safe().join("file.txt");
    junction::create(tree.evil(), &link).unwrap();

    let err = secure_create(&link).unwrap_err();
    assert!(
        matches!(
            err,
            Error::AlreadyExists { .. } | Error::ReparseEncountered { .. }
        ),
        "{err:?}"
    );
    assert!(is_empty_dir(&tree.evil()));
    assert!(junction::exists(&link).unwrap());
}

#[test_log::test]
fn hard_link_is_already_exists() {
    let tree = Tree::new();
    let target = tree.evil().join("target.txt");
    std::fs::write(&target, b"secret").unwrap();
    let link = tree.safe().join("link.txt");
    std::fs::hard_link(&target, &link).unwrap();

    // A hard link is an ordinary name, not a reparse point.
    let err = secure_create(&link).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }), "{err:?}");
    assert!(!err.is_reparse());
    assert_eq!(std::fs::read(&target).unwrap(), b"secret");
}

#[test_log::test]
fn symlink_leaf_is_not_followed() {
    let tree = Tree::new();
    let target = tree.evil().join("target.txt");
    let link = tree.safe().join("file.txt");
    if let Err(err) = std::os::windows::fs::symlink_file(&target, &link) {
        tracing::warn!(error = %err, "cannot create symbolic links, skipping");
        return;
    }

    // The link dangles, so following it would create the target.
    let err = secure_create(&link).unwrap_err();
    assert!(
        matches!(
            err,
            Error::AlreadyExists { .. } | Error::ReparseEncountered { .. }
        ),
        "{err:?}"
    );
    assert!(!target.exists());
    assert!(is_empty_dir(&tree.evil()));
}
