// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::common::Tree;
use secure_create::secure_create;
use secure_create::CreateAction;
use secure_create::Error;
use secure_create::Stage;
use std::io::Write;

#[test_log::test]
fn create_then_already_exists() {
    let tree = Tree::new();
    let path = tree.safe().join("file.bin");

    let created = secure_create(&path).unwrap();
    assert_eq!(created.action(), Some(CreateAction::Created));
    drop(created);
    assert!(path.is_file());

    let err = secure_create(&path).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }), "{err:?}");
    assert_eq!(err.stage(), Stage::Create);
}

#[test_log::test]
fn existing_file_is_untouched() {
    let tree = Tree::new();
    let path = tree.safe().join("keep.txt");
    std::fs::write(&path, b"original").unwrap();

    let err = secure_create(&path).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }), "{err:?}");
    assert_eq!(std::fs::read(&path).unwrap(), b"original");
}

#[test_log::test]
fn directory_is_already_exists() {
    let tree = Tree::new();
    let err = secure_create(tree.safe()).unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }), "{err:?}");
}

#[test_log::test]
fn handle_is_writable() {
    let tree = Tree::new();
    let path = tree.safe().join("data.txt");
    let mut file = secure_create(&path).unwrap().into_file();
    file.write_all(b"restored").unwrap();
    drop(file);
    assert_eq!(std::fs::read(&path).unwrap(), b"restored");
}

#[test_log::test]
fn relative_path() {
    let tree = Tree::new();
    // The only test in this binary that depends on the current directory.
    std::env::set_current_dir(tree.safe()).unwrap();
    drop(secure_create("relative.txt").unwrap());
    assert!(tree.safe().join("relative.txt").is_file());
}

#[test_log::test]
fn io_error_conversion() {
    let tree = Tree::new();
    let path = tree.safe().join("twice.txt");
    drop(secure_create(&path).unwrap());
    let err = std::io::Error::from(secure_create(&path).unwrap_err());
    assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
}
