// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Creation of new files without following reparse points.
//!
//! Backup and restore tools often run with more privileges than the users who
//! own the trees they write into. If such a tool checks a path and then
//! creates a file in it, a user can swap a directory on that path for a
//! junction or symbolic link in between and redirect the write. This crate
//! closes that window by handing the whole path to the kernel in one
//! `NtCreateFile` call that fails as soon as the path walk meets a reparse
//! point.
//!
//! The steps are exposed separately:
//!
//! 1. [`canonicalize`] turns a Win32 path into a device-qualified NT path
//!    (`C:\a\b` becomes `\??\C:\a\b`) without touching the file system.
//! 2. [`CreateRequest::builder`] builds the request. The reparse policy is
//!    always [`ReparsePolicy::Never`].
//! 3. `CreateRequest::issue` (Windows only) makes the call and returns the new
//!    handle, or an [`Error`] that says why nothing was created.
//!
//! `secure_create` (Windows only) runs all three.

mod canonical;
#[cfg(windows)]
mod create;
mod error;
mod request;
pub mod status;

pub use canonical::canonicalize;
pub use canonical::canonicalize_str;
pub use canonical::canonicalize_wide;
pub use canonical::CanonicalPath;
#[cfg(windows)]
pub use create::secure_create;
#[cfg(windows)]
pub use create::CreatedFile;
pub use error::classify_status;
pub use error::Error;
pub use error::Stage;
pub use error::SyntaxError;
pub use request::Access;
pub use request::CreateAction;
pub use request::CreateRequest;
pub use request::CreateRequestBuilder;
pub use request::Disposition;
pub use request::FileAttributes;
pub use request::ObjectKind;
pub use request::RawRequest;
pub use request::ReparsePolicy;
pub use request::ShareAccess;
