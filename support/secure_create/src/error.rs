// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::status;
use crate::status::NtStatus;
use pal::NativeString;
use std::io;
use thiserror::Error;

/// The step of a secure create that failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Turning the caller's path into a device-qualified NT path.
    Canonicalize,
    /// Encoding the path as a counted UTF-16 string.
    Marshal,
    /// The `NtCreateFile` request itself.
    Create,
}

/// Why a path was rejected before any request was issued.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("path is empty")]
    Empty,
    #[error("path contains a nul character")]
    EmbeddedNul,
    #[error("drive designator is not a letter")]
    BadDrive,
    #[error("UNC path is missing a server or share name")]
    IncompleteUnc,
    #[error("device path is missing a device name")]
    MissingDevice,
    #[error("invalid character {0:?} in a path component")]
    InvalidCharacter(char),
    #[error("path component ends with a dot or a space")]
    TrailingDotOrSpace,
    #[error("path component is a reserved device name")]
    ReservedName,
    #[error("literal path contains an empty component")]
    EmptyComponent,
    #[error("literal path contains a `.` or `..` component")]
    DotComponent,
    #[error("relative paths can only be resolved on Windows")]
    Relative,
    #[error("path conversion failed with error {0}")]
    Conversion(i32),
    #[error("path does not name a file")]
    NoFileName,
}

/// A secure create failure.
///
/// Every variant can be told apart by the caller; native failures carry the
/// raw status for diagnostics. None of these are retried internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid path syntax")]
    InvalidPathSyntax(#[source] SyntaxError),
    #[error("path is {len} UTF-16 code units long, more than {max}", max = NativeString::MAX_CHARS)]
    PathTooLong { len: usize },
    #[error("path is not representable as UTF-16")]
    InvalidEncoding,
    #[error("a path component is a reparse point (status {status:#010x})")]
    ReparseEncountered { status: NtStatus },
    #[error("an object already exists at the path (status {status:#010x})")]
    AlreadyExists { status: NtStatus },
    #[error("access denied (status {status:#010x})")]
    AccessDenied { status: NtStatus },
    #[error("create failed (status {status:#010x})")]
    OtherNative { status: NtStatus },
}

impl From<SyntaxError> for Error {
    fn from(value: SyntaxError) -> Self {
        Self::InvalidPathSyntax(value)
    }
}

impl Error {
    /// Returns the step that failed.
    pub fn stage(&self) -> Stage {
        match self {
            Error::InvalidPathSyntax(_) | Error::PathTooLong { .. } => Stage::Canonicalize,
            Error::InvalidEncoding => Stage::Marshal,
            Error::ReparseEncountered { .. }
            | Error::AlreadyExists { .. }
            | Error::AccessDenied { .. }
            | Error::OtherNative { .. } => Stage::Create,
        }
    }

    /// Returns the raw status of a native failure.
    pub fn status(&self) -> Option<NtStatus> {
        match *self {
            Error::ReparseEncountered { status }
            | Error::AlreadyExists { status }
            | Error::AccessDenied { status }
            | Error::OtherNative { status } => Some(status),
            Error::InvalidPathSyntax(_) | Error::PathTooLong { .. } | Error::InvalidEncoding => {
                None
            }
        }
    }

    /// Returns whether a reparse point was found on the path, which callers
    /// should treat as a possible attack rather than an ordinary failure.
    pub fn is_reparse(&self) -> bool {
        matches!(self, Error::ReparseEncountered { .. })
    }
}

/// Classifies the failure status of a create request.
pub fn classify_status(status: NtStatus) -> Error {
    match status {
        status::STATUS_REPARSE_POINT_ENCOUNTERED | status::STATUS_STOPPED_ON_SYMLINK => {
            Error::ReparseEncountered { status }
        }
        status::STATUS_OBJECT_NAME_COLLISION | status::STATUS_FILE_IS_A_DIRECTORY => {
            Error::AlreadyExists { status }
        }
        status::STATUS_ACCESS_DENIED => Error::AccessDenied { status },
        status => Error::OtherNative { status },
    }
}

impl From<Error> for io::Error {
    fn from(value: Error) -> Self {
        let kind = match value {
            Error::InvalidPathSyntax(_) | Error::PathTooLong { .. } | Error::InvalidEncoding => {
                io::ErrorKind::InvalidInput
            }
            Error::AlreadyExists { .. } => io::ErrorKind::AlreadyExists,
            Error::AccessDenied { .. } => io::ErrorKind::PermissionDenied,
            Error::ReparseEncountered { .. } | Error::OtherNative { .. } => io::ErrorKind::Other,
        };
        io::Error::new(kind, value)
    }
}
