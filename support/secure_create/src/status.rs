// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! NTSTATUS values that the create path distinguishes.
//!
//! These are defined here rather than taken from the system headers so that
//! failure classification is available, and testable, on every host.

/// A raw NT status code. Negative values are failures.
pub type NtStatus = i32;

pub const STATUS_STOPPED_ON_SYMLINK: NtStatus = 0x8000_002D_u32 as i32;
pub const STATUS_ACCESS_DENIED: NtStatus = 0xC000_0022_u32 as i32;
pub const STATUS_OBJECT_NAME_INVALID: NtStatus = 0xC000_0033_u32 as i32;
pub const STATUS_OBJECT_NAME_NOT_FOUND: NtStatus = 0xC000_0034_u32 as i32;
pub const STATUS_OBJECT_NAME_COLLISION: NtStatus = 0xC000_0035_u32 as i32;
pub const STATUS_OBJECT_PATH_NOT_FOUND: NtStatus = 0xC000_003A_u32 as i32;
pub const STATUS_FILE_IS_A_DIRECTORY: NtStatus = 0xC000_00BA_u32 as i32;
pub const STATUS_REPARSE_POINT_ENCOUNTERED: NtStatus = 0xC000_050B_u32 as i32;
