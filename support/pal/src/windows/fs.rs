// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::ObjectAttributes;
use ntapi::ntioapi;
use std::mem::zeroed;
use std::os::windows::io::FromRawHandle;
use std::os::windows::io::OwnedHandle;
use std::ptr::null_mut;
use winapi::shared::ntdef::NTSTATUS;

/// The completion block of a finished synchronous request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IoStatus {
    pub status: NTSTATUS,
    /// Request-specific result. For creates, the action that was taken
    /// (`FILE_CREATED`, `FILE_OPENED`, ...).
    pub information: usize,
}

/// The arguments of `NtCreateFile`, other than the name and output blocks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CreateParameters {
    pub desired_access: u32,
    pub file_attributes: u32,
    pub share_access: u32,
    pub disposition: u32,
    pub create_options: u32,
}

/// Creates or opens a file with a single `NtCreateFile` call.
///
/// On failure the raw status is returned and no handle exists.
pub fn create_file(
    obj_attr: &ObjectAttributes<'_>,
    params: &CreateParameters,
) -> Result<(OwnedHandle, IoStatus), NTSTATUS> {
    // SAFETY: calling the API according to the NT API. The object attributes
    // and the name they reference outlive the call.
    unsafe {
        let mut iosb: ntioapi::IO_STATUS_BLOCK = zeroed();
        let mut handle = null_mut();
        let status = ntioapi::NtCreateFile(
            &mut handle,
            params.desired_access,
            obj_attr.as_ptr(),
            &mut iosb,
            null_mut(),
            params.file_attributes,
            params.share_access,
            params.disposition,
            params.create_options,
            null_mut(),
            0,
        );

        if status < 0 {
            return Err(status);
        }

        Ok((
            OwnedHandle::from_raw_handle(handle.cast()),
            IoStatus {
                status: *iosb.u.Status(),
                information: iosb.Information,
            },
        ))
    }
}
