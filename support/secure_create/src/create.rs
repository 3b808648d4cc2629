// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::canonical::canonicalize;
use crate::error::classify_status;
use crate::error::Error;
use crate::request::CreateAction;
use crate::request::CreateRequest;
use pal::windows::fs;
use pal::windows::fs::CreateParameters;
use pal::windows::fs::IoStatus;
use pal::windows::ObjectAttributes;
use pal::windows::UnicodeStringRef;
use pal::NativeString;
use std::fs::File;
use std::os::windows::io::AsHandle;
use std::os::windows::io::BorrowedHandle;
use std::os::windows::io::OwnedHandle;
use std::path::Path;

/// A newly created file.
///
/// The handle belongs to the caller; dropping it closes the file.
#[derive(Debug)]
pub struct CreatedFile {
    pub handle: OwnedHandle,
    pub io_status: IoStatus,
}

impl CreatedFile {
    /// The action the system reports having taken. Always
    /// [`CreateAction::Created`] for a successful secure create.
    pub fn action(&self) -> Option<CreateAction> {
        CreateAction::from_information(self.io_status.information)
    }

    pub fn into_file(self) -> File {
        self.handle.into()
    }
}

impl AsHandle for CreatedFile {
    fn as_handle(&self) -> BorrowedHandle<'_> {
        self.handle.as_handle()
    }
}

impl From<CreatedFile> for OwnedHandle {
    fn from(value: CreatedFile) -> Self {
        value.handle
    }
}

impl CreateRequest<'_> {
    /// Issues the request as a single synchronous `NtCreateFile` call.
    ///
    /// The kernel resolves the path and creates the file in one step, so a
    /// component that is swapped for a reparse point at any moment either
    /// fails this call or is not observed by it.
    pub fn issue(&self) -> Result<CreatedFile, Error> {
        let path = self.path();
        let raw = self.raw();
        let name = NativeString::new(path.as_units())
            .map_err(|_| Error::PathTooLong { len: path.len() })?;
        let name = UnicodeStringRef::from(&name);
        let mut oa = ObjectAttributes::new();
        oa.name(&name).attributes(raw.object_attributes);

        let params = CreateParameters {
            desired_access: raw.desired_access,
            file_attributes: raw.file_attributes,
            share_access: raw.share_access,
            disposition: raw.disposition,
            create_options: raw.create_options,
        };

        match fs::create_file(&oa, &params) {
            Ok((handle, io_status)) => {
                tracing::debug!(%path, information = io_status.information, "created file");
                Ok(CreatedFile { handle, io_status })
            }
            Err(status) => {
                let err = classify_status(status);
                if err.is_reparse() {
                    tracing::warn!(%path, status, "reparse point on create path");
                } else {
                    tracing::debug!(%path, error = %err, "create failed");
                }
                Err(err)
            }
        }
    }
}

/// Creates a new regular file at `path` without following any reparse point
/// on the way.
///
/// Fails with [`Error::ReparseEncountered`] if any component of the path is a
/// symbolic link, junction or mount point, and with [`Error::AlreadyExists`]
/// if anything is already at `path`.
pub fn secure_create(path: impl AsRef<Path>) -> Result<CreatedFile, Error> {
    let path = canonicalize(path)?;
    CreateRequest::builder(&path).build()?.issue()
}
