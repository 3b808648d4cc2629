// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Construction of the `NtCreateFile` request.
//!
//! The values here are the raw flags the kernel sees. They are spelled out
//! locally so that requests can be built and inspected on any host.

use crate::canonical::CanonicalPath;
use crate::error::Error;
use crate::error::SyntaxError;
use pal::NativeString;
use std::ops::BitOr;

const OBJ_CASE_INSENSITIVE: u32 = 0x0000_0040;
const OBJ_DONT_REPARSE: u32 = 0x0000_1000;

const GENERIC_ALL: u32 = 0x1000_0000;
const SYNCHRONIZE: u32 = 0x0010_0000;

const FILE_SHARE_READ: u32 = 0x0000_0001;
const FILE_SHARE_WRITE: u32 = 0x0000_0002;
const FILE_SHARE_DELETE: u32 = 0x0000_0004;

const FILE_CREATE: u32 = 0x0000_0002;

const FILE_SYNCHRONOUS_IO_NONALERT: u32 = 0x0000_0020;
const FILE_NON_DIRECTORY_FILE: u32 = 0x0000_0040;
const FILE_OPEN_REPARSE_POINT: u32 = 0x0020_0000;

/// How the path walk treats reparse points.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReparsePolicy {
    /// Fail if any component, intermediate or final, is a reparse point.
    ///
    /// Sets `OBJ_DONT_REPARSE` on the object attributes, which stops the
    /// kernel walk at the first reparse point, and `FILE_OPEN_REPARSE_POINT`
    /// on the create options so the final component is never followed even
    /// where the attribute is not honored.
    Never,
}

impl ReparsePolicy {
    fn object_attributes(self) -> u32 {
        match self {
            ReparsePolicy::Never => OBJ_DONT_REPARSE,
        }
    }

    fn create_options(self) -> u32 {
        match self {
            ReparsePolicy::Never => FILE_OPEN_REPARSE_POINT,
        }
    }
}

/// The access requested on the new file.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Access {
    /// `GENERIC_ALL`, plus `SYNCHRONIZE` for synchronous I/O.
    Full,
}

impl Access {
    fn mask(self) -> u32 {
        match self {
            Access::Full => GENERIC_ALL | SYNCHRONIZE,
        }
    }
}

/// What to do when an object already exists at the path.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Create a new file; fail if anything exists at the path.
    CreateNew,
}

impl Disposition {
    fn value(self) -> u32 {
        match self {
            Disposition::CreateNew => FILE_CREATE,
        }
    }
}

/// The kind of object the request may produce.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    /// A regular file, never a directory.
    RegularFile,
}

impl ObjectKind {
    fn create_options(self) -> u32 {
        match self {
            ObjectKind::RegularFile => FILE_NON_DIRECTORY_FILE,
        }
    }
}

/// Which other opens of the new file are permitted while the returned handle
/// is open.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ShareAccess {
    pub read: bool,
    pub write: bool,
    pub delete: bool,
}

impl ShareAccess {
    fn value(self) -> u32 {
        let mut share = 0;
        if self.read {
            share |= FILE_SHARE_READ;
        }
        if self.write {
            share |= FILE_SHARE_WRITE;
        }
        if self.delete {
            share |= FILE_SHARE_DELETE;
        }
        share
    }
}

/// Attributes of the new file.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FileAttributes(u32);

impl FileAttributes {
    pub const NORMAL: Self = Self(0x0000_0080);
    pub const READONLY: Self = Self(0x0000_0001);
    pub const HIDDEN: Self = Self(0x0000_0002);
    pub const SYSTEM: Self = Self(0x0000_0004);
    pub const ARCHIVE: Self = Self(0x0000_0020);
    pub const TEMPORARY: Self = Self(0x0000_0100);
    pub const NOT_CONTENT_INDEXED: Self = Self(0x0000_2000);

    /// The value passed to the system. `NORMAL` is only valid alone, so it
    /// is dropped when combined with anything else.
    pub fn bits(self) -> u32 {
        if self.0 == Self::NORMAL.0 {
            self.0
        } else {
            self.0 & !Self::NORMAL.0
        }
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for FileAttributes {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl BitOr for FileAttributes {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The raw arguments of a create request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RawRequest {
    pub object_attributes: u32,
    pub desired_access: u32,
    pub file_attributes: u32,
    pub share_access: u32,
    pub disposition: u32,
    pub create_options: u32,
}

/// A validated request to create a new regular file at a canonical path,
/// without following reparse points.
///
/// Built with [`CreateRequest::builder`]. The reparse policy, disposition and
/// object kind have a single value each, so no request can be built that
/// follows a link or opens an existing object.
#[derive(Debug, Clone)]
pub struct CreateRequest<'a> {
    path: &'a CanonicalPath,
    reparse: ReparsePolicy,
    access: Access,
    disposition: Disposition,
    kind: ObjectKind,
    share: ShareAccess,
    attributes: FileAttributes,
    case_sensitive: bool,
}

impl<'a> CreateRequest<'a> {
    pub fn builder(path: &'a CanonicalPath) -> CreateRequestBuilder<'a> {
        CreateRequestBuilder {
            path,
            share: ShareAccess::default(),
            attributes: FileAttributes::default(),
            case_sensitive: false,
        }
    }

    pub fn path(&self) -> &'a CanonicalPath {
        self.path
    }

    pub fn reparse_policy(&self) -> ReparsePolicy {
        self.reparse
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn share(&self) -> ShareAccess {
        self.share
    }

    pub fn attributes(&self) -> FileAttributes {
        self.attributes
    }

    /// Returns the flags and values passed to the system for this request.
    pub fn raw(&self) -> RawRequest {
        let mut object_attributes = self.reparse.object_attributes();
        if !self.case_sensitive {
            object_attributes |= OBJ_CASE_INSENSITIVE;
        }
        RawRequest {
            object_attributes,
            desired_access: self.access.mask(),
            file_attributes: self.attributes.bits(),
            share_access: self.share.value(),
            disposition: self.disposition.value(),
            create_options: self.kind.create_options()
                | self.reparse.create_options()
                | FILE_SYNCHRONOUS_IO_NONALERT,
        }
    }
}

/// Options for a [`CreateRequest`].
#[derive(Debug, Clone)]
pub struct CreateRequestBuilder<'a> {
    path: &'a CanonicalPath,
    share: ShareAccess,
    attributes: FileAttributes,
    case_sensitive: bool,
}

impl<'a> CreateRequestBuilder<'a> {
    /// Allows others to open the file for reading while the handle is open.
    pub fn share_read(&mut self, share: bool) -> &mut Self {
        self.share.read = share;
        self
    }

    /// Allows others to open the file for writing while the handle is open.
    pub fn share_write(&mut self, share: bool) -> &mut Self {
        self.share.write = share;
        self
    }

    /// Allows others to delete or rename the file while the handle is open.
    pub fn share_delete(&mut self, share: bool) -> &mut Self {
        self.share.delete = share;
        self
    }

    /// Sets the attributes of the new file.
    pub fn attributes(&mut self, attributes: FileAttributes) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// Looks up names case-sensitively. By default lookups ignore case, as
    /// Win32 opens do.
    pub fn case_sensitive(&mut self, case_sensitive: bool) -> &mut Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Validates the options and returns the request.
    pub fn build(&self) -> Result<CreateRequest<'a>, Error> {
        if self.path.file_name().is_none() {
            return Err(SyntaxError::NoFileName.into());
        }
        if self.path.len() > NativeString::MAX_CHARS {
            return Err(Error::PathTooLong {
                len: self.path.len(),
            });
        }
        Ok(CreateRequest {
            path: self.path,
            reparse: ReparsePolicy::Never,
            access: Access::Full,
            disposition: Disposition::CreateNew,
            kind: ObjectKind::RegularFile,
            share: self.share,
            attributes: self.attributes,
            case_sensitive: self.case_sensitive,
        })
    }
}

/// The action reported in the `Information` field of a completed create.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CreateAction {
    Superseded,
    Opened,
    Created,
    Overwritten,
    Exists,
    DoesNotExist,
}

impl CreateAction {
    pub fn from_information(information: usize) -> Option<Self> {
        Some(match information {
            0 => CreateAction::Superseded,
            1 => CreateAction::Opened,
            2 => CreateAction::Created,
            3 => CreateAction::Overwritten,
            4 => CreateAction::Exists,
            5 => CreateAction::DoesNotExist,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::canonicalize_str;

    #[test]
    fn default_request() {
        let path = canonicalize_str(r"C:\backup\file.txt").unwrap();
        let request = CreateRequest::builder(&path).build().unwrap();
        assert_eq!(request.reparse_policy(), ReparsePolicy::Never);
        assert_eq!(request.access(), Access::Full);
        assert_eq!(request.disposition(), Disposition::CreateNew);
        assert_eq!(request.kind(), ObjectKind::RegularFile);
        assert_eq!(request.path(), &path);
        assert_eq!(
            request.raw(),
            RawRequest {
                object_attributes: 0x1040,
                desired_access: 0x1010_0000,
                file_attributes: 0x80,
                share_access: 0,
                disposition: 2,
                create_options: 0x0020_0060,
            }
        );
    }

    #[test]
    fn reparse_flags_survive_options() {
        let path = canonicalize_str(r"C:\backup\file.txt").unwrap();
        let request = CreateRequest::builder(&path)
            .share_read(true)
            .share_write(true)
            .share_delete(true)
            .case_sensitive(true)
            .attributes(FileAttributes::HIDDEN | FileAttributes::NOT_CONTENT_INDEXED)
            .build()
            .unwrap();
        let raw = request.raw();
        assert_eq!(raw.object_attributes, OBJ_DONT_REPARSE);
        assert_ne!(raw.create_options & FILE_OPEN_REPARSE_POINT, 0);
        assert_ne!(raw.create_options & FILE_NON_DIRECTORY_FILE, 0);
        assert_eq!(raw.disposition, FILE_CREATE);
        assert_eq!(raw.share_access, 7);
        assert_eq!(raw.file_attributes, 0x2002);
    }

    #[test]
    fn file_attributes() {
        assert_eq!(FileAttributes::default().bits(), 0x80);
        assert_eq!((FileAttributes::NORMAL | FileAttributes::HIDDEN).bits(), 0x2);
        assert!((FileAttributes::ARCHIVE | FileAttributes::TEMPORARY)
            .contains(FileAttributes::TEMPORARY));
        assert!(!FileAttributes::READONLY.contains(FileAttributes::SYSTEM));
    }

    #[test]
    fn requires_file_name() {
        for root in [r"C:\", r"C:\dir\", r"\\server\share"] {
            let path = canonicalize_str(root).unwrap();
            assert_eq!(
                CreateRequest::builder(&path).build().unwrap_err(),
                Error::InvalidPathSyntax(SyntaxError::NoFileName),
                "{root}"
            );
        }
    }

    #[test]
    fn create_action() {
        assert_eq!(CreateAction::from_information(2), Some(CreateAction::Created));
        assert_eq!(CreateAction::from_information(1), Some(CreateAction::Opened));
        assert_eq!(CreateAction::from_information(6), None);
    }

    #[cfg(windows)]
    #[test]
    fn matches_system_constants() {
        use ntapi::ntioapi;
        use winapi::shared::ntdef;
        use winapi::um::winnt;

        assert_eq!(OBJ_CASE_INSENSITIVE, ntdef::OBJ_CASE_INSENSITIVE);
        assert_eq!(GENERIC_ALL, winnt::GENERIC_ALL);
        assert_eq!(SYNCHRONIZE, winnt::SYNCHRONIZE);
        assert_eq!(FILE_SHARE_READ, winnt::FILE_SHARE_READ);
        assert_eq!(FILE_SHARE_WRITE, winnt::FILE_SHARE_WRITE);
        assert_eq!(FILE_SHARE_DELETE, winnt::FILE_SHARE_DELETE);
        assert_eq!(FileAttributes::NORMAL.bits(), winnt::FILE_ATTRIBUTE_NORMAL);
        assert_eq!(FILE_CREATE, ntioapi::FILE_CREATE);
        assert_eq!(FILE_NON_DIRECTORY_FILE, ntioapi::FILE_NON_DIRECTORY_FILE);
        assert_eq!(FILE_OPEN_REPARSE_POINT, ntioapi::FILE_OPEN_REPARSE_POINT);
        assert_eq!(
            FILE_SYNCHRONOUS_IO_NONALERT,
            ntioapi::FILE_SYNCHRONOUS_IO_NONALERT
        );
        assert_eq!(
            CreateAction::from_information(ntioapi::FILE_CREATED as usize),
            Some(CreateAction::Created)
        );
    }
}
