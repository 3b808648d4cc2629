// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(windows)]
// UNSAFETY: Calls to NT functions, and construction of the counted string and
// object attribute structures they consume.
#![expect(unsafe_code)]
#![allow(clippy::undocumented_unsafe_blocks)]

pub mod fs;

use crate::native_string::AsNativeUnits;
use crate::native_string::NativeString;
use ntapi::ntrtl::RtlDosPathNameToNtPathName_U_WithStatus;
use ntapi::ntrtl::RtlFreeUnicodeString;
use ntapi::ntrtl::RtlNtStatusToDosErrorNoTeb;
use std::fmt;
use std::io::Error;
use std::io::Result;
use std::marker::PhantomData;
use std::mem::zeroed;
use std::path::Path;
use std::ptr::null_mut;
use std::ptr::NonNull;
use widestring::U16CString;
use winapi::shared::ntdef;
use winapi::shared::ntdef::NTSTATUS;
use winapi::shared::ntdef::UNICODE_STRING;
use winapi::shared::winerror::ERROR_BAD_PATHNAME;

// Represents a UNICODE_STRING whose buffer was allocated by the system, such
// as the output of a path conversion. The buffer is released with
// RtlFreeUnicodeString when the value is dropped.
#[repr(transparent)]
pub struct UnicodeString(UNICODE_STRING);

// SAFETY: UnicodeString owns its heap-allocated pointers, which can be safely
//         aliased and sent between threads.
unsafe impl Send for UnicodeString {}
unsafe impl Sync for UnicodeString {}

impl UnicodeString {
    /// Returns a string with no buffer, ready to be filled in by a system call
    /// that allocates its output.
    pub fn empty() -> Self {
        Self(unsafe { zeroed() })
    }

    pub fn is_empty(&self) -> bool {
        self.0.Buffer.is_null() || self.0.Length == 0
    }

    pub fn as_mut_ptr(&mut self) -> *mut UNICODE_STRING {
        &mut self.0
    }

    pub fn as_slice(&self) -> &[u16] {
        let buffer = NonNull::new(self.0.Buffer).unwrap_or_else(NonNull::dangling);
        let len = if self.0.Buffer.is_null() {
            0
        } else {
            self.0.Length as usize / 2
        };
        unsafe { std::slice::from_raw_parts(buffer.as_ptr(), len) }
    }
}

impl Drop for UnicodeString {
    fn drop(&mut self) {
        // RtlFreeUnicodeString ignores a null buffer and clears the fields, so
        // an unfilled string is released safely too.
        unsafe {
            RtlFreeUnicodeString(&mut self.0);
        }
    }
}

impl AsNativeUnits for UnicodeString {
    fn as_units(&self) -> &[u16] {
        self.as_slice()
    }
}

impl fmt::Debug for UnicodeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UnicodeString")
            .field(&String::from_utf16_lossy(self.as_slice()))
            .finish()
    }
}

/// A UNICODE_STRING that borrows its buffer for `'a`.
#[repr(transparent)]
#[derive(Copy, Clone)]
pub struct UnicodeStringRef<'a>(UNICODE_STRING, PhantomData<&'a [u16]>);

impl UnicodeStringRef<'_> {
    /// The length of the contents in bytes.
    pub fn length(&self) -> u16 {
        self.0.Length
    }

    /// The size of the referenced buffer in bytes.
    pub fn maximum_length(&self) -> u16 {
        self.0.MaximumLength
    }

    pub fn as_ptr(&self) -> *const UNICODE_STRING {
        &self.0
    }

    pub fn as_slice(&self) -> &[u16] {
        let buffer = NonNull::new(self.0.Buffer).unwrap_or_else(NonNull::dangling);
        unsafe { std::slice::from_raw_parts(buffer.as_ptr(), self.0.Length as usize / 2) }
    }
}

impl<'a> From<&'a NativeString> for UnicodeStringRef<'a> {
    fn from(value: &'a NativeString) -> Self {
        // The terminator is part of the buffer but not of the contents.
        let buffer = value.as_slice_with_nul();
        Self(
            UNICODE_STRING {
                Length: value.length(),
                MaximumLength: value.maximum_length(),
                Buffer: buffer.as_ptr().cast_mut(),
            },
            PhantomData,
        )
    }
}

impl AsNativeUnits for UnicodeStringRef<'_> {
    fn as_units(&self) -> &[u16] {
        self.as_slice()
    }
}

pub trait AsUnicodeStringRef {
    fn as_unicode_string_ref(&self) -> &UnicodeStringRef<'_>;
}

impl AsUnicodeStringRef for UnicodeString {
    fn as_unicode_string_ref(&self) -> &UnicodeStringRef<'_> {
        // SAFETY: &UnicodeStringRef can be safely transmuted from
        // &UNICODE_STRING as long as the lifetimes are correct, and they are
        // here because the UnicodeStringRef will live no longer than self.
        unsafe { std::mem::transmute(&self.0) }
    }
}

impl AsUnicodeStringRef for UnicodeStringRef<'_> {
    fn as_unicode_string_ref(&self) -> &UnicodeStringRef<'_> {
        self
    }
}

pub fn status_to_error(status: NTSTATUS) -> Error {
    Error::from_raw_os_error(unsafe { RtlNtStatusToDosErrorNoTeb(status) } as i32)
}

pub fn chk_status(status: NTSTATUS) -> Result<NTSTATUS> {
    if status >= 0 {
        Ok(status)
    } else {
        Err(status_to_error(status))
    }
}

/// Converts a Win32 path to an NT path, resolving relative paths against the
/// current directory. The result is allocated by the system.
pub fn dos_to_nt_path<P: AsRef<Path>>(path: P) -> Result<UnicodeString> {
    let path16 = U16CString::from_os_str(path.as_ref().as_os_str())
        .map_err(|_| Error::from_raw_os_error(ERROR_BAD_PATHNAME as i32))?;
    let mut pathu = UnicodeString::empty();
    unsafe {
        chk_status(RtlDosPathNameToNtPathName_U_WithStatus(
            path16.as_ptr().cast_mut(),
            pathu.as_mut_ptr(),
            null_mut(),
            null_mut(),
        ))?;
    }
    Ok(pathu)
}

/// A wrapper around OBJECT_ATTRIBUTES.
#[repr(transparent)]
pub struct ObjectAttributes<'a> {
    attributes: ntdef::OBJECT_ATTRIBUTES,
    phantom: PhantomData<&'a ()>,
}

impl Default for ObjectAttributes<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ObjectAttributes<'a> {
    /// Constructs the default object attributes, with no name, root directory,
    /// attributes, or security information.
    pub fn new() -> Self {
        Self {
            attributes: ntdef::OBJECT_ATTRIBUTES {
                Length: size_of::<ntdef::OBJECT_ATTRIBUTES>() as u32,
                RootDirectory: null_mut(),
                ObjectName: null_mut(),
                Attributes: 0,
                SecurityDescriptor: null_mut(),
                SecurityQualityOfService: null_mut(),
            },
            phantom: PhantomData,
        }
    }

    /// Sets the object name to `name`.
    pub fn name<P>(&mut self, name: &'a P) -> &mut Self
    where
        P: AsUnicodeStringRef,
    {
        self.attributes.ObjectName = name.as_unicode_string_ref().as_ptr().cast_mut();
        self
    }

    /// Sets the attributes to `attributes`.
    pub fn attributes(&mut self, attributes: u32) -> &mut Self {
        self.attributes.Attributes = attributes;
        self
    }

    /// Returns the attribute flags that will be passed to the system.
    pub fn attribute_flags(&self) -> u32 {
        self.attributes.Attributes
    }

    /// Returns the OBJECT_ATTRIBUTES pointer for passing to an NT syscall.
    pub fn as_ptr(&self) -> *mut ntdef::OBJECT_ATTRIBUTES {
        std::ptr::from_ref(&self.attributes).cast_mut()
    }
}
