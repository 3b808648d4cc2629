// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Counted UTF-16 strings in the layout consumed by the NT native API.
//!
//! A `UNICODE_STRING` describes its contents with two byte counts: `Length`,
//! the number of valid bytes, and `MaximumLength`, the size of the buffer.
//! [`NativeString`] keeps those counts as ordinary fields next to an owned
//! buffer, so the counts can never disagree with the allocation. The buffer is
//! only reachable through borrows tied to the `NativeString`.

use std::fmt;
use widestring::U16Str;

/// The string does not fit in a counted native string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringTooLong;

impl fmt::Display for StringTooLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "string exceeds {} UTF-16 code units",
            NativeString::MAX_CHARS
        )
    }
}

impl std::error::Error for StringTooLong {}

/// Access to the valid UTF-16 units of a counted string.
pub trait AsNativeUnits {
    /// Returns the units covered by the string's length, excluding any
    /// terminator.
    fn as_units(&self) -> &[u16];
}

impl<T: AsNativeUnits + ?Sized> AsNativeUnits for &T {
    fn as_units(&self) -> &[u16] {
        (*self).as_units()
    }
}

/// An owned, NUL-terminated, counted UTF-16 string.
///
/// `length` and `maximum_length` are byte counts, matching the native
/// representation. `maximum_length` always covers the terminator, so
/// `length < maximum_length` holds for every value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NativeString {
    // Invariant: buffer.len() == length / 2 + 1 and the last unit is 0.
    buffer: Vec<u16>,
    length: u16,
    maximum_length: u16,
}

impl NativeString {
    /// The largest number of UTF-16 units a `NativeString` can hold. The byte
    /// count of the contents plus the terminator must fit in a `u16`.
    pub const MAX_CHARS: usize = (u16::MAX as usize / 2) - 1;

    /// Copies `s` into a new native string.
    pub fn new(s: &[u16]) -> Result<Self, StringTooLong> {
        Self::from_vec(s.to_vec())
    }

    /// Returns a native string with no contents. The buffer still holds the
    /// terminator, so it is never null.
    pub fn empty() -> Self {
        Self {
            buffer: vec![0],
            length: 0,
            maximum_length: 2,
        }
    }

    fn from_vec(mut units: Vec<u16>) -> Result<Self, StringTooLong> {
        let length: u16 = (units.len() * 2).try_into().map_err(|_| StringTooLong)?;
        let maximum_length = length.checked_add(2).ok_or(StringTooLong)?;
        units.push(0);
        Ok(Self {
            buffer: units,
            length,
            maximum_length,
        })
    }

    /// The number of UTF-16 units in the string.
    pub fn len(&self) -> usize {
        usize::from(self.length) / 2
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The length of the contents in bytes, excluding the terminator.
    pub fn length(&self) -> u16 {
        self.length
    }

    /// The size of the buffer in bytes, including the terminator.
    pub fn maximum_length(&self) -> u16 {
        self.maximum_length
    }

    /// Returns the contents, excluding the terminator.
    pub fn as_slice(&self) -> &[u16] {
        &self.buffer[..self.len()]
    }

    /// Returns the contents followed by the terminator.
    pub fn as_slice_with_nul(&self) -> &[u16] {
        &self.buffer
    }

    /// Decodes the contents, replacing unpaired surrogates with U+FFFD.
    pub fn to_string_lossy(&self) -> String {
        from_native(self)
    }

    /// Decodes the contents without loss.
    #[cfg(windows)]
    pub fn to_os_string(&self) -> std::ffi::OsString {
        from_native_os(self)
    }
}

impl Default for NativeString {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for NativeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeString")
            .field("value", &self.to_string_lossy())
            .field("length", &self.length)
            .field("maximum_length", &self.maximum_length)
            .finish()
    }
}

impl AsNativeUnits for NativeString {
    fn as_units(&self) -> &[u16] {
        self.as_slice()
    }
}

impl AsNativeUnits for [u16] {
    fn as_units(&self) -> &[u16] {
        self
    }
}

impl AsNativeUnits for U16Str {
    fn as_units(&self) -> &[u16] {
        self.as_slice()
    }
}

impl<'a> TryFrom<&'a str> for NativeString {
    type Error = StringTooLong;
    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        Self::from_vec(value.encode_utf16().collect())
    }
}

impl<'a> TryFrom<&'a U16Str> for NativeString {
    type Error = StringTooLong;
    fn try_from(value: &'a U16Str) -> Result<Self, Self::Error> {
        Self::new(value.as_slice())
    }
}

#[cfg(windows)]
impl<'a> TryFrom<&'a std::ffi::OsStr> for NativeString {
    type Error = StringTooLong;
    fn try_from(value: &'a std::ffi::OsStr) -> Result<Self, Self::Error> {
        use std::os::windows::ffi::OsStrExt;
        Self::from_vec(value.encode_wide().collect())
    }
}

/// Encodes `s` as a native string owned by the caller.
pub fn to_native(s: &str) -> Result<NativeString, StringTooLong> {
    NativeString::try_from(s)
}

/// Decodes the valid units of a native string. Reads exactly the counted
/// length; an empty or null-buffer string decodes to `""`.
pub fn from_native<S: AsNativeUnits + ?Sized>(ns: &S) -> String {
    String::from_utf16_lossy(ns.as_units())
}

/// Decodes the valid units of a native string without loss.
#[cfg(windows)]
pub fn from_native_os<S: AsNativeUnits + ?Sized>(ns: &S) -> std::ffi::OsString {
    use std::os::windows::ffi::OsStringExt;
    std::ffi::OsString::from_wide(ns.as_units())
}
