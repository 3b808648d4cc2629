// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Conversion of Win32 paths to device-qualified NT paths.
//!
//! Fully qualified paths are converted by string manipulation alone, so the
//! result depends only on the input. Nothing here looks at the file system;
//! links are detected later, by the create request itself.

use crate::error::Error;
use crate::error::SyntaxError;
use pal::AsNativeUnits;
use pal::NativeString;
use pal::StringTooLong;
use std::fmt;
use std::path::Path;
use widestring::U16Str;
use widestring::U16String;

const BACKSLASH: u16 = b'\\' as u16;
const SLASH: u16 = b'/' as u16;
const DOT: u16 = b'.' as u16;
const SPACE: u16 = b' ' as u16;
const COLON: u16 = b':' as u16;
const QUESTION: u16 = b'?' as u16;

const NT_PREFIX: [u16; 4] = [BACKSLASH, QUESTION, QUESTION, BACKSLASH];
const UNC: [u16; 3] = [b'U' as u16, b'N' as u16, b'C' as u16];

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9", "CONIN$",
    "CONOUT$", "CLOCK$",
];

/// A device-qualified NT path, such as `\??\C:\Users\Public`.
///
/// Only produced by [`canonicalize`] and friends. The path is kept as UTF-16
/// so that names which are not valid Unicode survive unchanged.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPath {
    path: U16String,
    // Length of the device prefix, e.g. `\??\C:\` or `\??\UNC\server\share\`.
    root_len: usize,
}

impl CanonicalPath {
    fn from_units(units: Vec<u16>) -> Result<Self, Error> {
        if units.len() > NativeString::MAX_CHARS {
            return Err(Error::PathTooLong { len: units.len() });
        }
        let root_len = nt_root_len(&units);
        Ok(Self {
            path: U16String::from_vec(units),
            root_len,
        })
    }

    pub fn as_units(&self) -> &[u16] {
        self.path.as_slice()
    }

    pub fn as_u16_str(&self) -> &U16Str {
        &self.path
    }

    /// The number of UTF-16 units in the path.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Returns the device prefix, including its trailing separator if any.
    pub fn root(&self) -> &[u16] {
        &self.as_units()[..self.root_len]
    }

    /// Returns the final component, or `None` if the path names a device
    /// root or ends with a separator.
    pub fn file_name(&self) -> Option<&[u16]> {
        let units = self.as_units();
        let tail = &units[self.root_len..];
        if tail.is_empty() || tail.last() == Some(&BACKSLASH) {
            return None;
        }
        let start = tail
            .iter()
            .rposition(|&c| c == BACKSLASH)
            .map_or(0, |i| i + 1);
        Some(&tail[start..])
    }

    /// Encodes the path as a counted native string.
    pub fn to_native(&self) -> Result<NativeString, StringTooLong> {
        NativeString::new(self.as_units())
    }

    pub fn to_string_lossy(&self) -> String {
        self.path.to_string_lossy()
    }
}

impl AsNativeUnits for CanonicalPath {
    fn as_units(&self) -> &[u16] {
        self.path.as_slice()
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path.display(), f)
    }
}

impl fmt::Debug for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_string_lossy(), f)
    }
}

/// Converts `path` to a device-qualified NT path.
///
/// Drive-absolute (`C:\a`), UNC (`\\server\share\a`), device (`\\.\C:\a`),
/// literal (`\\?\C:\a`) and NT (`\??\C:\a`) paths are converted without
/// consulting any process state. Relative paths are resolved against the
/// current directory, which is only possible on Windows.
pub fn canonicalize(path: impl AsRef<Path>) -> Result<CanonicalPath, Error> {
    canonicalize_wide(&path_to_units(path.as_ref())?)
}

/// Like [`canonicalize`], for a UTF-8 string.
pub fn canonicalize_str(path: &str) -> Result<CanonicalPath, Error> {
    canonicalize_wide(&path.encode_utf16().collect::<Vec<_>>())
}

/// Like [`canonicalize`], for a UTF-16 string.
pub fn canonicalize_wide(path: &[u16]) -> Result<CanonicalPath, Error> {
    let canonical = convert(path)?;
    tracing::debug!(path = %canonical, "canonicalized path");
    Ok(canonical)
}

#[cfg(windows)]
fn path_to_units(path: &Path) -> Result<Vec<u16>, Error> {
    use std::os::windows::ffi::OsStrExt;
    Ok(path.as_os_str().encode_wide().collect())
}

#[cfg(not(windows))]
fn path_to_units(path: &Path) -> Result<Vec<u16>, Error> {
    let path = path.to_str().ok_or(Error::InvalidEncoding)?;
    Ok(path.encode_utf16().collect())
}

fn is_separator(c: u16) -> bool {
    c == BACKSLASH || c == SLASH
}

fn convert(path: &[u16]) -> Result<CanonicalPath, Error> {
    if path.is_empty() {
        return Err(SyntaxError::Empty.into());
    }
    if path.contains(&0) {
        return Err(SyntaxError::EmbeddedNul.into());
    }
    if path.len() > NativeString::MAX_CHARS {
        return Err(Error::PathTooLong { len: path.len() });
    }

    let mut out = NT_PREFIX.to_vec();
    match path {
        // Already an NT path.
        [BACKSLASH, QUESTION, QUESTION, BACKSLASH, rest @ ..] => {
            check_literal(rest)?;
            out.extend_from_slice(rest);
        }
        // Literal Win32 path: only the prefix changes.
        [BACKSLASH, BACKSLASH, QUESTION, BACKSLASH, rest @ ..] => {
            check_literal(rest)?;
            out.extend_from_slice(rest);
        }
        // Device path, `\\.\` or `//?/`.
        [a, b, DOT | QUESTION, c, rest @ ..]
            if is_separator(*a) && is_separator(*b) && is_separator(*c) =>
        {
            let (device, rest) = split_component(rest);
            match device {
                [] => return Err(SyntaxError::MissingDevice.into()),
                [DOT] | [DOT, DOT] => return Err(SyntaxError::DotComponent.into()),
                _ => {}
            }
            out.extend_from_slice(device);
            push_normalized(&mut out, rest, false)?;
        }
        [a, b, rest @ ..] if is_separator(*a) && is_separator(*b) => {
            let (server, rest) = split_component(rest);
            // Repeated separators between the server and share collapse.
            let rest = match rest.iter().position(|&c| !is_separator(c)) {
                Some(i) => &rest[i..],
                None => &[],
            };
            let (share, rest) = split_component(rest);
            if server.is_empty() || share.is_empty() {
                return Err(SyntaxError::IncompleteUnc.into());
            }
            check_name(server)?;
            check_name(share)?;
            out.extend_from_slice(&UNC);
            out.push(BACKSLASH);
            out.extend_from_slice(server);
            out.push(BACKSLASH);
            out.extend_from_slice(share);
            push_normalized(&mut out, rest, false)?;
        }
        [drive, COLON, sep, rest @ ..] if is_separator(*sep) => {
            if !is_drive_letter(*drive) {
                return Err(SyntaxError::BadDrive.into());
            }
            out.extend_from_slice(&[*drive, COLON]);
            push_normalized(&mut out, rest, true)?;
        }
        _ => return resolve_relative(path),
    }

    CanonicalPath::from_units(out)
}

fn is_drive_letter(c: u16) -> bool {
    u8::try_from(c).is_ok_and(|c| c.is_ascii_alphabetic())
}

/// Splits off the first component. The separator that ends it, if any, stays
/// at the start of the remainder.
fn split_component(path: &[u16]) -> (&[u16], &[u16]) {
    match path.iter().position(|&c| is_separator(c)) {
        Some(i) => (&path[..i], &path[i..]),
        None => (path, &[]),
    }
}

/// Appends the components of `rest` to `out`, collapsing separators, removing
/// `.` and applying `..` without climbing above the root.
fn push_normalized(out: &mut Vec<u16>, rest: &[u16], rooted: bool) -> Result<(), Error> {
    let mut components: Vec<&[u16]> = Vec::new();
    for component in rest.split(|&c| is_separator(c)) {
        match component {
            [] | [DOT] => {}
            [DOT, DOT] => {
                components.pop();
            }
            name => {
                check_name(name)?;
                components.push(name);
            }
        }
    }

    let trailing = rest.last().is_some_and(|&c| is_separator(c));
    if components.is_empty() {
        if rooted || trailing {
            out.push(BACKSLASH);
        }
        return Ok(());
    }
    for component in components {
        out.push(BACKSLASH);
        out.extend_from_slice(component);
    }
    if trailing {
        out.push(BACKSLASH);
    }
    Ok(())
}

/// Checks a component that the Win32 layer would otherwise rewrite or
/// redirect.
fn check_name(name: &[u16]) -> Result<(), Error> {
    if let Some(&c) = name
        .iter()
        .find(|&&c| c < 0x20 || b"<>:\"|?*".iter().any(|&b| c == u16::from(b)))
    {
        // Every rejected unit is ASCII.
        return Err(SyntaxError::InvalidCharacter(char::from(c as u8)).into());
    }
    if matches!(name.last(), Some(&DOT | &SPACE)) {
        return Err(SyntaxError::TrailingDotOrSpace.into());
    }
    if is_reserved_name(name) {
        return Err(SyntaxError::ReservedName.into());
    }
    Ok(())
}

fn is_reserved_name(name: &[u16]) -> bool {
    let stem = match name.iter().position(|&c| c == DOT) {
        Some(i) => &name[..i],
        None => name,
    };
    let end = stem
        .iter()
        .rposition(|&c| c != SPACE)
        .map_or(0, |i| i + 1);
    let stem = &stem[..end];
    RESERVED_NAMES.iter().any(|reserved| {
        reserved.len() == stem.len()
            && reserved
                .bytes()
                .zip(stem)
                .all(|(r, &c)| u8::try_from(c).is_ok_and(|c| c.eq_ignore_ascii_case(&r)))
    })
}

/// Checks the part of a literal path after its prefix. Literal paths are
/// passed through untouched, so they must already be in final form.
fn check_literal(rest: &[u16]) -> Result<(), Error> {
    if rest.is_empty() {
        return Err(SyntaxError::MissingDevice.into());
    }
    // A single trailing separator is allowed, as in `\\?\C:\`.
    let rest = rest.strip_suffix(&[BACKSLASH]).unwrap_or(rest);
    for component in rest.split(|&c| c == BACKSLASH) {
        match component {
            [] => return Err(SyntaxError::EmptyComponent.into()),
            [DOT] | [DOT, DOT] => return Err(SyntaxError::DotComponent.into()),
            name => {
                if name.contains(&SLASH) {
                    return Err(SyntaxError::InvalidCharacter('/').into());
                }
            }
        }
    }
    Ok(())
}

/// Returns the length of the device prefix of an NT path.
fn nt_root_len(path: &[u16]) -> usize {
    let Some(rest) = path.strip_prefix(&NT_PREFIX) else {
        return 0;
    };
    let mut len = NT_PREFIX.len();
    let mut rest = rest;
    // The UNC device is followed by the server and share, which are part of
    // the root.
    let components = match rest {
        [u, n, c, BACKSLASH, tail @ ..] if is_unc(&[*u, *n, *c]) => {
            len += 4;
            rest = tail;
            2
        }
        _ => 1,
    };
    for _ in 0..components {
        match rest.iter().position(|&c| c == BACKSLASH) {
            Some(i) => {
                len += i + 1;
                rest = &rest[i + 1..];
            }
            None => return len + rest.len(),
        }
    }
    len
}

fn is_unc(name: &[u16; 3]) -> bool {
    name.iter()
        .zip(UNC)
        .all(|(&c, u)| c == u || c == u + u16::from(b'a' - b'A'))
}

/// Resolves a relative path against the current directory.
#[cfg(windows)]
fn resolve_relative(path: &[u16]) -> Result<CanonicalPath, Error> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use winapi::shared::winerror::ERROR_FILENAME_EXCED_RANGE;

    // Hold relative paths to the same naming rules as absolute ones. A drive
    // designator (`C:name`) is the only place a colon may appear.
    let names = match path {
        [drive, COLON, rest @ ..] if is_drive_letter(*drive) => rest,
        _ => path,
    };
    for name in names.split(|&c| is_separator(c)) {
        if !matches!(name, [] | [DOT] | [DOT, DOT]) {
            check_name(name)?;
        }
    }

    let nt_path = pal::windows::dos_to_nt_path(OsString::from_wide(path)).map_err(|err| {
        match err.raw_os_error() {
            Some(code) if code == ERROR_FILENAME_EXCED_RANGE as i32 => {
                Error::PathTooLong { len: path.len() }
            }
            code => SyntaxError::Conversion(code.unwrap_or_default()).into(),
        }
    })?;
    // `nt_path` was allocated by the system and is released when it goes out
    // of scope, on this path and every error path above.
    CanonicalPath::from_units(nt_path.as_units().to_vec())
}

#[cfg(not(windows))]
fn resolve_relative(_path: &[u16]) -> Result<CanonicalPath, Error> {
    Err(SyntaxError::Relative.into())
}
