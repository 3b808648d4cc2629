// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! This crate provides the platform layer for creating files through the NT
//! native API: counted UTF-16 strings, and on Windows, the system-allocated
//! string, object attribute, status, and file creation wrappers.
//!
//! The string types are portable so that callers can build and check native
//! requests on any host. Everything that calls into the system lives in the
//! `windows` module, which only exists on Windows.

pub mod native_string;
pub mod windows;

pub use native_string::from_native;
pub use native_string::to_native;
pub use native_string::AsNativeUnits;
pub use native_string::NativeString;
pub use native_string::StringTooLong;
