// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! End-to-end tests that create files on a real volume.

#![cfg(windows)]

mod common;
mod create;
mod links;
mod race;
