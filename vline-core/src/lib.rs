// vline-core - Error taxonomy and host built-ins for the VLine programming language
// Copyright (c) 2025 The VLine Authors. MIT licensed.

//! # vline-core
//!
//! The runtime's shared error taxonomy and the registry of host built-in
//! functions callable from bytecode via `CALL_FUNCTION`.

pub mod builtins;
pub mod error;

pub use builtins::{HostFn, HostIo, registry};
pub use error::{Error, Result};
