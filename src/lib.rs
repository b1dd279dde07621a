//! TabKeeper mirrors a live browser tab registry into a local snapshot and
//! derives bulk operations from it: search, domain grouping, duplicate
//! closing, scoped closing and inactive-tab suspension.
//!
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod app;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod source;
pub mod types;
