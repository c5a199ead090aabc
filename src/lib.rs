//! Shellmarks: a bookmark tree for a desktop shell, persisted as registry keys.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod registry;
pub mod rpc_handler;
pub mod services;
pub mod types;
