//! LinkStash: a single-user bookmark manager.
//!
//! Saves URLs, classifies them by platform, tags and favorites them, and
//! exports/imports the collection as JSON. This library crate exposes all
//! modules for use by the RPC binary and integration tests.

pub mod app;
pub mod config;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod storage;
pub mod types;
