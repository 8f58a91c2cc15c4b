//! Noteplane - multi-tenant notes backend.
//!
//! The core of the crate is the authorization engine in [`authz`]; the rest
//! is the storage and HTTP surface it guards. Everything is public so the
//! integration tests can exercise it.

pub mod authz;
pub mod entities;
pub mod errors;
pub mod session;
pub mod settings;
pub mod storage;
pub mod web;
