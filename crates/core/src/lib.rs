//! Xano Bridge Core - Shared types library.
//!
//! This crate provides the data model used by the `xano-bridge` service:
//! - [`ProviderUser`] - user snapshot from the identity provider
//! - [`BackendUserPayload`] - the backend's user-sync wire shape
//! - [`SessionToken`] - opaque backend session token
//! - [`SyncResult`] - outcome of a sync attempt
//!
//! # Architecture
//!
//! The core crate contains only types and pure mappings - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
