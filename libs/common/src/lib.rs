//! Common library for the Aora application
//!
//! This crate provides the pieces shared by the backend client, the
//! data-access layer and the mobile front-end: backend configuration and the
//! error taxonomy.

pub mod config;
pub mod error;

pub use config::AppwriteConfig;
pub use error::{BackendError, BackendResult};
