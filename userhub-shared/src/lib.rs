//! # Userhub Shared Library
//!
//! Database layer and models shared by the Userhub services.
//!
//! ## Modules
//!
//! - `db`: connection pool, dialect selection, and schema bootstrap
//! - `models`: the `users` resource and its repository operations

pub mod db;
pub mod models;
