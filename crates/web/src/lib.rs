//! McD Calories web application library.
//!
//! Menu browsing, a session-scoped cart, and nutrition totals. The binary
//! in `main.rs` wires these modules into a server; the CLI and the
//! integration tests reuse them directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
