//! Types stored outside the menu database.

pub mod session;

pub use session::keys as session_keys;
