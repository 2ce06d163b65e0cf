//! Request-level services composed from the repositories and the session.
//!
//! # Services
//!
//! - `menu` - Menu listing with category and name filters
//! - `cart` - Session cart persistence and nutrition aggregation
//!
//! Services never reach for ambient state: every function takes the
//! connection, session, or cart it works on as an argument.

pub mod cart;
pub mod menu;
