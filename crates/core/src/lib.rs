//! `fractal-core`: domain types and pure logic for the render service.
//!
//! Nothing in this crate touches the network, the database or threads; the
//! engine and API crates build on top of it.

pub mod clock;
pub mod error;
pub mod job;
pub mod kernel;
pub mod partition;
pub mod request;
pub mod store;
pub mod types;
