//! Product catalog HTTP service.
//!
//! The binary in `main.rs` is the composition root; this library exposes the
//! pieces it wires together so they can be tested and documented on their own.

pub mod api;
pub mod config;
pub mod openapi;
