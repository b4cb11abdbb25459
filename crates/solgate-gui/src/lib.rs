//! Solgate desktop GUI library.
//!
//! Re-exports modules for integration testing. The binary entry
//! point is in `main.rs`.

pub mod app;
pub mod theme;
pub mod views;
