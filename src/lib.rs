//! PiKite rig controller library.
//!
//! Exposes the control core (timer, scoped input handler, menu state
//! machine, capture loop) and its adapters for integration testing.  The
//! binary in `main.rs` only wires these together.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod input;
pub mod logging;
pub mod menu;
pub mod pins;
pub mod timer;
