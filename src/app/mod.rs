//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the control-loop rules for the PiKite rig: scope
//! handling, menu dispatch and the capture session.  All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without a camera, altimeter or buttons.

pub mod capture;
pub mod events;
pub mod ports;
pub mod service;
