//! Input drivers for the front panel.

pub mod button;
