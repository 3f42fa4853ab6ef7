//! Tooth hover, selection and focus.
//!
//! `controller` owns the state machine, `picking` feeds it pointer input and
//! `cursor` reflects its cursor style onto the window.

pub mod controller;
pub mod cursor;
pub mod picking;
pub mod state;
