//! Home security monitor library.
//!
//! Tracks door, window and motion sensors, an arming mode and the derived
//! alarm status, and escalates to alarm when the camera sees a cat while the
//! system is armed at home.

pub mod config;
pub mod error;
pub mod input;
pub mod repository;
pub mod security;
pub mod sensors;
