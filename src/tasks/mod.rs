//! Background Tasks Module
//!
//! Scheduled callbacks that run on the tokio runtime.
//!
//! # Tasks
//! - Repeating timer: runs a callback once per period until cancelled

mod timer;

pub use timer::{spawn_repeating, TimerHandle};
