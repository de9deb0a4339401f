//! Core kernel modules
//!
//! Everything here is architecture independent and runs on the host.

pub mod config;
pub mod coop;
pub mod critical;
pub mod cs_cell;
pub mod current;
pub mod error;
pub mod frame;
pub mod kernel;
pub mod ring;
pub mod sched;
pub mod task;
pub mod time;
pub mod types;
