//! BULWARK application layer.
//!
//! Runs the simulation engine on its own thread and exposes a small control
//! surface (start, send command, poll snapshot, stop) plus a scripted
//! headless session used by the demo binary.

pub mod control;
pub mod game_loop;
pub mod session;
pub mod state;

pub use bulwark_core as core;
