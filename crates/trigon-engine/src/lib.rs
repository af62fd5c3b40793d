//! Trigon engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the demo:
//! window/event-loop plumbing, keyboard input and key bindings, the shader
//! and vertex-buffer layer, and small geometry value types.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod geom;
pub mod render;
