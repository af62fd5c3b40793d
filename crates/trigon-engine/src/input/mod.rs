//! Keyboard input subsystem.
//!
//! The public API is platform-agnostic and does not expose winit types; the
//! runtime translates platform events into [`InputEvent`]s. [`Controls`]
//! layers key-combination bindings on top of the raw state.

mod controls;
mod frame;
mod state;
mod types;

pub use controls::{BindingId, Controls};
pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState, Modifiers};
