//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the window registry, and wires them to
//! the GPU layer. The registry (native id → window entry) is what lets a
//! platform callback that only knows the native id reach the owning state —
//! explicitly, instead of through a process-wide manager.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
pub use winit::window::WindowId;
