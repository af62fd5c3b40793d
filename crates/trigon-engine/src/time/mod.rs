//! Time utilities.
//!
//! - one [`FrameClock`] per window; `tick()` once per presented frame
//! - [`Countdown`] for fire-and-forget delayed flags (e.g. "close this
//!   window in a few seconds")

mod countdown;
mod frame_clock;

pub use countdown::Countdown;
pub use frame_clock::{FrameClock, FrameTime};
