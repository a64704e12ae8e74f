//! Time subsystem.
//!
//! Provides stable, testable frame timing without coupling to the loop.
//! Call `FrameClock::tick()` once per iteration to obtain a `Timestep`.

mod frame_clock;

pub use frame_clock::{FrameClock, Timestep};
