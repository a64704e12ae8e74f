//! Grain engine crate.
//!
//! Runtime core of a small real-time application framework: the frame loop,
//! the layer stack and its event pipeline, and a renderer front-end over
//! swappable backends.

pub mod core;
pub mod event;
pub mod input;
pub mod time;
pub mod window;

pub mod coords;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
