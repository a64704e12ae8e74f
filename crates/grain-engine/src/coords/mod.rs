//! Coordinate types shared between the window layer and renderers.
//!
//! Viewports are in physical pixels with the origin at the top-left.

mod viewport;

pub use viewport::Viewport;
