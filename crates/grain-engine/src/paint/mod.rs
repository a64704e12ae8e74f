//! Color representation used by clear colors and render state.

mod color;

pub use color::Color;
