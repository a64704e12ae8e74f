//! Application loop and the layer pipeline.
//!
//! An [`Application`] owns the window, a [`LayerStack`] and the
//! [`EngineCtx`] handed to every [`Layer`] hook. Layers are pushed once and
//! referred to afterwards through generation-checked [`LayerHandle`]s.

mod application;
mod config;
mod ctx;
mod layer;
mod layer_stack;
mod ui;

pub use application::Application;
pub use config::AppConfig;
pub use ctx::EngineCtx;
pub use layer::Layer;
pub use layer_stack::{LayerHandle, LayerStack};
pub use ui::{UiLayer, UiOverlay};
