use crate::event::Event;
use crate::time::Timestep;

use super::ctx::EngineCtx;
use super::ui::UiLayer;

/// A unit of per-frame behavior owned by a [`LayerStack`](super::LayerStack).
///
/// Every hook has an empty default, so a layer only implements what it uses.
/// Update, render and UI hooks run in stack order (regular layers, then
/// overlays); events arrive in reverse order and stop at the first layer that
/// marks them handled.
pub trait Layer {
    /// Diagnostic name, used in logs.
    fn name(&self) -> &str;

    /// Called once, right after the stack takes ownership.
    fn on_attach(&mut self, ctx: &mut EngineCtx) {
        let _ = ctx;
    }

    /// Called once, right before the stack drops the layer.
    fn on_detach(&mut self) {}

    fn on_update(&mut self, ts: Timestep, ctx: &mut EngineCtx) {
        let _ = (ts, ctx);
    }

    /// Called between `begin_scene` and `end_scene`.
    fn on_render(&mut self, ctx: &mut EngineCtx) {
        let _ = ctx;
    }

    /// Called inside the UI pass, if one is attached.
    fn on_ui_render(&mut self, ctx: &mut EngineCtx) {
        let _ = ctx;
    }

    fn on_event(&mut self, event: &mut Event) {
        let _ = event;
    }

    /// Returns the UI hooks when this layer drives the UI pass.
    fn as_ui_layer(&mut self) -> Option<&mut dyn UiLayer> {
        None
    }
}
