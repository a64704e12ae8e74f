use grain_engine::core::{EngineCtx, Layer};
use grain_engine::event::{Event, EventDispatcher, KeyPressed};
use grain_engine::input::Key;
use grain_engine::time::Timestep;

const SLOW_MOTION: f32 = 0.25;

/// Logs the frame rate once a second; `T` toggles slow motion.
#[derive(Debug, Default)]
pub struct StatsLayer {
    elapsed: f32,
    frames: u32,
    toggle_requested: bool,
}

impl StatsLayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layer for StatsLayer {
    fn name(&self) -> &str {
        "Stats"
    }

    fn on_update(&mut self, ts: Timestep, ctx: &mut EngineCtx) {
        if std::mem::take(&mut self.toggle_requested) {
            let scale = if ctx.clock.time_scale() == 1.0 { SLOW_MOTION } else { 1.0 };
            ctx.clock.set_time_scale(scale);
            log::info!("time scale set to {scale}");
        }

        // Raw time, so slow motion does not skew the reading.
        self.elapsed += ts.unscaled_seconds();
        self.frames += 1;
        if self.elapsed >= 1.0 {
            let (w, h) = ctx.window_size();
            log::info!(
                "{:.1} fps ({} frames, {w}x{h}, last dt {:.2} ms)",
                self.frames as f32 / self.elapsed,
                self.frames,
                ts.millis()
            );
            self.elapsed = 0.0;
            self.frames = 0;
        }
    }

    fn on_event(&mut self, event: &mut Event) {
        let toggle = &mut self.toggle_requested;
        EventDispatcher::new(event).dispatch::<KeyPressed, _>(|key| {
            if key.key == Key::T && key.repeat_count == 0 {
                *toggle = true;
            }
            false
        });
    }
}

#[cfg(test)]
mod tests {
    use grain_engine::render::headless::HeadlessApi;
    use grain_engine::render::Renderer;

    use super::*;

    fn ctx() -> EngineCtx {
        EngineCtx::new(Renderer::new(Box::new(HeadlessApi::default())), (800, 600))
    }

    fn frame() -> Timestep {
        Timestep::new(0.016, 1.0, 0.0, 0)
    }

    fn press(layer: &mut StatsLayer, repeat_count: u32) -> Event {
        let mut event = Event::new(KeyPressed { key: Key::T, repeat_count });
        layer.on_event(&mut event);
        event
    }

    #[test]
    fn t_toggles_slow_motion_on_the_next_update() {
        let mut ctx = ctx();
        let mut stats = StatsLayer::new();

        press(&mut stats, 0);
        assert_eq!(ctx.clock.time_scale(), 1.0);
        stats.on_update(frame(), &mut ctx);
        assert_eq!(ctx.clock.time_scale(), SLOW_MOTION);

        press(&mut stats, 0);
        stats.on_update(frame(), &mut ctx);
        assert_eq!(ctx.clock.time_scale(), 1.0);
    }

    #[test]
    fn key_repeats_do_not_toggle() {
        let mut ctx = ctx();
        let mut stats = StatsLayer::new();

        press(&mut stats, 0);
        stats.on_update(frame(), &mut ctx);
        press(&mut stats, 1);
        stats.on_update(frame(), &mut ctx);
        assert_eq!(ctx.clock.time_scale(), SLOW_MOTION);
    }

    #[test]
    fn key_presses_are_left_for_other_layers() {
        let mut stats = StatsLayer::new();
        assert!(!press(&mut stats, 0).handled());

        let mut other = Event::new(KeyPressed { key: Key::A, repeat_count: 0 });
        stats.on_event(&mut other);
        assert!(!stats.toggle_requested);
    }
}
