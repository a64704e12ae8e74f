use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

use crate::event::{Event, EventDispatcher, WindowClose, WindowResize};
use crate::render::headless::HeadlessApi;
use crate::render::{wgpu_backend, Backend, Renderer, RendererApi};
use crate::window::{HeadlessWindow, Window, WinitWindow};

use super::config::AppConfig;
use super::ctx::EngineCtx;
use super::layer::Layer;
use super::layer_stack::{LayerHandle, LayerStack};
use super::ui::{UiLayer, UiOverlay};

static INSTANCE: AtomicBool = AtomicBool::new(false);

/// Proof that this is the only live application in the process.
struct InstanceGuard;

impl InstanceGuard {
    fn acquire() -> Self {
        let taken = INSTANCE.swap(true, Ordering::AcqRel);
        assert!(!taken, "application already exists; only one may be alive per process");
        InstanceGuard
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        INSTANCE.store(false, Ordering::Release);
    }
}

/// Owns the window, the layer stack and the engine context, and drives the
/// frame loop.
///
/// Each iteration of [`run`](Self::run):
/// 1. ticks the clock and updates every layer (stack order);
/// 2. renders every layer between `begin_scene` and `end_scene`;
/// 3. runs the UI pass, if the UI overlay is attached;
/// 4. lets the window deliver pending events and present the frame.
///
/// The loop ends after the iteration in which a `WindowClose` was routed or a
/// layer called [`EngineCtx::request_exit`].
pub struct Application {
    window: Box<dyn Window>,
    layers: LayerStack,
    ctx: EngineCtx,
    ui_handle: Option<LayerHandle>,
    running: bool,
    shut_down: bool,
    _instance: InstanceGuard,
}

impl Application {
    /// Opens the configured window and backend.
    ///
    /// Panics if another application is alive or `config.backend` is
    /// [`Backend::None`]. If the wgpu backend cannot be brought up the error
    /// is logged and the application continues on the headless backend.
    pub fn new(config: AppConfig) -> Result<Self> {
        let instance = InstanceGuard::acquire();
        let backend = config.backend.require();
        log::info!("creating application '{}' (backend: {backend})", config.window.title);

        let (window, api) = match backend {
            Backend::Wgpu => open_wgpu(&config)?,
            Backend::Headless => open_headless(&config),
            Backend::None => unreachable!("rejected by Backend::require"),
        };
        Ok(Self::assemble(instance, config, window, api))
    }

    /// Builds an application around an existing window and backend.
    pub fn from_parts(
        config: AppConfig,
        window: Box<dyn Window>,
        api: Box<dyn RendererApi>,
    ) -> Self {
        let instance = InstanceGuard::acquire();
        Self::assemble(instance, config, window, api)
    }

    fn assemble(
        instance: InstanceGuard,
        config: AppConfig,
        window: Box<dyn Window>,
        api: Box<dyn RendererApi>,
    ) -> Self {
        let mut renderer = Renderer::new(api);
        let size = (window.width(), window.height());
        if size.0 > 0 && size.1 > 0 {
            renderer.on_window_resize(size.0, size.1);
        }

        let mut ctx = EngineCtx::new(renderer, size);
        let mut layers = LayerStack::new();
        let ui_handle = config
            .ui_overlay
            .then(|| layers.push_overlay(Box::new(UiOverlay::new()), &mut ctx));

        log::info!(
            "application ready: '{}' {}x{} on {}",
            window.title(),
            size.0,
            size.1,
            ctx.renderer.backend()
        );

        Self {
            window,
            layers,
            ctx,
            ui_handle,
            running: true,
            shut_down: false,
            _instance: instance,
        }
    }

    // ── layers ───────────────────────────────────────────────────────────

    pub fn push_layer<L: Layer + 'static>(&mut self, layer: L) -> LayerHandle {
        self.layers.push_layer(Box::new(layer), &mut self.ctx)
    }

    pub fn push_overlay<L: Layer + 'static>(&mut self, layer: L) -> LayerHandle {
        self.layers.push_overlay(Box::new(layer), &mut self.ctx)
    }

    pub fn pop_layer(&mut self, handle: LayerHandle) -> bool {
        self.layers.pop_layer(handle)
    }

    pub fn pop_overlay(&mut self, handle: LayerHandle) -> bool {
        self.layers.pop_overlay(handle)
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// The UI overlay's hooks, while it is attached.
    pub fn ui_layer_mut(&mut self) -> Option<&mut dyn UiLayer> {
        let handle = self.ui_handle?;
        self.layers.get_mut(handle)?.as_ui_layer()
    }

    // ── loop ─────────────────────────────────────────────────────────────

    /// Runs iterations until something stops the loop.
    pub fn run(&mut self) {
        log::info!("entering main loop");
        let mut frames = 0u64;
        while self.running {
            self.step();
            frames += 1;
        }
        log::info!("main loop exited after {frames} frames");
    }

    /// Runs one loop iteration.
    pub fn step(&mut self) {
        let ts = self.ctx.clock.tick();
        for layer in self.layers.iter_mut() {
            layer.on_update(ts, &mut self.ctx);
        }

        self.ctx.renderer.begin_scene();
        for layer in self.layers.iter_mut() {
            layer.on_render(&mut self.ctx);
        }
        self.ctx.renderer.end_scene();

        self.render_ui();

        let Self {
            window,
            layers,
            ctx,
            running,
            ..
        } = self;
        window.update(&mut |event: &mut Event| route_event(layers, ctx, running, event));

        if self.ctx.take_exit_request() {
            log::info!("exit requested by a layer");
            self.running = false;
        }
    }

    fn render_ui(&mut self) {
        let Some(handle) = self.ui_handle.filter(|h| self.layers.is_valid(*h)) else {
            return;
        };

        if let Some(ui) = self.layers.get_mut(handle).and_then(|l| l.as_ui_layer()) {
            ui.begin(&mut self.ctx);
        }
        for layer in self.layers.iter_mut() {
            layer.on_ui_render(&mut self.ctx);
        }
        if let Some(ui) = self.layers.get_mut(handle).and_then(|l| l.as_ui_layer()) {
            ui.end(&mut self.ctx);
        }
    }

    /// Routes one event exactly like the window would.
    pub fn on_event(&mut self, event: &mut Event) {
        route_event(&mut self.layers, &mut self.ctx, &mut self.running, event);
    }

    /// Stops the loop after the current iteration.
    pub fn close(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stops the loop and detaches every layer. Later calls do nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        log::info!("shutting down application");
        self.running = false;
        self.layers.clear();
        self.shut_down = true;
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn ctx(&self) -> &EngineCtx {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut EngineCtx {
        &mut self.ctx
    }

    pub fn window(&self) -> &dyn Window {
        self.window.as_ref()
    }

    pub fn window_mut(&mut self) -> &mut dyn Window {
        self.window.as_mut()
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn open_wgpu(config: &AppConfig) -> Result<(Box<dyn Window>, Box<dyn RendererApi>)> {
    let mut window = WinitWindow::new(&config.window).context("failed to open window")?;
    let os_window = window
        .os_window()
        .context("window reported ready but has no OS handle")?;

    let init = config.gpu.clone().with_vsync(config.window.vsync);
    let api: Box<dyn RendererApi> = match wgpu_backend::create(os_window, init) {
        Ok((api, context)) => {
            window.set_context(Box::new(context));
            Box::new(api)
        }
        Err(err) => {
            log::error!("wgpu backend unavailable, continuing without drawing: {err:#}");
            Box::new(HeadlessApi::default())
        }
    };
    Ok((Box::new(window), api))
}

fn open_headless(config: &AppConfig) -> (Box<dyn Window>, Box<dyn RendererApi>) {
    let (window, handle) = HeadlessWindow::new(&config.window);
    if let Some(frames) = config.headless_frames {
        handle.close_after_frames(frames);
    }
    (Box::new(window), Box::new(HeadlessApi::default()))
}

fn route_event(
    layers: &mut LayerStack,
    ctx: &mut EngineCtx,
    running: &mut bool,
    event: &mut Event,
) {
    log::trace!("{event}");
    ctx.input.apply(event);

    let mut dispatcher = EventDispatcher::new(event);
    dispatcher.dispatch::<WindowClose, _>(|_| {
        *running = false;
        true
    });
    dispatcher.dispatch::<WindowResize, _>(|resize| {
        on_window_resize(ctx, resize);
        false
    });

    for layer in layers.iter_mut().rev() {
        if event.handled() {
            break;
        }
        layer.on_event(event);
    }
}

fn on_window_resize(ctx: &mut EngineCtx, resize: &WindowResize) {
    if resize.width == 0 || resize.height == 0 {
        log::debug!("ignoring degenerate resize {}x{}", resize.width, resize.height);
        return;
    }
    ctx.renderer.on_window_resize(resize.width, resize.height);
    ctx.set_window_size(resize.width, resize.height);
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::{Mutex, MutexGuard};

    use super::*;
    use crate::coords::Viewport;
    use crate::event::{KeyPressed, MouseButtonPressed};
    use crate::input::{Key, MouseButton};
    use crate::render::headless::{CommandLog, RenderOp};
    use crate::time::Timestep;
    use crate::window::HeadlessHandle;

    // The instance guard is process-wide; tests that build an application
    // must not overlap.
    static SERIAL: Mutex<()> = Mutex::new(());

    fn serial() -> MutexGuard<'static, ()> {
        SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    type Journal = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        journal: Journal,
        consume_events: bool,
        exit_on_update: bool,
    }

    impl Recorder {
        fn new(name: &'static str, journal: &Journal) -> Self {
            Self {
                name,
                journal: Rc::clone(journal),
                consume_events: false,
                exit_on_update: false,
            }
        }

        fn consuming(mut self) -> Self {
            self.consume_events = true;
            self
        }

        fn note(&self, what: impl std::fmt::Display) {
            self.journal.borrow_mut().push(format!("{}:{what}", self.name));
        }
    }

    impl Layer for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn on_attach(&mut self, _ctx: &mut EngineCtx) {
            self.note("attach");
        }

        fn on_detach(&mut self) {
            self.note("detach");
        }

        fn on_update(&mut self, _ts: Timestep, ctx: &mut EngineCtx) {
            self.note("update");
            if self.exit_on_update {
                ctx.request_exit();
            }
        }

        fn on_render(&mut self, _ctx: &mut EngineCtx) {
            self.note("render");
        }

        fn on_ui_render(&mut self, _ctx: &mut EngineCtx) {
            self.note("ui");
        }

        fn on_event(&mut self, event: &mut Event) {
            self.note(format!("event {}", event.kind()));
            if self.consume_events {
                event.mark_handled();
            }
        }
    }

    fn headless_app(ui_overlay: bool) -> (Application, HeadlessHandle, CommandLog) {
        let config = AppConfig::default()
            .with_backend(Backend::Headless)
            .with_ui_overlay(ui_overlay);
        let (window, handle) = HeadlessWindow::new(&config.window);
        let log = CommandLog::default();
        let app = Application::from_parts(
            config,
            Box::new(window),
            Box::new(HeadlessApi::new(log.clone())),
        );
        (app, handle, log)
    }

    fn entries(journal: &Journal, what: &str) -> Vec<String> {
        journal
            .borrow()
            .iter()
            .filter(|e| e.split_once(':').is_some_and(|(_, w)| w == what))
            .cloned()
            .collect()
    }

    // ── frame order ──────────────────────────────────────────────────────

    #[test]
    fn update_and_render_run_in_stack_order() {
        let _serial = serial();
        let journal = Journal::default();
        let (mut app, _handle, _log) = headless_app(false);
        app.push_overlay(Recorder::new("B", &journal));
        app.push_layer(Recorder::new("A", &journal));

        app.step();

        assert_eq!(entries(&journal, "update"), ["A:update", "B:update"]);
        assert_eq!(entries(&journal, "render"), ["A:render", "B:render"]);
    }

    #[test]
    fn render_pass_is_bracketed_by_begin_scene() {
        let _serial = serial();
        let (mut app, _handle, log) = headless_app(false);
        log.clear();

        app.step();

        let ops = log.ops();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], RenderOp::SetClearColor(_)));
        assert_eq!(ops[1], RenderOp::Clear);
    }

    #[test]
    fn ui_pass_runs_only_with_the_overlay() {
        let _serial = serial();
        let journal = Journal::default();
        {
            let (mut app, _handle, _log) = headless_app(false);
            app.push_layer(Recorder::new("A", &journal));
            app.step();
        }
        assert!(entries(&journal, "ui").is_empty());

        let (mut app, _handle, _log) = headless_app(true);
        app.push_layer(Recorder::new("A", &journal));
        app.step();
        assert_eq!(entries(&journal, "ui"), ["A:ui"]);
    }

    #[test]
    fn the_window_presents_once_per_step() {
        let _serial = serial();
        let (mut app, handle, _log) = headless_app(true);
        app.step();
        app.step();
        assert_eq!(handle.frames_presented(), 2);
    }

    // ── event routing ────────────────────────────────────────────────────

    #[test]
    fn events_reach_overlays_first() {
        let _serial = serial();
        let journal = Journal::default();
        let (mut app, handle, _log) = headless_app(false);
        app.push_layer(Recorder::new("A", &journal));
        app.push_overlay(Recorder::new("B", &journal));

        handle.push(KeyPressed { key: Key::A, repeat_count: 0 });
        app.step();

        assert_eq!(
            entries(&journal, "event KeyPressed"),
            ["B:event KeyPressed", "A:event KeyPressed"]
        );
    }

    #[test]
    fn a_handled_event_stops_propagating() {
        let _serial = serial();
        let journal = Journal::default();
        let (mut app, _handle, _log) = headless_app(false);
        app.push_layer(Recorder::new("A", &journal));
        app.push_overlay(Recorder::new("B", &journal).consuming());

        let mut event = Event::new(KeyPressed { key: Key::Space, repeat_count: 0 });
        app.on_event(&mut event);

        assert!(event.handled());
        assert_eq!(entries(&journal, "event KeyPressed"), ["B:event KeyPressed"]);
    }

    #[test]
    fn routed_events_update_input_state() {
        let _serial = serial();
        let (mut app, handle, _log) = headless_app(false);
        handle.push(KeyPressed { key: Key::W, repeat_count: 0 });
        app.step();
        assert!(app.ctx().input.is_key_pressed(Key::W));
    }

    #[test]
    fn ui_capture_blocks_mouse_events_from_layers() {
        let _serial = serial();
        let journal = Journal::default();
        let (mut app, _handle, _log) = headless_app(true);
        app.push_layer(Recorder::new("A", &journal));
        if let Some(ui) = app.ui_layer_mut() {
            ui.set_capture(true, false);
        }

        let mut click = Event::new(MouseButtonPressed { button: MouseButton::Left });
        app.on_event(&mut click);
        let mut key = Event::new(KeyPressed { key: Key::A, repeat_count: 0 });
        app.on_event(&mut key);

        assert!(click.handled());
        assert!(!key.handled());
        assert_eq!(entries(&journal, "event KeyPressed"), ["A:event KeyPressed"]);
        assert!(entries(&journal, "event MouseButtonPressed").is_empty());
    }

    // ── resize ───────────────────────────────────────────────────────────

    #[test]
    fn initial_viewport_covers_the_window() {
        let _serial = serial();
        let (app, _handle, log) = headless_app(false);
        let full = Viewport::full(1600, 900);
        assert_eq!(app.ctx().renderer.viewport(), full);
        assert!(log.ops().contains(&RenderOp::SetViewport(full)));
    }

    #[test]
    fn resize_updates_viewport_and_still_reaches_layers() {
        let _serial = serial();
        let journal = Journal::default();
        let (mut app, _handle, log) = headless_app(false);
        app.push_layer(Recorder::new("A", &journal));
        log.clear();

        let mut event = Event::new(WindowResize { width: 640, height: 480 });
        app.on_event(&mut event);

        assert!(!event.handled());
        assert_eq!(app.ctx().renderer.viewport(), Viewport::full(640, 480));
        assert_eq!(app.ctx().window_size(), (640, 480));
        assert_eq!(log.ops(), [RenderOp::SetViewport(Viewport::full(640, 480))]);
        assert_eq!(entries(&journal, "event WindowResize"), ["A:event WindowResize"]);
    }

    #[test]
    fn zero_sized_resize_is_ignored() {
        let _serial = serial();
        let (mut app, _handle, log) = headless_app(false);
        let before = app.ctx().renderer.viewport();
        log.clear();

        for (width, height) in [(0, 600), (800, 0), (0, 0)] {
            let mut event = Event::new(WindowResize { width, height });
            app.on_event(&mut event);
            assert!(!event.handled());
        }

        assert_eq!(app.ctx().renderer.viewport(), before);
        assert_eq!(app.ctx().window_size(), (1600, 900));
        assert!(log.is_empty());
    }

    // ── shutdown ─────────────────────────────────────────────────────────

    #[test]
    fn close_finishes_the_iteration_then_detaches_once() {
        let _serial = serial();
        let journal = Journal::default();
        let (mut app, handle, _log) = headless_app(false);
        app.push_layer(Recorder::new("A", &journal));
        app.push_overlay(Recorder::new("B", &journal));
        handle.push(WindowClose);

        app.run();

        assert!(!app.is_running());
        assert_eq!(handle.frames_presented(), 1);
        assert_eq!(entries(&journal, "update"), ["A:update", "B:update"]);
        assert!(entries(&journal, "event WindowClose").is_empty());

        app.shutdown();
        app.shutdown();
        drop(app);
        assert_eq!(entries(&journal, "detach"), ["A:detach", "B:detach"]);
    }

    #[test]
    fn headless_frame_limit_closes_the_window() {
        let _serial = serial();
        let (mut app, handle, _log) = headless_app(false);
        handle.close_after_frames(3);
        app.run();
        assert_eq!(handle.frames_presented(), 3);
    }

    #[test]
    fn headless_config_opens_and_runs_to_its_frame_limit() {
        let _serial = serial();
        let journal = Journal::default();
        let config = AppConfig::default()
            .with_backend(Backend::Headless)
            .with_headless_frames(3);
        let mut app = Application::new(config).expect("headless backend opens");
        app.push_layer(Recorder::new("A", &journal));

        app.run();
        assert!(!app.is_running());
        assert_eq!(app.ctx().renderer.backend(), Backend::Headless);
        assert_eq!(entries(&journal, "update").len(), 3);
    }

    #[test]
    fn a_layer_can_request_exit() {
        let _serial = serial();
        let journal = Journal::default();
        let (mut app, handle, _log) = headless_app(false);
        let mut quitter = Recorder::new("Q", &journal);
        quitter.exit_on_update = true;
        app.push_layer(quitter);

        app.run();
        assert_eq!(handle.frames_presented(), 1);
        assert!(!app.ctx().exit_requested());
    }

    #[test]
    fn dropping_without_shutdown_detaches_layers() {
        let _serial = serial();
        let journal = Journal::default();
        {
            let (mut app, _handle, _log) = headless_app(false);
            app.push_layer(Recorder::new("A", &journal));
        }
        assert_eq!(entries(&journal, "detach"), ["A:detach"]);
    }

    // ── handles and instances ────────────────────────────────────────────

    #[test]
    fn popping_through_stale_or_wrong_handles_is_harmless() {
        let _serial = serial();
        let journal = Journal::default();
        let (mut app, _handle, _log) = headless_app(false);
        let a = app.push_layer(Recorder::new("A", &journal));
        let b = app.push_overlay(Recorder::new("B", &journal));

        assert!(!app.pop_overlay(a));
        assert!(!app.pop_layer(b));
        assert!(app.pop_layer(a));
        assert!(!app.pop_layer(a));
        assert_eq!(app.layers().len(), 1);
    }

    #[test]
    #[should_panic(expected = "application already exists")]
    fn a_second_application_panics() {
        let _serial = serial();
        let (_first, _handle, _log) = headless_app(false);
        let _second = headless_app(false);
    }

    #[test]
    fn a_new_application_can_follow_a_dropped_one() {
        let _serial = serial();
        drop(headless_app(false));
        let (app, _handle, _log) = headless_app(false);
        assert!(app.is_running());
    }

    #[test]
    #[should_panic(expected = "no rendering backend selected")]
    fn the_none_backend_is_rejected() {
        let _serial = serial();
        let _ = Application::new(AppConfig::default().with_backend(Backend::None));
    }
}
