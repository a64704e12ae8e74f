use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as OsWindow, WindowId};

use crate::event::{
    Event, EventPayload, KeyPressed, KeyReleased, KeyTyped, MouseButtonPressed,
    MouseButtonReleased, MouseMoved, MouseScrolled, WindowClose, WindowFocus, WindowLostFocus,
    WindowMoved, WindowResize,
};
use crate::input::{Key, MouseButton};

use super::{GraphicsContext, Window, WindowProps};

/// Pixel-precise wheel deltas are divided by this to get "lines".
const PIXELS_PER_LINE: f64 = 20.0;

/// Upper bound on pump iterations while waiting for the OS window.
const CREATE_ATTEMPTS: usize = 100;

/// A winit window driven by `pump_app_events`, so the application keeps
/// ownership of the loop.
pub struct WinitWindow {
    event_loop: EventLoop<()>,
    state: PumpState,
    context: Option<Box<dyn GraphicsContext>>,
}

struct PumpState {
    props: WindowProps,
    window: Option<Arc<OsWindow>>,
    create_error: Option<anyhow::Error>,
    size: (u32, u32),
    pending: Vec<Event>,
    close_queued: bool,
}

impl WinitWindow {
    /// Opens the OS window. The event loop is pumped until the window exists.
    pub fn new(props: &WindowProps) -> Result<Self> {
        log::info!(
            "creating window '{}' ({}x{})",
            props.title,
            props.width,
            props.height
        );

        let mut event_loop = EventLoop::new().context("failed to create winit event loop")?;
        let mut state = PumpState {
            props: props.clone(),
            window: None,
            create_error: None,
            size: (props.width, props.height),
            pending: Vec::new(),
            close_queued: false,
        };

        for _ in 0..CREATE_ATTEMPTS {
            let status = event_loop.pump_app_events(Some(Duration::from_millis(10)), &mut state);
            if let PumpStatus::Exit(code) = status {
                anyhow::bail!("event loop exited during window creation (code {code})");
            }
            if state.window.is_some() || state.create_error.is_some() {
                break;
            }
        }

        if let Some(err) = state.create_error.take() {
            return Err(err);
        }
        anyhow::ensure!(state.window.is_some(), "event loop never resumed; no window was created");

        Ok(Self {
            event_loop,
            state,
            context: None,
        })
    }

    /// Shared handle to the OS window, for building a surface on it.
    pub fn os_window(&self) -> Option<Arc<OsWindow>> {
        self.state.window.clone()
    }

    /// Installs the presentation context. Replaces any previous one.
    pub fn set_context(&mut self, context: Box<dyn GraphicsContext>) {
        self.context = Some(context);
    }
}

impl Window for WinitWindow {
    fn width(&self) -> u32 {
        self.state.size.0
    }

    fn height(&self) -> u32 {
        self.state.size.1
    }

    fn title(&self) -> &str {
        &self.state.props.title
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.state.props.vsync = enabled;
        if let Some(ctx) = self.context.as_mut() {
            ctx.set_vsync(enabled);
        }
    }

    fn is_vsync(&self) -> bool {
        self.state.props.vsync
    }

    fn update(&mut self, on_event: &mut dyn FnMut(&mut Event)) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.state);

        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop exited (code {code})");
            self.state.queue_close();
        }

        for mut event in std::mem::take(&mut self.state.pending) {
            if let EventPayload::WindowResize(r) = event.payload() {
                if let Some(ctx) = self.context.as_mut() {
                    ctx.resize(r.width, r.height);
                }
            }
            on_event(&mut event);
        }

        if let Some(ctx) = self.context.as_mut() {
            if let Some(window) = &self.state.window {
                window.pre_present_notify();
            }
            ctx.swap_buffers();
        }
    }
}

impl PumpState {
    fn push(&mut self, event: impl Into<Event>) {
        self.pending.push(event.into());
    }

    fn queue_close(&mut self) {
        if !self.close_queued {
            self.close_queued = true;
            self.push(WindowClose);
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = OsWindow::default_attributes()
            .with_title(self.props.title.clone())
            .with_inner_size(LogicalSize::new(
                self.props.width as f64,
                self.props.height as f64,
            ));

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let size = window.inner_size();
        self.size = (size.width, size.height);
        self.window = Some(Arc::new(window));
        Ok(())
    }

    fn scale_factor(&self) -> f64 {
        self.window.as_ref().map_or(1.0, |w| w.scale_factor())
    }

    fn translate(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.queue_close(),

            WindowEvent::Resized(size) => {
                self.size = (size.width, size.height);
                self.push(WindowResize {
                    width: size.width,
                    height: size.height,
                });
            }

            WindowEvent::Focused(true) => self.push(WindowFocus),
            WindowEvent::Focused(false) => self.push(WindowLostFocus),

            WindowEvent::Moved(pos) => self.push(WindowMoved { x: pos.x, y: pos.y }),

            WindowEvent::KeyboardInput { event, .. } => {
                let key = map_key(event.physical_key);
                match event.state {
                    ElementState::Pressed => {
                        self.push(KeyPressed {
                            key,
                            repeat_count: u32::from(event.repeat),
                        });
                        if let Some(text) = event.text.as_deref() {
                            for ch in text.chars().filter(|c| !c.is_control()) {
                                self.push(KeyTyped { ch });
                            }
                        }
                    }
                    ElementState::Released => self.push(KeyReleased { key }),
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let button = map_mouse_button(button);
                match state {
                    ElementState::Pressed => self.push(MouseButtonPressed { button }),
                    ElementState::Released => self.push(MouseButtonReleased { button }),
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = to_logical_f32(self.scale_factor(), position);
                self.push(MouseMoved { x, y });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let (x_offset, y_offset) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (x, y),
                    MouseScrollDelta::PixelDelta(p) => {
                        ((p.x / PIXELS_PER_LINE) as f32, (p.y / PIXELS_PER_LINE) as f32)
                    }
                };
                self.push(MouseScrolled { x_offset, y_offset });
            }

            _ => {}
        }
    }
}

impl ApplicationHandler for PumpState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            log::error!("{e:#}");
            self.create_error = Some(e);
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.window.as_ref().is_none_or(|w| w.id() != window_id) {
            return;
        }
        self.translate(event);
    }
}

fn to_logical_f32(scale_factor: f64, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let logical = pos.to_logical::<f64>(scale_factor);
    (logical.x as f32, logical.y as f32)
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = pk else {
        return Key::Unknown(0);
    };

    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Space => Key::Space,
        KeyCode::CapsLock => Key::CapsLock,

        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,

        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,

        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::ShiftRight => Key::RightShift,
        KeyCode::ControlLeft => Key::LeftControl,
        KeyCode::ControlRight => Key::RightControl,
        KeyCode::AltLeft => Key::LeftAlt,
        KeyCode::AltRight => Key::RightAlt,
        KeyCode::SuperLeft => Key::LeftSuper,
        KeyCode::SuperRight => Key::RightSuper,

        KeyCode::Quote => Key::Apostrophe,
        KeyCode::Comma => Key::Comma,
        KeyCode::Minus => Key::Minus,
        KeyCode::Period => Key::Period,
        KeyCode::Slash => Key::Slash,
        KeyCode::Semicolon => Key::Semicolon,
        KeyCode::Equal => Key::Equal,
        KeyCode::BracketLeft => Key::LeftBracket,
        KeyCode::Backslash => Key::Backslash,
        KeyCode::BracketRight => Key::RightBracket,
        KeyCode::Backquote => Key::GraveAccent,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::Digit0 | KeyCode::Numpad0 => Key::Num0,
        KeyCode::Digit1 | KeyCode::Numpad1 => Key::Num1,
        KeyCode::Digit2 | KeyCode::Numpad2 => Key::Num2,
        KeyCode::Digit3 | KeyCode::Numpad3 => Key::Num3,
        KeyCode::Digit4 | KeyCode::Numpad4 => Key::Num4,
        KeyCode::Digit5 | KeyCode::Numpad5 => Key::Num5,
        KeyCode::Digit6 | KeyCode::Numpad6 => Key::Num6,
        KeyCode::Digit7 | KeyCode::Numpad7 => Key::Num7,
        KeyCode::Digit8 | KeyCode::Numpad8 => Key::Num8,
        KeyCode::Digit9 | KeyCode::Numpad9 => Key::Num9,

        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,

        other => Key::Unknown(other as u32),
    }
}
