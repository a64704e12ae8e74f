use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::event::{Event, EventPayload, WindowClose};

use super::{Window, WindowProps};

#[derive(Debug, Default)]
struct Shared {
    pending: VecDeque<Event>,
    frames_presented: u64,
    close_after: Option<u64>,
    close_sent: bool,
}

/// Feeds a [`HeadlessWindow`] from outside the application.
#[derive(Debug, Clone)]
pub struct HeadlessHandle {
    shared: Rc<RefCell<Shared>>,
}

impl HeadlessHandle {
    /// Queues an event for the next `update`.
    pub fn push(&self, event: impl Into<Event>) {
        self.shared.borrow_mut().pending.push_back(event.into());
    }

    pub fn frames_presented(&self) -> u64 {
        self.shared.borrow().frames_presented
    }

    pub fn pending(&self) -> usize {
        self.shared.borrow().pending.len()
    }

    /// Delivers a `WindowClose` during the update that presents frame `frames`.
    pub fn close_after_frames(&self, frames: u64) {
        let mut shared = self.shared.borrow_mut();
        shared.close_after = Some(frames);
        shared.close_sent = false;
    }
}

/// Window stand-in with no OS surface.
///
/// Events come from a [`HeadlessHandle`]; presenting only counts frames.
#[derive(Debug)]
pub struct HeadlessWindow {
    props: WindowProps,
    width: u32,
    height: u32,
    shared: Rc<RefCell<Shared>>,
}

impl HeadlessWindow {
    pub fn new(props: &WindowProps) -> (Self, HeadlessHandle) {
        let shared = Rc::new(RefCell::new(Shared::default()));
        let window = Self {
            props: props.clone(),
            width: props.width,
            height: props.height,
            shared: Rc::clone(&shared),
        };
        log::info!(
            "creating headless window '{}' ({}x{})",
            props.title,
            props.width,
            props.height
        );
        (window, HeadlessHandle { shared })
    }
}

impl Window for HeadlessWindow {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn title(&self) -> &str {
        &self.props.title
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.props.vsync = enabled;
    }

    fn is_vsync(&self) -> bool {
        self.props.vsync
    }

    fn update(&mut self, on_event: &mut dyn FnMut(&mut Event)) {
        {
            let mut shared = self.shared.borrow_mut();
            let presenting = shared.frames_presented + 1;
            let closing = shared.close_after.is_some_and(|n| presenting >= n);
            if closing && !shared.close_sent {
                shared.close_sent = true;
                shared.pending.push_back(Event::new(WindowClose));
            }
        }

        // Pop one at a time so the sink may queue more through a handle.
        loop {
            let next = self.shared.borrow_mut().pending.pop_front();
            let Some(mut event) = next else { break };
            if let EventPayload::WindowResize(r) = event.payload() {
                self.width = r.width;
                self.height = r.height;
            }
            on_event(&mut event);
        }

        self.shared.borrow_mut().frames_presented += 1;
    }
}
