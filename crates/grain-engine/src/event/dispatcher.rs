use super::types::{Event, EventType};

/// Routes one event instance to typed handlers.
///
/// Each [`dispatch`](Self::dispatch) call is independent: it re-checks the
/// runtime kind and runs its handler only on a match. Calls can be chained
/// against the same event.
pub struct EventDispatcher<'a> {
    event: &'a mut Event,
}

impl<'a> EventDispatcher<'a> {
    pub fn new(event: &'a mut Event) -> Self {
        Self { event }
    }

    /// Runs `handler` if the event is a `T`, folding its return value into
    /// the event's `handled` flag.
    ///
    /// Returns whether the kinds matched. A mismatch has no side effects.
    pub fn dispatch<T, F>(&mut self, handler: F) -> bool
    where
        T: EventType,
        F: FnOnce(&T) -> bool,
    {
        let handled = match T::from_payload(self.event.payload()) {
            Some(payload) => handler(payload),
            None => return false,
        };
        self.event.set_handled(handled);
        true
    }

    pub fn event(&self) -> &Event {
        self.event
    }
}
