use std::cell::RefCell;

use super::{EditorEvent, EventHandler};

/// Delivers session events to subscribers, synchronously and in
/// subscription order. Single-threaded: the session owns it.
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        // A cloned session starts with no subscribers
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.handlers.borrow().len())
            .finish()
    }
}

impl EventBus {
    /// An empty bus; events emitted before any subscription are dropped.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.handlers.borrow_mut().push(handler);
    }

    pub fn emit(&self, event: EditorEvent) {
        for handler in self.handlers.borrow_mut().iter_mut() {
            handler.handle_event(&event);
        }
    }

    /// Lets callers skip building payloads nobody will receive.
    pub fn has_subscribers(&self) -> bool {
        !self.handlers.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLog;
    use crate::tools::ToolKind;

    fn tool_changed() -> EditorEvent {
        EditorEvent::ToolChanged {
            old: ToolKind::Pencil,
            new: ToolKind::Fill,
        }
    }

    #[test]
    fn test_every_subscriber_receives_events() {
        let bus = EventBus::new();
        assert!(!bus.has_subscribers());
        bus.emit(tool_changed());

        let first = EventLog::new();
        let second = EventLog::new();
        bus.subscribe(Box::new(first.clone()));
        bus.subscribe(Box::new(second.clone()));
        bus.emit(tool_changed());

        assert!(bus.has_subscribers());
        assert_eq!(first.events(), vec![tool_changed()]);
        assert_eq!(second.events(), vec![tool_changed()]);
    }

    #[test]
    fn test_clone_drops_subscribers() {
        let bus = EventBus::new();
        let log = EventLog::new();
        bus.subscribe(Box::new(log.clone()));

        let copy = bus.clone();
        assert!(!copy.has_subscribers());
        copy.emit(tool_changed());
        assert!(log.events().is_empty());
    }
}
