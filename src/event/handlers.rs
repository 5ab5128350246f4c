use std::sync::Arc;

use parking_lot::Mutex;

use super::{EditorEvent, EventHandler};

/// Keeps the most recent autosave payload where the host can reach it,
/// e.g. to restore the drawing when the editor is recreated.
#[derive(Debug, Clone, Default)]
pub struct AutosaveSlot {
    latest: Arc<Mutex<Option<Arc<Vec<u8>>>>>,
}

impl AutosaveSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Arc<Vec<u8>>> {
        self.latest.lock().clone()
    }

    pub fn take(&self) -> Option<Arc<Vec<u8>>> {
        self.latest.lock().take()
    }
}

impl EventHandler for AutosaveSlot {
    fn handle_event(&mut self, event: &EditorEvent) {
        if let EditorEvent::Autosave { png } = event {
            *self.latest.lock() = Some(Arc::clone(png));
        }
    }
}

/// Records every event; handy for diagnostics and tests.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<EditorEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EditorEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&EditorEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventHandler for EventLog {
    fn handle_event(&mut self, event: &EditorEvent) {
        log::trace!("event: {:?}", event);
        self.events.lock().push(event.clone());
    }
}
