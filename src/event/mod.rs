mod bus;
mod events;
mod handlers;

pub use bus::EventBus;
pub use events::{EditorEvent, HistoryEvent, LayerEvent, LayerKind};
pub use handlers::{AutosaveSlot, EventLog};

pub trait EventHandler: Send {
    fn handle_event(&mut self, event: &EditorEvent);
}
