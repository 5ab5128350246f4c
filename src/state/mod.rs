mod persistence;
mod session;
pub mod settings;

pub use persistence::{
    PersistenceError,
    PersistenceResult,
    SavedSession,
    StatePersistence,
};
pub use session::EditorSession;
pub use settings::SessionSettings;
