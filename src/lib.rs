#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod collab;
pub mod color;
pub mod components;
pub mod compositor;
pub mod error;
pub mod event;
pub mod export;
pub mod geometry;
pub mod history;
pub mod input;
pub mod layer;
pub mod panels;
pub mod raster;
pub mod state;
pub mod texture_manager;
pub mod tools;
pub mod util;

pub use app::PixelApp;
pub use collab::{ArtCollaborator, CollaboratorError, OfflineCollaborator};
pub use compositor::{LayerCompositor, LayerStack};
pub use error::{EditorError, EditorResult};
pub use event::{EditorEvent, EventBus, EventHandler};
pub use geometry::{CoordinateMapper, GridPos};
pub use history::HistoryManager;
pub use input::InputEvent;
pub use layer::{ActiveLayer, Opacity, ReferenceLayer, SketchLayer};
pub use raster::{GridPreset, RasterBuffer};
pub use state::{EditorSession, SessionSettings, StatePersistence};
pub use tools::{BrushSize, ToolDispatcher, ToolKind};
