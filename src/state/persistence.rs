use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use super::{EditorSession, SessionSettings};
use crate::export;
use crate::util::time;

const AUTOSAVE_PREFIX: &str = "autosave_";

/// Errors that can occur during session persistence
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize session: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write session: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to read session file: {0}")]
    ReadError(String),

    #[error("Invalid session data: {0}")]
    InvalidState(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Serializable description of a session. The drawing itself is stored
/// next to it as a PNG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSession {
    pub id: Uuid,
    pub settings: SessionSettings,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
    pub version: String,
}

impl SavedSession {
    pub fn new(session: &EditorSession) -> Self {
        Self {
            id: session.id(),
            settings: session.settings(),
            timestamp: time::timestamp_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Applies settings then the drawing. History restarts from the
    /// loaded drawing. The session is left untouched if `png` is unusable.
    pub fn restore(&self, session: &mut EditorSession, png: &[u8]) -> PersistenceResult<()> {
        if self.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Session version {} differs from current version {}",
                self.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        let drawing = export::decode_for_grid(png, self.settings.preset.size())
            .map_err(|e| PersistenceError::InvalidState(e.to_string()))?;
        session
            .apply_settings(&self.settings)
            .map_err(|e| PersistenceError::InvalidState(e.to_string()))?;
        session
            .load_grid_image(&drawing)
            .map_err(|e| PersistenceError::InvalidState(e.to_string()))?;
        Ok(())
    }
}

/// Saves sessions to a directory and rotates autosaves.
#[derive(Debug, Clone)]
pub struct StatePersistence {
    state_dir: PathBuf,
    max_autosaves: usize,
    /// Seconds between autosaves
    autosave_interval: u64,
    last_autosave: u64,
}

impl StatePersistence {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            max_autosaves: 5,
            autosave_interval: 300,
            last_autosave: 0,
        }
    }

    pub fn with_autosave_interval(mut self, secs: u64) -> Self {
        self.autosave_interval = secs;
        self
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn max_autosaves(&self) -> usize {
        self.max_autosaves
    }

    fn json_path(&self, name: &str) -> PathBuf {
        self.state_dir.join(format!("{}.json", name))
    }

    fn png_path(&self, name: &str) -> PathBuf {
        self.state_dir.join(format!("{}.png", name))
    }

    /// Writes `{name}.json` and `{name}.png`.
    pub fn save_session(&self, session: &EditorSession, name: &str) -> PersistenceResult<()> {
        let saved = SavedSession::new(session);
        let png = session
            .export_png()
            .map_err(|e| PersistenceError::InvalidState(e.to_string()))?;

        fs::create_dir_all(&self.state_dir)?;

        let json = serde_json::to_string_pretty(&saved)?;
        fs::write(self.json_path(name), json)?;
        fs::write(self.png_path(name), png)?;

        log::info!("Saved session {} to {:?}", name, self.state_dir);
        Ok(())
    }

    pub fn load_session(&self, name: &str) -> PersistenceResult<(SavedSession, Vec<u8>)> {
        let json = fs::read_to_string(self.json_path(name))
            .map_err(|e| PersistenceError::ReadError(e.to_string()))?;
        let saved: SavedSession = serde_json::from_str(&json)?;
        let png = fs::read(self.png_path(name))
            .map_err(|e| PersistenceError::ReadError(e.to_string()))?;
        Ok((saved, png))
    }

    /// Loads `name` and applies it to `session`.
    pub fn restore_session(&self, session: &mut EditorSession, name: &str) -> PersistenceResult<()> {
        let (saved, png) = self.load_session(name)?;
        saved.restore(session, &png)
    }

    pub fn should_autosave(&self) -> bool {
        let now = time::timestamp_secs();
        now.saturating_sub(self.last_autosave) >= self.autosave_interval
    }

    /// Saves under a timestamped name if the interval has elapsed.
    /// Returns the name used.
    pub fn try_autosave(&mut self, session: &EditorSession) -> PersistenceResult<Option<String>> {
        if !self.should_autosave() {
            return Ok(None);
        }
        let name = format!("{}{}", AUTOSAVE_PREFIX, time::timestamp_millis());
        self.save_session(session, &name)?;
        self.last_autosave = time::timestamp_secs();
        self.cleanup_old_autosaves()?;
        Ok(Some(name))
    }

    /// Autosave names, oldest first. Names embed a millisecond timestamp.
    fn autosave_names(&self) -> PersistenceResult<Vec<String>> {
        if !self.state_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names: Vec<(u64, String)> = fs::read_dir(&self.state_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let file = entry.file_name().to_string_lossy().into_owned();
                let stem = file.strip_suffix(".json")?;
                let stamp = stem.strip_prefix(AUTOSAVE_PREFIX)?.parse().ok()?;
                Some((stamp, stem.to_string()))
            })
            .collect();
        names.sort();
        Ok(names.into_iter().map(|(_, name)| name).collect())
    }

    /// Removes the oldest autosaves beyond the limit.
    pub fn cleanup_old_autosaves(&self) -> PersistenceResult<()> {
        let names = self.autosave_names()?;
        let excess = names.len().saturating_sub(self.max_autosaves);
        for name in &names[..excess] {
            log::debug!("Removing old autosave {}", name);
            fs::remove_file(self.json_path(name))?;
            let png = self.png_path(name);
            if png.exists() {
                fs::remove_file(png)?;
            }
        }
        Ok(())
    }

    pub fn find_latest_autosave(&self) -> PersistenceResult<Option<String>> {
        Ok(self.autosave_names()?.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::GridPreset;
    use crate::tools::ToolKind;
    use egui::{pos2, Color32, Rect};

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("pixel_studio_test_{}", Uuid::new_v4()))
    }

    fn drawn_session() -> EditorSession {
        let mut session = EditorSession::new(GridPreset::Body);
        session.set_canvas_bounds(Rect::from_min_size(pos2(0.0, 0.0), egui::vec2(32.0, 64.0)));
        session.set_color(Color32::from_rgb(10, 200, 30));
        session.set_tool(ToolKind::Pencil);
        session.pointer_down(pos2(3.5, 40.5));
        session.pointer_up();
        session
    }

    #[test]
    fn test_save_and_restore_round_trip() {
        let dir = scratch_dir();
        let persistence = StatePersistence::new(&dir);
        let original = drawn_session();
        persistence.save_session(&original, "work").unwrap();

        let mut restored = EditorSession::default();
        persistence.restore_session(&mut restored, "work").unwrap();
        assert_eq!(restored.preset(), GridPreset::Body);
        assert_eq!(restored.color_hex(), "#0ac81e");
        assert_eq!(restored.pixels(), original.pixels());
        assert!(!restored.history().can_undo());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_corrupt_drawing_leaves_session_untouched() {
        let dir = scratch_dir();
        let persistence = StatePersistence::new(&dir);
        persistence.save_session(&drawn_session(), "broken").unwrap();
        fs::write(dir.join("broken.png"), b"garbage").unwrap();

        let mut live = EditorSession::new(GridPreset::Head);
        live.set_canvas_bounds(Rect::from_min_size(pos2(0.0, 0.0), egui::vec2(32.0, 32.0)));
        live.set_color(Color32::RED);
        live.pointer_down(pos2(5.5, 5.5));
        live.pointer_up();
        let drawn = live.pixels().clone();

        assert!(matches!(
            persistence.restore_session(&mut live, "broken"),
            Err(PersistenceError::InvalidState(_))
        ));
        assert_eq!(live.preset(), GridPreset::Head);
        assert_eq!(live.pixels(), &drawn);
        assert!(live.history().can_undo());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_session_is_read_error() {
        let persistence = StatePersistence::new(scratch_dir());
        assert!(matches!(
            persistence.load_session("nope"),
            Err(PersistenceError::ReadError(_))
        ));
    }

    #[test]
    fn test_autosave_rotation_keeps_newest() {
        let dir = scratch_dir();
        let persistence = StatePersistence::new(&dir);
        let session = drawn_session();
        for stamp in 1..=8u64 {
            persistence
                .save_session(&session, &format!("{}{}", AUTOSAVE_PREFIX, stamp))
                .unwrap();
        }
        persistence.cleanup_old_autosaves().unwrap();

        let names = persistence.autosave_names().unwrap();
        assert_eq!(names.len(), persistence.max_autosaves());
        assert_eq!(names[0], "autosave_4");
        assert_eq!(
            persistence.find_latest_autosave().unwrap().as_deref(),
            Some("autosave_8")
        );
        assert!(!dir.join("autosave_1.png").exists());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_autosave_respects_interval() {
        let dir = scratch_dir();
        let mut persistence = StatePersistence::new(&dir).with_autosave_interval(3600);
        let session = drawn_session();
        assert!(persistence.try_autosave(&session).unwrap().is_some());
        assert!(persistence.try_autosave(&session).unwrap().is_none());

        fs::remove_dir_all(dir).ok();
    }
}
