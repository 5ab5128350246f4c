use std::sync::Arc;

use crate::collab::{self, ArtCollaborator, CollaboratorError, OfflineCollaborator, PendingResult};
use crate::event::AutosaveSlot;
use crate::input::InputHandler;
use crate::layer::ReferenceLayer;
use crate::panels::{central_panel, tools_panel};
use crate::state::{EditorSession, SessionSettings};
use crate::texture_manager::TextureManager;

/// Storage key for the last autosaved drawing (PNG bytes).
const DRAWING_KEY: &str = "pixel_studio_drawing";

/// Enough for the canvas and preview plus a few stale revisions.
const TEXTURE_CACHE_SIZE: usize = 8;

pub struct PixelApp {
    session: EditorSession,
    input: InputHandler,
    textures: TextureManager,
    collaborator: Arc<dyn ArtCollaborator>,
    autosave: AutosaveSlot,
    pending_reference: Option<PendingResult<Result<ReferenceLayer, CollaboratorError>>>,
    pending_critique: Option<PendingResult<String>>,
    /// Last critique text shown in the side panel
    pub(crate) critique: Option<String>,
    /// Subject typed for reference generation
    pub(crate) reference_subject: String,
    /// Hex field contents; applied when editing finishes
    pub(crate) hex_input: String,
    /// Clear-layer confirmation is open
    pub(crate) show_clear_modal: bool,
    pub(crate) status: Option<String>,
}

impl Default for PixelApp {
    fn default() -> Self {
        Self::with_session(EditorSession::default(), Arc::new(OfflineCollaborator))
    }
}

impl PixelApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self::default();

        if let Some(storage) = cc.storage {
            if let Some(settings) = eframe::get_value::<SessionSettings>(storage, eframe::APP_KEY) {
                if let Err(err) = app.session.apply_settings(&settings) {
                    log::warn!("Ignoring stored settings: {err}");
                }
            }
            if let Some(png) = eframe::get_value::<Vec<u8>>(storage, DRAWING_KEY) {
                match app.session.load_pixels(&png) {
                    Ok(()) => log::info!("Restored drawing ({} bytes)", png.len()),
                    Err(err) => log::warn!("Could not restore drawing: {err}"),
                }
            }
        }
        app.hex_input = app.session.color_hex();
        app
    }

    pub fn with_session(session: EditorSession, collaborator: Arc<dyn ArtCollaborator>) -> Self {
        let autosave = AutosaveSlot::new();
        session.subscribe(Box::new(autosave.clone()));
        Self {
            hex_input: session.color_hex(),
            session,
            input: InputHandler::new(),
            textures: TextureManager::new(TEXTURE_CACHE_SIZE),
            collaborator,
            autosave,
            pending_reference: None,
            pending_critique: None,
            critique: None,
            reference_subject: String::new(),
            show_clear_modal: false,
            status: None,
        }
    }

    pub fn set_collaborator(&mut self, collaborator: Arc<dyn ArtCollaborator>) {
        self.collaborator = collaborator;
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    pub(crate) fn input_mut(&mut self) -> &mut InputHandler {
        &mut self.input
    }

    /// Session and texture cache borrowed together for rendering.
    pub(crate) fn render_parts(&mut self) -> (&EditorSession, &mut TextureManager) {
        (&self.session, &mut self.textures)
    }

    pub fn is_generating(&self) -> bool {
        self.pending_reference.is_some()
    }

    pub fn is_critiquing(&self) -> bool {
        self.pending_critique.is_some()
    }

    pub(crate) fn report<E: std::fmt::Display>(&mut self, context: &str, err: E) {
        log::warn!("{context}: {err}");
        self.status = Some(format!("{context}: {err}"));
    }

    pub fn undo(&mut self) {
        if let Err(err) = self.session.undo() {
            self.report("Undo failed", err);
        }
    }

    pub fn redo(&mut self) {
        if let Err(err) = self.session.redo() {
            self.report("Redo failed", err);
        }
    }

    /// False on web builds, which have no working directory to write to.
    pub fn can_export_files() -> bool {
        cfg!(not(target_arch = "wasm32"))
    }

    /// Encodes the pixel layer and writes it to the working directory.
    pub fn export(&mut self) {
        let png = match self.session.export_png() {
            Ok(png) => png,
            Err(err) => return self.report("Export failed", err),
        };
        let name = self.session.export_file_name();

        if let Err(err) = write_export(&name, &png) {
            return self.report("Export failed", err);
        }

        log::info!("Exported {} ({} bytes)", name, png.len());
        self.status = Some(format!("Exported {name}"));
    }

    /// Starts generating a reference for `reference_subject`.
    pub fn request_reference(&mut self) {
        if self.pending_reference.is_some() {
            return;
        }
        let collaborator = Arc::clone(&self.collaborator);
        let subject = self.reference_subject.clone();
        self.pending_reference = Some(PendingResult::spawn(async move {
            collab::request_reference(collaborator.as_ref(), &subject).await
        }));
    }

    /// Sends the current drawing off for review.
    pub fn request_critique(&mut self) {
        if self.pending_critique.is_some() {
            return;
        }
        let png = match self.session.export_png() {
            Ok(png) => png,
            Err(err) => return self.report("Critique failed", err),
        };
        let collaborator = Arc::clone(&self.collaborator);
        self.pending_critique = Some(PendingResult::spawn(async move {
            collab::request_critique(collaborator.as_ref(), png).await
        }));
    }

    fn poll_collaborators(&mut self, ctx: &egui::Context) {
        if let Some(result) = self.pending_reference.as_ref().and_then(|p| p.poll()) {
            self.pending_reference = None;
            match result {
                Ok(reference) => self.session.set_reference(reference),
                Err(err) => self.report("Reference generation failed", err),
            }
        }
        if let Some(text) = self.pending_critique.as_ref().and_then(|p| p.poll()) {
            self.pending_critique = None;
            self.critique = Some(text);
        }
        if self.is_generating() || self.is_critiquing() {
            ctx.request_repaint();
        }
    }

    /// Dropped image files become the reference overlay.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let bytes = match (&file.bytes, &file.path) {
                (Some(bytes), _) => bytes.to_vec(),
                #[cfg(not(target_arch = "wasm32"))]
                (None, Some(path)) => match std::fs::read(path) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        self.report("Could not read dropped file", err);
                        continue;
                    }
                },
                _ => continue,
            };
            if let Err(err) = self.session.load_reference(&file.name, &bytes) {
                self.report("Could not load reference", err);
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (undo, redo) = ctx.input_mut(|i| {
            let redo = i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::Z)
                || i.consume_key(egui::Modifiers::COMMAND, egui::Key::Y);
            let undo = i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z);
            (undo, redo)
        });
        if redo {
            self.redo();
        } else if undo {
            self.undo();
        }
    }

    fn clear_modal(&mut self, ctx: &egui::Context) {
        if !self.show_clear_modal {
            return;
        }
        let layer = self.session.active_layer();
        egui::Window::new("Clear layer")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!("Erase everything on the {} layer?", layer.label()));
                ui.horizontal(|ui| {
                    if ui.button("Clear").clicked() {
                        self.session.clear_active_layer();
                        self.show_clear_modal = false;
                    }
                    if ui.button("Cancel").clicked() {
                        self.show_clear_modal = false;
                    }
                });
            });
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_export(name: &str, png: &[u8]) -> std::io::Result<()> {
    std::fs::write(name, png)
}

#[cfg(target_arch = "wasm32")]
fn write_export(_name: &str, _png: &[u8]) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "file export is not available in the browser",
    ))
}

impl eframe::App for PixelApp {
    /// Called by the framework to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.session.settings());
        if let Some(png) = self.autosave.latest() {
            eframe::set_value(storage, DRAWING_KEY, &*png);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.textures.begin_frame();
        self.poll_collaborators(ctx);
        self.handle_dropped_files(ctx);
        self.handle_shortcuts(ctx);

        tools_panel(self, ctx);
        central_panel(self, ctx);
        self.clear_modal(ctx);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_write_export_creates_png() {
        assert!(PixelApp::can_export_files());
        let png = EditorSession::default().export_png().unwrap();
        let path = std::env::temp_dir().join(format!("pixel_studio_export_{}.png", uuid::Uuid::new_v4()));
        let name = path.to_string_lossy().into_owned();

        write_export(&name, &png).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), png);
        std::fs::remove_file(path).ok();
    }
}
