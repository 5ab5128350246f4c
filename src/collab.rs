//! Hooks for an external image generation / critique service.
//!
//! The engine only builds prompts and consumes or produces encoded images.
//! Nothing here touches the pixel grid directly, so a failed or slow call
//! can never leave a drawing half-modified.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use thiserror::Error;

use crate::layer::ReferenceLayer;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("No art collaborator is configured")]
    NotConfigured,

    #[error("Collaborator request failed: {0}")]
    Failed(String),

    #[error("Collaborator returned no usable result")]
    EmptyResult,

    #[error("Generated image could not be decoded: {0}")]
    InvalidImage(String),
}

/// Critique prompt sent along with the exported PNG.
pub const CRITIQUE_PROMPT: &str = "You are a pixel art master for a classic online RPG. \
Review this image technically. Cover: 1. anti-aliasing, 2. shading (avoid pillow shading), \
3. colours, 4. anatomy if it is a head or body sprite. Be direct and encouraging.";

/// Shown when a critique cannot be obtained.
pub const CRITIQUE_FALLBACK: &str = "The master is speechless right now. Try again later.";

/// Generation prompt for a reference asset described by `subject`.
pub fn reference_prompt(subject: &str) -> String {
    format!(
        "Create a pixel art asset for a classic online RPG. The item should be: {}. \
         Style: 32x32 pixels, transparent background (or black for easy removal), \
         vibrant colours, simple retro game shading.",
        subject.trim()
    )
}

/// An external service that can draw references and review drawings.
pub trait ArtCollaborator: Send + Sync {
    /// Encoded image for `prompt`, or `None` when nothing was produced.
    fn generate_reference(&self, prompt: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, CollaboratorError>>;

    /// Free-form text review of a PNG, guided by `prompt`.
    fn critique_image(&self, prompt: &str, png: Vec<u8>) -> BoxFuture<'_, Result<String, CollaboratorError>>;
}

/// Used when no service is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineCollaborator;

impl ArtCollaborator for OfflineCollaborator {
    fn generate_reference(&self, _prompt: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, CollaboratorError>> {
        Box::pin(async { Err(CollaboratorError::NotConfigured) })
    }

    fn critique_image(&self, _prompt: &str, _png: Vec<u8>) -> BoxFuture<'_, Result<String, CollaboratorError>> {
        Box::pin(async { Err(CollaboratorError::NotConfigured) })
    }
}

/// Asks for a reference image of `subject` and decodes it.
///
/// Empty subjects are rejected without calling the service.
pub async fn request_reference(
    collaborator: &dyn ArtCollaborator,
    subject: &str,
) -> Result<ReferenceLayer, CollaboratorError> {
    if subject.trim().is_empty() {
        return Err(CollaboratorError::EmptyResult);
    }
    let prompt = reference_prompt(subject);
    log::info!("Requesting reference: {}", subject.trim());

    let bytes = collaborator
        .generate_reference(&prompt)
        .await
        .inspect_err(|e| log::warn!("Reference generation failed: {e}"))?
        .ok_or(CollaboratorError::EmptyResult)?;

    ReferenceLayer::decode(subject.trim(), &bytes)
        .map_err(|e| CollaboratorError::InvalidImage(e.to_string()))
}

/// Reviews `png`. Never fails: problems come back as fallback text.
pub async fn request_critique(collaborator: &dyn ArtCollaborator, png: Vec<u8>) -> String {
    match collaborator.critique_image(CRITIQUE_PROMPT, png).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => CRITIQUE_FALLBACK.to_string(),
        Err(err) => {
            log::warn!("Critique failed: {err}");
            format!("{CRITIQUE_FALLBACK} ({err})")
        }
    }
}

/// Result slot for a request running in the background.
#[derive(Debug)]
pub struct PendingResult<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for PendingResult<T> {
    fn clone(&self) -> Self {
        Self { slot: Arc::clone(&self.slot) }
    }
}

impl<T: Send + 'static> PendingResult<T> {
    /// Runs `future` off the UI thread and stores its output.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let pending = Self { slot: Arc::new(Mutex::new(None)) };
        let slot = Arc::clone(&pending.slot);
        let task = async move {
            let value = future.await;
            *slot.lock() = Some(value);
        };

        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(move || futures::executor::block_on(task));

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(task);

        pending
    }

    /// Takes the result once it is ready.
    pub fn poll(&self) -> Option<T> {
        self.slot.lock().take()
    }
}
