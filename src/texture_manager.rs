use std::collections::HashMap;
use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use image::RgbaImage;
use thiserror::Error;

/// Errors that can occur during texture generation
#[derive(Error, Debug)]
pub enum TextureGenerationError {
    #[error("Failed to generate texture")]
    GenerationFailed,
    #[error("Invalid texture dimensions")]
    InvalidDimensions,
}

/// Which on-screen image a texture shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// Full layer composite shown on the canvas
    Canvas,
    /// Native-resolution thumbnail of the pixel layer
    Preview,
}

impl TextureKind {
    fn name(self) -> &'static str {
        match self {
            Self::Canvas => "canvas",
            Self::Preview => "preview",
        }
    }
}

/// Converts a straight-alpha RGBA image into an egui image.
pub fn color_image(image: &RgbaImage) -> Result<ColorImage, TextureGenerationError> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(TextureGenerationError::InvalidDimensions);
    }
    Ok(ColorImage::from_rgba_unmultiplied([w as usize, h as usize], image.as_raw()))
}

/// Caches textures by (kind, revision) so unchanged images are not re-uploaded
pub struct TextureManager {
    texture_cache: HashMap<(TextureKind, u64), TextureHandle>,
    /// Frame each texture was last used in
    last_used: HashMap<(TextureKind, u64), u64>,
    current_frame: u64,
    max_cache_size: usize,
}

impl TextureManager {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size: max_cache_size.max(1),
        }
    }

    /// Call at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Gets the cached texture for `(kind, revision)` or builds it.
    pub fn get_or_create_texture<F>(
        &mut self,
        kind: TextureKind,
        revision: u64,
        generator: F,
        ctx: &Context,
    ) -> Result<TextureId, TextureGenerationError>
    where
        F: FnOnce() -> Result<ColorImage, TextureGenerationError>,
    {
        let cache_key = (kind, revision);

        if let Some(handle) = self.texture_cache.get(&cache_key) {
            self.last_used.insert(cache_key, self.current_frame);
            return Ok(handle.id());
        }

        let image = generator()?;
        self.make_room();

        let name = format!("{}_v{}", kind.name(), revision);
        // Hard pixel edges when magnified
        let handle = ctx.load_texture(&name, image, TextureOptions::NEAREST);

        self.texture_cache.insert(cache_key, handle.clone());
        self.last_used.insert(cache_key, self.current_frame);
        log::trace!("Uploaded texture {}", name);

        Ok(handle.id())
    }

    /// Drops every cached revision of `kind`
    pub fn invalidate(&mut self, kind: TextureKind) {
        self.texture_cache.retain(|(k, _), _| *k != kind);
        self.last_used.retain(|(k, _), _| *k != kind);
    }

    /// Evicts least recently used textures until one more fits
    fn make_room(&mut self) {
        if self.texture_cache.len() < self.max_cache_size {
            return;
        }

        let mut entries: Vec<((TextureKind, u64), u64)> =
            self.last_used.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = self.texture_cache.len() + 1 - self.max_cache_size;
        for (key, _) in entries.iter().take(to_remove) {
            self.texture_cache.remove(key);
            self.last_used.remove(key);
        }
    }

    pub fn clear_cache(&mut self) {
        self.texture_cache.clear();
        self.last_used.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }

    #[cfg(test)]
    pub fn get_texture(&self, kind: TextureKind, revision: u64) -> Option<&TextureHandle> {
        self.texture_cache.get(&(kind, revision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_texture_generator() -> Result<ColorImage, TextureGenerationError> {
        Ok(ColorImage::new([10, 10], egui::Color32::WHITE))
    }

    #[test]
    fn test_cache_hit() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);

        let id1 = manager
            .get_or_create_texture(TextureKind::Canvas, 1, mock_texture_generator, &ctx)
            .unwrap();
        let id2 = manager
            .get_or_create_texture(TextureKind::Canvas, 1, || Err(TextureGenerationError::GenerationFailed), &ctx)
            .unwrap();

        assert_eq!(id1, id2);
        assert_eq!(manager.cache_size(), 1);
    }

    #[test]
    fn test_invalidation() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(10);
        manager.get_or_create_texture(TextureKind::Canvas, 1, mock_texture_generator, &ctx).unwrap();
        manager.get_or_create_texture(TextureKind::Preview, 1, mock_texture_generator, &ctx).unwrap();

        manager.invalidate(TextureKind::Canvas);

        assert_eq!(manager.cache_size(), 1);
        assert!(manager.get_texture(TextureKind::Preview, 1).is_some());
    }

    #[test]
    fn test_lru_eviction() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(2);

        manager.get_or_create_texture(TextureKind::Canvas, 1, mock_texture_generator, &ctx).unwrap();
        manager.begin_frame();
        manager.get_or_create_texture(TextureKind::Canvas, 2, mock_texture_generator, &ctx).unwrap();
        manager.begin_frame();
        manager.get_or_create_texture(TextureKind::Canvas, 3, mock_texture_generator, &ctx).unwrap();

        assert_eq!(manager.cache_size(), 2);
        assert!(manager.get_texture(TextureKind::Canvas, 1).is_none());
        assert!(manager.get_texture(TextureKind::Canvas, 2).is_some());
        assert!(manager.get_texture(TextureKind::Canvas, 3).is_some());
    }

    #[test]
    fn test_failed_generation_is_not_cached() {
        let ctx = Context::default();
        let mut manager = TextureManager::new(4);
        let result = manager.get_or_create_texture(
            TextureKind::Preview,
            7,
            || Err(TextureGenerationError::GenerationFailed),
            &ctx,
        );
        assert!(result.is_err());
        assert_eq!(manager.cache_size(), 0);
    }

    #[test]
    fn test_color_image_rejects_empty() {
        assert!(matches!(
            color_image(&RgbaImage::new(0, 4)),
            Err(TextureGenerationError::InvalidDimensions)
        ));
        let img = color_image(&RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]))).unwrap();
        assert_eq!(img.size, [3, 2]);
        assert_eq!(img.pixels[0], egui::Color32::from_rgb(1, 2, 3));
    }
}
