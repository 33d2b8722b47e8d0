use std::collections::HashMap;
use std::path::Path;

use image::RgbaImage;
use rayon::prelude::*;

use crate::deck::Deck;

/// Decoded images keyed by the path written in the deck.
#[derive(Debug, Default)]
pub struct PreloadedImages {
    images: HashMap<String, RgbaImage>,
}

impl PreloadedImages {
    /// Decode every image the deck references, in parallel. Paths are
    /// resolved against `base_path`; images that fail to load are skipped.
    pub fn load(deck: &Deck, base_path: &Path) -> Self {
        let images = deck
            .image_paths()
            .into_par_iter()
            .filter_map(|path| {
                let full = base_path.join(path);
                match image::open(&full) {
                    Ok(img) => Some((path.to_string(), img.into_rgba8())),
                    Err(e) => {
                        tracing::warn!("Failed to preload image {}: {e}", full.display());
                        None
                    }
                }
            })
            .collect::<HashMap<_, _>>();
        tracing::debug!(count = images.len(), "preloaded images");
        Self { images }
    }

    pub fn get(&self, path: &str) -> Option<&RgbaImage> {
        self.images.get(path)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
