//! Persona image table.
//!
//! One optional image per emotion label, loaded once at startup from a
//! directory laid out as `<dir>/<label>.png`. Missing or undecodable files
//! are recorded as absent and never fail the load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::emotion::EmotionLabel;

/// Decoded persona image for one label. Immutable after load.
#[derive(Clone, Debug)]
pub struct OverlayAsset {
    image: DynamicImage,
    source: Option<PathBuf>,
}

impl OverlayAsset {
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image,
            source: None,
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Label to optional persona image.
#[derive(Clone, Debug, Default)]
pub struct AssetTable {
    entries: HashMap<EmotionLabel, Option<OverlayAsset>>,
}

impl AssetTable {
    /// Table with every label absent.
    pub fn empty() -> Self {
        Self {
            entries: EmotionLabel::ALL.into_iter().map(|l| (l, None)).collect(),
        }
    }

    /// Load every label's image from `dir`. Never fails.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let mut table = Self::empty();
        for label in EmotionLabel::ALL {
            let path = dir.join(label.asset_file_name());
            let asset = load_asset(&path);
            table.entries.insert(label, asset);
        }

        let present: Vec<&str> = table.present().map(EmotionLabel::as_str).collect();
        log::info!(
            "asset table: {}/{} persona images loaded from {} ({})",
            present.len(),
            EmotionLabel::ALL.len(),
            dir.display(),
            present.join(", ")
        );
        table
    }

    /// Replace one label's entry.
    pub fn insert(&mut self, label: EmotionLabel, asset: Option<OverlayAsset>) {
        self.entries.insert(label, asset);
    }

    /// Exact lookup, no fallback.
    pub fn get(&self, label: EmotionLabel) -> Option<&OverlayAsset> {
        self.entries.get(&label).and_then(Option::as_ref)
    }

    /// Lookup with the neutral fallback. `None` means draw no overlay.
    pub fn resolve(&self, label: EmotionLabel) -> Option<&OverlayAsset> {
        self.get(label).or_else(|| self.get(EmotionLabel::Neutral))
    }

    /// Labels that have an image.
    pub fn present(&self) -> impl Iterator<Item = EmotionLabel> + '_ {
        EmotionLabel::ALL
            .into_iter()
            .filter(|label| self.get(*label).is_some())
    }
}

fn load_asset(path: &Path) -> Option<OverlayAsset> {
    if !path.exists() {
        log::debug!("persona image {} not found", path.display());
        return None;
    }
    match image::open(path) {
        Ok(image) => Some(OverlayAsset {
            image,
            source: Some(path.to_path_buf()),
        }),
        Err(err) => {
            log::warn!("persona image {} unreadable: {}", path.display(), err);
            None
        }
    }
}
