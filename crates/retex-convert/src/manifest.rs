//! Per-asset configuration manifest.
//!
//! Nothing in a CTXR file says whether its payload is DXT5-compressed, and
//! nothing in a PS3 asset says whether its pixels are Morton-tiled. Both
//! have to be known per asset, so they live in a small JSON manifest mapping
//! the asset file name to its tags:
//!
//! ```json
//! {
//!   "jungle_canopy_overlay.ctxr": { "format": "dxt5", "swizzled": true },
//!   "menu_font.ctxr": { "swizzled": false }
//! }
//! ```
//!
//! Assets missing from the manifest are raw RGBA8 and tiled, matching how
//! the bulk of the shipped assets are stored.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use retex_ctxr::PixelLayout;
use serde::{Deserialize, Serialize};

use crate::Result;

fn default_layout() -> PixelLayout {
    PixelLayout::Rgba8
}

fn default_swizzled() -> bool {
    true
}

/// Tags for one asset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Payload layout of the asset.
    #[serde(default = "default_layout")]
    pub format: PixelLayout,
    /// Whether the PS3 build stores this asset Morton-tiled.
    #[serde(default = "default_swizzled")]
    pub swizzled: bool,
}

impl Default for AssetEntry {
    fn default() -> Self {
        Self {
            format: default_layout(),
            swizzled: default_swizzled(),
        }
    }
}

/// Asset name to tags mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
    entries: HashMap<String, AssetEntry>,
}

impl AssetManifest {
    /// Load a manifest from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Tags for `file_name`, falling back to the defaults for unlisted
    /// assets.
    pub fn entry(&self, file_name: &str) -> AssetEntry {
        self.entries.get(file_name).copied().unwrap_or_default()
    }

    /// Payload layout of the named asset.
    pub fn layout_for(&self, file_name: &str) -> PixelLayout {
        self.entry(file_name).format
    }

    /// Whether the named asset's PS3 payload is Morton-tiled.
    pub fn is_swizzled(&self, file_name: &str) -> bool {
        self.entry(file_name).swizzled
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no explicit entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_defaults() {
        let manifest: AssetManifest = serde_json::from_str(
            r#"{
                "leaves.ctxr": { "format": "dxt5" },
                "hud.ctxr": { "swizzled": false }
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.layout_for("leaves.ctxr"), PixelLayout::Dxt5);
        assert!(manifest.is_swizzled("leaves.ctxr"));

        assert_eq!(manifest.layout_for("hud.ctxr"), PixelLayout::Rgba8);
        assert!(!manifest.is_swizzled("hud.ctxr"));

        // Unlisted assets get the shipped-asset defaults.
        assert_eq!(manifest.layout_for("unknown.ctxr"), PixelLayout::Rgba8);
        assert!(manifest.is_swizzled("unknown.ctxr"));
    }
}
