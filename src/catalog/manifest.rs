use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::assets::loader::{AssetRef, normalize_rel_path};
use crate::encode::still::{DEFAULT_JPEG_QUALITY, StillFormat};
use crate::foundation::core::Canvas;
use crate::foundation::error::{BoothError, BoothResult};
use crate::render::pipeline::{CaptureOptions, DEFAULT_ASSET_TIMEOUT};
use crate::render::plan::{PlanOptions, UniformPlacement};

/// School level a uniform belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolCategory {
    /// Middle school.
    #[default]
    Middle,
    /// High school.
    High,
}

impl std::str::FromStr for SchoolCategory {
    type Err = BoothError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "middle" => Ok(Self::Middle),
            "high" => Ok(Self::High),
            other => Err(BoothError::validation(format!(
                "unknown category '{other}' (expected middle|high)"
            ))),
        }
    }
}

/// Garment style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformKind {
    /// Winter uniform.
    Winter,
    /// Jumper skirt.
    Jumper,
    /// Summer uniform.
    Summer,
    /// Dress.
    Dress,
}

/// One selectable uniform.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UniformEntry {
    /// Catalog id.
    pub id: String,
    /// Display name; also recorded on captures.
    pub name: String,
    /// Overlay image.
    pub image: AssetRef,
    /// School level.
    pub category: SchoolCategory,
    /// Garment style.
    pub kind: UniformKind,
}

/// One selectable sticker.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StickerEntry {
    /// Catalog id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Overlay image.
    pub image: AssetRef,
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_asset_timeout_ms() -> u64 {
    DEFAULT_ASSET_TIMEOUT.as_millis() as u64
}

fn default_fallback() -> Canvas {
    Canvas::FALLBACK
}

/// Capture settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptureConfig {
    /// JPEG quality in `1..=100`.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Per-layer asset load timeout in milliseconds.
    #[serde(default = "default_asset_timeout_ms")]
    pub asset_timeout_ms: u64,
    /// Output size used when no camera frame is available.
    #[serde(default = "default_fallback")]
    pub fallback: Canvas,
    /// Whether the uniform follows its on-screen transform in captures.
    #[serde(default)]
    pub uniform_placement: UniformPlacement,
    /// Output encoding.
    #[serde(default)]
    pub format: StillFormat,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
            asset_timeout_ms: default_asset_timeout_ms(),
            fallback: default_fallback(),
            uniform_placement: UniformPlacement::default(),
            format: StillFormat::default(),
        }
    }
}

impl CaptureConfig {
    /// Check value ranges.
    pub fn validate(&self) -> BoothResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(BoothError::validation("capture.jpeg_quality must be in 1..=100"));
        }
        if self.asset_timeout_ms == 0 {
            return Err(BoothError::validation("capture.asset_timeout_ms must be > 0"));
        }
        Canvas::new(self.fallback.width, self.fallback.height)
            .map_err(|_| BoothError::validation("capture.fallback dimensions must be > 0"))?;
        Ok(())
    }

    /// Pipeline options for these settings.
    pub fn to_options(&self) -> CaptureOptions {
        CaptureOptions {
            asset_timeout: Duration::from_millis(self.asset_timeout_ms),
            fallback_canvas: self.fallback,
            plan: PlanOptions {
                uniform_placement: self.uniform_placement,
                ..PlanOptions::default()
            },
            format: self.format,
            jpeg_quality: self.jpeg_quality,
        }
    }
}

/// Everything a booth needs besides live input: catalog plus capture settings.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoothManifest {
    /// Selectable uniforms.
    #[serde(default)]
    pub uniforms: Vec<UniformEntry>,
    /// Selectable stickers.
    #[serde(default)]
    pub stickers: Vec<StickerEntry>,
    /// Capture settings.
    #[serde(default)]
    pub capture: CaptureConfig,
}

impl BoothManifest {
    /// Parse and validate a JSON manifest.
    pub fn from_json_str(s: &str) -> BoothResult<Self> {
        let manifest: Self =
            serde_json::from_str(s).map_err(|e| BoothError::serde(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read, parse and validate a JSON manifest file.
    pub fn from_path(path: &Path) -> BoothResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read manifest '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Check ids, names and asset paths.
    ///
    /// Ids must be non-empty and unique within their list. Asset references must be
    /// normalized relative paths.
    pub fn validate(&self) -> BoothResult<()> {
        let mut seen = HashSet::new();
        for u in &self.uniforms {
            check_entry("uniform", &u.id, &u.name, &u.image, &mut seen)?;
        }
        seen.clear();
        for s in &self.stickers {
            check_entry("sticker", &s.id, &s.name, &s.image, &mut seen)?;
        }
        self.capture.validate()
    }

    /// Uniform by catalog id.
    pub fn uniform(&self, id: &str) -> Option<&UniformEntry> {
        self.uniforms.iter().find(|u| u.id == id)
    }

    /// Sticker by catalog id.
    pub fn sticker(&self, id: &str) -> Option<&StickerEntry> {
        self.stickers.iter().find(|s| s.id == id)
    }

    /// Uniforms of one school level, in manifest order.
    pub fn uniforms_in(&self, category: SchoolCategory) -> impl Iterator<Item = &UniformEntry> {
        self.uniforms.iter().filter(move |u| u.category == category)
    }
}

fn check_entry<'a>(
    what: &str,
    id: &'a str,
    name: &str,
    image: &AssetRef,
    seen: &mut HashSet<&'a str>,
) -> BoothResult<()> {
    if id.trim().is_empty() {
        return Err(BoothError::validation(format!("{what} id must be non-empty")));
    }
    if name.trim().is_empty() {
        return Err(BoothError::validation(format!("{what} '{id}' name must be non-empty")));
    }
    if !seen.insert(id) {
        return Err(BoothError::validation(format!("duplicate {what} id '{id}'")));
    }
    let norm = normalize_rel_path(image.as_str())?;
    if norm != image.as_str() {
        return Err(BoothError::validation(format!(
            "{what} '{id}' image path must be normalized (got '{image}', expected '{norm}')"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/manifest.rs"]
mod tests;
