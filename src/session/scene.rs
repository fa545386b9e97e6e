use std::path::Path;

use anyhow::Context;

use crate::foundation::core::{OverlayId, Point};
use crate::foundation::error::{BoothError, BoothResult};
use crate::session::booth::{BoothEvent, BoothSession, EventEffect};
use crate::transform::model::Transform;

/// Overlay addressed by a recorded gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureTarget {
    /// The uniform.
    Uniform,
    /// The n-th sticker listed in the scene.
    Sticker(usize),
}

/// One recorded gesture tick.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GestureTick {
    /// Overlay receiving the tick.
    pub target: GestureTarget,
    /// Contacts down, as `[x, y]` pairs. Empty lifts every contact.
    #[serde(default)]
    pub contacts: Vec<[f64; 2]>,
}

/// A sticker placement.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneSticker {
    /// Catalog id.
    pub sticker: String,
    /// Initial placement.
    #[serde(default)]
    pub transform: Transform,
}

fn default_true() -> bool {
    true
}

/// Scripted booth state: what is worn, what is placed and how it was moved.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    /// Catalog id of the uniform to wear.
    #[serde(default)]
    pub uniform: Option<String>,
    /// Initial uniform placement.
    #[serde(default)]
    pub uniform_transform: Transform,
    /// Whether the uniform layer is shown.
    #[serde(default = "default_true")]
    pub uniform_visible: bool,
    /// Filter tag recorded on the capture.
    #[serde(default)]
    pub filter: Option<String>,
    /// Stickers in placement order.
    #[serde(default)]
    pub stickers: Vec<SceneSticker>,
    /// Gesture ticks replayed after placement, in order.
    #[serde(default)]
    pub gestures: Vec<GestureTick>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            uniform: None,
            uniform_transform: Transform::IDENTITY,
            uniform_visible: true,
            filter: None,
            stickers: Vec::new(),
            gestures: Vec::new(),
        }
    }
}

impl Scene {
    /// Read and parse a scene JSON file.
    pub fn from_path(path: &Path) -> BoothResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scene '{}'", path.display()))?;
        serde_json::from_str(&text).map_err(|e| BoothError::serde(e.to_string()))
    }

    /// Drive `session` into this scene's state.
    ///
    /// Returns how many gesture ticks were applied (rejected ticks included).
    pub fn apply_to(&self, session: &mut BoothSession) -> BoothResult<usize> {
        let mut uniform_id = None;
        if let Some(id) = &self.uniform {
            if let EventEffect::UniformSelected(inst) =
                session.apply(BoothEvent::SelectUniform(id.clone()))?
            {
                session.place_overlay(&inst.id, self.uniform_transform);
                uniform_id = Some(inst.id);
            }
            let visible = session.registry().uniform().is_some_and(|u| u.visible);
            if visible != self.uniform_visible {
                session.apply(BoothEvent::ToggleUniformVisible)?;
            }
        }
        session.apply(BoothEvent::SetFilter(self.filter.clone()))?;

        let mut sticker_ids: Vec<OverlayId> = Vec::with_capacity(self.stickers.len());
        for s in &self.stickers {
            if let EventEffect::StickerAdded(inst) =
                session.apply(BoothEvent::AddSticker(s.sticker.clone()))?
            {
                session.place_overlay(&inst.id, s.transform);
                sticker_ids.push(inst.id);
            }
        }

        for (i, tick) in self.gestures.iter().enumerate() {
            let overlay = match tick.target {
                GestureTarget::Uniform => uniform_id.clone(),
                GestureTarget::Sticker(n) => sticker_ids.get(n).cloned(),
            }
            .ok_or_else(|| {
                BoothError::validation(format!(
                    "gesture {i} targets {:?}, which is not in the scene",
                    tick.target
                ))
            })?;
            let contacts = tick.contacts.iter().map(|&[x, y]| Point::new(x, y)).collect();
            session.apply(BoothEvent::Gesture { overlay, contacts })?;
        }
        Ok(self.gestures.len())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/scene.rs"]
mod tests;
