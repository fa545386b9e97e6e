use crate::assets::loader::AssetRef;
use crate::foundation::core::OverlayId;
use crate::interaction::arbiter::InteractionArbiter;
use crate::transform::model::{Transform, TransformDelta};

/// Which layer band an overlay paints in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    /// The single garment layer, painted directly above the camera frame.
    Uniform,
    /// Decorative layers, painted above the uniform in insertion order.
    Sticker,
}

impl OverlayKind {
    fn paint_band(self) -> u8 {
        match self {
            Self::Uniform => 0,
            Self::Sticker => 1,
        }
    }
}

/// One placed overlay layer.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayInstance {
    /// Unique, immutable id.
    pub id: OverlayId,
    /// Layer band.
    pub kind: OverlayKind,
    /// Display name (catalog entry name).
    pub name: String,
    /// Image handle.
    pub image: AssetRef,
    /// Current placement.
    pub transform: Transform,
    /// Insertion sequence; orders overlays within a band.
    pub z_order: u64,
    /// Hidden overlays stay registered but are not painted.
    pub visible: bool,
}

/// Owns every placed overlay and the interaction lock guarding them.
///
/// Paint order is fixed: uniform first, then stickers in insertion order. The camera frame is
/// always below both and is not part of the registry.
#[derive(Debug, Default)]
pub struct OverlayRegistry {
    uniform: Option<OverlayInstance>,
    stickers: Vec<OverlayInstance>,
    next_seq: u64,
    arbiter: InteractionArbiter,
}

impl OverlayRegistry {
    /// Create an empty registry with a free interaction lock.
    pub fn new() -> Self {
        Self::default()
    }

    fn instantiate(&mut self, kind: OverlayKind, image: AssetRef, name: String) -> OverlayInstance {
        let seq = self.next_seq;
        self.next_seq += 1;
        let prefix = match kind {
            OverlayKind::Uniform => "uniform",
            OverlayKind::Sticker => "sticker",
        };
        OverlayInstance {
            id: OverlayId::new(format!("{prefix}-{seq}")),
            kind,
            name,
            image,
            transform: Transform::IDENTITY,
            z_order: seq,
            visible: true,
        }
    }

    /// Replace the uniform overlay with a fresh one at the default transform.
    ///
    /// The previous uniform's transform is discarded. If it held the interaction lock, the lock
    /// is released.
    pub fn set_uniform(&mut self, image: AssetRef, name: impl Into<String>) -> OverlayInstance {
        let visible = self.uniform.as_ref().is_none_or(|u| u.visible);
        if let Some(old) = self.uniform.take() {
            self.arbiter.release(&old.id);
        }
        let mut inst = self.instantiate(OverlayKind::Uniform, image, name.into());
        inst.visible = visible;
        tracing::debug!(overlay = %inst.id, name = %inst.name, "uniform set");
        self.uniform = Some(inst.clone());
        inst
    }

    /// Remove the uniform overlay, if any.
    pub fn clear_uniform(&mut self) -> Option<OverlayInstance> {
        let old = self.uniform.take()?;
        self.arbiter.release(&old.id);
        Some(old)
    }

    /// Show or hide the uniform layer without discarding it.
    pub fn set_uniform_visible(&mut self, visible: bool) {
        if let Some(u) = self.uniform.as_mut() {
            u.visible = visible;
        }
    }

    /// Append a sticker at the canvas centre with the default transform.
    pub fn add_sticker(&mut self, image: AssetRef, name: impl Into<String>) -> OverlayInstance {
        let inst = self.instantiate(OverlayKind::Sticker, image, name.into());
        tracing::debug!(overlay = %inst.id, name = %inst.name, "sticker added");
        self.stickers.push(inst.clone());
        inst
    }

    /// Apply `delta` to the overlay's transform.
    ///
    /// Unknown ids are a silent no-op (a gesture may race with removal); returns whether an
    /// overlay was updated.
    pub fn update_overlay(&mut self, id: &OverlayId, delta: TransformDelta) -> bool {
        match self.get_mut(id) {
            Some(inst) => {
                inst.transform = inst.transform.apply(delta);
                true
            }
            None => {
                tracing::debug!(overlay = %id, "update for missing overlay ignored");
                false
            }
        }
    }

    /// Put the overlay back at the default transform.
    pub fn reset_transform(&mut self, id: &OverlayId) -> bool {
        self.set_transform(id, Transform::IDENTITY)
    }

    /// Place the overlay at an absolute transform (scale is clamped).
    pub fn set_transform(&mut self, id: &OverlayId, t: Transform) -> bool {
        match self.get_mut(id) {
            Some(inst) => {
                inst.transform = Transform::new(t.x, t.y, t.scale, t.rotation_deg);
                true
            }
            None => false,
        }
    }

    /// Delete one overlay, releasing the interaction lock if it held it.
    pub fn remove_overlay(&mut self, id: &OverlayId) -> Option<OverlayInstance> {
        let removed = if self.uniform.as_ref().is_some_and(|u| &u.id == id) {
            self.uniform.take()
        } else {
            let pos = self.stickers.iter().position(|s| &s.id == id)?;
            Some(self.stickers.remove(pos))
        };
        self.arbiter.release(id);
        removed
    }

    /// Delete every sticker, leaving the uniform in place. Returns how many were removed.
    pub fn remove_all_stickers(&mut self) -> usize {
        let removed = std::mem::take(&mut self.stickers);
        for s in &removed {
            self.arbiter.release(&s.id);
        }
        removed.len()
    }

    /// Borrow an overlay by id.
    pub fn get(&self, id: &OverlayId) -> Option<&OverlayInstance> {
        if let Some(u) = self.uniform.as_ref().filter(|u| &u.id == id) {
            return Some(u);
        }
        self.stickers.iter().find(|s| &s.id == id)
    }

    fn get_mut(&mut self, id: &OverlayId) -> Option<&mut OverlayInstance> {
        if let Some(u) = self.uniform.as_mut().filter(|u| &u.id == id) {
            return Some(u);
        }
        self.stickers.iter_mut().find(|s| &s.id == id)
    }

    /// Current uniform overlay.
    pub fn uniform(&self) -> Option<&OverlayInstance> {
        self.uniform.as_ref()
    }

    /// Stickers in paint order.
    pub fn stickers(&self) -> &[OverlayInstance] {
        &self.stickers
    }

    /// Number of placed stickers.
    pub fn sticker_count(&self) -> usize {
        self.stickers.len()
    }

    /// Return `true` when at least one sticker is placed.
    pub fn has_stickers(&self) -> bool {
        !self.stickers.is_empty()
    }

    /// Point-in-time copy of every overlay, back to front.
    pub fn snapshot(&self) -> Vec<OverlayInstance> {
        let mut out: Vec<OverlayInstance> = self
            .uniform
            .iter()
            .chain(self.stickers.iter())
            .cloned()
            .collect();
        out.sort_by_key(|o| (o.kind.paint_band(), o.z_order));
        out
    }

    /// The interaction lock guarding these overlays.
    pub fn arbiter(&self) -> &InteractionArbiter {
        &self.arbiter
    }

    /// Mutable access to the interaction lock, for gesture handling.
    pub fn arbiter_mut(&mut self) -> &mut InteractionArbiter {
        &mut self.arbiter
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/registry.rs"]
mod tests;
