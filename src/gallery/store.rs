use crate::render::pipeline::CapturedFrame;

/// Receives captured frames and owns them afterwards.
pub trait GalleryStore: Send {
    /// Add a frame; it becomes the most recent entry.
    fn push(&mut self, frame: CapturedFrame);
    /// Delete a frame by id. Returns whether it existed.
    fn remove(&mut self, id: &str) -> bool;
    /// Look up a frame by id.
    fn get(&self, id: &str) -> Option<&CapturedFrame>;
    /// All frames, most recent first.
    fn frames(&self) -> Vec<&CapturedFrame>;
    /// Number of stored frames.
    fn len(&self) -> usize;
    /// Return `true` when the gallery is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Volatile gallery; contents are lost when dropped.
#[derive(Clone, Debug, Default)]
pub struct InMemoryGallery {
    // oldest first
    frames: Vec<CapturedFrame>,
}

impl InMemoryGallery {
    /// Create an empty gallery.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every frame.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl GalleryStore for InMemoryGallery {
    fn push(&mut self, frame: CapturedFrame) {
        tracing::debug!(id = %frame.id, "gallery push");
        self.frames.push(frame);
    }

    fn remove(&mut self, id: &str) -> bool {
        let before = self.frames.len();
        self.frames.retain(|f| f.id != id);
        before != self.frames.len()
    }

    fn get(&self, id: &str) -> Option<&CapturedFrame> {
        self.frames.iter().find(|f| f.id == id)
    }

    fn frames(&self) -> Vec<&CapturedFrame> {
        self.frames.iter().rev().collect()
    }

    fn len(&self) -> usize {
        self.frames.len()
    }
}

/// File name for downloading `frame`: `uniform-photo-<UTC ISO date-time>.<ext>`.
pub fn download_file_name(frame: &CapturedFrame) -> String {
    let stamp = chrono::DateTime::from_timestamp_millis(frame.timestamp_millis)
        .unwrap_or_default()
        .format("%Y-%m-%dT%H:%M:%S");
    format!("uniform-photo-{stamp}.{}", frame.format.extension())
}

/// Text for the capture-count badge; `None` hides the badge.
pub fn badge_label(count: usize) -> Option<String> {
    match count {
        0 => None,
        1..=99 => Some(count.to_string()),
        _ => Some("99+".to_owned()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gallery/store.rs"]
mod tests;
