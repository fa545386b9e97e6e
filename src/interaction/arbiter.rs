use crate::foundation::core::OverlayId;

/// Single-owner token deciding which overlay may consume gesture input.
///
/// At most one overlay holds the lock at any instant. Every read and write of the holder goes
/// through this type; there is no way to assign the holder directly.
#[derive(Debug, Default)]
pub struct InteractionArbiter {
    holder: Option<OverlayId>,
}

impl InteractionArbiter {
    /// Create a free arbiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `id`.
    ///
    /// Succeeds when the lock is free or already held by `id`. On failure nothing changes.
    pub fn try_acquire(&mut self, id: &OverlayId) -> bool {
        match &self.holder {
            Some(current) if current != id => {
                tracing::debug!(requested = %id, holder = %current, "interaction lock busy");
                false
            }
            Some(_) => true,
            None => {
                tracing::debug!(holder = %id, "interaction lock acquired");
                self.holder = Some(id.clone());
                true
            }
        }
    }

    /// Release the lock if, and only if, it is held by `id`.
    pub fn release(&mut self, id: &OverlayId) {
        if self.holder.as_ref() == Some(id) {
            tracing::debug!(holder = %id, "interaction lock released");
            self.holder = None;
        }
    }

    /// Return `true` when another overlay holds the lock.
    pub fn is_blocked(&self, id: &OverlayId) -> bool {
        self.holder.as_ref().is_some_and(|h| h != id)
    }

    /// Current lock holder, if any.
    pub fn holder(&self) -> Option<&OverlayId> {
        self.holder.as_ref()
    }

    /// Return `true` when nobody holds the lock.
    pub fn is_free(&self) -> bool {
        self.holder.is_none()
    }

    /// Unconditionally clear the lock. Used when the enclosing view is torn down.
    pub fn reset(&mut self) {
        self.holder = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/arbiter.rs"]
mod tests;
