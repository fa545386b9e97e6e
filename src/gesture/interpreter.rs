use std::collections::HashMap;

use crate::foundation::core::{OverlayId, Point};
use crate::foundation::math::wrap_degrees_signed;
use crate::interaction::arbiter::InteractionArbiter;
use crate::transform::model::TransformDelta;

/// Result of feeding one gesture tick to the interpreter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureOutcome {
    /// A drag or pinch phase started; the baseline was captured, nothing to apply yet.
    Began,
    /// Apply this delta to the overlay's transform.
    Delta(TransformDelta),
    /// All contacts lifted; the session was dropped and the lock released.
    Ended,
    /// Another overlay owns the interaction lock; the tick was ignored.
    Rejected,
    /// Zero contacts on an overlay without an active session.
    Idle,
    /// A contact coordinate was not finite; the tick was dropped without touching the session.
    Malformed,
}

/// Two-contact geometry captured at one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PinchBaseline {
    distance: f64,
    angle_rad: f64,
}

impl PinchBaseline {
    fn between(a: Point, b: Point) -> Self {
        let d = b - a;
        Self {
            distance: d.hypot(),
            angle_rad: d.y.atan2(d.x),
        }
    }

    /// Delta from this (previous) baseline to `next`.
    ///
    /// A zero or unusable distance on either side yields the identity delta: coincident contacts
    /// define neither a ratio nor an angle.
    fn delta_to(self, next: PinchBaseline) -> TransformDelta {
        if !(self.distance > 0.0 && next.distance > 0.0) {
            return TransformDelta::IDENTITY;
        }
        let d_scale = next.distance / self.distance;
        let d_rotation = wrap_degrees_signed((next.angle_rad - self.angle_rad).to_degrees());
        TransformDelta::pinch(d_scale, d_rotation)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Drag { last: Point },
    Pinch { baseline: PinchBaseline },
}

/// Converts per-overlay contact sets into incremental transform deltas.
///
/// Each overlay with contacts down has one session record (drag position or pinch baseline),
/// keyed by overlay id. Baselines are refreshed every tick, so successive deltas compose.
#[derive(Debug, Default)]
pub struct GestureInterpreter {
    sessions: HashMap<OverlayId, Phase>,
}

impl GestureInterpreter {
    /// Create an interpreter with no active sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one tick carrying every contact currently down on `id`'s hit region.
    ///
    /// Only the first two contacts are considered. Starting or continuing a gesture acquires the
    /// interaction lock for `id`; lifting every contact releases it.
    pub fn tick(
        &mut self,
        id: &OverlayId,
        contacts: &[Point],
        arbiter: &mut InteractionArbiter,
    ) -> GestureOutcome {
        if arbiter.is_blocked(id) {
            tracing::debug!(overlay = %id, "gesture rejected: another overlay holds the lock");
            return GestureOutcome::Rejected;
        }
        if contacts.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            tracing::debug!(overlay = %id, "dropping gesture tick with non-finite contact");
            return GestureOutcome::Malformed;
        }

        match contacts {
            [] => {
                let had_session = self.sessions.remove(id).is_some();
                let held_lock = arbiter.holder() == Some(id);
                arbiter.release(id);
                if had_session || held_lock {
                    GestureOutcome::Ended
                } else {
                    GestureOutcome::Idle
                }
            }
            [p] => {
                if !arbiter.try_acquire(id) {
                    return GestureOutcome::Rejected;
                }
                match self.sessions.insert(id.clone(), Phase::Drag { last: *p }) {
                    Some(Phase::Drag { last }) => {
                        GestureOutcome::Delta(TransformDelta::pan(p.x - last.x, p.y - last.y))
                    }
                    // Fresh drag, or a pinch that dropped to one finger: re-baseline, no jump.
                    Some(Phase::Pinch { .. }) | None => GestureOutcome::Began,
                }
            }
            [a, b, ..] => {
                if !arbiter.try_acquire(id) {
                    return GestureOutcome::Rejected;
                }
                let current = PinchBaseline::between(*a, *b);
                match self
                    .sessions
                    .insert(id.clone(), Phase::Pinch { baseline: current })
                {
                    Some(Phase::Pinch { baseline }) => {
                        GestureOutcome::Delta(baseline.delta_to(current))
                    }
                    Some(Phase::Drag { .. }) | None => GestureOutcome::Began,
                }
            }
        }
    }

    /// Drop the session for `id` (e.g. the overlay was removed mid-gesture).
    pub fn forget(&mut self, id: &OverlayId) {
        self.sessions.remove(id);
    }

    /// Drop every session. Used when the view is torn down.
    pub fn reset(&mut self) {
        self.sessions.clear();
    }

    /// Return `true` while `id` has contacts down.
    pub fn is_active(&self, id: &OverlayId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Return `true` while `id` is in a two-contact phase.
    pub fn is_pinching(&self, id: &OverlayId) -> bool {
        matches!(self.sessions.get(id), Some(Phase::Pinch { .. }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gesture/interpreter.rs"]
mod tests;
