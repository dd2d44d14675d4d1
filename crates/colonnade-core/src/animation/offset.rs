//! `OffsetAnim`: the scalar view-offset animation mode (spec.md §3's
//! "Viewport state").

use crate::animation::spring::Spring;
use crate::clock::Seconds;

/// The three modes a single scalar offset can be in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OffsetAnim {
    /// Not animating; a fixed value.
    Static(f64),
    /// Riding a spring from its old value to a new target.
    Animating(Spring),
    /// Externally driven (an interactive drag), bypasses the spring entirely.
    Gesture(f64),
}

impl OffsetAnim {
    pub fn static_at(v: f64) -> Self {
        OffsetAnim::Static(v)
    }

    /// Value at the most recent tick (i.e. at time `t`).
    pub fn current(&self, t: Seconds) -> f64 {
        match self {
            OffsetAnim::Static(v) => *v,
            OffsetAnim::Animating(spring) => spring.value(t),
            OffsetAnim::Gesture(v) => *v,
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self, OffsetAnim::Animating(_))
    }

    pub fn is_gesture(&self) -> bool {
        matches!(self, OffsetAnim::Gesture(_))
    }

    /// Begins (or retargets) an animation toward `target`, starting from the
    /// current value at time `t` so a mid-flight retarget never jumps.
    pub fn animate_to(&self, t: Seconds, target: f64) -> Self {
        let from = self.current(t);
        if (from - target).abs() < f64::EPSILON {
            return OffsetAnim::Static(target);
        }
        OffsetAnim::Animating(Spring::new(from, target, t))
    }

    pub fn begin_gesture(&self, t: Seconds) -> Self {
        OffsetAnim::Gesture(self.current(t))
    }

    pub fn update_gesture(&self, value: f64) -> Self {
        OffsetAnim::Gesture(value)
    }

    pub fn end_gesture(&self, t: Seconds, settle_to: f64) -> Self {
        match self {
            OffsetAnim::Gesture(v) => OffsetAnim::Animating(Spring::new(*v, settle_to, t)),
            other => other.animate_to(t, settle_to),
        }
    }

    /// Advances the animation state at time `t`, returning whether it is
    /// still in flight. Static/gesture offsets are always "not animating";
    /// a spring that has settled collapses to `Static`.
    pub fn advance(&mut self, t: Seconds) -> bool {
        if let OffsetAnim::Animating(spring) = self {
            if spring.is_complete(t) {
                *self = OffsetAnim::Static(spring.to);
                return false;
            }
            return true;
        }
        false
    }
}
