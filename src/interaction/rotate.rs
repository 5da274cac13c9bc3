use bevy::prelude::*;

/// Below this angle (radians) the prop snaps onto its goal.
pub const SNAP_EPSILON: f32 = 0.01;

/// Look-triggered rotation: pursues `target` while looked at, `initial` otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub looked_at: bool,
    pub initial: Quat,
    pub target: Quat,
    pub speed: f32,
}

impl RotationState {
    /// `axis` and `angle` are applied in the prop's local frame.
    pub fn new(initial: Quat, axis: Vec3, angle: f32, speed: f32) -> Self {
        let delta = Quat::from_axis_angle(axis.try_normalize().unwrap_or(Vec3::Y), angle);
        Self {
            looked_at: false,
            initial,
            target: (initial * delta).normalize(),
            speed,
        }
    }

    pub fn goal(&self) -> Quat {
        if self.looked_at {
            self.target
        } else {
            self.initial
        }
    }

    /// Next orientation from `current` after `delta` seconds.
    pub fn step(&self, current: Quat, delta: f32) -> Quat {
        let goal = self.goal();
        if current.angle_between(goal) < SNAP_EPSILON {
            return goal;
        }
        let next = current.slerp(goal, (self.speed * delta).clamp(0.0, 1.0));
        if next.angle_between(goal) < SNAP_EPSILON {
            goal
        } else {
            next
        }
    }

    /// Clears the look flag and returns the orientation to snap back to.
    pub fn reset(&mut self) -> Quat {
        self.looked_at = false;
        self.initial
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn state() -> RotationState {
        RotationState::new(Quat::IDENTITY, Vec3::Y, FRAC_PI_2, 2.0)
    }

    #[test]
    fn target_is_initial_composed_with_delta() {
        let initial = Quat::from_rotation_x(0.3);
        let s = RotationState::new(initial, Vec3::Y, FRAC_PI_2, 1.0);
        let expected = initial * Quat::from_rotation_y(FRAC_PI_2);
        assert!(s.target.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn approaches_target_monotonically_without_overshoot() {
        let mut s = state();
        s.looked_at = true;
        let mut current = s.initial;
        let mut last = current.angle_between(s.target);

        for _ in 0..600 {
            current = s.step(current, 1.0 / 60.0);
            let remaining = current.angle_between(s.target);
            assert!(remaining <= last + 1e-4);
            // Never further from the start than the target itself is.
            assert!(current.angle_between(s.initial) <= FRAC_PI_2 + 1e-3);
            last = remaining;
        }
        assert_eq!(current, s.target);
    }

    #[test]
    fn returns_to_initial_when_look_ends() {
        let mut s = state();
        s.looked_at = true;
        let mut current = s.initial;
        for _ in 0..30 {
            current = s.step(current, 1.0 / 60.0);
        }
        s.looked_at = false;
        for _ in 0..600 {
            current = s.step(current, 1.0 / 60.0);
        }
        assert_eq!(current, s.initial);
    }

    #[test]
    fn reset_clears_look_flag() {
        let mut s = state();
        s.looked_at = true;
        assert_eq!(s.reset(), Quat::IDENTITY);
        assert!(!s.looked_at);
    }
}
