use std::time::Duration;

use bevy::prelude::*;

/// Sliding door state machine.
///
/// Closed -> Opening -> Open -> Closing -> Closed, modelled as `is_open` (the
/// target) plus `is_animating`. Toggling mid-animation is ignored. Opening
/// schedules an auto-close which only fires if the door is still open and idle.
#[derive(Debug, Clone)]
pub struct DoorMotion {
    is_open: bool,
    is_animating: bool,
    progress: f32,
    closed_position: Vec3,
    open_position: Vec3,
    duration: f32,
    auto_close_delay: f32,
    auto_close: Option<Timer>,
}

impl DoorMotion {
    /// `local_offset` is the slide vector in the door's frame; `rotation` carries it into world space.
    pub fn new(
        closed_position: Vec3,
        rotation: Quat,
        local_offset: Vec3,
        duration: f32,
        auto_close_delay: f32,
    ) -> Self {
        Self {
            is_open: false,
            is_animating: false,
            progress: 0.0,
            closed_position,
            open_position: closed_position + rotation * local_offset,
            duration: duration.max(f32::EPSILON),
            auto_close_delay,
            auto_close: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn closed_position(&self) -> Vec3 {
        self.closed_position
    }

    pub fn open_position(&self) -> Vec3 {
        self.open_position
    }

    pub fn has_pending_auto_close(&self) -> bool {
        self.auto_close.is_some()
    }

    /// Current world position of the door panel.
    pub fn position(&self) -> Vec3 {
        let (from, to) = if self.is_open {
            (self.closed_position, self.open_position)
        } else {
            (self.open_position, self.closed_position)
        };
        if !self.is_animating {
            return to;
        }
        from.lerp(to, self.progress)
    }

    /// Starts opening or closing. Returns false when the door is already moving.
    pub fn toggle(&mut self) -> bool {
        if self.is_animating {
            return false;
        }
        self.auto_close = None;
        self.is_open = !self.is_open;
        self.is_animating = true;
        self.progress = 0.0;
        if self.is_open {
            self.auto_close = Some(Timer::from_seconds(self.auto_close_delay, TimerMode::Once));
        }
        true
    }

    pub fn cancel_auto_close(&mut self) {
        self.auto_close = None;
    }

    /// Advances the slide and the auto-close timer. Returns the new position if the panel moved.
    pub fn advance(&mut self, delta: f32) -> Option<Vec3> {
        let mut moved = None;

        if self.is_animating {
            self.progress += delta / self.duration;
            if self.progress >= 1.0 {
                self.progress = 1.0;
                self.is_animating = false;
            }
            moved = Some(self.position());
        }

        let fired = self.auto_close.as_mut().is_some_and(|timer| {
            timer.tick(Duration::from_secs_f32(delta.max(0.0)));
            timer.finished()
        });
        if fired {
            self.auto_close = None;
            if self.is_open && !self.is_animating {
                debug!("Auto-closing door");
                self.toggle();
            }
        }

        moved
    }
}
