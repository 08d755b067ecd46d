//! Capture / detach state machine
//!
//! At most one influencing source holds the orbiter captured at a time.
//! Leaving the captured source's zone does not drop it; it starts a detach
//! that completes only after the orbiter has swept a configured number of
//! full revolutions around the body. A release starts a grace period during
//! which the released source cannot recapture, so the orbiter can actually
//! leave the well it was just thrown out of.

use std::f64::consts::PI;

use crate::simulation::forces::{circular_speed, tangent_of, wrap_angle, MIN_DISTANCE};
use crate::simulation::settings::OrbiterSettings;
use crate::simulation::states::{AttractorId, NVec2, System};

/// Cooldown after a release before the same attractor may recapture.
pub const GRACE_PERIOD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Uncaptured,
    Captured,
    Detaching,
}

/// Capture transitions surfaced to the embedder (HUD, audio, scoring).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitEvent {
    Entered(AttractorId),
    Exited(AttractorId),
}

#[derive(Debug, Clone)]
pub struct CaptureState {
    captured: Option<AttractorId>,
    detaching: bool,               // only meaningful while captured
    detach_angle: f64,             // accumulated |wrapped bearing delta| while detaching
    previous_bearing: f64,         // bearing at the last detach update
    last_released: Option<AttractorId>,
    grace_timer: f64,              // counts down from GRACE_PERIOD, never negative
    events: Vec<OrbitEvent>,       // pending transitions, drained by the embedder
}

impl CaptureState {
    pub fn new() -> Self {
        CaptureState {
            captured: None,
            detaching: false,
            detach_angle: 0.0,
            previous_bearing: 0.0,
            last_released: None,
            grace_timer: 0.0,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> CapturePhase {
        match (self.captured, self.detaching) {
            (None, _) => CapturePhase::Uncaptured,
            (Some(_), false) => CapturePhase::Captured,
            (Some(_), true) => CapturePhase::Detaching,
        }
    }

    pub fn captured(&self) -> Option<AttractorId> {
        self.captured
    }

    pub fn is_detaching(&self) -> bool {
        self.detaching
    }

    pub fn detach_angle(&self) -> f64 {
        self.detach_angle
    }

    pub fn grace_timer(&self) -> f64 {
        self.grace_timer
    }

    pub fn last_released(&self) -> Option<AttractorId> {
        self.last_released
    }

    /// True while `id` is barred from gravity and recapture after a release.
    pub fn is_grace_excluded(&self, id: AttractorId) -> bool {
        self.grace_timer > 0.0 && self.last_released == Some(id)
    }

    /// Count the grace period down; at zero the exclusion is lifted.
    pub fn tick_grace(&mut self, dt: f64) {
        if self.grace_timer > 0.0 {
            self.grace_timer = (self.grace_timer - dt).max(0.0);
            if self.grace_timer == 0.0 {
                self.last_released = None;
            }
        }
    }

    pub fn drain_events(&mut self) -> Vec<OrbitEvent> {
        std::mem::take(&mut self.events)
    }

    /// Attempt to capture `id`. No-op when `id` is already captured or still
    /// grace-excluded. A different previous capture is exited first. On
    /// success the orbiter velocity is blended toward the idealized circular
    /// velocity: gain 0 leaves it untouched, gain 1 snaps to the ideal.
    pub fn try_capture(
        &mut self,
        system: &System,
        id: AttractorId,
        position: NVec2,
        velocity: &mut NVec2,
        settings: &OrbiterSettings,
    ) -> bool {
        if self.captured == Some(id) {
            return false;
        }
        if self.is_grace_excluded(id) {
            return false;
        }
        let Some(data) = system.get(id) else {
            return false;
        };

        if let Some(previous) = self.captured.take() {
            self.detaching = false;
            self.detach_angle = 0.0;
            self.events.push(OrbitEvent::Exited(previous));
        }
        self.captured = Some(id);
        self.events.push(OrbitEvent::Entered(id));
        log::debug!("captured by {} {:?}", data.kind.label(), id);

        let to_center = data.position - position;
        let distance = to_center.norm();
        if distance < MIN_DISTANCE {
            // Degenerate geometry: keep the capture, skip the blend
            return true;
        }
        let center_dir = to_center / distance;
        let tangent = tangent_of(center_dir);
        let gain = settings.stabilization.clamp(0.0, 1.0);

        // Evaluate the ideal speed at a separation interpolated toward the
        // preferred radius by the gain, so a strongly stabilized capture
        // already anticipates where the orbiter is about to settle
        let effective = distance + (data.orbit_radius - distance) * gain;
        let speed = circular_speed(data.gravity, effective, settings.max_speed);
        let ideal = tangent * speed + data.velocity;
        *velocity = velocity.lerp(&ideal, gain);
        true
    }

    /// Same-source re-entry while detaching cancels the detach and keeps
    /// the capture. Returns true when that happened.
    pub fn cancel_detach_if(&mut self, id: AttractorId) -> bool {
        if self.detaching && self.captured == Some(id) {
            self.detaching = false;
            self.detach_angle = 0.0;
            log::debug!("detach from {:?} cancelled by re-entry", id);
            true
        } else {
            false
        }
    }

    /// Captured -> Detaching. `bearing` is the orbiter's current angle
    /// around the attractor; progress is measured from here.
    pub fn begin_detach(&mut self, bearing: f64) {
        if self.captured.is_none() || self.detaching {
            return;
        }
        self.detaching = true;
        self.detach_angle = 0.0;
        self.previous_bearing = bearing;
    }

    /// Accumulate swept angle while detaching. Deltas are wrapped into
    /// (-pi, pi] before the absolute value, so crossing the +/-pi seam never
    /// counts as a near-full revolution. Returns true once the accumulated
    /// angle reaches `detach_spins` full turns.
    pub fn update_detach(&mut self, bearing: f64, detach_spins: u32) -> bool {
        if !self.detaching {
            return false;
        }
        let delta = wrap_angle(bearing - self.previous_bearing);
        self.detach_angle += delta.abs();
        self.previous_bearing = bearing;
        self.detach_angle >= detach_spins as f64 * 2.0 * PI
    }

    /// Release the captured attractor: manual command, detach completion,
    /// invalidation or despawn. Starts the grace period and fires the exit
    /// event. Returns the released id, or `None` when nothing was captured.
    pub fn release(&mut self) -> Option<AttractorId> {
        let released = self.captured.take()?;
        self.last_released = Some(released);
        self.grace_timer = GRACE_PERIOD;
        self.detaching = false;
        self.detach_angle = 0.0;
        self.events.push(OrbitEvent::Exited(released));
        log::debug!("released from {:?}", released);
        Some(released)
    }

    /// Back to the initial state; pending events are dropped too.
    pub fn reset(&mut self) {
        *self = CaptureState::new();
    }
}
