//! The player-facing orbiter
//!
//! Glues the gravity registry, the capture state machine and the stabilizer
//! set into one fixed-step body. Each step runs the same phases in order:
//! staged settings swap, grace decay, stale-source purge, force
//! accumulation, detach progress, then a semi-implicit Euler integration.
//!
//! The embedder owns the step cadence and feeds proximity events in
//! between steps via `add_gravity_source` / `remove_gravity_source`.

use crate::properties::{PropertyDef, Tunable};
use crate::simulation::capture::{CaptureState, OrbitEvent};
use crate::simulation::forces::{gravity_toward, normalize_or_zero, CaptureFrame, StabilizerSet};
use crate::simulation::registry::{GravityRegistry, RemoveOutcome};
use crate::simulation::settings::{EscapeMode, OrbiterSettings};
use crate::simulation::states::{AttractorId, AttractorKind, NVec2, System};
use crate::simulation::trajectory::{self, TrajectoryPreview};

pub struct Orbiter {
    position: NVec2,
    velocity: NVec2,
    registry: GravityRegistry,
    capture: CaptureState,
    stabilizers: StabilizerSet,
    settings: OrbiterSettings,
    pending_settings: Option<OrbiterSettings>, // applied at the next step boundary
}

impl Orbiter {
    pub fn new(position: NVec2, settings: OrbiterSettings) -> Self {
        Orbiter {
            position,
            velocity: NVec2::zeros(),
            registry: GravityRegistry::new(),
            capture: CaptureState::new(),
            stabilizers: StabilizerSet::standard(),
            settings,
            pending_settings: None,
        }
    }

    pub fn position(&self) -> NVec2 {
        self.position
    }

    pub fn velocity(&self) -> NVec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: NVec2) {
        self.velocity = velocity;
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// The settings in effect for the current step.
    pub fn settings(&self) -> &OrbiterSettings {
        &self.settings
    }

    /// Stage a new settings snapshot; it takes effect at the next
    /// `fixed_step` so a step never mixes two snapshots.
    pub fn set_settings(&mut self, settings: OrbiterSettings) {
        self.pending_settings = Some(settings);
    }

    pub fn sources(&self) -> &GravityRegistry {
        &self.registry
    }

    pub fn capture(&self) -> &CaptureState {
        &self.capture
    }

    pub fn captured_kind(&self, system: &System) -> Option<AttractorKind> {
        self.capture
            .captured()
            .and_then(|id| system.get(id))
            .map(|a| a.kind)
    }

    pub fn drain_events(&mut self) -> Vec<OrbitEvent> {
        self.capture.drain_events()
    }

    /// Zone-entry callback from the embedder's proximity layer.
    pub fn add_gravity_source(&mut self, system: &System, id: AttractorId) {
        if !self.registry.add(system, id) {
            return;
        }
        // Re-entering the zone we are detaching from cancels the detach
        if self.capture.cancel_detach_if(id) {
            return;
        }
        self.capture
            .try_capture(system, id, self.position, &mut self.velocity, &self.settings);
    }

    /// Zone-exit callback. Exiting the captured source's zone starts a
    /// detach instead of dropping the source.
    pub fn remove_gravity_source(&mut self, system: &System, id: AttractorId) {
        match self.registry.remove(id, self.capture.captured()) {
            RemoveOutcome::BeginDetach => {
                if !self.capture.is_detaching() {
                    if let Some(data) = system.get(id) {
                        let offset = self.position - data.position;
                        self.capture.begin_detach(offset.y.atan2(offset.x));
                    }
                }
            }
            RemoveOutcome::Removed | RemoveOutcome::NotPresent => {}
        }
    }

    /// One fixed physics step of size `dt`.
    pub fn fixed_step(&mut self, system: &System, dt: f64) {
        if let Some(settings) = self.pending_settings.take() {
            self.settings = settings;
        }

        self.capture.tick_grace(dt);

        // Sources that despawned since the last step; losing the captured
        // one forces a release (grace period included)
        let captured = self.capture.captured();
        if self.registry.purge(system, captured) {
            self.capture.release();
        }

        let mut accel = NVec2::zeros();
        if self.registry.is_empty() {
            // Nothing pulls on us: fall back to the ambient field
            accel += self.settings.ambient_gravity;
        } else {
            for id in self.registry.iter() {
                if self.capture.is_grace_excluded(id) {
                    continue;
                }
                let Some(data) = system.get(id) else {
                    continue;
                };
                if let Some(g) = gravity_toward(self.position, data) {
                    accel += g;
                }
            }
        }

        // Stabilization acts only on the captured source
        if let Some(id) = self.capture.captured() {
            if let Some(data) = system.get(id) {
                if let Some(frame) = CaptureFrame::compute(self.position, self.velocity, data) {
                    accel += self.stabilizers.accumulate(&frame, data, &self.settings);
                }
                if self.capture.is_detaching() {
                    let offset = self.position - data.position;
                    let bearing = offset.y.atan2(offset.x);
                    let spins = self.settings.detach_spins;
                    if self.capture.update_detach(bearing, spins) {
                        // Full turns swept: the detach completes and the
                        // source stops influencing us entirely
                        if let Some(released) = self.capture.release() {
                            self.registry.remove_outright(released);
                        }
                    }
                }
            }
        }

        // Semi-implicit Euler: kick the velocity, then drift the position
        self.velocity += accel * dt;
        self.position += self.velocity * dt;
    }

    /// Manual release while captured. The exit direction comes from the
    /// escape mode; the current speed is kept and the escape boost added.
    pub fn release_toward(&mut self, aim: NVec2) {
        if self.capture.captured().is_none() {
            return;
        }
        let speed = self.velocity.norm();
        let dir = match self.settings.escape_mode {
            EscapeMode::Cursor => normalize_or_zero(aim - self.position),
            EscapeMode::Velocity => normalize_or_zero(self.velocity),
        };
        self.capture.release();
        self.velocity = dir * (speed + self.settings.escape_force);
    }

    /// Release (if captured) and launch toward `aim` at exactly `speed`.
    /// A degenerate aim falls back to the +x direction.
    pub fn release_with_speed(&mut self, aim: NVec2, speed: f64) {
        let to_aim = aim - self.position;
        let dir = if to_aim.norm_squared() > 1e-4 {
            to_aim / to_aim.norm()
        } else {
            NVec2::new(1.0, 0.0)
        };
        if self.capture.captured().is_some() {
            self.capture.release();
        }
        self.velocity = dir * speed;
    }

    /// Preview of a release toward `aim`, clipped at the first orbit zone
    /// that would take over.
    pub fn predict_trajectory(&self, system: &System, aim: NVec2) -> TrajectoryPreview {
        trajectory::predict(
            self.position,
            aim,
            system,
            &self.registry,
            self.capture.captured(),
        )
    }

    /// Respawn at `position` with a clean slate.
    pub fn reset(&mut self, position: NVec2) {
        self.position = position;
        self.velocity = NVec2::zeros();
        self.registry.clear();
        self.capture.reset();
        self.pending_settings = None;
    }

    /// Shutdown: release any capture (the exit event stays drainable) and
    /// forget all sources.
    pub fn disable(&mut self) {
        self.capture.release();
        self.registry.clear();
    }

    /// The most recently staged settings, or the active ones.
    fn view(&self) -> &OrbiterSettings {
        self.pending_settings.as_ref().unwrap_or(&self.settings)
    }
}

impl Tunable for Orbiter {
    fn properties(&self) -> Vec<PropertyDef> {
        const GROUP: &str = "Orbiter";
        let s = self.view();
        vec![
            PropertyDef::new(GROUP, "Max Speed", 5.0, 20.0, s.max_speed),
            PropertyDef::new(GROUP, "Stabilization", 0.0, 1.0, s.stabilization),
            PropertyDef::new(GROUP, "Radius Correction", 0.0, 10.0, s.radius_correction),
            PropertyDef::new(GROUP, "Speed Damping", 0.0, 5.0, s.speed_damping),
            PropertyDef::new(GROUP, "Escape Force", 0.0, 30.0, s.escape_force),
            PropertyDef::whole(GROUP, "Detach Spins", 1.0, 5.0, s.detach_spins as f64),
        ]
    }

    fn set_property(&mut self, name: &str, value: f64) -> bool {
        let mut next = self.view().clone();
        match name {
            "Max Speed" => next.max_speed = value.clamp(5.0, 20.0),
            "Stabilization" => next.stabilization = value.clamp(0.0, 1.0),
            "Radius Correction" => next.radius_correction = value.clamp(0.0, 10.0),
            "Speed Damping" => next.speed_damping = value.clamp(0.0, 5.0),
            "Escape Force" => next.escape_force = value.clamp(0.0, 30.0),
            "Detach Spins" => next.detach_spins = value.round().clamp(1.0, 5.0) as u32,
            _ => return false,
        }
        self.set_settings(next);
        true
    }
}
