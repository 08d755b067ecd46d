//! Deterministic background orbiter (rails driver)
//!
//! Moves one scene body along a prescribed orbit each frame, independent of
//! the physics-driven orbiter. With a single reference body it follows a
//! Keplerian ellipse around that focus; with two or more it traverses the
//! envelope path generated around the whole cluster; with none left it
//! holds position. Reference bodies that despawn are dropped lazily.

use nalgebra::Rotation2;
use serde::Deserialize;

use crate::background::envelope::{barycenter_of, cluster_radius, EnvelopePath};
use crate::background::kepler::{KeplerOrbit, ECCENTRICITY_MAX, ECCENTRICITY_MIN};
use crate::properties::{PropertyDef, Tunable};
use crate::simulation::states::{AttractorId, NVec2, System};

/// How the body is driven. The mode normally derives from the number of
/// valid reference bodies (one: Kepler, several: envelope) but can be
/// pinned in the scenario, e.g. a Kepler ellipse oriented by a second body.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitMode {
    #[serde(skip)]
    Hold,
    #[serde(rename = "kepler")]
    Kepler,
    #[serde(rename = "envelope")]
    Envelope,
}

pub struct BackgroundOrbiter {
    targets: Vec<AttractorId>,          // reference bodies, first is the Kepler focus
    mode_override: Option<OrbitMode>,   // pin the mode instead of deriving it
    radius: f64,                        // Kepler: semi-major axis; envelope: extra clearance
    speed: f64,                         // Kepler: mean motion (rad/s); envelope: linear speed
    body_radius: f64,                   // own visual radius, part of the safety margin
    position: NVec2,
    orbit: KeplerOrbit,
    path: Option<EnvelopePath>,
    path_parameter: f64,                // normalized arc length; grows unbounded, wraps on sampling
    dirty: bool,                        // re-sync to targets before the next move
}

impl BackgroundOrbiter {
    /// `radius: None` derives the orbit size from the current distance to
    /// the targets, so a body dropped into the scene orbits from where it
    /// stands. The first `update` performs the initial sync.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        system: &System,
        position: NVec2,
        targets: Vec<AttractorId>,
        mode: Option<OrbitMode>,
        radius: Option<f64>,
        speed: f64,
        eccentricity: f64,
        body_radius: f64,
    ) -> Self {
        let mut orbiter = BackgroundOrbiter {
            targets,
            mode_override: mode,
            radius: radius.unwrap_or(0.0),
            speed,
            body_radius,
            position,
            orbit: KeplerOrbit::new(eccentricity),
            path: None,
            path_parameter: 0.0,
            dirty: true,
        };
        if radius.is_none() {
            orbiter.init_radius_from_distance(system);
        }
        orbiter
    }

    pub fn position(&self) -> NVec2 {
        self.position
    }

    pub fn targets(&self) -> &[AttractorId] {
        &self.targets
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn eccentricity(&self) -> f64 {
        self.orbit.eccentricity
    }

    pub fn path(&self) -> Option<&EnvelopePath> {
        self.path.as_ref()
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
        self.dirty = true;
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn set_eccentricity(&mut self, eccentricity: f64) {
        self.orbit.eccentricity = eccentricity;
        self.dirty = true;
    }

    /// Teleport; the orbit state re-syncs at the next update.
    pub fn set_position(&mut self, position: NVec2) {
        self.position = position;
        self.dirty = true;
    }

    /// The mode in effect for the current target set.
    pub fn mode(&self, system: &System) -> OrbitMode {
        let valid = self
            .targets
            .iter()
            .filter(|&&id| system.is_valid(id))
            .count();
        if valid == 0 {
            return OrbitMode::Hold;
        }
        match self.mode_override {
            // An envelope needs at least two bodies to wrap around
            Some(OrbitMode::Envelope) if valid < 2 => OrbitMode::Kepler,
            Some(mode) => mode,
            None if valid >= 2 => OrbitMode::Envelope,
            None => OrbitMode::Kepler,
        }
    }

    pub fn add_reference_body(&mut self, system: &System, id: AttractorId) {
        if system.get(id).is_none() {
            log::warn!("ignoring unknown reference body {:?}", id);
            return;
        }
        self.targets.push(id);
        self.sync_to_targets(system);
    }

    pub fn remove_reference_body_at(&mut self, system: &System, index: usize) {
        if index >= self.targets.len() {
            return;
        }
        self.targets.remove(index);
        if !self.targets.is_empty() {
            self.sync_to_targets(system);
        }
    }

    /// Advance by `dt` and return the new position. Call once per frame;
    /// the caller is expected to drive the scene body to the result.
    pub fn update(&mut self, system: &System, dt: f64) -> NVec2 {
        self.purge_targets(system);
        if self.targets.is_empty() {
            return self.position;
        }
        if self.dirty {
            self.sync_to_targets(system);
        }
        match self.mode(system) {
            OrbitMode::Hold => {}
            OrbitMode::Kepler => self.apply_kepler_orbit(system, dt),
            OrbitMode::Envelope => self.apply_path_orbit(system, dt),
        }
        self.position
    }

    /// Re-derive the orbit state (mean anomaly or path parameter) from the
    /// current position so the body does not jump when targets or tuning
    /// change.
    pub fn sync_to_targets(&mut self, system: &System) {
        self.purge_targets(system);
        if self.targets.is_empty() {
            return;
        }
        match self.mode(system) {
            OrbitMode::Hold => {}
            OrbitMode::Kepler => {
                let offset = self.position - self.focus(system);
                let local = Rotation2::new(-self.orientation(system)) * offset;
                self.orbit.sync_from_offset(local);
            }
            OrbitMode::Envelope => {
                let members = self.member_positions(system);
                let margin = self.min_safe_margin(system);
                let path = EnvelopePath::build(&members, self.radius, margin);
                self.path_parameter = path.parameter_near(self.position);
                self.path = Some(path);
            }
        }
        self.dirty = false;
    }

    fn apply_kepler_orbit(&mut self, system: &System, dt: f64) {
        self.orbit.advance(self.speed, dt);
        let margin = self.min_safe_margin(system);
        let local = self.orbit.local_position(self.radius, margin);
        let rotated = Rotation2::new(self.orientation(system)) * local;
        self.position = self.focus(system) + rotated;
    }

    fn apply_path_orbit(&mut self, system: &System, dt: f64) {
        // Rebuild from the members' current positions so the envelope
        // follows a moving cluster
        let members = self.member_positions(system);
        let margin = self.min_safe_margin(system);
        let path = EnvelopePath::build(&members, self.radius, margin);
        let rate = if path.total_length() > 1e-4 {
            self.speed / path.total_length()
        } else {
            0.0
        };
        self.path_parameter += rate * dt;
        self.position = path.position_at(self.path_parameter);
        self.path = Some(path);
    }

    fn purge_targets(&mut self, system: &System) {
        let before = self.targets.len();
        self.targets.retain(|&id| {
            let keep = system.is_valid(id);
            if !keep {
                log::debug!("dropping despawned reference body {:?}", id);
            }
            keep
        });
        if self.targets.len() != before {
            // The anomaly or path parameter is stale once membership changes
            self.dirty = true;
        }
    }

    fn member_positions(&self, system: &System) -> Vec<NVec2> {
        self.targets
            .iter()
            .filter(|&&id| system.is_valid(id))
            .filter_map(|&id| system.get(id).map(|a| a.position))
            .collect()
    }

    /// Clearance below which the path or ellipse must never pass: both
    /// visual radii plus a couple percent of slack.
    fn min_safe_margin(&self, system: &System) -> f64 {
        let mut max_target = 0.0f64;
        for &id in &self.targets {
            if let Some(a) = system.get(id) {
                if a.body_radius > max_target {
                    max_target = a.body_radius;
                }
            }
        }
        (self.body_radius + max_target) * 1.02 + 0.02
    }

    fn focus(&self, system: &System) -> NVec2 {
        self.targets
            .iter()
            .copied()
            .find(|&id| system.is_valid(id))
            .and_then(|id| system.get(id))
            .map(|a| a.position)
            .unwrap_or_else(NVec2::zeros)
    }

    /// Bearing from the first valid reference body to the second, used to
    /// orient the Kepler ellipse. Zero without a second body.
    fn orientation(&self, system: &System) -> f64 {
        let mut valid = self
            .targets
            .iter()
            .copied()
            .filter(|&id| system.is_valid(id));
        match (valid.next(), valid.next()) {
            (Some(first), Some(second)) => match (system.get(first), system.get(second)) {
                (Some(a), Some(b)) => {
                    let dir = b.position - a.position;
                    dir.y.atan2(dir.x)
                }
                _ => 0.0,
            },
            _ => 0.0,
        }
    }

    fn init_radius_from_distance(&mut self, system: &System) {
        let members = self.member_positions(system);
        if members.is_empty() {
            return;
        }
        let margin = self.min_safe_margin(system);
        match self.mode(system) {
            OrbitMode::Hold => {}
            OrbitMode::Envelope => {
                let barycenter = barycenter_of(&members);
                let cluster = cluster_radius(&members, barycenter);
                let distance = (self.position - barycenter).norm();
                self.radius = (distance - cluster).max(0.0).max(margin * 0.5);
            }
            OrbitMode::Kepler => {
                let distance = (self.position - self.focus(system)).norm();
                let e = self
                    .orbit
                    .eccentricity
                    .clamp(ECCENTRICITY_MIN, ECCENTRICITY_MAX);
                self.radius = distance.max(margin / (1.0 - e));
            }
        }
    }
}

impl Tunable for BackgroundOrbiter {
    fn properties(&self) -> Vec<PropertyDef> {
        const GROUP: &str = "Background Orbiter";
        let mut list = vec![
            PropertyDef::new(GROUP, "Speed", 0.1, 15.0, self.speed),
            PropertyDef::new(GROUP, "Radius", 0.5, 20.0, self.radius),
        ];
        // Eccentricity only shapes the single-focus ellipse
        if self.mode_override == Some(OrbitMode::Kepler) || self.targets.len() < 2 {
            list.push(PropertyDef::new(
                GROUP,
                "Eccentricity",
                0.01,
                0.99,
                self.orbit.eccentricity,
            ));
        }
        list
    }

    fn set_property(&mut self, name: &str, value: f64) -> bool {
        match name {
            "Speed" => self.set_speed(value.clamp(0.1, 15.0)),
            "Radius" => self.set_radius(value.clamp(0.5, 20.0)),
            "Eccentricity" => self.set_eccentricity(value.clamp(0.01, 0.99)),
            _ => return false,
        }
        true
    }
}
