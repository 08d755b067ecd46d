//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! (`Scenario`) containing:
//! - numerical parameters (`SimParams`)
//! - scene state (`System` with attractors at t = 0)
//! - the physics orbiter (`Orbiter`)
//! - deterministic rails (`Rail` per configured orbit)
//!
//! The bundle also owns a simple proximity sweep standing in for the
//! embedder's collision layer: each physics step it compares the orbiter
//! against every attractor's orbit zone and feeds the enter/exit edges
//! into the orbiter.

use crate::background::orbiter::BackgroundOrbiter;
use crate::configuration::config::{kind_defaults, AttractorConfig, ConfigError, ScenarioConfig};
use crate::simulation::orbiter::Orbiter;
use crate::simulation::settings::SimParams;
use crate::simulation::states::{Attractor, AttractorId, NVec2, System};

/// One rails-driven attractor: the driver plus the body it moves.
pub struct Rail {
    pub body: AttractorId,
    pub orbiter: BackgroundOrbiter,
}

/// Fully-initialized runtime bundle for one scenario.
pub struct Scenario {
    pub params: SimParams,
    pub system: System,
    pub orbiter: Orbiter,
    pub rails: Vec<Rail>,
    inside: Vec<bool>, // proximity sweep state, one flag per attractor
}

impl Scenario {
    pub fn build(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;

        // Attractors: map `AttractorConfig` -> runtime `Attractor`,
        // filling omitted tuning from the per-kind defaults table
        let mut system = System::new();
        for ac in &cfg.attractors {
            let defaults = kind_defaults(ac.kind);
            system.spawn(Attractor {
                kind: ac.kind,
                position: NVec2::new(ac.position[0], ac.position[1]),
                velocity: NVec2::zeros(),
                gravity: ac.gravity.unwrap_or(defaults.gravity),
                orbit_radius: ac.orbit_radius.unwrap_or(defaults.orbit_radius),
                tangential: ac.tangential.unwrap_or(defaults.tangential),
                radial_damping: ac.radial_damping.unwrap_or(defaults.radial_damping),
                body_radius: ac.body_radius.unwrap_or(defaults.body_radius),
                active: true,
                parent: ac.parent.map(AttractorId),
            });
        }

        // Rails need the finished system to read focus positions
        let rails = cfg
            .attractors
            .iter()
            .enumerate()
            .filter_map(|(index, ac): (usize, &AttractorConfig)| {
                let rail = ac.orbit.as_ref()?;
                let body = AttractorId(index);
                let (position, body_radius) = system
                    .get(body)
                    .map(|a| (a.position, a.body_radius))
                    .unwrap_or((NVec2::zeros(), 0.5));
                let targets = rail.targets.iter().copied().map(AttractorId).collect();
                Some(Rail {
                    body,
                    orbiter: BackgroundOrbiter::new(
                        &system,
                        position,
                        targets,
                        rail.mode,
                        rail.radius,
                        rail.speed,
                        rail.eccentricity,
                        body_radius,
                    ),
                })
            })
            .collect();

        let mut orbiter = Orbiter::new(
            NVec2::new(cfg.orbiter.position[0], cfg.orbiter.position[1]),
            cfg.settings.to_settings(),
        );
        if let Some(velocity) = &cfg.orbiter.velocity {
            orbiter.set_velocity(NVec2::new(velocity[0], velocity[1]));
        }

        let params = SimParams {
            t_end: cfg.parameters.t_end,
            fixed_dt: cfg.parameters.fixed_dt,
        };

        let inside = vec![false; system.attractors.len()];
        Ok(Scenario {
            params,
            system,
            orbiter,
            rails,
            inside,
        })
    }

    /// Advance all deterministic rails by one frame of length `dt` and
    /// move the driven attractors.
    pub fn advance_frame(&mut self, dt: f64) {
        for rail in &mut self.rails {
            let position = rail.orbiter.update(&self.system, dt);
            self.system.drive_to(rail.body, position, dt);
        }
    }

    /// Advance the physics by one fixed step: feed proximity edges into
    /// the orbiter, then run its step.
    pub fn step_physics(&mut self) {
        self.sweep_proximity();
        let dt = self.params.fixed_dt;
        self.orbiter.fixed_step(&self.system, dt);
        self.system.t += dt;
    }

    /// Minimal stand-in for a collision layer: the orbiter is "inside" an
    /// attractor's zone while within its orbit radius; edges become
    /// add/remove gravity-source calls.
    fn sweep_proximity(&mut self) {
        if self.inside.len() != self.system.attractors.len() {
            self.inside.resize(self.system.attractors.len(), false);
        }
        for index in 0..self.system.attractors.len() {
            let id = AttractorId(index);
            let (position, zone) = {
                let a = &self.system.attractors[index];
                (a.position, a.orbit_radius)
            };
            let inside_now = self.system.is_valid(id)
                && (self.orbiter.position() - position).norm() <= zone;
            let was_inside = self.inside[index];
            if inside_now && !was_inside {
                self.orbiter.add_gravity_source(&self.system, id);
            } else if !inside_now && was_inside {
                self.orbiter.remove_gravity_source(&self.system, id);
            }
            self.inside[index] = inside_now;
        }
    }
}
