//! Runtime tunables for the captured orbiter
//!
//! `OrbiterSettings` holds the knobs the embedder may adjust at runtime:
//! - speed ceiling and stabilization gain,
//! - radial spring and damping gains,
//! - release (escape) behavior,
//! - detach-spin threshold and ambient gravity fallback.
//!
//! Settings changed mid-step are staged by the orbiter and applied at the
//! next fixed-step boundary, so one step never mixes two snapshots.

use serde::Deserialize;

use crate::simulation::states::NVec2;

/// Direction used when a manual release leaves orbit.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeMode {
    #[serde(rename = "cursor")]
    Cursor, // aim from the orbiter toward the released-toward point
    #[serde(rename = "velocity")]
    Velocity, // keep the current heading
}

#[derive(Debug, Clone)]
pub struct OrbiterSettings {
    pub max_speed: f64,          // tangential speed ceiling
    pub stabilization: f64,      // blend gain in [0, 1]; 0 is free-flight, 1 snaps to ideal
    pub radius_correction: f64,  // radial spring gain toward the preferred orbit radius
    pub speed_damping: f64,      // brake gain applied above max_speed
    pub escape_mode: EscapeMode, // how a manual release picks its direction
    pub escape_force: f64,       // one-shot speed boost applied on release
    pub detach_spins: u32,       // full revolutions required to complete a detach
    pub ambient_gravity: NVec2,  // uniform field applied while no source influences us
}

impl Default for OrbiterSettings {
    fn default() -> Self {
        OrbiterSettings {
            max_speed: 10.0,
            stabilization: 0.5,
            radius_correction: 3.0,
            speed_damping: 2.0,
            escape_mode: EscapeMode::Cursor,
            escape_force: 5.0,
            detach_spins: 1,
            ambient_gravity: NVec2::new(0.0, -9.81),
        }
    }
}

/// Numerical parameters of a scenario run.
#[derive(Debug, Clone)]
pub struct SimParams {
    pub t_end: f64,    // time end
    pub fixed_dt: f64, // fixed physics step size
}
