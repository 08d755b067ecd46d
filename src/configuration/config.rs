//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`ParametersConfig`] – run length and fixed step size
//! - [`SettingsConfig`]   – orbiter tunables (all optional, defaults apply)
//! - [`OrbiterConfig`]    – initial state of the physics orbiter
//! - [`AttractorConfig`]  – one entry per scene body, optionally on rails
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario
//!
//! # YAML format
//! An example scenario YAML matching these types:
//!
//! ```yaml
//! parameters:
//!   t_end: 30.0             # total simulation time
//!   fixed_dt: 0.02          # fixed physics step size
//!
//! settings:
//!   max_speed: 10.0
//!   stabilization: 0.5
//!   escape_mode: "cursor"   # or "velocity"
//!   detach_spins: 1
//!
//! orbiter:
//!   position: [ 14.0, 4.0 ]
//!
//! attractors:
//!   - kind: "sun"
//!     position: [ 0.0, 0.0 ]
//!   - kind: "planet"
//!     position: [ 14.0, 0.0 ]
//!     orbit:                # rails: ellipse around attractor 0
//!       targets: [ 0 ]
//!       speed: 0.35
//!       eccentricity: 0.2
//! ```
//!
//! Per-kind tuning (gravity, orbit radius, assist and damping
//! coefficients, body radius) falls back to the defaults table when a
//! field is omitted. The scenario builder maps this configuration into
//! the runtime structs.

use std::fs::File;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::background::kepler::ECCENTRICITY_MIN;
use crate::background::orbiter::OrbitMode;
use crate::simulation::settings::{EscapeMode, OrbiterSettings};
use crate::simulation::states::{AttractorKind, NVec2};

/// Errors raised while loading or validating a scenario file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{field}: expected exactly 2 components, got {got}")]
    BadVector { field: String, got: usize },
    #[error("{field}: value {value} is not finite")]
    NonFinite { field: String, value: f64 },
    #[error("{field}: value {value} must be positive")]
    NotPositive { field: String, value: f64 },
    #[error("{field}: value {value} outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("attractor {index}: reference {target} out of range ({count} attractors)")]
    BadReference {
        index: usize,
        target: usize,
        count: usize,
    },
    #[error("attractor {index}: cannot orbit itself")]
    SelfOrbit { index: usize },
}

/// Run length and step size for a scenario.
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub t_end: f64,    // time end
    pub fixed_dt: f64, // fixed physics step size
}

/// Orbiter tunables; every field falls back to the runtime default.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SettingsConfig {
    pub max_speed: f64,          // tangential speed ceiling
    pub stabilization: f64,      // blend gain in [0, 1]
    pub radius_correction: f64,  // radial spring gain
    pub speed_damping: f64,      // overspeed brake gain
    pub escape_mode: EscapeMode, // "cursor" or "velocity"
    pub escape_force: f64,       // one-shot boost on release
    pub detach_spins: u32,       // full turns to complete a detach
    pub ambient_gravity: Vec<f64>, // uniform field while uninfluenced
}

impl Default for SettingsConfig {
    fn default() -> Self {
        let defaults = OrbiterSettings::default();
        SettingsConfig {
            max_speed: defaults.max_speed,
            stabilization: defaults.stabilization,
            radius_correction: defaults.radius_correction,
            speed_damping: defaults.speed_damping,
            escape_mode: defaults.escape_mode,
            escape_force: defaults.escape_force,
            detach_spins: defaults.detach_spins,
            ambient_gravity: vec![defaults.ambient_gravity.x, defaults.ambient_gravity.y],
        }
    }
}

impl SettingsConfig {
    /// Map into the runtime settings, clamping the gains into their
    /// working ranges.
    pub fn to_settings(&self) -> OrbiterSettings {
        OrbiterSettings {
            max_speed: self.max_speed,
            stabilization: self.stabilization.clamp(0.0, 1.0),
            radius_correction: self.radius_correction,
            speed_damping: self.speed_damping,
            escape_mode: self.escape_mode,
            escape_force: self.escape_force,
            detach_spins: self.detach_spins.max(1),
            ambient_gravity: NVec2::new(
                self.ambient_gravity.first().copied().unwrap_or(0.0),
                self.ambient_gravity.get(1).copied().unwrap_or(-9.81),
            ),
        }
    }
}

/// Initial state of the physics orbiter.
#[derive(Deserialize, Debug)]
pub struct OrbiterConfig {
    pub position: Vec<f64>, // initial position
    #[serde(default)]
    pub velocity: Option<Vec<f64>>, // initial velocity, zero when omitted
}

/// Deterministic rail attached to one attractor.
#[derive(Deserialize, Debug)]
pub struct RailConfig {
    pub targets: Vec<usize>, // indices into `attractors`; first is the Kepler focus
    #[serde(default)]
    pub mode: Option<OrbitMode>, // "kepler" or "envelope"; derived from target count when omitted
    #[serde(default)]
    pub radius: Option<f64>, // semi-major axis / extra clearance; derived from distance when omitted
    pub speed: f64, // mean motion (rad/s) or linear path speed
    #[serde(default = "default_eccentricity")]
    pub eccentricity: f64, // ellipse shape, single-focus mode only
}

fn default_eccentricity() -> f64 {
    0.5
}

/// Configuration for a single attractor body.
#[derive(Deserialize, Debug)]
pub struct AttractorConfig {
    pub kind: AttractorKind, // "sun", "planet", "asteroid" or "unclassified"
    pub position: Vec<f64>,  // initial position
    #[serde(default)]
    pub gravity: Option<f64>, // field strength, per-kind default when omitted
    #[serde(default)]
    pub orbit_radius: Option<f64>, // preferred orbit distance
    #[serde(default)]
    pub tangential: Option<f64>, // tangential-assist coefficient
    #[serde(default)]
    pub radial_damping: Option<f64>, // radial damping coefficient
    #[serde(default)]
    pub body_radius: Option<f64>, // visual radius for clearance margins
    #[serde(default)]
    pub parent: Option<usize>, // index of the parent body, if any
    #[serde(default)]
    pub orbit: Option<RailConfig>, // rails driving this body, if any
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug)]
pub struct ScenarioConfig {
    pub parameters: ParametersConfig, // run length and step size
    #[serde(default)]
    pub settings: SettingsConfig, // orbiter tunables
    pub orbiter: OrbiterConfig, // physics orbiter start state
    pub attractors: Vec<AttractorConfig>, // scene bodies
}

impl ScenarioConfig {
    /// Parse and validate a scenario from a YAML string.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: ScenarioConfig = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural validation beyond what serde checks: vector arities,
    /// finite values, index ranges and eccentricity bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("parameters.t_end", self.parameters.t_end)?;
        positive("parameters.fixed_dt", self.parameters.fixed_dt)?;

        finite("settings.max_speed", self.settings.max_speed)?;
        finite("settings.stabilization", self.settings.stabilization)?;
        finite("settings.radius_correction", self.settings.radius_correction)?;
        finite("settings.speed_damping", self.settings.speed_damping)?;
        finite("settings.escape_force", self.settings.escape_force)?;
        vec2("settings.ambient_gravity", &self.settings.ambient_gravity)?;

        vec2("orbiter.position", &self.orbiter.position)?;
        if let Some(velocity) = &self.orbiter.velocity {
            vec2("orbiter.velocity", velocity)?;
        }

        let count = self.attractors.len();
        for (index, attractor) in self.attractors.iter().enumerate() {
            let field = |name: &str| format!("attractors[{index}].{name}");
            vec2(&field("position"), &attractor.position)?;
            for (name, value) in [
                ("gravity", attractor.gravity),
                ("orbit_radius", attractor.orbit_radius),
                ("tangential", attractor.tangential),
                ("radial_damping", attractor.radial_damping),
                ("body_radius", attractor.body_radius),
            ] {
                if let Some(value) = value {
                    finite(&field(name), value)?;
                }
            }
            if let Some(parent) = attractor.parent {
                if parent >= count {
                    return Err(ConfigError::BadReference {
                        index,
                        target: parent,
                        count,
                    });
                }
                if parent == index {
                    return Err(ConfigError::SelfOrbit { index });
                }
            }
            if let Some(rail) = &attractor.orbit {
                finite(&field("orbit.speed"), rail.speed)?;
                if let Some(radius) = rail.radius {
                    positive(&field("orbit.radius"), radius)?;
                }
                if !(ECCENTRICITY_MIN..=MAX_CONFIG_ECCENTRICITY).contains(&rail.eccentricity) {
                    return Err(ConfigError::OutOfRange {
                        field: field("orbit.eccentricity"),
                        value: rail.eccentricity,
                        min: ECCENTRICITY_MIN,
                        max: MAX_CONFIG_ECCENTRICITY,
                    });
                }
                for &target in &rail.targets {
                    if target >= count {
                        return Err(ConfigError::BadReference {
                            index,
                            target,
                            count,
                        });
                    }
                    if target == index {
                        return Err(ConfigError::SelfOrbit { index });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Tighter eccentricity cap for scenario files; the solver itself clamps
/// at 0.99 when values are pushed higher at runtime.
pub const MAX_CONFIG_ECCENTRICITY: f64 = 0.9;

/// Load and validate a scenario YAML file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let file = File::open(path)?;
    let config: ScenarioConfig = serde_yaml::from_reader(file)?;
    config.validate()?;
    Ok(config)
}

/// Per-kind fallback tuning used when an attractor entry omits fields.
#[derive(Debug, Clone, Copy)]
pub struct KindDefaults {
    pub gravity: f64,
    pub orbit_radius: f64,
    pub tangential: f64,
    pub radial_damping: f64,
    pub body_radius: f64,
}

/// Defaults table keyed by attractor kind.
pub fn kind_defaults(kind: AttractorKind) -> KindDefaults {
    match kind {
        AttractorKind::Planet => KindDefaults {
            gravity: 25.0,
            orbit_radius: 5.0,
            tangential: 3.0,
            radial_damping: 0.75,
            body_radius: 0.5,
        },
        AttractorKind::Asteroid => KindDefaults {
            gravity: 18.0,
            orbit_radius: 2.0,
            tangential: 4.0,
            radial_damping: 0.9,
            body_radius: 0.25,
        },
        AttractorKind::Sun => KindDefaults {
            gravity: 28.0,
            orbit_radius: 6.0,
            tangential: 2.5,
            radial_damping: 0.7,
            body_radius: 2.0,
        },
        AttractorKind::Unclassified => KindDefaults {
            gravity: 22.0,
            orbit_radius: 3.0,
            tangential: 3.5,
            radial_damping: 0.85,
            body_radius: 1.5,
        },
    }
}

fn vec2(field: &str, values: &[f64]) -> Result<(), ConfigError> {
    if values.len() != 2 {
        return Err(ConfigError::BadVector {
            field: field.to_string(),
            got: values.len(),
        });
    }
    for &value in values {
        finite(field, value)?;
    }
    Ok(())
}

fn finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite {
            field: field.to_string(),
            value,
        })
    }
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive {
            field: field.to_string(),
            value,
        })
    }
}
