pub mod simulation;
pub mod background;
pub mod configuration;
pub mod properties;
pub mod benchmark;

pub use simulation::states::{Attractor, AttractorId, AttractorKind, NVec2, System};
pub use simulation::settings::{EscapeMode, OrbiterSettings, SimParams};
pub use simulation::registry::{GravityRegistry, RemoveOutcome};
pub use simulation::capture::{CapturePhase, CaptureState, OrbitEvent, GRACE_PERIOD};
pub use simulation::forces::{
    circular_speed, gravity_toward, tangent_of, wrap_angle, CaptureFrame, Stabilizer,
    StabilizerSet,
};
pub use simulation::trajectory::TrajectoryPreview;
pub use simulation::orbiter::Orbiter;
pub use simulation::scenario::{Rail, Scenario};

pub use background::kepler::KeplerOrbit;
pub use background::envelope::EnvelopePath;
pub use background::orbiter::{BackgroundOrbiter, OrbitMode};

pub use configuration::config::{
    kind_defaults, load_scenario, AttractorConfig, ConfigError, KindDefaults, OrbiterConfig,
    ParametersConfig, RailConfig, ScenarioConfig, SettingsConfig,
};

pub use properties::{PropertyDef, Tunable};

pub use benchmark::benchmark::{bench_envelope, bench_orbiter_step};
