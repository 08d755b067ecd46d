//! Force / acceleration contributors for the captured orbiter
//!
//! Defines the per-source inverse-square pull and the stabilizer terms that
//! hold a captured orbiter on a circular orbit: radius correction,
//! tangential assist and radial damping. All terms are mass-independent
//! accelerations evaluated in the attractor's moving frame.

use crate::simulation::settings::OrbiterSettings;
use crate::simulation::states::{Attractor, NVec2};

/// Below this separation the geometry is degenerate (orbiter inside the
/// body center) and force terms are skipped for the step.
pub const MIN_DISTANCE: f64 = 0.01;
/// Below this tangential speed the motion direction is unreliable and the
/// default tangent (perpendicular to the center line) is used instead.
pub const MIN_TANGENTIAL_SPEED: f64 = 1e-3;
/// Floor for the separation inside the circular-speed square root.
const MIN_SPEED_DISTANCE: f64 = 0.1;
/// Floor for the orbit radius when normalizing the radial deviation.
const MIN_RADIUS: f64 = 0.1;

/// Tangent direction for a given unit vector toward the orbit center,
/// oriented so the default orbit sense is clockwise.
pub fn tangent_of(center_dir: NVec2) -> NVec2 {
    NVec2::new(center_dir.y, -center_dir.x)
}

/// Wrap an angle difference into (-pi, pi] so that crossing the +/-pi
/// seam never shows up as a near-2pi jump.
pub fn wrap_angle(delta: f64) -> f64 {
    let mut d = delta;
    if d > std::f64::consts::PI {
        d -= 2.0 * std::f64::consts::PI;
    }
    if d < -std::f64::consts::PI {
        d += 2.0 * std::f64::consts::PI;
    }
    d
}

/// Normalize, returning the zero vector for degenerate input.
pub fn normalize_or_zero(v: NVec2) -> NVec2 {
    let n = v.norm();
    if n > MIN_TANGENTIAL_SPEED {
        v / n
    } else {
        NVec2::zeros()
    }
}

/// Circular-orbit speed sqrt(g / d) at separation `d`, capped at `max_speed`.
pub fn circular_speed(gravity: f64, distance: f64, max_speed: f64) -> f64 {
    (gravity / distance.max(MIN_SPEED_DISTANCE)).sqrt().min(max_speed)
}

/// Inverse-square pull toward one source: a = g / d^2 along the center line.
/// Returns `None` when the separation is degenerate.
pub fn gravity_toward(position: NVec2, data: &Attractor) -> Option<NVec2> {
    let to_center = data.position - position;
    let distance = to_center.norm();
    if distance < MIN_DISTANCE {
        return None;
    }
    Some(to_center / distance * (data.gravity / (distance * distance)))
}

/// Kinematic frame of the orbiter relative to the captured attractor.
///
/// Splits the relative velocity into radial and tangential components so
/// each stabilizer can work on the part it cares about. All velocities are
/// taken relative to the attractor, so a source moving on rails carries its
/// orbiter along instead of shearing it off.
#[derive(Debug, Clone)]
pub struct CaptureFrame {
    pub center_dir: NVec2,          // unit vector from orbiter toward the attractor
    pub distance: f64,              // separation
    pub rel_velocity: NVec2,        // orbiter velocity minus attractor velocity
    pub radial_velocity: NVec2,     // component along the center line
    pub tangential_velocity: NVec2, // component across the center line
    pub tangential_speed: f64,
    pub tangent_dir: NVec2, // motion direction, or the default tangent when stalled
}

impl CaptureFrame {
    /// Build the frame, or `None` when the geometry is degenerate.
    pub fn compute(position: NVec2, velocity: NVec2, data: &Attractor) -> Option<Self> {
        let to_center = data.position - position;
        let distance = to_center.norm();
        if distance < MIN_DISTANCE {
            return None;
        }
        let center_dir = to_center / distance;

        // Velocity relative to the (possibly moving) attractor
        let rel_velocity = velocity - data.velocity;

        // Project onto the center line; the remainder is tangential
        let radial_velocity = center_dir * rel_velocity.dot(&center_dir);
        let tangential_velocity = rel_velocity - radial_velocity;
        let tangential_speed = tangential_velocity.norm();

        // When the orbiter is (nearly) stalled there is no motion direction
        // to follow, so the assist pushes along the default tangent
        let tangent_dir = if tangential_speed > MIN_TANGENTIAL_SPEED {
            tangential_velocity / tangential_speed
        } else {
            tangent_of(center_dir)
        };

        Some(CaptureFrame {
            center_dir,
            distance,
            rel_velocity,
            radial_velocity,
            tangential_velocity,
            tangential_speed,
            tangent_dir,
        })
    }
}

/// Trait for stabilization terms acting on a captured orbiter.
/// Each term returns its acceleration contribution for this step.
pub trait Stabilizer {
    fn acceleration(
        &self,
        frame: &CaptureFrame,
        data: &Attractor,
        settings: &OrbiterSettings,
    ) -> NVec2;
}

/// Collection of stabilizer terms; their contributions are summed into a
/// single acceleration vector per step.
pub struct StabilizerSet {
    terms: Vec<Box<dyn Stabilizer + Send + Sync>>,
}

impl StabilizerSet {
    /// Create an empty stabilizer set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a stabilizer term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Stabilizer + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    /// The standard stabilization stack: radial spring, tangential assist,
    /// radial damping.
    pub fn standard() -> Self {
        Self::new()
            .with(RadiusCorrection)
            .with(TangentialAssist)
            .with(RadialDamping)
    }

    /// Sum the contributions of all terms.
    pub fn accumulate(
        &self,
        frame: &CaptureFrame,
        data: &Attractor,
        settings: &OrbiterSettings,
    ) -> NVec2 {
        let mut accel = NVec2::zeros();
        for term in &self.terms {
            accel += term.acceleration(frame, data, settings);
        }
        accel
    }
}

/// Spring toward the attractor's preferred orbit radius.
pub struct RadiusCorrection;

impl Stabilizer for RadiusCorrection {
    fn acceleration(
        &self,
        frame: &CaptureFrame,
        data: &Attractor,
        settings: &OrbiterSettings,
    ) -> NVec2 {
        // Signed radial error: positive when the orbiter sits outside the
        // preferred radius, so the acceleration points inward (along
        // center_dir), and outward when it sits inside.
        let radius_error = frame.distance - data.orbit_radius;
        frame.center_dir * radius_error * settings.radius_correction
    }
}

/// Drives the tangential speed toward the circular-orbit speed for the
/// current separation, and brakes above the speed ceiling.
pub struct TangentialAssist;

impl Stabilizer for TangentialAssist {
    fn acceleration(
        &self,
        frame: &CaptureFrame,
        data: &Attractor,
        settings: &OrbiterSettings,
    ) -> NVec2 {
        // Target is the speed of an ideal circular orbit at the current
        // separation: sqrt(g / d), capped at the ceiling. The floor on d
        // keeps the square root bounded during close passes.
        let target = circular_speed(data.gravity, frame.distance, settings.max_speed);

        // Proportional push along the motion direction (or the default
        // tangent when stalled), scaled by the per-body assist coefficient
        // and the global stabilization gain. With gain 0 the orbiter flies
        // ballistic; with gain 1 it is firmly herded onto the circle.
        let speed_error = target - frame.tangential_speed;
        let mut accel =
            frame.tangent_dir * speed_error * data.tangential * settings.stabilization;

        // Above the ceiling an extra brake bleeds off the excess
        let excess = frame.tangential_speed - settings.max_speed;
        if excess > 0.0 {
            accel -= frame.tangent_dir * excess * settings.speed_damping;
        }
        accel
    }
}

/// Damps radial motion so the orbiter settles on the circle instead of
/// oscillating through it.
pub struct RadialDamping;

impl Stabilizer for RadialDamping {
    fn acceleration(
        &self,
        frame: &CaptureFrame,
        data: &Attractor,
        settings: &OrbiterSettings,
    ) -> NVec2 {
        // Deviation from the preferred radius, normalized by the radius so
        // the boost is scale-free. Far off the circle the damping is
        // strengthened (up to 3x at one radius of error with gain 1) to
        // kill large radial swings quickly.
        let radius_error = (frame.distance - data.orbit_radius).abs();
        let normalized = radius_error / data.orbit_radius.max(MIN_RADIUS);
        let strength = data.radial_damping * (1.0 + normalized * settings.stabilization * 2.0);
        -frame.radial_velocity * strength
    }
}
