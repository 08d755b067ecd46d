//! Kepler-equation solver for background ellipses
//!
//! Background bodies on rails follow closed Keplerian ellipses around a
//! focus body. The solver advances the mean anomaly at a constant rate and
//! recovers the focus-local position through the eccentric and true
//! anomalies. The inverse direction (position to mean anomaly) keeps a body
//! visually in place when its targets or tuning change.

use crate::simulation::states::NVec2;

const KEPLER_ITERATIONS: usize = 5;
const KEPLER_TOLERANCE: f64 = 1e-6;

/// Eccentricity is clamped into this range before solving; at 1 the
/// ellipse degenerates and the safe-axis division blows up.
pub const ECCENTRICITY_MIN: f64 = 0.01;
pub const ECCENTRICITY_MAX: f64 = 0.99;

/// Solve Kepler's equation M = E - e*sin(E) for the eccentric anomaly E
/// by Newton-Raphson. A handful of iterations is plenty for the
/// eccentricities we allow.
pub fn mean_to_eccentric(mean_anomaly: f64, e: f64) -> f64 {
    let mut ea = mean_anomaly;
    for _ in 0..KEPLER_ITERATIONS {
        let de = (ea - e * ea.sin() - mean_anomaly) / (1.0 - e * ea.cos());
        ea -= de;
        if de.abs() < KEPLER_TOLERANCE {
            break;
        }
    }
    ea
}

/// True anomaly nu from eccentric anomaly E (radians).
pub fn eccentric_to_true(ea: f64, e: f64) -> f64 {
    let sqrt_1_plus_e = (1.0 + e).sqrt();
    let sqrt_1_min_e = (1.0 - e).sqrt();
    2.0 * (sqrt_1_plus_e * (ea * 0.5).sin()).atan2(sqrt_1_min_e * (ea * 0.5).cos())
}

/// Eccentric anomaly E from true anomaly nu (radians).
pub fn true_to_eccentric(nu: f64, e: f64) -> f64 {
    let denom = 1.0 + e * nu.cos();
    let sin_e = (1.0 - e * e).sqrt() * nu.sin() / denom;
    let cos_e = (e + nu.cos()) / denom;
    sin_e.atan2(cos_e)
}

/// Mean anomaly M from eccentric anomaly E.
pub fn eccentric_to_mean(ea: f64, e: f64) -> f64 {
    ea - e * ea.sin()
}

/// Distance from the focus at true anomaly nu; `a` is the semi-major axis.
pub fn radius_at(a: f64, e: f64, nu: f64) -> f64 {
    a * (1.0 - e * e) / (1.0 + e * nu.cos())
}

/// Anomaly state of one elliptical rail. The semi-major axis is owned by
/// the background orbiter (it doubles as the clearance knob in envelope
/// mode) and passed in per call.
#[derive(Debug, Clone)]
pub struct KeplerOrbit {
    pub eccentricity: f64,
    pub mean_anomaly: f64,
}

impl KeplerOrbit {
    pub fn new(eccentricity: f64) -> Self {
        KeplerOrbit {
            eccentricity,
            mean_anomaly: 0.0,
        }
    }

    fn clamped_eccentricity(&self) -> f64 {
        self.eccentricity.clamp(ECCENTRICITY_MIN, ECCENTRICITY_MAX)
    }

    /// Advance the mean anomaly at `rate` radians per time unit. The value
    /// grows without bound; the trigonometry wraps it implicitly.
    pub fn advance(&mut self, rate: f64, dt: f64) {
        self.mean_anomaly += rate * dt;
    }

    /// Semi-major axis actually used: the requested one, floored so the
    /// periapsis a*(1-e) never dips under the minimum safe margin.
    pub fn effective_axis(&self, a: f64, min_safe_margin: f64) -> f64 {
        let e = self.clamped_eccentricity();
        a.max(min_safe_margin / (1.0 - e))
    }

    /// Position on the ellipse in the focus-local frame, periapsis on +x.
    pub fn local_position(&self, a: f64, min_safe_margin: f64) -> NVec2 {
        let e = self.clamped_eccentricity();
        let axis = self.effective_axis(a, min_safe_margin);
        let ea = mean_to_eccentric(self.mean_anomaly, e);
        let nu = eccentric_to_true(ea, e);
        let r = radius_at(axis, e, nu);
        NVec2::new(r * nu.cos(), r * nu.sin())
    }

    /// Re-derive the mean anomaly from a focus-local offset so the body
    /// stays visually in place. Returns false (state unchanged) when the
    /// offset is degenerate or lies where the conic equation has no
    /// usable solution.
    pub fn sync_from_offset(&mut self, offset: NVec2) -> bool {
        let r = offset.norm();
        if r < 1e-4 {
            return false;
        }
        let nu = offset.y.atan2(offset.x);
        let e = self.clamped_eccentricity();
        let denom = 1.0 + e * nu.cos();
        if denom.abs() < 1e-3 {
            return false;
        }
        let a_from_r = r * denom / (1.0 - e * e);
        if a_from_r < 1e-3 {
            return false;
        }
        let ea = true_to_eccentric(nu, e);
        self.mean_anomaly = eccentric_to_mean(ea, e);
        true
    }
}
