//! Envelope path around a multi-body cluster
//!
//! When a background body orbits two or more reference bodies at once, no
//! single ellipse fits. Instead a closed envelope is generated around the
//! whole cluster: sample the support of the member positions in every
//! direction, pad by a safety margin, smooth the radii, and connect the
//! samples into a polyline traversed at constant linear speed.
//!
//! The path is rebuilt every frame from the members' current positions, so
//! it deforms continuously while the cluster moves.

use std::f64::consts::TAU;

use crate::simulation::states::NVec2;

/// Fraction of the cluster radius added as breathing room.
const MARGIN_FACTOR: f64 = 0.5;
/// Cap on the factor-derived margin for very spread-out clusters.
const MARGIN_MAX: f64 = 20.0;
/// Bounds on the angular sample count.
const SAMPLE_MIN: usize = 48;
const SAMPLE_MAX: usize = 128;
/// Desired polyline segment length used to pick the sample count.
const TARGET_SEGMENT_LENGTH: f64 = 0.6;
/// Smoothing pass budget: a baseline plus extra passes for jagged input.
const SMOOTH_PASSES_BASELINE: usize = 80;
const SMOOTH_PASSES_MAX: usize = 120;
/// Normalized second-difference level that earns one extra pass.
const JAGGEDNESS_THRESHOLD: f64 = 0.08;
/// Floor for the total length so parameter math never divides by zero.
const MIN_TOTAL_LENGTH: f64 = 1e-4;
/// Floor for segment lengths during interpolation and projection.
const MIN_SEGMENT_LENGTH: f64 = 1e-4;

/// Mean of the member positions.
pub fn barycenter_of(members: &[NVec2]) -> NVec2 {
    if members.is_empty() {
        return NVec2::zeros();
    }
    let mut sum = NVec2::zeros();
    for p in members {
        sum += *p;
    }
    sum / members.len() as f64
}

/// Largest member distance from `center`.
pub fn cluster_radius(members: &[NVec2], center: NVec2) -> f64 {
    members
        .iter()
        .map(|p| (p - center).norm())
        .fold(0.0f64, f64::max)
}

/// A closed polyline around the cluster, stored relative to the
/// barycenter, with cumulative arc lengths for constant-speed traversal.
#[derive(Debug, Clone)]
pub struct EnvelopePath {
    barycenter: NVec2,
    points: Vec<NVec2>,   // barycenter-relative vertices
    cumulative: Vec<f64>, // n + 1 entries; last is the unfloored total
    total_length: f64,
}

impl EnvelopePath {
    /// Build the envelope around `members` (world positions).
    /// `extra_clearance` is the orbiter's radius knob; `min_safe_margin`
    /// is the collision clearance the smoothed path must never undercut.
    pub fn build(members: &[NVec2], extra_clearance: f64, min_safe_margin: f64) -> Self {
        if members.is_empty() {
            return EnvelopePath {
                barycenter: NVec2::zeros(),
                points: vec![NVec2::zeros()],
                cumulative: vec![0.0, 0.0],
                total_length: MIN_TOTAL_LENGTH,
            };
        }

        let barycenter = barycenter_of(members);
        let system_radius = cluster_radius(members, barycenter);

        let margin_from_factor = (system_radius * MARGIN_FACTOR).clamp(0.0, MARGIN_MAX);
        let effective_margin = min_safe_margin + margin_from_factor + extra_clearance;
        let estimated_length = TAU * (system_radius + effective_margin);
        let n = ((estimated_length / TARGET_SEGMENT_LENGTH).ceil() as usize)
            .clamp(SAMPLE_MIN, SAMPLE_MAX);

        // Support of the member set in each sample direction: the largest
        // projection of any member offset onto that direction
        let mut raw_max = vec![0.0f64; n];
        let mut radii = vec![0.0f64; n];
        for a in 0..n {
            let theta = TAU * a as f64 / n as f64;
            let (sin, cos) = theta.sin_cos();
            let mut max_r = 0.0f64;
            for p in members {
                let d = p - barycenter;
                let r = d.x * cos + d.y * sin;
                if r > max_r {
                    max_r = r;
                }
            }
            raw_max[a] = max_r;
            radii[a] = max_r + effective_margin;
        }

        // Jaggedness of the raw profile (mean absolute second difference,
        // normalized by the mean radius) buys extra smoothing passes
        let mean_r = radii.iter().sum::<f64>() / n as f64;
        let mut jaggedness = 0.0;
        for a in 0..n {
            let prev = (a + n - 1) % n;
            let prev2 = (a + n - 2) % n;
            jaggedness += (radii[a] - 2.0 * radii[prev] + radii[prev2]).abs();
        }
        jaggedness = if mean_r > 1e-3 {
            (jaggedness / n as f64) / mean_r
        } else {
            0.0
        };
        let passes = SMOOTH_PASSES_MAX
            .min(SMOOTH_PASSES_BASELINE + (jaggedness / JAGGEDNESS_THRESHOLD).round() as usize);

        // Circular 5-tap kernel (1 2 2 2 1)/8 applied repeatedly
        for _ in 0..passes {
            let mut next = vec![0.0f64; n];
            for a in 0..n {
                let p2 = (a + n - 2) % n;
                let p1 = (a + n - 1) % n;
                let n1 = (a + 1) % n;
                let n2 = (a + 2) % n;
                next[a] =
                    (radii[p2] + 2.0 * radii[p1] + 2.0 * radii[a] + 2.0 * radii[n1] + radii[n2])
                        / 8.0;
            }
            radii = next;
        }

        // Smoothing may have pulled the curve into the cluster; push it
        // back out to the raw support plus the hard clearance
        for a in 0..n {
            let min_radius = raw_max[a] + min_safe_margin;
            if radii[a] < min_radius {
                radii[a] = min_radius;
            }
        }

        let points: Vec<NVec2> = (0..n)
            .map(|a| {
                let theta = TAU * a as f64 / n as f64;
                NVec2::new(radii[a] * theta.cos(), radii[a] * theta.sin())
            })
            .collect();

        let mut cumulative = vec![0.0f64; n + 1];
        for a in 1..=n {
            cumulative[a] = cumulative[a - 1] + (points[a % n] - points[a - 1]).norm();
        }
        let total_length = cumulative[n].max(MIN_TOTAL_LENGTH);

        EnvelopePath {
            barycenter,
            points,
            cumulative,
            total_length,
        }
    }

    pub fn barycenter(&self) -> NVec2 {
        self.barycenter
    }

    pub fn points(&self) -> &[NVec2] {
        &self.points
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// World position at normalized arc-length parameter `s`. The
    /// parameter wraps, so any real value samples somewhere on the loop.
    pub fn position_at(&self, s: f64) -> NVec2 {
        let t = s.rem_euclid(1.0);
        let len = t * self.total_length;
        let n = self.points.len();

        let mut seg = 0;
        for i in 1..=n {
            seg = i - 1;
            if self.cumulative[i] >= len {
                break;
            }
        }
        let seg_start = self.cumulative[seg];
        let seg_len = self.cumulative[seg + 1] - seg_start;
        let u = if seg_len > MIN_SEGMENT_LENGTH {
            (len - seg_start) / seg_len
        } else {
            0.0
        };
        let a = self.points[seg];
        let b = self.points[(seg + 1) % n];
        self.barycenter + a.lerp(&b, u)
    }

    /// Parameter of the path point nearest to a world position, found by
    /// projecting onto every segment. Used to keep a body visually in
    /// place when the path is regenerated around it.
    pub fn parameter_near(&self, world: NVec2) -> f64 {
        let local = world - self.barycenter;
        let n = self.points.len();
        let mut best_seg = 0;
        let mut best_t = 0.0;
        let mut best_d2 = f64::MAX;
        for seg in 0..n {
            let a = self.points[seg];
            let b = self.points[(seg + 1) % n];
            let ab = b - a;
            let ab_len2 = ab.norm_squared();
            let t = if ab_len2 > MIN_SEGMENT_LENGTH * MIN_SEGMENT_LENGTH {
                ((local - a).dot(&ab) / ab_len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let pt = a + ab * t;
            let d2 = (local - pt).norm_squared();
            if d2 < best_d2 {
                best_d2 = d2;
                best_seg = seg;
                best_t = t;
            }
        }
        let len = self.cumulative[best_seg]
            + best_t * (self.cumulative[best_seg + 1] - self.cumulative[best_seg]);
        len / self.total_length
    }
}
