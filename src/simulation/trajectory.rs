//! Straight-line trajectory preview
//!
//! Predicts where a released orbiter would first cross into the orbit zone
//! of an influencing (but not captured) source. The aim ray is clipped at
//! the nearest zone-circle entry, which is exactly the point where a new
//! capture would take over.

use crate::simulation::registry::GravityRegistry;
use crate::simulation::states::{AttractorId, NVec2, System};

/// Below this aim-ray length the direction is meaningless and the preview
/// collapses to the origin point.
const MIN_RAY_LENGTH: f64 = 1e-3;

/// Result of a preview: a polyline from the orbiter toward the aim point,
/// possibly clipped at an orbit-zone entry.
#[derive(Debug, Clone)]
pub struct TrajectoryPreview {
    pub points: Vec<NVec2>,                // origin plus end; a single point when degenerate
    pub clipped_by: Option<AttractorId>,   // the source whose zone clipped the ray
}

impl TrajectoryPreview {
    pub fn end(&self) -> NVec2 {
        // points is never empty by construction
        self.points[self.points.len() - 1]
    }
}

/// Clip the ray from `origin` to `aim` against the orbit circles of all
/// influencing sources except the captured one. The nearest entry wins.
pub fn predict(
    origin: NVec2,
    aim: NVec2,
    system: &System,
    registry: &GravityRegistry,
    captured: Option<AttractorId>,
) -> TrajectoryPreview {
    let ray = aim - origin;
    let length = ray.norm();
    if length < MIN_RAY_LENGTH {
        return TrajectoryPreview {
            points: vec![origin],
            clipped_by: None,
        };
    }
    let dir = ray / length;

    let mut best_end = aim;
    let mut best_dist = length;
    let mut clipped_by = None;

    for id in registry.iter() {
        if captured == Some(id) || !system.is_valid(id) {
            continue;
        }
        let Some(data) = system.get(id) else {
            continue;
        };

        // Closest approach of the ray to the zone center
        let to_center = data.position - origin;
        let projection = to_center.dot(&dir);
        if projection < 0.0 || projection > length {
            continue;
        }
        let closest = origin + dir * projection;
        let off_axis = (closest - data.position).norm();
        if off_axis > data.orbit_radius {
            continue;
        }

        // The ray pierces the zone circle; back up from the closest
        // approach to the first intersection
        let half_chord = (data.orbit_radius * data.orbit_radius - off_axis * off_axis).sqrt();
        let entry = projection - half_chord;
        if entry > 0.0 && entry < length && entry < best_dist {
            best_dist = entry;
            best_end = origin + dir * entry;
            clipped_by = Some(id);
        }
    }

    TrajectoryPreview {
        points: vec![origin, best_end],
        clipped_by,
    }
}
