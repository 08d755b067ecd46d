//! Core state types for the orbital simulation.
//!
//! Defines the attractor scene:
//! - `Attractor` / `AttractorKind`  a gravity well with stabilization coefficients
//! - `AttractorId`  stable handle into a `System`
//! - `System`  the collection of attractors plus the simulation clock
//!
//! Attractors are never removed from the backing storage, only deactivated,
//! so an `AttractorId` stays usable for the lifetime of the scene.

use nalgebra::Vector2;
use serde::Deserialize;

use crate::properties::{PropertyDef, Tunable};

pub type NVec2 = Vector2<f64>;

/// Classification of an attractor body. Zone registration only accepts
/// classified kinds; `Unclassified` sources are rejected with a warning.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttractorKind {
    #[serde(rename = "unclassified")]
    Unclassified,
    #[serde(rename = "sun")]
    Sun,
    #[serde(rename = "planet")]
    Planet,
    #[serde(rename = "asteroid")]
    Asteroid,
}

impl AttractorKind {
    pub fn label(&self) -> &'static str {
        match self {
            AttractorKind::Unclassified => "unclassified",
            AttractorKind::Sun => "sun",
            AttractorKind::Planet => "planet",
            AttractorKind::Asteroid => "asteroid",
        }
    }
}

/// Index-based handle to an attractor inside a `System`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttractorId(pub usize);

#[derive(Debug, Clone)]
pub struct Attractor {
    pub kind: AttractorKind,
    pub position: NVec2,
    pub velocity: NVec2,     // written by the rails driver, read by the force model
    pub gravity: f64,        // field strength; acceleration magnitude is gravity / d^2
    pub orbit_radius: f64,   // preferred stable orbit distance
    pub tangential: f64,     // tangential-assist coefficient
    pub radial_damping: f64, // radial damping coefficient
    pub body_radius: f64,    // visual body radius, used for clearance margins
    pub active: bool,
    pub parent: Option<AttractorId>, // deactivating the parent invalidates this body
}

impl Tunable for Attractor {
    fn properties(&self) -> Vec<PropertyDef> {
        vec![
            PropertyDef::new("Body", "Body Radius", 0.5, 7.5, self.body_radius),
            PropertyDef::new("Orbit", "Orbit Radius", 1.0, 10.0, self.orbit_radius),
            PropertyDef::new("Orbit", "Gravity", 15.0, 30.0, self.gravity),
            PropertyDef::new("Orbit", "Tangential Force", 2.0, 5.0, self.tangential),
            PropertyDef::new("Orbit", "Radial Damping", 0.5, 1.5, self.radial_damping),
        ]
    }

    fn set_property(&mut self, name: &str, value: f64) -> bool {
        match name {
            "Body Radius" => self.body_radius = value.clamp(0.5, 7.5),
            "Orbit Radius" => self.orbit_radius = value.clamp(1.0, 10.0),
            "Gravity" => self.gravity = value.clamp(15.0, 30.0),
            "Tangential Force" => self.tangential = value.clamp(2.0, 5.0),
            "Radial Damping" => self.radial_damping = value.clamp(0.5, 1.5),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct System {
    pub attractors: Vec<Attractor>, // backing storage, indexed by AttractorId
    pub t: f64,                     // time
}

impl System {
    pub fn new() -> Self {
        System {
            attractors: Vec::new(),
            t: 0.0,
        }
    }

    pub fn spawn(&mut self, attractor: Attractor) -> AttractorId {
        self.attractors.push(attractor);
        AttractorId(self.attractors.len() - 1)
    }

    pub fn get(&self, id: AttractorId) -> Option<&Attractor> {
        self.attractors.get(id.0)
    }

    pub fn get_mut(&mut self, id: AttractorId) -> Option<&mut Attractor> {
        self.attractors.get_mut(id.0)
    }

    /// An attractor is valid while it is active and its parent (if any)
    /// is active too.
    pub fn is_valid(&self, id: AttractorId) -> bool {
        match self.attractors.get(id.0) {
            Some(a) => {
                a.active
                    && a.parent
                        .map_or(true, |p| self.attractors.get(p.0).is_some_and(|q| q.active))
            }
            None => false,
        }
    }

    pub fn deactivate(&mut self, id: AttractorId) {
        if let Some(a) = self.attractors.get_mut(id.0) {
            a.active = false;
        }
    }

    /// Move a rails-driven attractor to `position`, deriving its velocity by
    /// finite difference so the force model sees a consistent moving frame.
    pub fn drive_to(&mut self, id: AttractorId, position: NVec2, dt: f64) {
        if let Some(a) = self.attractors.get_mut(id.0) {
            if dt > 0.0 {
                a.velocity = (position - a.position) / dt;
            }
            a.position = position;
        }
    }
}
