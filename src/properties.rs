//! Generic tunable-property surface
//!
//! Simulation objects expose their runtime knobs as a flat list of named,
//! range-bounded properties. An embedder can bind these to sliders without
//! knowing the concrete type; writes go back through `set_property`.

/// One adjustable property: display grouping, bounds and current value.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    pub group: &'static str,
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub whole: bool, // snap to whole numbers (e.g. spin counts)
}

impl PropertyDef {
    pub fn new(group: &'static str, name: &'static str, min: f64, max: f64, value: f64) -> Self {
        PropertyDef {
            group,
            name,
            min,
            max,
            value,
            whole: false,
        }
    }

    pub fn whole(group: &'static str, name: &'static str, min: f64, max: f64, value: f64) -> Self {
        PropertyDef {
            group,
            name,
            min,
            max,
            value,
            whole: true,
        }
    }
}

/// Implemented by objects that can be tuned at runtime.
pub trait Tunable {
    /// Snapshot of the current properties.
    fn properties(&self) -> Vec<PropertyDef>;

    /// Apply a new value to the named property, clamped into its range.
    /// Returns false when the name is unknown; the object is unchanged then.
    fn set_property(&mut self, name: &str, value: f64) -> bool;
}
