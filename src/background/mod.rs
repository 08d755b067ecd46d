pub mod kepler;
pub mod envelope;
pub mod orbiter;
