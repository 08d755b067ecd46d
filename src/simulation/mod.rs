pub mod states;
pub mod settings;
pub mod registry;
pub mod capture;
pub mod forces;
pub mod trajectory;
pub mod orbiter;
pub mod scenario;
