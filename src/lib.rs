pub mod agents;
pub mod config;
pub mod error;
pub mod global_variables;
pub mod learning;
pub mod monitoring;
pub mod simulation_engine;
