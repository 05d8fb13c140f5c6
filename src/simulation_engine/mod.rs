// simulation_engine/mod.rs
pub mod grid;
pub mod intersections;
pub mod movement;
pub mod route_generation;
pub mod simulation;
pub mod simulator;
pub mod vehicles;
