//! EmpireMUD - combat and creature-state engine

pub mod combat;
pub mod core;
pub mod entity;
pub mod evolve;
pub mod simulation;
pub mod world;
