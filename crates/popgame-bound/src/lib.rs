#![doc = include_str!("../README.md")]

pub mod config;
pub mod constraints;
pub mod objective;
pub mod optimizer;
pub mod sweep;

pub use config::{BoundConfig, ConfigError};
pub use constraints::{initial_guess, ordering_constraint, project_feasible, Bounds, LinearConstraint};
pub use objective::{denominator, numerator, objective, ObjectiveError};
pub use optimizer::{minimize, minimize_from, BoundError, BoundResult, TerminationStatus};
pub use sweep::sweep;
