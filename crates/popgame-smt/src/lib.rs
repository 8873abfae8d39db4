#![doc = include_str!("../README.md")]

//! SMT encoding primitives and solver integration for population-game
//! equilibrium queries.
//!
//! Terms are built over `Real` and `Bool` sorts (QF_NRA: the payoff
//! expressions are quadratic), then handed to an in-process Z3 backend or
//! to a cvc5 subprocess speaking SMT-LIB2.

pub mod backends;
pub mod numeral;
pub mod script;
pub mod solver;
pub mod sorts;
pub mod terms;
