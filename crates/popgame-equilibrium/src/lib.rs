#![doc = include_str!("../README.md")]

pub mod encoder;
pub mod model;
pub mod verify;
pub mod witness;

pub use encoder::{encode_query, EquilibriumQuery};
pub use model::{Coefficient, ModelError, PayoffModel, Population, SocialState};
pub use verify::{
    check_uniqueness, run_verification, ExclusionMode, SolverChoice, UniquenessVerdict, Verdict,
    VerifierConfig, VerifyError,
};
pub use witness::{check_witness, WitnessReport};
