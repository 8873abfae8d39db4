pub(crate) mod bound;
pub(crate) mod equilibrium;
pub(crate) mod helpers;
