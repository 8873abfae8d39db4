//! Shared types used across CLI commands and tests.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentEntry {
    pub(crate) var: String,
    pub(crate) value: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecheckReport {
    pub(crate) holds: bool,
    pub(crate) checked: usize,
    pub(crate) violations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EquilibriumReport {
    pub(crate) schema_version: u32,
    pub(crate) model: String,
    pub(crate) solver: String,
    pub(crate) exclude: String,
    pub(crate) result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) assignment: Option<Vec<AssignmentEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) witness: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) recheck: Option<RecheckReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UniquenessReport {
    pub(crate) schema_version: u32,
    pub(crate) model: String,
    pub(crate) solver: String,
    pub(crate) candidate: Option<String>,
    pub(crate) result: String,
    pub(crate) output: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct BoundSweepReport<'a> {
    pub(crate) schema_version: u32,
    pub(crate) min_n: usize,
    pub(crate) max_n: usize,
    pub(crate) b: f64,
    pub(crate) points: &'a [popgame_bound::BoundResult],
}
