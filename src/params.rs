//! Run parameters and the commit gate

use serde::{Deserialize, Serialize};

use crate::report::CascadeReport;

/// How a cascade run treats its result. Both flags default to false.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CascadeParameters {
    /// Compute and report, but change nothing
    pub dry_run: bool,
    /// Persist only if the run recorded no errors
    pub atomic: bool,
}

impl CascadeParameters {
    pub fn dry_run() -> Self {
        CascadeParameters { dry_run: true, atomic: false }
    }

    pub fn atomic() -> Self {
        CascadeParameters { dry_run: false, atomic: true }
    }
}

/// Whether the updated objects of a finished run go to the store.
///
/// | dry_run | atomic | errors | commit |
/// |---------|--------|--------|--------|
/// | true    | any    | any    | no     |
/// | false   | false  | any    | yes    |
/// | false   | true   | none   | yes    |
/// | false   | true   | some   | no     |
#[inline]
pub fn should_commit(parameters: &CascadeParameters, report: &CascadeReport) -> bool {
    !parameters.dry_run && (!parameters.atomic || !report.has_errors())
}
