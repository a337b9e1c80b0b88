use std::result;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid configuration: {reason}")]
    ConfigInvalid { reason: String },
    #[error("class {class} cannot meet its weekly period budget with the declared activities")]
    BudgetInfeasible { class: String },
    #[error("no staff assignment satisfies the per-subject headcounts with the given expertise")]
    AssignmentInfeasible,
    #[error("no timetable satisfies the scheduling constraints")]
    SchedulingInfeasible,
    #[error("the scheduling solver exhausted its time budget of {limit_secs} seconds")]
    SolverTimeout { limit_secs: f64 },
}

impl Error {
    pub fn config(reason: impl Into<String>) -> Error {
        Error::ConfigInvalid {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
