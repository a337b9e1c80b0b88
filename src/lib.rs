//! Two-phase constraint engine that builds a department's weekly
//! timetable: a budgeter derives per-subject weekly period counts, a
//! first solve balances staff assignment by minimizing the heaviest
//! weekly load, and a second solve places every activity into the
//! 6-day by 7-period grid.

pub mod assignment;
pub mod budget;
pub mod checks;
pub mod config;
pub mod errors;
pub mod expertise;
pub mod schedule;
pub mod solution_output;
pub mod solver;
pub mod subjects;
pub mod utils;
pub mod xlsx;

pub use config::{Config, RawConfig};
pub use errors::{Error, Result};
pub use solution_output::TimetableResponse;
pub use solver::SolverOptions;

/// Everything a successful run produces, kept together so renderers can
/// translate ids back to names.
pub struct Timetable {
    pub config: Config,
    pub allocation: budget::PeriodAllocation,
    pub assignments: assignment::Assignments,
    pub schedule: schedule::Schedule,
}

impl Timetable {
    pub fn response(&self) -> TimetableResponse {
        TimetableResponse::success(&self.config, &self.schedule)
    }
}

/// Runs the whole pipeline over a boundary configuration record. Every
/// stage either feeds the next or short-circuits with its typed error;
/// no partial schedule is ever returned.
pub fn generate_timetable(raw: RawConfig, options: &SolverOptions) -> Result<Timetable> {
    let config = Config::try_from(raw)?;
    checks::check_config(&config)?;
    let allocation = budget::allocate(&config)?;
    let assignments = assignment::solve(&config, &allocation)?;
    let schedule = schedule::solve(&config, &allocation, &assignments, options)?;
    Ok(Timetable {
        config,
        allocation,
        assignments,
        schedule,
    })
}
