use std::collections::HashMap;

use enum_map::EnumMap;
use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, Solution, SolverModel,
    Variable,
};
use log::{debug, info};

use crate::{
    assignment::Assignments,
    budget::PeriodAllocation,
    config::{ClassData, ClassId, Config, StaffId},
    errors::{Error, Result},
    solver::{status_from_error, SolveClock, SolveStatus, SolverOptions},
    subjects::{self, SubjectId, SubjectKind},
    utils::{Day, ALL_DAYS, NUM_DAYS, NUM_PERIODS},
};

/// Labs run as three contiguous periods starting after the first period
/// of either half-day; tutorials as two contiguous periods. Neither may
/// start on Saturday.
pub const LAB_START_PERIODS: [usize; 2] = [1, 4];
pub const TUTORIAL_START_PERIODS: [usize; 5] = [0, 1, 2, 4, 5];
pub const LAB_BLOCK_LEN: usize = 3;
pub const TUTORIAL_BLOCK_LEN: usize = 2;

/// Periods a library-tagged subject may occupy.
pub const LIBRARY_PERIODS: [usize; 2] = [3, 6];

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Slot {
    #[default]
    Free,
    Occupied {
        subject: SubjectId,
        staff: Vec<StaffId>,
    },
}

pub struct Schedule {
    per_class: Vec<EnumMap<Day, [Slot; NUM_PERIODS]>>,
}

impl Schedule {
    pub(crate) fn from_grids(per_class: Vec<EnumMap<Day, [Slot; NUM_PERIODS]>>) -> Schedule {
        Schedule { per_class }
    }

    pub fn class_grid(&self, class: ClassId) -> &EnumMap<Day, [Slot; NUM_PERIODS]> {
        &self.per_class[class.raw_index()]
    }

    pub fn slot(&self, class: ClassId, day: Day, period: usize) -> &Slot {
        &self.per_class[class.raw_index()][day][period]
    }
}

/// Whether subject `s` of this class may ever meet at (day, period).
/// Slots outside the domain get no decision variable at all, which is
/// how the library restriction and the block windows enter the model.
fn in_domain(config: &Config, class: &ClassData, subject: SubjectId, d: usize, p: usize) -> bool {
    if subjects::is_library_name(config.subject_name(subject)) {
        return LIBRARY_PERIODS.contains(&p);
    }
    if class.is_lab(subject) {
        return d < NUM_DAYS - 1 && p > 0;
    }
    if class.is_tutorial(subject) {
        return d < NUM_DAYS - 1;
    }
    true
}

type VarKey = (usize, usize, usize, usize);

struct GridVars {
    occupancy: HashMap<VarKey, Variable>,
}

impl GridVars {
    fn get(&self, class: ClassId, d: usize, p: usize, subject: SubjectId) -> Option<Variable> {
        self.occupancy
            .get(&(class.raw_index(), d, p, subject.raw_index()))
            .copied()
    }
}

/// Phase 2: places every activity into the 6×7 grid, honoring the fixed
/// staff assignment, and minimizes the number of same-day repeats of
/// core lectures.
pub fn solve(
    config: &Config,
    allocation: &PeriodAllocation,
    assignments: &Assignments,
    options: &SolverOptions,
) -> Result<Schedule> {
    info!(
        "phase 2: scheduling {} classes (time budget {}s)",
        config.num_classes(),
        options.time_limit
    );

    let active_per_class: Vec<Vec<SubjectId>> = config
        .classes
        .iter()
        .map(|class| class.active_subjects())
        .collect();

    let mut vars = ProblemVariables::new();

    // Occupancy variables, created in fixed order: class, day, period,
    // then subject in activity order.
    let mut occupancy = HashMap::new();
    for class_id in config.class_ids() {
        let class = config.class_data(class_id);
        for d in 0..NUM_DAYS {
            for p in 0..NUM_PERIODS {
                for &subject in &active_per_class[class_id.raw_index()] {
                    if in_domain(config, class, subject, d, p) {
                        occupancy.insert(
                            (class_id.raw_index(), d, p, subject.raw_index()),
                            vars.add(variable().binary()),
                        );
                    }
                }
            }
        }
    }

    // Block-start helpers for labs and tutorials.
    let mut lab_starts: Vec<(ClassId, SubjectId, Vec<(usize, usize, Variable)>)> = Vec::new();
    let mut tutorial_starts: Vec<(ClassId, SubjectId, Vec<(usize, usize, Variable)>)> = Vec::new();
    for class_id in config.class_ids() {
        let class = config.class_data(class_id);
        for &subject in &class.labs {
            let mut starts = Vec::new();
            for d in 0..NUM_DAYS - 1 {
                for &p in &LAB_START_PERIODS {
                    starts.push((d, p, vars.add(variable().binary())));
                }
            }
            lab_starts.push((class_id, subject, starts));
        }
        for &subject in &class.tutorials {
            let mut starts = Vec::new();
            for d in 0..NUM_DAYS - 1 {
                for &p in &TUTORIAL_START_PERIODS {
                    starts.push((d, p, vars.add(variable().binary())));
                }
            }
            tutorial_starts.push((class_id, subject, starts));
        }
    }

    // Repeat penalties for core lectures: one binary per (class, core
    // lecture, day), forced up when the lecture meets twice that day.
    let mut repeat_penalties: Vec<(ClassId, SubjectId, usize, Variable)> = Vec::new();
    for class_id in config.class_ids() {
        let class = config.class_data(class_id);
        for &subject in &class.lectures {
            if config.subject(subject).kind != SubjectKind::Lecture {
                continue;
            }
            for d in 0..NUM_DAYS {
                repeat_penalties.push((class_id, subject, d, vars.add(variable().binary())));
            }
        }
    }

    let objective: Expression = repeat_penalties.iter().map(|(_, _, _, var)| *var).sum();
    let mut model = vars.minimise(objective).using(default_solver);
    let grid = GridVars { occupancy };

    // One activity per slot; elective groups count through their
    // representative and are pinned together below.
    for class_id in config.class_ids() {
        let class = config.class_data(class_id);
        let non_electives: Vec<SubjectId> = active_per_class[class_id.raw_index()]
            .iter()
            .copied()
            .filter(|&subject| !class.is_elective_member(subject))
            .collect();
        for d in 0..NUM_DAYS {
            for p in 0..NUM_PERIODS {
                let slot_load: Expression = non_electives
                    .iter()
                    .filter_map(|&subject| grid.get(class_id, d, p, subject))
                    .chain(
                        class
                            .elective_groups
                            .iter()
                            .filter_map(|group| grid.get(class_id, d, p, group[0])),
                    )
                    .sum();
                model.add_constraint(constraint!(slot_load <= 1));
            }
        }

        for group in &class.elective_groups {
            for &other in &group[1..] {
                for d in 0..NUM_DAYS {
                    for p in 0..NUM_PERIODS {
                        match (grid.get(class_id, d, p, group[0]), grid.get(class_id, d, p, other)) {
                            (Some(first), Some(second)) => {
                                model.add_constraint(constraint!(first - second == 0));
                            }
                            (Some(only), None) | (None, Some(only)) => {
                                model.add_constraint(constraint!(only <= 0));
                            }
                            (None, None) => {}
                        }
                    }
                }
            }
        }
    }

    // Weekly period counts.
    for class_id in config.class_ids() {
        for &subject in &active_per_class[class_id.raw_index()] {
            let mut slots = Vec::new();
            for d in 0..NUM_DAYS {
                for p in 0..NUM_PERIODS {
                    if let Some(var) = grid.get(class_id, d, p, subject) {
                        slots.push(var);
                    }
                }
            }
            let weekly: Expression = slots.into_iter().sum();
            let periods = allocation.periods(class_id, subject);
            model.add_constraint(constraint!(weekly == periods as f64));
        }
    }

    // Lab blocks: each start pins the following three periods, exactly
    // one start per lab, at most one lab per class per day.
    for (class_id, subject, starts) in &lab_starts {
        for &(d, p, start) in starts {
            for offset in 0..LAB_BLOCK_LEN {
                let slot = grid
                    .get(*class_id, d, p + offset, *subject)
                    .expect("lab block must stay inside the subject's domain");
                model.add_constraint(constraint!(slot - start >= 0));
            }
        }
        let total: Expression = starts.iter().map(|(_, _, var)| *var).sum();
        model.add_constraint(constraint!(total == 1));
    }
    for class_id in config.class_ids() {
        for d in 0..NUM_DAYS - 1 {
            let daily_labs: Expression = lab_starts
                .iter()
                .filter(|(owner, _, _)| *owner == class_id)
                .flat_map(|(_, _, starts)| {
                    starts
                        .iter()
                        .filter(move |(start_day, _, _)| *start_day == d)
                        .map(|(_, _, var)| *var)
                })
                .sum();
            model.add_constraint(constraint!(daily_labs <= 1));
        }
    }

    // Tutorial blocks.
    for (class_id, subject, starts) in &tutorial_starts {
        for &(d, p, start) in starts {
            for offset in 0..TUTORIAL_BLOCK_LEN {
                let slot = grid
                    .get(*class_id, d, p + offset, *subject)
                    .expect("tutorial block must stay inside the subject's domain");
                model.add_constraint(constraint!(slot - start >= 0));
            }
        }
        let total: Expression = starts.iter().map(|(_, _, var)| *var).sum();
        model.add_constraint(constraint!(total == 1));
    }

    // A staff member teaches at most one class at a time.
    for staff in config.staff_ids() {
        for d in 0..NUM_DAYS {
            for p in 0..NUM_PERIODS {
                let mut busy = Vec::new();
                for class_id in config.class_ids() {
                    for &subject in &active_per_class[class_id.raw_index()] {
                        if assignments.involves(class_id, subject, staff) {
                            if let Some(var) = grid.get(class_id, d, p, subject) {
                                busy.push(var);
                            }
                        }
                    }
                }
                if busy.len() >= 2 {
                    let active: Expression = busy.into_iter().sum();
                    model.add_constraint(constraint!(active <= 1));
                }
            }
        }
    }

    // Core lectures meet at most twice a day, and a second meeting costs
    // a penalty.
    for (class_id, subject, d, penalty) in &repeat_penalties {
        let daily: Expression = (0..NUM_PERIODS)
            .filter_map(|p| grid.get(*class_id, *d, p, *subject))
            .sum();
        model.add_constraint(constraint!(daily.clone() <= 2));
        model.add_constraint(constraint!(daily - *penalty <= 1));
    }

    // First-period diversity: no subject opens more than one day.
    for class_id in config.class_ids() {
        for &subject in &active_per_class[class_id.raw_index()] {
            let openings: Vec<Variable> = (0..NUM_DAYS)
                .filter_map(|d| grid.get(class_id, d, 0, subject))
                .collect();
            if openings.len() >= 2 {
                let first_period: Expression = openings.into_iter().sum();
                model.add_constraint(constraint!(first_period <= 1));
            }
        }
    }

    debug!(
        "phase 2 model: {} occupancy vars, {} lab starts, {} tutorial starts, {} penalties",
        grid.occupancy.len(),
        lab_starts.iter().map(|(_, _, s)| s.len()).sum::<usize>(),
        tutorial_starts.iter().map(|(_, _, s)| s.len()).sum::<usize>(),
        repeat_penalties.len(),
    );

    let clock = SolveClock::start(options.time_limit);
    let solution = match model.solve() {
        Ok(solution) => solution,
        Err(error) => {
            info!("phase 2 solve failed after {:.1}s: {error}", clock.elapsed_secs());
            return Err(match status_from_error(&error) {
                SolveStatus::Unknown if clock.exhausted() => Error::SolverTimeout {
                    limit_secs: clock.limit_secs(),
                },
                _ => Error::SchedulingInfeasible,
            });
        }
    };
    info!("phase 2 done in {:.1}s", clock.elapsed_secs());

    let mut per_class = Vec::with_capacity(config.num_classes());
    for class_id in config.class_ids() {
        let mut week: EnumMap<Day, [Slot; NUM_PERIODS]> = EnumMap::default();
        for day in ALL_DAYS {
            for p in 0..NUM_PERIODS {
                // For an elective slot every member is scheduled at once;
                // the first in activity order is the one rendered.
                let scheduled = active_per_class[class_id.raw_index()]
                    .iter()
                    .copied()
                    .find(|&subject| {
                        grid.get(class_id, day.index(), p, subject)
                            .is_some_and(|var| solution.value(var) > 0.5)
                    });
                if let Some(subject) = scheduled {
                    let staff = assignments
                        .staff_for(class_id, subject)
                        .unwrap_or_default()
                        .to_vec();
                    week[day][p] = Slot::Occupied { subject, staff };
                }
            }
        }
        per_class.push(week);
    }

    Ok(Schedule::from_grids(per_class))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfig;

    fn config_from_json(value: serde_json::Value) -> Config {
        let raw: RawConfig = serde_json::from_value(value).expect("fixture should deserialize");
        Config::try_from(raw).expect("fixture should resolve")
    }

    #[test]
    fn domains_prune_impossible_slots() {
        let config = config_from_json(serde_json::json!({
            "classes": ["CSE-A"],
            "staff": ["Rao"],
            "subjects": ["Maths", "DB_Lab", "M_Tutorial", "LIB_HH"],
            "staff_expertise": {
                "Maths": ["Rao"], "DB_Lab": ["Rao"], "M_Tutorial": ["Rao"], "LIB_HH": ["Rao"]
            },
            "class_data": {
                "CSE-A": {
                    "subjects": ["Maths", "LIB_HH"],
                    "labs": ["DB_Lab"],
                    "tutorials": ["M_Tutorial"]
                }
            }
        }));
        let class = config.class_data(crate::config::ClassId::from_index(0));
        let by_name = |name: &str| {
            (0..config.num_subjects())
                .map(SubjectId::from_index)
                .find(|&subject| config.subject_name(subject) == name)
                .unwrap()
        };

        let lecture = by_name("Maths");
        let lab = by_name("DB_Lab");
        let tutorial = by_name("M_Tutorial");
        let library = by_name("LIB_HH");

        assert!(in_domain(&config, class, lecture, 5, 0));
        // No Saturday labs or tutorials, no lab in the opening period.
        assert!(!in_domain(&config, class, lab, 5, 2));
        assert!(!in_domain(&config, class, lab, 2, 0));
        assert!(in_domain(&config, class, lab, 2, 1));
        assert!(!in_domain(&config, class, tutorial, 5, 3));
        assert!(in_domain(&config, class, tutorial, 4, 0));
        // Library subjects only in the designated periods.
        assert!(in_domain(&config, class, library, 5, 3));
        assert!(in_domain(&config, class, library, 1, 6));
        assert!(!in_domain(&config, class, library, 1, 2));
    }

    #[test]
    fn lab_blocks_fit_inside_lab_domains() {
        for &p in &LAB_START_PERIODS {
            assert!(p > 0 && p + LAB_BLOCK_LEN <= NUM_PERIODS);
        }
        for &p in &TUTORIAL_START_PERIODS {
            assert!(p + TUTORIAL_BLOCK_LEN <= NUM_PERIODS);
        }
    }
}
