use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, Solution, SolverModel,
    Variable,
};
use log::{debug, info};

use crate::{
    budget::{PeriodAllocation, WEEKLY_PERIODS},
    config::{ClassId, Config, StaffId},
    errors::{Error, Result},
    subjects::SubjectId,
};

/// Phase 1 output: the chosen staff per (class, subject), in expertise
/// declaration order, plus the minimized maximum weekly load.
#[derive(Debug)]
pub struct Assignments {
    per_class: Vec<Vec<Option<Vec<StaffId>>>>,
    max_load: u32,
}

impl Assignments {
    pub fn staff_for(&self, class: ClassId, subject: SubjectId) -> Option<&[StaffId]> {
        self.per_class[class.raw_index()][subject.raw_index()]
            .as_deref()
    }

    pub fn max_load(&self) -> u32 {
        self.max_load
    }

    pub fn involves(&self, class: ClassId, subject: SubjectId, staff: StaffId) -> bool {
        self.staff_for(class, subject)
            .is_some_and(|list| list.contains(&staff))
    }
}

struct SubjectSlot {
    class: ClassId,
    subject: SubjectId,
    headcount: u32,
    candidates: Vec<(StaffId, Variable)>,
}

/// Chooses staff for every (class, subject) pair so that each pair gets
/// its required headcount (two for labs and tutorials when two qualified
/// staff exist, one otherwise) while minimizing the largest weekly load
/// any one staff member carries.
pub fn solve(config: &Config, allocation: &PeriodAllocation) -> Result<Assignments> {
    info!("phase 1: balancing staff assignment");

    let mut vars = ProblemVariables::new();
    let mut slots: Vec<SubjectSlot> = Vec::new();

    // Variable creation order is fixed: class, then subject in activity
    // order, then staff in expertise order.
    for class_id in config.class_ids() {
        let class = config.class_data(class_id);
        for subject in class.active_subjects() {
            let qualified = config.expertise.qualified_staff(subject);
            let wants_pair = class.is_lab(subject) || class.is_tutorial(subject);
            let headcount = if wants_pair && qualified.len() >= 2 { 2 } else { 1 };
            slots.push(SubjectSlot {
                class: class_id,
                subject,
                headcount,
                candidates: qualified
                    .iter()
                    .map(|&staff| (staff, vars.add(variable().binary())))
                    .collect(),
            });
        }
    }

    let max_load = vars.add(variable().integer().min(0).max(WEEKLY_PERIODS as f64));
    let mut model = vars.minimise(max_load).using(default_solver);

    for slot in &slots {
        let chosen: Expression = slot.candidates.iter().map(|(_, var)| *var).sum();
        model.add_constraint(constraint!(chosen == slot.headcount as f64));
    }

    for staff in config.staff_ids() {
        let load: Expression = slots
            .iter()
            .flat_map(|slot| {
                let periods = allocation.periods(slot.class, slot.subject) as f64;
                slot.candidates
                    .iter()
                    .filter(move |(candidate, _)| *candidate == staff)
                    .map(move |(_, var)| periods * *var)
            })
            .sum();
        model.add_constraint(constraint!(load <= max_load));
    }

    debug!(
        "phase 1 model: {} pairs over {} staff",
        slots.len(),
        config.num_staff()
    );

    let solution = match model.solve() {
        Ok(solution) => solution,
        Err(error) => {
            info!("phase 1 solve failed: {error}");
            return Err(Error::AssignmentInfeasible);
        }
    };

    let mut per_class = vec![vec![None; config.num_subjects()]; config.num_classes()];
    for slot in &slots {
        let chosen: Vec<StaffId> = slot
            .candidates
            .iter()
            .filter(|(_, var)| solution.value(*var) > 0.5)
            .map(|(staff, _)| *staff)
            .collect();
        per_class[slot.class.raw_index()][slot.subject.raw_index()] = Some(chosen);
    }

    let max_load = solution.value(max_load).round() as u32;
    info!("phase 1 done: minimized maximum weekly load is {max_load}");

    Ok(Assignments {
        per_class,
        max_load,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{budget, config::RawConfig};

    fn config_from_json(value: serde_json::Value) -> Config {
        let raw: RawConfig = serde_json::from_value(value).expect("fixture should deserialize");
        Config::try_from(raw).expect("fixture should resolve")
    }

    fn subject_named(config: &Config, name: &str) -> SubjectId {
        (0..config.num_subjects())
            .map(SubjectId::from_index)
            .find(|&subject| config.subject_name(subject) == name)
            .expect("subject should exist")
    }

    #[test]
    fn balances_load_between_equally_qualified_staff() {
        let config = config_from_json(serde_json::json!({
            "classes": ["CSE-A"],
            "staff": ["Rao", "Iyer"],
            "subjects": ["A", "B"],
            "staff_expertise": { "A": ["Rao", "Iyer"], "B": ["Rao", "Iyer"] },
            "class_data": { "CSE-A": { "subjects": ["A", "B"] } }
        }));
        let allocation = budget::allocate(&config).unwrap();
        let assignments = solve(&config, &allocation).unwrap();

        // 21 + 21 periods split one subject each.
        assert_eq!(assignments.max_load(), 21);
        let class = ClassId::from_index(0);
        let a_staff = assignments.staff_for(class, subject_named(&config, "A")).unwrap();
        let b_staff = assignments.staff_for(class, subject_named(&config, "B")).unwrap();
        assert_eq!(a_staff.len(), 1);
        assert_eq!(b_staff.len(), 1);
        assert_ne!(a_staff[0], b_staff[0]);
    }

    #[test]
    fn labs_take_two_staff_when_available() {
        let config = config_from_json(serde_json::json!({
            "classes": ["CSE-A"],
            "staff": ["Rao", "Iyer", "Nair"],
            "subjects": ["A", "DB_Lab", "M_Tutorial"],
            "staff_expertise": {
                "A": ["Rao"],
                "DB_Lab": ["Rao", "Iyer"],
                "M_Tutorial": ["Nair"]
            },
            "class_data": {
                "CSE-A": { "subjects": ["A"], "labs": ["DB_Lab"], "tutorials": ["M_Tutorial"] }
            }
        }));
        let allocation = budget::allocate(&config).unwrap();
        let assignments = solve(&config, &allocation).unwrap();
        let class = ClassId::from_index(0);

        let lab_staff = assignments
            .staff_for(class, subject_named(&config, "DB_Lab"))
            .unwrap();
        assert_eq!(lab_staff.len(), 2);

        // Only one qualified candidate, so the tutorial falls back to one.
        let tut_staff = assignments
            .staff_for(class, subject_named(&config, "M_Tutorial"))
            .unwrap();
        assert_eq!(tut_staff.len(), 1);
    }

    #[test]
    fn sole_instructor_for_two_full_classes_is_infeasible() {
        // One person cannot carry 84 weekly periods under the 42 bound.
        let config = config_from_json(serde_json::json!({
            "classes": ["CSE-A", "CSE-B"],
            "staff": ["Rao"],
            "subjects": ["A"],
            "staff_expertise": { "A": ["Rao"] },
            "class_data": {
                "CSE-A": { "subjects": ["A"] },
                "CSE-B": { "subjects": ["A"] }
            }
        }));
        let allocation = budget::allocate(&config).unwrap();
        assert_eq!(
            solve(&config, &allocation).unwrap_err(),
            Error::AssignmentInfeasible
        );
    }
}
