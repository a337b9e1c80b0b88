use log::debug;

use crate::{
    config::{ClassId, Config},
    errors::{Error, Result},
    subjects::{self, SubjectId, SubjectKind},
    utils::{NUM_DAYS, NUM_PERIODS},
};

/// Every class meets for the full grid each week.
pub const WEEKLY_PERIODS: u32 = (NUM_DAYS * NUM_PERIODS) as u32;

/// Weekly period counts per (class, subject), dense over the subject list.
/// A zero means the subject is inactive for that class (or was allocated
/// nothing by the remainder split).
#[derive(Debug)]
pub struct PeriodAllocation {
    per_class: Vec<Vec<u32>>,
}

impl PeriodAllocation {
    pub fn periods(&self, class: ClassId, subject: SubjectId) -> u32 {
        self.per_class[class.raw_index()][subject.raw_index()]
    }
}

/// Derives per-subject weekly period counts so that each class totals
/// exactly [`WEEKLY_PERIODS`], counting each elective group once. Labs,
/// tutorials, specials and electives carry fixed counts; the remainder is
/// split evenly over the core lectures, first lectures in declaration
/// order absorbing the odd periods.
pub fn allocate(config: &Config) -> Result<PeriodAllocation> {
    let mut per_class = Vec::with_capacity(config.num_classes());

    for class_id in config.class_ids() {
        let class = config.class_data(class_id);
        let mut counts: Vec<Option<u32>> = vec![None; config.num_subjects()];

        for &subject in &class.labs {
            counts[subject.raw_index()] = Some(subjects::LAB_PERIODS);
        }
        for &subject in &class.tutorials {
            counts[subject.raw_index()] = Some(subjects::TUTORIAL_PERIODS);
        }
        for &subject in &class.lectures {
            if let Some(periods) = subjects::special_periods(config.subject_name(subject)) {
                counts[subject.raw_index()] = Some(periods);
            }
        }
        for group in &class.elective_groups {
            for &subject in group {
                counts[subject.raw_index()] = Some(subjects::ELECTIVE_PERIODS);
            }
        }

        // Each group occupies one set of slots, however many subjects
        // run in parallel inside it.
        let elective_cost = subjects::ELECTIVE_PERIODS * class.elective_groups.len() as u32;
        let fixed_sum: u32 = counts
            .iter()
            .enumerate()
            .filter_map(|(index, count)| {
                let subject = SubjectId::from_index(index);
                match count {
                    Some(count) if !class.is_elective_member(subject) => Some(*count),
                    _ => None,
                }
            })
            .sum();

        let core_lectures: Vec<SubjectId> = class
            .lectures
            .iter()
            .copied()
            .filter(|&subject| {
                counts[subject.raw_index()].is_none()
                    && config.subject(subject).kind != SubjectKind::Lab
                    && config.expertise.has_any_qualified(subject)
            })
            .collect();

        let used = fixed_sum + elective_cost;
        if used > WEEKLY_PERIODS {
            return Err(Error::BudgetInfeasible {
                class: config.class_name(class_id).to_string(),
            });
        }
        let remaining = WEEKLY_PERIODS - used;
        if remaining > 0 && core_lectures.is_empty() {
            return Err(Error::BudgetInfeasible {
                class: config.class_name(class_id).to_string(),
            });
        }

        if !core_lectures.is_empty() {
            let base = remaining / core_lectures.len() as u32;
            let odd = remaining % core_lectures.len() as u32;
            for (position, &subject) in core_lectures.iter().enumerate() {
                let extra = if (position as u32) < odd { 1 } else { 0 };
                counts[subject.raw_index()] = Some(base + extra);
            }
        }

        debug!(
            "budgeted {} for class {}: {} fixed + {} elective + {} over {} core lectures",
            WEEKLY_PERIODS,
            config.class_name(class_id),
            fixed_sum,
            elective_cost,
            remaining,
            core_lectures.len(),
        );

        per_class.push(counts.into_iter().map(|count| count.unwrap_or(0)).collect());
    }

    Ok(PeriodAllocation { per_class })
}
