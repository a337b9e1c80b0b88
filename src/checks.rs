use crate::{
    config::Config,
    errors::{Error, Result},
};

/// Referential problems are caught while resolving the boundary record;
/// this pass rejects configurations that resolve cleanly but cannot be
/// handed to the solvers.
pub fn check_config(config: &Config) -> Result<()> {
    for class_id in config.class_ids() {
        let class_name = config.class_name(class_id);
        let class = config.class_data(class_id);
        let active = class.active_subjects();

        for &subject in &active {
            if !config.expertise.has_any_qualified(subject) {
                return Err(Error::config(format!(
                    "no qualified staff for subject {:?} taken by class {class_name:?}",
                    config.subject_name(subject)
                )));
            }
        }

        for &subject in class.labs.iter().chain(&class.tutorials) {
            if crate::subjects::is_library_name(config.subject_name(subject)) {
                return Err(Error::config(format!(
                    "library subject {:?} cannot run as a lab or tutorial in class {class_name:?}",
                    config.subject_name(subject)
                )));
            }
        }

        for group in &class.elective_groups {
            if group.len() < 2 {
                return Err(Error::config(format!(
                    "an elective group of class {class_name:?} has fewer than two subjects"
                )));
            }
            for &subject in group {
                if !active.contains(&subject) {
                    return Err(Error::config(format!(
                        "elective subject {:?} is not in class {class_name:?}'s activity lists",
                        config.subject_name(subject)
                    )));
                }
            }
        }

        for (index, group) in class.elective_groups.iter().enumerate() {
            for other in &class.elective_groups[index + 1..] {
                if let Some(&shared) = group.iter().find(|subject| other.contains(subject)) {
                    return Err(Error::config(format!(
                        "subject {:?} appears in two elective groups of class {class_name:?}",
                        config.subject_name(shared)
                    )));
                }
            }
        }
    }

    Ok(())
}
