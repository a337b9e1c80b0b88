use std::collections::HashMap;

use serde::Deserialize;

use crate::{
    errors::{Error, Result},
    expertise::ExpertiseMatrix,
    subjects::{self, Subject, SubjectId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u16);

impl ClassId {
    pub fn from_index(index: usize) -> ClassId {
        ClassId(index as _)
    }

    pub fn raw_index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaffId(u16);

impl StaffId {
    pub fn from_index(index: usize) -> StaffId {
        StaffId(index as _)
    }

    pub fn raw_index(self) -> usize {
        self.0 as usize
    }
}

/// The boundary input record, as produced by the spreadsheet adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    pub classes: Vec<String>,
    pub staff: Vec<String>,
    pub subjects: Vec<String>,
    #[serde(default)]
    pub staff_expertise: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub class_data: HashMap<String, RawClassData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClassData {
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub labs: Vec<String>,
    #[serde(default)]
    pub tutorials: Vec<String>,
    #[serde(default)]
    pub elective_groups: Vec<Vec<String>>,
}

/// Per-class activity lists, resolved to dense subject indices. The
/// `lectures` list carries both regular lectures and specials, matching
/// the boundary record's `subjects` field.
#[derive(Debug, Clone)]
pub struct ClassData {
    pub lectures: Vec<SubjectId>,
    pub labs: Vec<SubjectId>,
    pub tutorials: Vec<SubjectId>,
    pub elective_groups: Vec<Vec<SubjectId>>,
}

impl ClassData {
    /// All subjects the class meets for, deduplicated, in declaration
    /// order (lectures, then labs, then tutorials).
    pub fn active_subjects(&self) -> Vec<SubjectId> {
        let mut seen = vec![];
        for &subject in self
            .lectures
            .iter()
            .chain(&self.labs)
            .chain(&self.tutorials)
        {
            if !seen.contains(&subject) {
                seen.push(subject);
            }
        }
        seen
    }

    pub fn is_elective_member(&self, subject: SubjectId) -> bool {
        self.elective_groups
            .iter()
            .any(|group| group.contains(&subject))
    }

    pub fn is_lab(&self, subject: SubjectId) -> bool {
        self.labs.contains(&subject)
    }

    pub fn is_tutorial(&self, subject: SubjectId) -> bool {
        self.tutorials.contains(&subject)
    }
}

#[derive(Debug)]
pub struct Config {
    pub class_names: Vec<String>,
    pub staff_names: Vec<String>,
    pub subjects: Vec<Subject>,
    pub expertise: ExpertiseMatrix,
    pub classes: Vec<ClassData>,
}

fn intern(kind: &str, names: &[String]) -> Result<HashMap<String, usize>> {
    let mut indices = HashMap::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        if indices.insert(name.clone(), index).is_some() {
            return Err(Error::config(format!("duplicate {kind} name {name:?}")));
        }
    }
    Ok(indices)
}

impl TryFrom<RawConfig> for Config {
    type Error = Error;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let class_indices = intern("class", &raw.classes)?;
        let staff_indices = intern("staff", &raw.staff)?;
        let subject_indices = intern("subject", &raw.subjects)?;

        let lookup_subject = |class: &str, name: &str| -> Result<SubjectId> {
            subject_indices
                .get(name)
                .map(|&index| SubjectId::from_index(index))
                .ok_or_else(|| {
                    Error::config(format!("class {class:?} lists unknown subject {name:?}"))
                })
        };

        for name in raw.class_data.keys() {
            if !class_indices.contains_key(name) {
                return Err(Error::config(format!(
                    "activity data given for unknown class {name:?}"
                )));
            }
        }

        let mut classes = Vec::with_capacity(raw.classes.len());
        for class_name in &raw.classes {
            let data = raw.class_data.get(class_name).ok_or_else(|| {
                Error::config(format!("class {class_name:?} has no activity data"))
            })?;

            let resolve_list = |names: &[String]| -> Result<Vec<SubjectId>> {
                names
                    .iter()
                    .map(|name| lookup_subject(class_name, name))
                    .collect()
            };

            classes.push(ClassData {
                lectures: resolve_list(&data.subjects)?,
                labs: resolve_list(&data.labs)?,
                tutorials: resolve_list(&data.tutorials)?,
                elective_groups: data
                    .elective_groups
                    .iter()
                    .map(|group| resolve_list(group))
                    .collect::<Result<_>>()?,
            });
        }

        // Elective membership in any class marks the subject for the
        // diversity and daily-cap rules.
        let mut in_elective_group = vec![false; raw.subjects.len()];
        for class in &classes {
            for group in &class.elective_groups {
                for subject in group {
                    in_elective_group[subject.raw_index()] = true;
                }
            }
        }

        let subjects = raw
            .subjects
            .iter()
            .enumerate()
            .map(|(index, name)| Subject {
                name: name.clone(),
                kind: subjects::classify(name, in_elective_group[index]),
            })
            .collect::<Vec<_>>();

        let mut expertise = ExpertiseMatrix::build(subjects.len(), raw.staff.len());
        for (subject_name, staff_list) in &raw.staff_expertise {
            let subject = subject_indices
                .get(subject_name)
                .map(|&index| SubjectId::from_index(index))
                .ok_or_else(|| {
                    Error::config(format!("expertise given for unknown subject {subject_name:?}"))
                })?;
            for staff_name in staff_list {
                let staff = staff_indices
                    .get(staff_name)
                    .map(|&index| StaffId::from_index(index))
                    .ok_or_else(|| {
                        Error::config(format!(
                            "expertise for {subject_name:?} names unknown staff {staff_name:?}"
                        ))
                    })?;
                if !expertise.add_qualification(subject, staff) {
                    return Err(Error::config(format!(
                        "expertise for {subject_name:?} lists {staff_name:?} twice"
                    )));
                }
            }
        }

        Ok(Config {
            class_names: raw.classes,
            staff_names: raw.staff,
            subjects,
            expertise,
            classes,
        })
    }
}

impl Config {
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn num_staff(&self) -> usize {
        self.staff_names.len()
    }

    pub fn num_subjects(&self) -> usize {
        self.subjects.len()
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> {
        (0..self.classes.len()).map(ClassId::from_index)
    }

    pub fn staff_ids(&self) -> impl Iterator<Item = StaffId> {
        (0..self.staff_names.len()).map(StaffId::from_index)
    }

    pub fn class_data(&self, class: ClassId) -> &ClassData {
        &self.classes[class.raw_index()]
    }

    pub fn class_name(&self, class: ClassId) -> &str {
        &self.class_names[class.raw_index()]
    }

    pub fn staff_name(&self, staff: StaffId) -> &str {
        &self.staff_names[staff.raw_index()]
    }

    pub fn subject(&self, subject: SubjectId) -> &Subject {
        &self.subjects[subject.raw_index()]
    }

    pub fn subject_name(&self, subject: SubjectId) -> &str {
        &self.subjects[subject.raw_index()].name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subjects::SubjectKind;

    fn raw_from_json(value: serde_json::Value) -> RawConfig {
        serde_json::from_value(value).expect("fixture should deserialize")
    }

    fn small_raw() -> RawConfig {
        raw_from_json(serde_json::json!({
            "classes": ["CSE-A"],
            "staff": ["Rao", "Iyer"],
            "subjects": ["Maths", "DBMS_Lab", "LIB_HH"],
            "staff_expertise": {
                "Maths": ["Rao"],
                "DBMS_Lab": ["Rao", "Iyer"],
                "LIB_HH": ["Iyer"]
            },
            "class_data": {
                "CSE-A": {
                    "subjects": ["Maths", "LIB_HH"],
                    "labs": ["DBMS_Lab"],
                    "tutorials": [],
                    "elective_groups": []
                }
            }
        }))
    }

    #[test]
    fn resolves_dense_indices_in_declaration_order() {
        let config = Config::try_from(small_raw()).unwrap();
        assert_eq!(config.num_classes(), 1);
        assert_eq!(config.num_staff(), 2);
        assert_eq!(config.num_subjects(), 3);

        let class = config.class_data(ClassId::from_index(0));
        let active: Vec<&str> = class
            .active_subjects()
            .iter()
            .map(|&subject| config.subject_name(subject))
            .collect();
        assert_eq!(active, vec!["Maths", "LIB_HH", "DBMS_Lab"]);

        assert_eq!(config.subject(SubjectId::from_index(1)).kind, SubjectKind::Lab);
        assert_eq!(
            config.subject(SubjectId::from_index(2)).kind,
            SubjectKind::Special
        );
    }

    #[test]
    fn duplicate_class_name_is_rejected() {
        let mut raw = small_raw();
        raw.classes.push("CSE-A".into());
        let err = Config::try_from(raw).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }

    #[test]
    fn unknown_subject_in_class_list_is_rejected() {
        let mut raw = small_raw();
        raw.class_data
            .get_mut("CSE-A")
            .unwrap()
            .subjects
            .push("Chemistry".into());
        let err = Config::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("Chemistry"));
    }

    #[test]
    fn unknown_staff_in_expertise_is_rejected() {
        let mut raw = small_raw();
        raw.staff_expertise
            .get_mut("Maths")
            .unwrap()
            .push("Nair".into());
        let err = Config::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("Nair"));
    }

    #[test]
    fn class_without_activity_data_is_rejected() {
        let mut raw = small_raw();
        raw.classes.push("CSE-B".into());
        let err = Config::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("CSE-B"));
    }

    #[test]
    fn elective_membership_marks_kind() {
        let raw = raw_from_json(serde_json::json!({
            "classes": ["CSE-A"],
            "staff": ["Rao", "Iyer"],
            "subjects": ["AI", "ML", "Maths"],
            "staff_expertise": {
                "AI": ["Rao"], "ML": ["Iyer"], "Maths": ["Rao"]
            },
            "class_data": {
                "CSE-A": {
                    "subjects": ["AI", "ML", "Maths"],
                    "labs": [],
                    "tutorials": [],
                    "elective_groups": [["AI", "ML"]]
                }
            }
        }));
        let config = Config::try_from(raw).unwrap();
        assert_eq!(
            config.subject(SubjectId::from_index(0)).kind,
            SubjectKind::ElectiveMember
        );
        assert_eq!(
            config.subject(SubjectId::from_index(2)).kind,
            SubjectKind::Lecture
        );
        assert!(config
            .class_data(ClassId::from_index(0))
            .is_elective_member(SubjectId::from_index(1)));
    }
}
