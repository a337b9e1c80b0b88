use bit_set::BitSet;

use crate::{config::StaffId, subjects::SubjectId};

// A precomputed store of which staff members are qualified for each subject.
// Membership queries go through the bitset; the ordered lists preserve the
// boundary declaration order, which fixes variable creation order in the
// solvers and the staff order in rendered slots.
#[derive(Debug)]
pub struct ExpertiseMatrix {
    num_staff: usize,
    qualified: BitSet,
    per_subject: Vec<Vec<StaffId>>,
}

impl ExpertiseMatrix {
    fn bit_index(num_staff: usize, subject: SubjectId, staff: StaffId) -> usize {
        subject.raw_index() * num_staff + staff.raw_index()
    }

    pub fn build(num_subjects: usize, num_staff: usize) -> ExpertiseMatrix {
        ExpertiseMatrix {
            num_staff,
            qualified: BitSet::with_capacity(num_subjects * num_staff),
            per_subject: vec![Vec::new(); num_subjects],
        }
    }

    pub fn add_qualification(&mut self, subject: SubjectId, staff: StaffId) -> bool {
        let inserted = self
            .qualified
            .insert(Self::bit_index(self.num_staff, subject, staff));
        if inserted {
            self.per_subject[subject.raw_index()].push(staff);
        }
        inserted
    }

    pub fn is_qualified(&self, subject: SubjectId, staff: StaffId) -> bool {
        self.qualified
            .contains(Self::bit_index(self.num_staff, subject, staff))
    }

    /// Qualified staff for a subject, in declaration order.
    pub fn qualified_staff(&self, subject: SubjectId) -> &[StaffId] {
        &self.per_subject[subject.raw_index()]
    }

    pub fn has_any_qualified(&self, subject: SubjectId) -> bool {
        !self.qualified_staff(subject).is_empty()
    }
}
