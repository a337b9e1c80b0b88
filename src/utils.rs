use enum_map::Enum;
use strum::IntoStaticStr;

pub const NUM_DAYS: usize = 6;
pub const NUM_PERIODS: usize = 7;

/// Teaching days of the week. Saturday carries periods but no lab or
/// tutorial blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Enum, IntoStaticStr)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

pub const ALL_DAYS: [Day; NUM_DAYS] = [
    Day::Monday,
    Day::Tuesday,
    Day::Wednesday,
    Day::Thursday,
    Day::Friday,
    Day::Saturday,
];

impl Day {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Day {
        ALL_DAYS[index]
    }

    pub fn is_weekday(self) -> bool {
        self != Day::Saturday
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_indices_round_trip() {
        for (index, day) in ALL_DAYS.iter().enumerate() {
            assert_eq!(day.index(), index);
            assert_eq!(Day::from_index(index), *day);
        }
    }

    #[test]
    fn saturday_is_not_a_weekday() {
        assert!(Day::Friday.is_weekday());
        assert!(!Day::Saturday.is_weekday());
    }
}
