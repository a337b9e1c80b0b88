use std::collections::BTreeMap;

use itertools::Itertools;
use serde::Serialize;

use crate::{
    config::Config,
    errors::Error,
    schedule::{Schedule, Slot},
    utils::{ALL_DAYS, NUM_PERIODS},
};

pub const FREE_SLOT: &str = "--- FREE ---";

/// The boundary output record. Day keys are stringified indices `"0"`
/// (Monday) through `"5"` (Saturday); each maps to the seven slot strings
/// of that day in period order.
#[derive(Debug, Clone, Serialize)]
pub struct TimetableResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<BTreeMap<String, BTreeMap<String, Vec<String>>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TimetableResponse {
    pub fn success(config: &Config, schedule: &Schedule) -> TimetableResponse {
        TimetableResponse {
            status: "success",
            schedule: Some(render_schedule(config, schedule)),
            message: None,
        }
    }

    pub fn failure(error: &Error) -> TimetableResponse {
        TimetableResponse {
            status: "error",
            schedule: None,
            message: Some(error.to_string()),
        }
    }
}

pub fn slot_string(config: &Config, slot: &Slot) -> String {
    match slot {
        Slot::Free => FREE_SLOT.to_string(),
        Slot::Occupied { subject, staff } => {
            let staff_names = staff
                .iter()
                .map(|&member| config.staff_name(member))
                .join(" & ");
            format!("{} ({staff_names})", config.subject_name(*subject))
        }
    }
}

pub fn render_schedule(
    config: &Config,
    schedule: &Schedule,
) -> BTreeMap<String, BTreeMap<String, Vec<String>>> {
    let mut rendered = BTreeMap::new();
    for class_id in config.class_ids() {
        let mut days = BTreeMap::new();
        for day in ALL_DAYS {
            let slots: Vec<String> = (0..NUM_PERIODS)
                .map(|p| slot_string(config, schedule.slot(class_id, day, p)))
                .collect();
            days.insert(day.index().to_string(), slots);
        }
        rendered.insert(config.class_name(class_id).to_string(), days);
    }
    rendered
}
