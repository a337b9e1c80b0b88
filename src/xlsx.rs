use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use thiserror::Error;

use crate::{
    config::{ClassId, Config},
    schedule::Schedule,
    solution_output::slot_string,
    utils::{Day, ALL_DAYS, NUM_PERIODS},
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("error in rust_xlsxwriter crate: {0:?}")]
    Xlsx(#[from] XlsxError),
}

pub type Result<T> = std::result::Result<T, Error>;

const ROW_TITLE: u32 = 0;
const ROW_DAY_HEADER: u32 = 1;
const ROW_FIRST_PERIOD: u32 = 2;

const COL_PERIOD: u16 = 0;
const COL_FIRST_DAY: u16 = 1;

const PERIOD_COL_WIDTH: f64 = 12.0;
const DAY_COL_WIDTH: f64 = 28.0;

// Worksheet names are capped at 31 characters by the format.
fn sheet_name(class_name: &str) -> String {
    class_name.chars().take(31).collect()
}

fn day_header(day: Day) -> &'static str {
    day.into()
}

fn build_class_worksheet(
    worksheet: &mut Worksheet,
    config: &Config,
    schedule: &Schedule,
    class: ClassId,
) -> Result<()> {
    let title_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Medium);
    let slot_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);

    worksheet.set_name(sheet_name(config.class_name(class)))?;

    let last_day_col = COL_FIRST_DAY + ALL_DAYS.len() as u16 - 1;
    worksheet.merge_range(
        ROW_TITLE,
        COL_PERIOD,
        ROW_TITLE,
        last_day_col,
        format!("Weekly Timetable: {}", config.class_name(class)).as_str(),
        &title_format,
    )?;

    worksheet.write_with_format(ROW_DAY_HEADER, COL_PERIOD, "Period", &header_format)?;
    for (offset, day) in ALL_DAYS.iter().enumerate() {
        worksheet.write_with_format(
            ROW_DAY_HEADER,
            COL_FIRST_DAY + offset as u16,
            day_header(*day),
            &header_format,
        )?;
    }

    for period in 0..NUM_PERIODS {
        let row = ROW_FIRST_PERIOD + period as u32;
        worksheet.write_with_format(
            row,
            COL_PERIOD,
            format!("Period {}", period + 1).as_str(),
            &header_format,
        )?;
        for (offset, day) in ALL_DAYS.iter().enumerate() {
            worksheet.write_with_format(
                row,
                COL_FIRST_DAY + offset as u16,
                slot_string(config, schedule.slot(class, *day, period)).as_str(),
                &slot_format,
            )?;
        }
    }

    worksheet.set_column_width(COL_PERIOD, PERIOD_COL_WIDTH)?;
    for offset in 0..ALL_DAYS.len() as u16 {
        worksheet.set_column_width(COL_FIRST_DAY + offset, DAY_COL_WIDTH)?;
    }

    Ok(())
}

/// Writes one worksheet per class, days across, periods down.
pub fn write_workbook(config: &Config, schedule: &Schedule, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    for class in config.class_ids() {
        let worksheet = workbook.add_worksheet();
        build_class_worksheet(worksheet, config, schedule, class)?;
    }
    workbook.save(path)?;
    Ok(())
}
