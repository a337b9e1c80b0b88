use std::{fs::File, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use timegrid::{generate_timetable, RawConfig, SolverOptions, TimetableResponse};

#[derive(Debug, clap::Parser)]
struct Args {
    /// Path to the configuration record (JSON).
    config: PathBuf,
    /// Solver options TOML; defaults apply when omitted.
    #[arg(long)]
    options: Option<PathBuf>,
    /// Write the result record here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Also export the generated timetable as a workbook.
    #[arg(long)]
    xlsx: Option<PathBuf>,
}

fn main_impl() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config_file = File::open(&args.config)
        .with_context(|| anyhow!("failed to open config at {}", args.config.display()))?;
    let raw: RawConfig = serde_json::from_reader(config_file)
        .with_context(|| anyhow!("could not parse {} as a configuration record", args.config.display()))?;

    let options = match &args.options {
        Some(path) => SolverOptions::read_from_toml(path)?,
        None => SolverOptions::default(),
    };

    println!(
        "Loaded {} classes, {} staff, {} subjects",
        raw.classes.len(),
        raw.staff.len(),
        raw.subjects.len()
    );

    let response = match generate_timetable(raw, &options) {
        Ok(timetable) => {
            println!(
                "Generated timetable (max weekly staff load {})",
                timetable.assignments.max_load()
            );
            if let Some(xlsx_path) = &args.xlsx {
                timegrid::xlsx::write_workbook(&timetable.config, &timetable.schedule, xlsx_path)
                    .with_context(|| {
                        anyhow!("failed to export workbook to {}", xlsx_path.display())
                    })?;
                println!("Exported workbook to {}", xlsx_path.display());
            }
            timetable.response()
        }
        Err(error) => {
            println!("Timetable generation failed: {error}");
            TimetableResponse::failure(&error)
        }
    };

    let rendered =
        serde_json::to_string_pretty(&response).context("failed to serialize result record")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered + "\n")
                .with_context(|| anyhow!("failed to write result to {}", path.display()))?;
            println!("Wrote result record to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn main() {
    match main_impl() {
        Ok(_) => {}
        Err(err) => println!("\nError: {:?}", err),
    }
}
