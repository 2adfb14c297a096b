//src/main.rs
mod cli; // Keep cli module for parsing args

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::io::{self, stdout};
use tracing_subscriber::EnvFilter;

use fittrack_lib::dates::{month_grid, today};
use fittrack_lib::stats::weekly_total_sets;
use fittrack_lib::{date_key, AppService, DayStats, Exercise, SetField, Units, WorkoutLog};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli_args = cli::parse_args(); // Parse arguments once
    let export_csv = cli_args.export_csv;

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();

        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    let mut service =
        AppService::initialize().context("Failed to initialize application service")?;
    let header_color = service.config.header_color();
    let unit = weight_unit(service.config.units);

    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            unreachable!("Completion generation should have exited already");
        }
        cli::Commands::Show { date } => {
            let exercises = service.exercises_for(date);
            if exercises.is_empty() {
                println!("No exercises logged on {}.", date_key(date));
            } else if export_csv {
                let mut log = WorkoutLog::new();
                log.insert(date_key(date), exercises.to_vec());
                print_log_csv(&log, unit)?;
            } else {
                println!("Workout for {}", date_key(date));
                print_exercise_table(exercises, header_color, unit);
            }
        }
        cli::Commands::AddExercise { name, date } => {
            let mut draft = service.draft_for(date);
            if !draft.add_exercise(&name) {
                bail!("Exercise name cannot be empty.");
            }
            let position = draft.exercises().len();
            service.save_date(date, draft.into_exercises())?;
            println!(
                "Added '{}' as exercise #{} on {}.",
                name.trim(),
                position,
                date_key(date)
            );
        }
        cli::Commands::RemoveExercise { exercise, date } => {
            let mut draft = service.draft_for(date);
            let removed = draft.remove_exercise(exercise)?;
            service.save_date(date, draft.into_exercises())?;
            println!(
                "Removed '{}' ({} set(s)) from {}.",
                removed.name,
                removed.sets.len(),
                date_key(date)
            );
        }
        cli::Commands::AddSet { exercise, date, reps, weight } => {
            let mut draft = service.draft_for(date);
            draft.add_set(exercise)?;
            let index = draft.exercises()[exercise].sets.len() - 1;
            if let Some(r) = reps {
                draft.update_set(exercise, index, SetField::Reps, f64::from(r))?;
            }
            if let Some(w) = weight {
                draft.update_set(exercise, index, SetField::Weight, w)?;
            }
            let name = draft.exercises()[exercise].name.clone();
            let added = draft.exercises()[exercise].sets[index].clone();
            service.save_date(date, draft.into_exercises())?;
            println!(
                "Added set #{} to '{}': {} reps x {}{}",
                index + 1,
                name,
                added.reps,
                added.weight,
                unit
            );
        }
        cli::Commands::RemoveSet { exercise, set, date } => {
            let mut draft = service.draft_for(date);
            let removed = draft.remove_set(exercise, set)?;
            service.save_date(date, draft.into_exercises())?;
            println!(
                "Removed set #{} ({} reps x {}{}) from exercise #{}.",
                set + 1,
                removed.reps,
                removed.weight,
                unit,
                exercise + 1
            );
        }
        cli::Commands::EditSet { exercise, set, date, reps, weight } => {
            if reps.is_none() && weight.is_none() {
                bail!("Nothing to change: pass --reps and/or --weight.");
            }
            let mut draft = service.draft_for(date);
            if let Some(r) = reps {
                draft.update_set(exercise, set, SetField::Reps, f64::from(r))?;
            }
            if let Some(w) = weight {
                draft.update_set(exercise, set, SetField::Weight, w)?;
            }
            service.save_date(date, draft.into_exercises())?;
            println!("Updated set #{} of exercise #{}.", set + 1, exercise + 1);
        }
        cli::Commands::Copy { from, to } => {
            let copied = service.copy_date(from, to)?;
            if copied == 0 {
                println!("Nothing logged on {} to copy.", date_key(from));
            } else {
                println!(
                    "Copied {} exercise(s) from {} to {}.",
                    copied,
                    date_key(from),
                    date_key(to)
                );
            }
        }
        cli::Commands::Calendar { year, month } => {
            let now = today();
            let year = year.unwrap_or_else(|| now.year());
            let month = month.unwrap_or_else(|| now.month());
            print_calendar(&service, year, month, now, header_color);
        }
        cli::Commands::Stats => {
            let week = service.weekly_stats(today());
            if export_csv {
                print_stats_csv(&week)?;
            } else {
                println!("Total workout days: {}", service.total_workout_days());
                println!("Sets this week: {}", weekly_total_sets(&week));
                print_stats_table(&week, header_color, unit);
            }
        }
        cli::Commands::Advice { date } => {
            eprintln!("Asking the AI coach...");
            let advice = service.request_advice(date).await;
            println!("{advice}");
        }
        cli::Commands::Export => {
            print_log_csv(service.log(), unit)?;
        }
        cli::Commands::SetApiKey { key } => {
            let clearing = key.as_deref().map_or(true, |k| k.trim().is_empty());
            service.set_api_key(key)?;
            if clearing {
                println!("Cleared the Gemini API key in {:?}.", service.get_config_path());
            } else {
                println!("Saved the Gemini API key to {:?}.", service.get_config_path());
            }
        }
        cli::Commands::ConfigPath => {
            println!("{}", service.get_config_path().display());
        }
        cli::Commands::DbPath => {
            println!("{}", service.get_db_path().display());
        }
    }

    Ok(())
}

const fn weight_unit(units: Units) -> &'static str {
    match units {
        Units::Metric => "kg",
        Units::Imperial => "lbs",
    }
}

fn print_exercise_table(exercises: &[Exercise], header_color: Color, unit: &str) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").fg(header_color),
            Cell::new("Exercise").fg(header_color),
            Cell::new("Set").fg(header_color),
            Cell::new("Reps").fg(header_color),
            Cell::new(format!("Weight ({unit})")).fg(header_color),
        ]);

    for (ex_index, exercise) in exercises.iter().enumerate() {
        if exercise.sets.is_empty() {
            table.add_row(vec![
                Cell::new(ex_index + 1),
                Cell::new(&exercise.name),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
            ]);
        }
        for (set_index, set) in exercise.sets.iter().enumerate() {
            let (number, name) = if set_index == 0 {
                ((ex_index + 1).to_string(), exercise.name.as_str())
            } else {
                (String::new(), "")
            };
            table.add_row(vec![
                Cell::new(number),
                Cell::new(name),
                Cell::new(set_index + 1),
                Cell::new(set.reps),
                Cell::new(set.weight),
            ]);
        }
    }
    println!("{table}");
}

fn print_calendar(
    service: &AppService,
    year: i32,
    month: u32,
    now: NaiveDate,
    header_color: Color,
) {
    let grid = month_grid(year, month);
    if grid.is_empty() {
        println!("Invalid month: {year}-{month:02}");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(
        ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
            .into_iter()
            .map(|d| Cell::new(d).fg(header_color)),
    );

    for week in grid.chunks(7) {
        table.add_row(week.iter().map(|cell| match cell {
            None => Cell::new(""),
            Some(day) => {
                let mark = if service.has_workout(*day) { "✔" } else { "" };
                let cell = Cell::new(format!("{:>2}{mark}", day.day()))
                    .set_alignment(CellAlignment::Right);
                if *day == now {
                    cell.fg(Color::Yellow)
                } else {
                    cell
                }
            }
        }));
    }

    let logged = service
        .month_overview(year, month)
        .iter()
        .filter(|(_, has)| *has)
        .count();
    println!("{year}-{month:02} ({logged} workout day(s))");
    println!("{table}");
}

fn print_stats_table(week: &[DayStats], header_color: Color, unit: &str) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Day").fg(header_color),
            Cell::new("Sets").fg(header_color),
            Cell::new(format!("Volume ({unit})")).fg(header_color),
        ]);
    for day in week {
        table.add_row(vec![
            Cell::new(&day.label),
            Cell::new(day.total_sets),
            Cell::new(format!("{:.1}", day.total_volume)),
        ]);
    }
    println!("{table}");
}

fn print_stats_csv(week: &[DayStats]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(["Date", "Label", "Sets", "Volume"])?;
    for day in week {
        writer.write_record([
            date_key(day.date),
            day.label.clone(),
            day.total_sets.to_string(),
            day.total_volume.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_log_csv(log: &WorkoutLog, unit: &str) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    let weight_header = format!("Weight_{unit}");
    writer.write_record([
        "Date",
        "Exercise_ID",
        "Exercise",
        "Set_ID",
        "Set",
        "Reps",
        weight_header.as_str(),
    ])?;
    for (date, exercises) in log {
        for exercise in exercises {
            for (index, set) in exercise.sets.iter().enumerate() {
                writer.write_record([
                    date.clone(),
                    exercise.id.to_string(),
                    exercise.name.clone(),
                    set.id.to_string(),
                    (index + 1).to_string(),
                    set.reps.to_string(),
                    set.weight.to_string(),
                ])?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}
