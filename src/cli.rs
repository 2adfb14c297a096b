// src/cli.rs
use chrono::{Duration, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use fittrack_lib::dates::today;

#[derive(Parser, Debug)]
#[command(author, version, about = "A CLI tool to log workouts per day", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    /// Print tabular output as CSV instead
    #[arg(long, global = true)]
    pub export_csv: bool,
}

// Custom parser for date strings and shorthands
pub fn parse_date_shorthand(s: &str) -> Result<NaiveDate, String> {
    match s.to_lowercase().as_str() {
        "today" => Ok(today()),
        "yesterday" => Ok(today() - Duration::days(1)),
        "tomorrow" => Ok(today() + Duration::days(1)),
        _ => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(s, "%d.%m.%Y"))
            .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
            .map_err(|_| {
                format!(
                    "Invalid date format: '{s}'. Use 'today', 'yesterday', 'tomorrow', YYYY-MM-DD, DD.MM.YYYY, or YYYY/MM/DD."
                )
            }),
    }
}

// 1-based positions on the command line, 0-based in the library
fn parse_position(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("Invalid position '{s}': expected a number starting at 1")),
    }
}

fn parse_month(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => Ok(m),
        _ => Err(format!("Invalid month '{s}': expected 1-12")),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the exercises logged on a date
    Show {
        #[arg(short, long, value_parser = parse_date_shorthand, default_value = "today")]
        date: NaiveDate,
    },
    /// Add an exercise (seeded with one set of 10 reps at 0 weight)
    AddExercise {
        /// Name of the exercise (e.g., "Squat")
        name: String,
        #[arg(short, long, value_parser = parse_date_shorthand, default_value = "today")]
        date: NaiveDate,
    },
    /// Remove an exercise and all its sets
    RemoveExercise {
        /// Position of the exercise as shown by `show`
        #[arg(value_parser = parse_position)]
        exercise: usize,
        #[arg(short, long, value_parser = parse_date_shorthand, default_value = "today")]
        date: NaiveDate,
    },
    /// Add a set, copying the previous set's reps and weight
    AddSet {
        #[arg(value_parser = parse_position)]
        exercise: usize,
        #[arg(short, long, value_parser = parse_date_shorthand, default_value = "today")]
        date: NaiveDate,
        /// Override the copied repetition count
        #[arg(short, long)]
        reps: Option<u32>,
        /// Override the copied weight
        #[arg(short, long)]
        weight: Option<f64>,
    },
    /// Remove one set from an exercise
    RemoveSet {
        #[arg(value_parser = parse_position)]
        exercise: usize,
        #[arg(value_parser = parse_position)]
        set: usize,
        #[arg(short, long, value_parser = parse_date_shorthand, default_value = "today")]
        date: NaiveDate,
    },
    /// Change the reps and/or weight of one set
    EditSet {
        #[arg(value_parser = parse_position)]
        exercise: usize,
        #[arg(value_parser = parse_position)]
        set: usize,
        #[arg(short, long, value_parser = parse_date_shorthand, default_value = "today")]
        date: NaiveDate,
        #[arg(short, long)]
        reps: Option<u32>,
        #[arg(short, long)]
        weight: Option<f64>,
    },
    /// Copy every exercise of one date onto another (appends, never overwrites)
    Copy {
        #[arg(long, value_parser = parse_date_shorthand)]
        from: NaiveDate,
        #[arg(long, value_parser = parse_date_shorthand, default_value = "today")]
        to: NaiveDate,
    },
    /// Show a month calendar marking workout days
    Calendar {
        #[arg(short, long)]
        year: Option<i32>,
        #[arg(short, long, value_parser = parse_month)]
        month: Option<u32>,
    },
    /// Sets and volume for the last 7 days
    Stats,
    /// Ask the AI coach for advice based on recent workouts
    Advice {
        #[arg(short, long, value_parser = parse_date_shorthand, default_value = "today")]
        date: NaiveDate,
    },
    /// Export every logged set as CSV
    Export,
    /// Store the Gemini API key in the config file (omit to clear it)
    SetApiKey { key: Option<String> },
    /// Show the path to the config file
    ConfigPath,
    /// Show the path to the database file
    DbPath,
    /// Generate shell completion scripts
    GenerateCompletion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_parsing_shorthands() {
        assert_eq!(parse_date_shorthand("today").unwrap(), today());
        assert_eq!(
            parse_date_shorthand("Yesterday").unwrap(),
            today() - Duration::days(1)
        );
    }

    #[test]
    fn test_date_parsing_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(parse_date_shorthand("2024-05-01").unwrap(), expected);
        assert_eq!(parse_date_shorthand("01.05.2024").unwrap(), expected);
        assert_eq!(parse_date_shorthand("2024/05/01").unwrap(), expected);
        assert!(parse_date_shorthand("May 1st").is_err());
    }

    #[test]
    fn test_positions_are_one_based() {
        assert_eq!(parse_position("1"), Ok(0));
        assert!(parse_position("0").is_err());
        assert!(parse_position("x").is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn test_parse_edit_set_command() {
        let cli = Cli::try_parse_from([
            "fittrack", "edit-set", "2", "1", "--date", "2024-05-01", "--weight", "62.5",
        ])
        .unwrap();
        match cli.command {
            Commands::EditSet { exercise, set, date, reps, weight } => {
                assert_eq!((exercise, set), (1, 0));
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
                assert_eq!(reps, None);
                assert_eq!(weight, Some(62.5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
