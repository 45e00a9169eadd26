//! Line commands for the interactive viewer loop.

use std::path::PathBuf;

/// One parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    Time(u32),
    Level(u32),
    Species(String),
    DataType(String),
    Dataset(String),
    Datasets,
    Upload(PathBuf),
    Points,
    Status,
    Help,
    Quit,
}

/// Parse one input line. Blank lines parse to `None`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();

    if parts.next().is_some() {
        return Err(format!("too many arguments for '{}'", verb));
    }

    let command = match (verb, arg) {
        ("play", None) => Command::Play,
        ("pause", None) => Command::Pause,
        ("time", Some(v)) => Command::Time(parse_index(v)?),
        ("level", Some(v)) => Command::Level(parse_index(v)?),
        ("species", Some(v)) => Command::Species(v.to_string()),
        ("type", Some(v)) => Command::DataType(v.to_string()),
        ("dataset", Some(v)) => Command::Dataset(v.to_string()),
        ("datasets", None) => Command::Datasets,
        ("upload", Some(v)) => Command::Upload(PathBuf::from(v)),
        ("points", None) => Command::Points,
        ("status", None) => Command::Status,
        ("help", None) => Command::Help,
        ("quit", None) | ("exit", None) => Command::Quit,
        (verb, Some(_)) => return Err(format!("'{}' takes no argument or is unknown", verb)),
        (verb, None) => return Err(format!("'{}' needs an argument or is unknown", verb)),
    };

    Ok(Some(command))
}

fn parse_index(value: &str) -> Result<u32, String> {
    value
        .parse()
        .map_err(|_| format!("'{}' is not a valid index", value))
}

pub const HELP: &str = "\
commands:
  play | pause            start or stop automatic time stepping
  time N | level N        move a slider axis (clamped to bounds)
  species S | type T      select species / data type
  dataset ID              switch the active dataset
  datasets                list available datasets
  upload PATH             upload a dataset file and switch to it
  points                  fetch point data for the current selection
  status                  show the current selection and bounds
  quit                    detach and exit";
