use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Names accepted by `SESAME_LOG_LEVEL`, indexed by verbosity count.
const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// `-v` is counted on the command line; the env var takes a level name or
/// the equivalent count.
fn parse_level(value: &str) -> Result<u8, String> {
    let value = value.trim();

    if let Ok(count) = value.parse::<u8>() {
        if usize::from(count) < LEVEL_NAMES.len() {
            return Ok(count);
        }
        return Err(format!(
            "log level count must be below {}",
            LEVEL_NAMES.len()
        ));
    }

    LEVEL_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(value))
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("unknown log level '{value}', expected one of {LEVEL_NAMES:?}"))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Increase log verbosity (-v warn, -vv info, -vvv debug, -vvvv trace)")
            .env("SESAME_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::new(parse_level)),
    )
}
