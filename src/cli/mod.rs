use crate::infra::DEFAULT_SERVER;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TAIL_INTERVAL_MS: u64 = 2000;
const MIN_TAIL_INTERVAL_MS: u64 = 250;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Run(RunConfig),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunConfig {
    pub server: String,
    pub tail_interval: Duration,
}

#[derive(Debug, Error)]
pub enum CliParseError {
    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("missing value for flag: {0}")]
    MissingFlagValue(String),

    #[error("invalid value for {flag}: {value}")]
    InvalidFlagValue { flag: String, value: String },

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}

pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, CliParseError> {
    let default_server =
        std::env::var("BRAMBLE_SERVER").unwrap_or_else(|_| DEFAULT_SERVER.to_string());
    parse_invocation_with_default(args, &default_server)
}

fn parse_invocation_with_default(
    args: &[String],
    default_server: &str,
) -> Result<CliInvocation, CliParseError> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        return Ok(CliInvocation::PrintHelp);
    }
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        return Ok(CliInvocation::PrintVersion);
    }

    let mut server = default_server.to_string();
    let mut interval_ms = DEFAULT_TAIL_INTERVAL_MS;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--server" | "-s" => {
                server = iter
                    .next()
                    .ok_or_else(|| CliParseError::MissingFlagValue("--server".to_string()))?
                    .clone();
            }
            "--interval-ms" => {
                let value = iter
                    .next()
                    .ok_or_else(|| CliParseError::MissingFlagValue("--interval-ms".to_string()))?;
                interval_ms = value
                    .parse::<u64>()
                    .ok()
                    .filter(|parsed| *parsed >= MIN_TAIL_INTERVAL_MS)
                    .ok_or_else(|| CliParseError::InvalidFlagValue {
                        flag: "--interval-ms".to_string(),
                        value: value.clone(),
                    })?;
            }
            _ if arg.starts_with('-') => {
                return Err(CliParseError::UnknownFlag(arg.clone()));
            }
            _ => {
                return Err(CliParseError::UnexpectedArgument(arg.clone()));
            }
        }
    }

    Ok(CliInvocation::Run(RunConfig {
        server,
        tail_interval: Duration::from_millis(interval_ms),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        std::iter::once("bramble")
            .chain(parts.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn defaults_to_the_given_server_and_interval() {
        let invocation =
            parse_invocation_with_default(&args(&[]), "http://127.0.0.1:8000").expect("parse");
        assert_eq!(
            invocation,
            CliInvocation::Run(RunConfig {
                server: "http://127.0.0.1:8000".to_string(),
                tail_interval: Duration::from_millis(DEFAULT_TAIL_INTERVAL_MS),
            })
        );
    }

    #[test]
    fn server_flag_overrides_the_default() {
        let invocation = parse_invocation_with_default(
            &args(&["--server", "http://10.0.0.2:9000", "--interval-ms", "500"]),
            "http://127.0.0.1:8000",
        )
        .expect("parse");
        assert_eq!(
            invocation,
            CliInvocation::Run(RunConfig {
                server: "http://10.0.0.2:9000".to_string(),
                tail_interval: Duration::from_millis(500),
            })
        );
    }

    #[test]
    fn help_wins_over_other_flags() {
        let invocation = parse_invocation_with_default(
            &args(&["--server", "x", "--help"]),
            "http://127.0.0.1:8000",
        )
        .expect("parse");
        assert_eq!(invocation, CliInvocation::PrintHelp);
    }

    #[test]
    fn rejects_a_sub_minimum_interval() {
        let error = parse_invocation_with_default(
            &args(&["--interval-ms", "10"]),
            "http://127.0.0.1:8000",
        )
        .expect_err("error");
        assert!(matches!(error, CliParseError::InvalidFlagValue { .. }));
    }

    #[test]
    fn rejects_unknown_flags_and_positional_arguments() {
        assert!(matches!(
            parse_invocation_with_default(&args(&["--bogus"]), "s"),
            Err(CliParseError::UnknownFlag(_))
        ));
        assert!(matches!(
            parse_invocation_with_default(&args(&["stray"]), "s"),
            Err(CliParseError::UnexpectedArgument(_))
        ));
    }
}
