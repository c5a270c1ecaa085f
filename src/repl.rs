//! Control commands read from stdin

use std::io::BufRead;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc::{self, Receiver};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "barkeep control")]
struct ControlLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Hide or show the bars of one monitor
    Toggle { monitor: usize },
    /// Respawn every bar
    Redraw,
    /// Re-read the configuration file and redraw
    Reload,
    /// Collect every metric and rewrite the status lines
    Update,
    /// Collect only the named metrics
    Refresh { keys: Vec<String> },
    /// Print bar state per monitor
    Status,
    Quit,
}

/// Parse one control line. `Ok(None)` for blank lines.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let args = shlex::split(line).ok_or("error: Invalid quoting")?;
    let parsed = ControlLine::try_parse_from(args).map_err(|e| e.to_string())?;
    Ok(Some(parsed.command))
}

/// Forward stdin lines from a blocking reader thread. The channel closes at
/// end of input.
pub fn spawn_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel(8);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse("toggle 1").unwrap(), Some(Command::Toggle { monitor: 1 }));
        assert_eq!(parse("  redraw ").unwrap(), Some(Command::Redraw));
        assert_eq!(
            parse("refresh volume 'clock'").unwrap(),
            Some(Command::Refresh {
                keys: vec!["volume".to_string(), "clock".to_string()]
            })
        );
        assert_eq!(parse("").unwrap(), None);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse("toggle").is_err());
        assert!(parse("toggle x").is_err());
        assert!(parse("frobnicate").is_err());
        assert!(parse("refresh 'clock").is_err());
    }
}
