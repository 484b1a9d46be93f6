//! Interactive session loop: render state, collect action/target, forward
//! requests to the engine, and export the log on demand.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use redblue_core::{Action, EngineError, Game, TurnPhase};

use crate::export;

const HELP: &str = "\
commands:
  actions              list actions for the current phase
  state                show nodes and both sides' resources
  log                  print the audit trail
  do <action> [target] [dest]   submit an action (e.g. `do exploit DMZ`)
  end                  end the current phase
  save [path]          export the log as CSV
  help                 this text
  quit                 leave (honors --log-out)";

/// One interactive session over a single run.
pub struct App {
    game: Game,
    log_out: Option<PathBuf>,
}

impl App {
    pub fn new(game: Game, log_out: Option<PathBuf>) -> Self {
        Self { game, log_out }
    }

    /// Drive the session until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        writeln!(
            out,
            "redblue — attacker vs defender (educational, abstract simulation)"
        )?;
        writeln!(out, "type `help` for commands")?;
        self.print_state(out)?;

        for line in input.lines() {
            let line = line?;
            if !self.handle_line(line.trim(), out)? {
                break;
            }
        }

        if let Some(path) = self.log_out.take() {
            export::write_csv(self.game.log(), &path)?;
            writeln!(out, "log saved to {}", path.display())?;
        }
        Ok(())
    }

    /// Returns `false` when the session should end.
    fn handle_line(&mut self, line: &str, out: &mut impl Write) -> Result<bool> {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return Ok(true);
        };
        let args: Vec<&str> = parts.collect();

        match command {
            "help" => writeln!(out, "{HELP}")?,
            "actions" => self.print_actions(out)?,
            "state" => self.print_state(out)?,
            "log" => {
                for record in self.game.log() {
                    writeln!(
                        out,
                        "[turn {} | {} | {}] {}",
                        record.turn, record.phase, record.actor, record.message
                    )?;
                }
            }
            "do" => self.handle_action(&args, out)?,
            "end" => match self.game.end_phase() {
                Ok(Some(outcome)) => {
                    writeln!(out, "*** {outcome} ***")?;
                }
                Ok(None) => self.print_state(out)?,
                Err(err) => writeln!(out, "rejected: {err}")?,
            },
            "save" => {
                let path = args
                    .first()
                    .map(PathBuf::from)
                    .unwrap_or_else(export::default_log_path);
                export::write_csv(self.game.log(), &path)?;
                writeln!(out, "log saved to {}", path.display())?;
            }
            "quit" | "exit" => return Ok(false),
            other => {
                warn!(command = other, "unknown command");
                writeln!(out, "unknown command '{other}', type `help`")?;
            }
        }
        Ok(true)
    }

    fn handle_action(&mut self, args: &[&str], out: &mut impl Write) -> Result<()> {
        let action = match parse_action(args) {
            Ok(action) => action,
            Err(message) => {
                writeln!(out, "{message}")?;
                return Ok(());
            }
        };

        match self.game.submit(action) {
            Ok(result) => {
                writeln!(out, "{}", result.record.message)?;
                if let Some(outcome) = result.outcome {
                    writeln!(out, "*** {outcome} ***")?;
                }
            }
            Err(err @ EngineError::GameOver(_)) => writeln!(out, "{err}")?,
            Err(err) => writeln!(out, "rejected: {err}")?,
        }
        Ok(())
    }

    fn print_actions(&self, out: &mut impl Write) -> Result<()> {
        let specs = self.game.valid_actions();
        if specs.is_empty() {
            writeln!(out, "game over, no actions available")?;
            return Ok(());
        }
        for spec in specs {
            let hint = if spec.requires_target { " <target>" } else { "" };
            writeln!(out, "  {}{hint}", spec.kind)?;
        }
        Ok(())
    }

    fn print_state(&self, out: &mut impl Write) -> Result<()> {
        let state = self.game.state();
        let phase = match state.phase {
            TurnPhase::Attacker => "attacker",
            TurnPhase::Defender => "defender",
        };
        writeln!(out, "-- turn {} | {phase} phase --", state.turn)?;
        writeln!(
            out,
            "attacker: funds={} skill={:.1} members={} exfil={}",
            state.attacker.funds, state.attacker.skill, state.attacker.members,
            state.attacker.exfil_value
        )?;
        writeln!(
            out,
            "defender: budget={} monitoring={:.2} awareness={:.2}",
            state.defender.budget, state.defender.monitoring, state.defender.awareness
        )?;
        for (name, status) in &state.nodes {
            let spec = self.game.topology().spec(name);
            let value = spec.map(|s| s.value).unwrap_or(0);
            writeln!(
                out,
                "  {name:<9} value={value:>2} exp={:.2} patch={} {}{}{}",
                status.exposure,
                status.patch_level,
                if status.compromised { "compromised " } else { "" },
                if status.isolated { "isolated " } else { "" },
                if status.honeypot { "honeypot" } else { "" },
            )?;
        }
        if let Some(outcome) = self.game.outcome() {
            writeln!(out, "*** {outcome} ***")?;
        }
        Ok(())
    }
}

fn parse_action(args: &[&str]) -> Result<Action, String> {
    let usage = "usage: do <action> [target] [dest]";
    let Some(kind) = args.first() else {
        return Err(usage.to_string());
    };
    let target = |index: usize| -> Result<String, String> {
        args.get(index)
            .map(|s| s.to_string())
            .ok_or_else(|| format!("'{kind}' needs a target node"))
    };

    match *kind {
        "recon" => Ok(Action::Recon),
        "social" => Ok(Action::Social),
        "recruit" => Ok(Action::Recruit),
        "exploit" => Ok(Action::Exploit { target: target(1)? }),
        "lateral" => Ok(Action::Lateral {
            from: target(1)?,
            to: args
                .get(2)
                .map(|s| s.to_string())
                .ok_or_else(|| "lateral needs a source and a destination".to_string())?,
        }),
        "exfiltrate" => Ok(Action::Exfiltrate { target: target(1)? }),
        "harden" => Ok(Action::Harden { target: target(1)? }),
        "patch" => Ok(Action::Patch { target: target(1)? }),
        "monitor" => Ok(Action::Monitor),
        "awareness" => Ok(Action::Awareness),
        "isolate" => Ok(Action::Isolate { target: target(1)? }),
        "honeypot" => Ok(Action::Honeypot { target: target(1)? }),
        "forensic" => Ok(Action::Forensic),
        other => Err(format!("unknown action '{other}'")),
    }
}
