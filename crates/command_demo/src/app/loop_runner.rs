use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use command_engine::{Entity, HistorySnapshot, InputSnapshot, Session};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use super::bootstrap::AppWiring;
use super::config::LoopConfig;
use super::console::{ConsoleCommandProcessor, LineOutcome, LocalAction, ParsedCommand};

#[derive(Debug, Error)]
pub(crate) enum LoopError {
    #[error("failed to read input line: {0}")]
    ReadInput(#[source] io::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] io::Error),
    #[error("failed to encode dump: {0}")]
    EncodeDump(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LoopSummary {
    pub(crate) ticks: u64,
    pub(crate) effective_calls: u64,
    pub(crate) quit_requested: bool,
}

#[derive(Serialize)]
struct DumpView<'a> {
    entities: &'a [Entity],
    history: HistorySnapshot,
}

pub(crate) fn run(mut app: AppWiring) -> ExitCode {
    let stdin = io::stdin();
    let stdout = io::stdout();
    match run_loop(&mut app.session, &app.loop_config, stdin.lock(), stdout.lock()) {
        Ok(summary) => {
            info!(
                ticks = summary.ticks,
                effective_calls = summary.effective_calls,
                quit = summary.quit_requested,
                "session_finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "session_failed");
            ExitCode::FAILURE
        }
    }
}

/// Drives one tick per input line until quit, EOF, or `max_ticks`.
pub(crate) fn run_loop<R, W>(
    session: &mut Session,
    config: &LoopConfig,
    input: R,
    mut output: W,
) -> Result<LoopSummary, LoopError>
where
    R: BufRead,
    W: Write,
{
    let processor = ConsoleCommandProcessor::new();
    let mut summary = LoopSummary::default();

    let mut lines = input.lines();
    // Checked before every read so a reached limit never waits on more input.
    while !tick_limit_reached(config, summary.ticks) {
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.map_err(LoopError::ReadInput)?;

        let snapshot = match processor.process_line(&line) {
            LineOutcome::Blank => continue,
            LineOutcome::Error(message) => {
                write_line(&mut output, &message)?;
                continue;
            }
            LineOutcome::Command(ParsedCommand::Local(action)) => {
                run_local_action(session, &processor, action, &mut output)?;
                continue;
            }
            LineOutcome::Command(ParsedCommand::Input(action)) => {
                InputSnapshot::empty().with_pressed(action, true)
            }
        };

        let outcome = session.tick(&snapshot);
        summary.ticks += 1;
        summary.effective_calls += outcome.effective_calls as u64;

        if outcome.quit_requested {
            summary.quit_requested = true;
            break;
        }
        if outcome.calls > 0 && outcome.effective_calls == 0 {
            write_line(&mut output, "nothing to do")?;
        } else if config.echo_positions {
            write_active_position(session, &mut output)?;
        }
    }

    if tick_limit_reached(config, summary.ticks) {
        info!(max_ticks = ?config.max_ticks, "tick_limit_reached");
    }
    output.flush().map_err(LoopError::WriteOutput)?;
    Ok(summary)
}

fn tick_limit_reached(config: &LoopConfig, ticks: u64) -> bool {
    config.max_ticks.is_some_and(|max_ticks| ticks >= max_ticks)
}

fn run_local_action<W: Write>(
    session: &Session,
    processor: &ConsoleCommandProcessor,
    action: LocalAction,
    output: &mut W,
) -> Result<(), LoopError> {
    match action {
        LocalAction::Help => {
            for line in processor.registry().help_lines() {
                write_line(output, &line)?;
            }
        }
        LocalAction::Where(Some(name)) => match session.world().find_by_name(&name) {
            Some(entity) => write_entity_line(session, entity, output)?,
            None => write_line(output, &format!("error: unknown target '{name}'"))?,
        },
        LocalAction::Where(None) => {
            for entity in session.world().entities() {
                write_entity_line(session, entity, output)?;
            }
            write_line(
                output,
                &format!(
                    "undo={} redo={}",
                    session.engine().undo_len(),
                    session.engine().redo_len()
                ),
            )?;
        }
        LocalAction::Dump => {
            let view = DumpView {
                entities: session.world().entities(),
                history: session.history_snapshot(),
            };
            let json = serde_json::to_string_pretty(&view).map_err(LoopError::EncodeDump)?;
            write_line(output, &json)?;
        }
    }
    Ok(())
}

fn write_entity_line<W: Write>(
    session: &Session,
    entity: &Entity,
    output: &mut W,
) -> Result<(), LoopError> {
    let marker = if entity.id == session.engine().active_target() {
        "*"
    } else {
        " "
    };
    write_line(output, &format!("{marker} {} {}", entity.name, entity.position))
}

fn write_active_position<W: Write>(session: &Session, output: &mut W) -> Result<(), LoopError> {
    match session.active_entity() {
        Some(entity) => write_line(output, &format!("{} {}", entity.name, entity.position)),
        None => Ok(()),
    }
}

fn write_line<W: Write>(output: &mut W, line: &str) -> Result<(), LoopError> {
    writeln!(output, "{line}").map_err(LoopError::WriteOutput)
}

#[cfg(test)]
mod tests {
    use command_engine::SessionConfig;

    use super::*;

    fn run_script(script: &str, config: &LoopConfig) -> (Session, LoopSummary, Vec<String>) {
        let mut session = Session::from_config(&SessionConfig::default()).expect("session");
        let mut output = Vec::new();
        let summary =
            run_loop(&mut session, config, script.as_bytes(), &mut output).expect("loop");
        let text = String::from_utf8(output).expect("utf8");
        let lines = text.lines().map(ToString::to_string).collect();
        (session, summary, lines)
    }

    fn echo_config() -> LoopConfig {
        LoopConfig::default()
    }

    #[test]
    fn scripted_walkthrough_prints_each_position() {
        let script = "forward\nleft\nundo\nundo\nredo\nright\nredo\n";
        let (session, summary, lines) = run_script(script, &echo_config());

        assert_eq!(
            lines,
            vec![
                "cube (0.00, 0.00, 1.00)",
                "cube (-1.00, 0.00, 1.00)",
                "cube (0.00, 0.00, 1.00)",
                "cube (0.00, 0.00, 0.00)",
                "cube (0.00, 0.00, 1.00)",
                "cube (1.00, 0.00, 1.00)",
                "nothing to do",
            ]
        );
        assert_eq!(summary.ticks, 7);
        assert_eq!(summary.effective_calls, 6);
        assert!(!summary.quit_requested);
        assert!(!session.engine().can_redo());
    }

    #[test]
    fn quit_stops_before_later_lines() {
        let (session, summary, _) = run_script("forward\nquit\nforward\n", &echo_config());

        assert!(summary.quit_requested);
        assert_eq!(summary.ticks, 2);
        assert_eq!(session.engine().undo_len(), 1);
    }

    #[test]
    fn max_ticks_limits_processed_lines() {
        let config = LoopConfig {
            max_ticks: Some(2),
            echo_positions: false,
        };
        let (session, summary, lines) = run_script("forward\nforward\nforward\n", &config);

        assert_eq!(summary.ticks, 2);
        assert!(lines.is_empty());
        assert_eq!(session.engine().undo_len(), 2);
    }

    #[test]
    fn reached_tick_limit_stops_without_reading_further_lines() {
        let config = LoopConfig {
            max_ticks: Some(1),
            echo_positions: false,
        };
        let mut session = Session::from_config(&SessionConfig::default()).expect("session");
        let mut reader = io::Cursor::new("forward\nforward\n");

        let summary =
            run_loop(&mut session, &config, &mut reader, Vec::new()).expect("loop");

        assert_eq!(summary.ticks, 1);
        assert_eq!(reader.position(), "forward\n".len() as u64);
    }

    #[test]
    fn zero_tick_limit_reads_nothing() {
        let config = LoopConfig {
            max_ticks: Some(0),
            echo_positions: true,
        };
        let mut session = Session::from_config(&SessionConfig::default()).expect("session");
        let mut reader = io::Cursor::new("forward\n");

        let summary =
            run_loop(&mut session, &config, &mut reader, Vec::new()).expect("loop");

        assert_eq!(summary.ticks, 0);
        assert_eq!(reader.position(), 0);
        assert!(!session.engine().can_undo());
    }

    #[test]
    fn where_with_name_prints_only_that_target() {
        let script = "cycle\nwhere sphere\nwhere \"cube\"\nwhere crate\n";
        let (_, summary, lines) = run_script(script, &echo_config());

        assert_eq!(summary.ticks, 1);
        assert_eq!(
            lines,
            vec![
                "sphere (3.00, 0.00, 0.00)",
                "* sphere (3.00, 0.00, 0.00)",
                "  cube (0.00, 0.00, 0.00)",
                "error: unknown target 'crate'",
            ]
        );
    }

    #[test]
    fn errors_and_local_commands_do_not_consume_ticks() {
        let script = "# comment\njump\nwhere\ncycle\nforward\nwhere\n";
        let (_, summary, lines) = run_script(script, &echo_config());

        assert_eq!(summary.ticks, 2);
        assert_eq!(
            lines,
            vec![
                "error: unknown command 'jump'. try: help",
                "* cube (0.00, 0.00, 0.00)",
                "  sphere (3.00, 0.00, 0.00)",
                "undo=0 redo=0",
                "sphere (3.00, 0.00, 0.00)",
                "sphere (3.00, 0.00, 1.00)",
                "  cube (0.00, 0.00, 0.00)",
                "* sphere (3.00, 0.00, 1.00)",
                "undo=1 redo=0",
            ]
        );
    }

    #[test]
    fn dump_emits_json_with_history() {
        let (_, _, lines) = run_script("forward\nundo\ndump\n", &echo_config());
        let json_text = lines[2..].join("\n");
        let value: serde_json::Value = serde_json::from_str(&json_text).expect("json");

        assert_eq!(value["entities"][0]["name"], "cube");
        assert_eq!(value["history"]["redo"][0]["kind"], "MoveForward");
        assert_eq!(
            value["history"]["undo"].as_array().map(Vec::len),
            Some(0)
        );
    }

    #[test]
    fn help_lists_every_command() {
        let (_, summary, lines) = run_script("help\n", &echo_config());
        assert_eq!(summary.ticks, 0);
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "help - List commands");
    }
}
