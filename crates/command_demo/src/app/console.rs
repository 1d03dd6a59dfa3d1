use std::collections::HashMap;

use command_engine::InputAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LocalAction {
    Help,
    /// All targets, or only the named one.
    Where(Option<String>),
    Dump,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParsedCommand {
    Local(LocalAction),
    Input(InputAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommandParseError {
    reason: String,
    usage: String,
}

impl CommandParseError {
    pub(crate) fn message(&self) -> String {
        format!("error: {}. usage: {}", self.reason, self.usage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineOutcome {
    Blank,
    Command(ParsedCommand),
    Error(String),
}

type ParseFn = fn(&[String]) -> Result<ParsedCommand, CommandParseError>;

pub(crate) struct CommandSpec {
    name: String,
    help: String,
    arg_schema: String,
    parse: ParseFn,
}

pub(crate) struct ConsoleCommandRegistry {
    specs: Vec<CommandSpec>,
    lookup_by_lower_name: HashMap<String, usize>,
}

impl ConsoleCommandRegistry {
    pub(crate) fn new() -> Self {
        Self {
            specs: Vec::new(),
            lookup_by_lower_name: HashMap::new(),
        }
    }

    pub(crate) fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, &str, &str, ParseFn); 11] = [
            ("help", "", "List commands", parse_help_command),
            ("forward", "", "Move active target +Z", parse_forward_command),
            ("back", "", "Move active target -Z", parse_back_command),
            ("left", "", "Move active target -X", parse_left_command),
            ("right", "", "Move active target +X", parse_right_command),
            ("undo", "", "Undo the most recent move", parse_undo_command),
            ("redo", "", "Redo the most recently undone move", parse_redo_command),
            ("cycle", "", "Make the next target active", parse_cycle_command),
            ("where", "[\"<name>\"]", "Print target positions", parse_where_command),
            ("dump", "", "Print world and history as JSON", parse_dump_command),
            ("quit", "", "Stop the session", parse_quit_command),
        ];
        for (name, arg_schema, help, parse) in builtins {
            registry
                .register(name, help, arg_schema, parse)
                .expect("built-in command registration should not fail");
        }
        registry
    }

    pub(crate) fn register(
        &mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        arg_schema: impl Into<String>,
        parse: ParseFn,
    ) -> Result<(), String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("command name cannot be empty".to_string());
        }
        let lower = name.to_ascii_lowercase();
        if self.lookup_by_lower_name.contains_key(&lower) {
            return Err(format!("duplicate command registration: {name}"));
        }

        self.specs.push(CommandSpec {
            name,
            help: help.into(),
            arg_schema: arg_schema.into(),
            parse,
        });
        self.lookup_by_lower_name
            .insert(lower, self.specs.len() - 1);
        Ok(())
    }

    pub(crate) fn lookup(&self, input_name: &str) -> Option<&CommandSpec> {
        let lower = input_name.to_ascii_lowercase();
        let index = self.lookup_by_lower_name.get(&lower)?;
        self.specs.get(*index)
    }

    pub(crate) fn help_lines(&self) -> Vec<String> {
        // Registration order.
        self.specs
            .iter()
            .map(|spec| {
                if spec.arg_schema.is_empty() {
                    format!("{} - {}", spec.name, spec.help)
                } else {
                    format!("{} {} - {}", spec.name, spec.arg_schema, spec.help)
                }
            })
            .collect()
    }
}

pub(crate) struct ConsoleCommandProcessor {
    registry: ConsoleCommandRegistry,
}

impl Default for ConsoleCommandProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleCommandProcessor {
    pub(crate) fn new() -> Self {
        Self {
            registry: ConsoleCommandRegistry::with_builtins(),
        }
    }

    pub(crate) fn registry(&self) -> &ConsoleCommandRegistry {
        &self.registry
    }

    pub(crate) fn process_line(&self, raw_line: &str) -> LineOutcome {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return LineOutcome::Blank;
        }

        let tokens = match tokenize_line(trimmed) {
            Ok(tokens) => tokens,
            Err(reason) => return LineOutcome::Error(format!("error: {reason}. usage: help")),
        };
        let Some((command_name, args)) = tokens.split_first() else {
            return LineOutcome::Blank;
        };

        let Some(spec) = self.registry.lookup(command_name) else {
            return LineOutcome::Error(format!(
                "error: unknown command '{command_name}'. try: help"
            ));
        };

        match (spec.parse)(args) {
            Ok(command) => LineOutcome::Command(command),
            Err(error) => LineOutcome::Error(error.message()),
        }
    }
}

fn tokenize_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                pending_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending_token {
                    tokens.push(std::mem::take(&mut current));
                    pending_token = false;
                }
            }
            _ => {
                current.push(ch);
                pending_token = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted string".to_string());
    }
    if pending_token {
        tokens.push(current);
    }

    Ok(tokens)
}

fn require_no_args(args: &[String], usage: &str) -> Result<(), CommandParseError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandParseError {
            reason: "unexpected extra arguments".to_string(),
            usage: usage.to_string(),
        })
    }
}

fn parse_help_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "help")?;
    Ok(ParsedCommand::Local(LocalAction::Help))
}

fn parse_where_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let usage = "where [\"<name>\"]";
    match args {
        [] => Ok(ParsedCommand::Local(LocalAction::Where(None))),
        [name] if !name.trim().is_empty() => Ok(ParsedCommand::Local(LocalAction::Where(
            Some(name.clone()),
        ))),
        [_] => Err(CommandParseError {
            reason: "target name cannot be empty".to_string(),
            usage: usage.to_string(),
        }),
        _ => Err(CommandParseError {
            reason: "expected at most one target name".to_string(),
            usage: usage.to_string(),
        }),
    }
}

fn parse_dump_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "dump")?;
    Ok(ParsedCommand::Local(LocalAction::Dump))
}

fn parse_forward_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "forward")?;
    Ok(ParsedCommand::Input(InputAction::MoveForward))
}

fn parse_back_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "back")?;
    Ok(ParsedCommand::Input(InputAction::MoveBackward))
}

fn parse_left_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "left")?;
    Ok(ParsedCommand::Input(InputAction::MoveLeft))
}

fn parse_right_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "right")?;
    Ok(ParsedCommand::Input(InputAction::MoveRight))
}

fn parse_undo_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "undo")?;
    Ok(ParsedCommand::Input(InputAction::Undo))
}

fn parse_redo_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "redo")?;
    Ok(ParsedCommand::Input(InputAction::Redo))
}

fn parse_cycle_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "cycle")?;
    Ok(ParsedCommand::Input(InputAction::CycleTarget))
}

fn parse_quit_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "quit")?;
    Ok(ParsedCommand::Input(InputAction::Quit))
}
