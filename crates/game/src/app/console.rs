use std::fmt;

use engine::Vec2;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ConsoleCommand {
    Click { pos: Vec2 },
    DoubleClick { pos: Vec2 },
    Tap { pos: Vec2 },
    Resize { width: f32, height: f32 },
    Plan,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason}. usage: {usage}")]
pub(crate) struct ConsoleParseError {
    reason: String,
    usage: &'static str,
}

struct CommandSpec {
    name: &'static str,
    arg_schema: &'static str,
    help: &'static str,
    parse: fn(&[&str]) -> Result<ConsoleCommand, ConsoleParseError>,
}

// Help output follows this order.
static COMMANDS: [CommandSpec; 8] = [
    CommandSpec {
        name: "click",
        arg_schema: "<x> <y>",
        help: "Single click at a scene point",
        parse: parse_click,
    },
    CommandSpec {
        name: "dblclick",
        arg_schema: "<x> <y>",
        help: "Double click at a scene point",
        parse: parse_double_click,
    },
    CommandSpec {
        name: "tap",
        arg_schema: "<x> <y>",
        help: "Touch tap; two quick taps make a double click",
        parse: parse_tap,
    },
    CommandSpec {
        name: "resize",
        arg_schema: "<w> <h>",
        help: "Resize the scene",
        parse: parse_resize,
    },
    CommandSpec {
        name: "plan",
        arg_schema: "",
        help: "Request a new action plan",
        parse: parse_plan,
    },
    CommandSpec {
        name: "status",
        arg_schema: "",
        help: "Print scene status",
        parse: parse_status,
    },
    CommandSpec {
        name: "help",
        arg_schema: "",
        help: "List commands",
        parse: parse_help,
    },
    CommandSpec {
        name: "quit",
        arg_schema: "",
        help: "Quit",
        parse: parse_quit,
    },
];

/// Blank lines parse to `None`.
pub(crate) fn parse_console_line(line: &str) -> Result<Option<ConsoleCommand>, ConsoleParseError> {
    let tokens = line.split_whitespace().collect::<Vec<_>>();
    let Some((name, args)) = tokens.split_first() else {
        return Ok(None);
    };
    let lower = name.to_ascii_lowercase();
    let Some(spec) = COMMANDS.iter().find(|spec| spec.name == lower) else {
        return Err(ConsoleParseError {
            reason: format!("unknown command '{name}'"),
            usage: "help",
        });
    };
    (spec.parse)(args).map(Some)
}

pub(crate) fn help_lines() -> impl Iterator<Item = String> {
    COMMANDS.iter().map(|spec| {
        if spec.arg_schema.is_empty() {
            format!("{} - {}", spec.name, spec.help)
        } else {
            format!("{} {} - {}", spec.name, spec.arg_schema, spec.help)
        }
    })
}

fn parse_click(args: &[&str]) -> Result<ConsoleCommand, ConsoleParseError> {
    let pos = parse_point(args, "click <x> <y>")?;
    Ok(ConsoleCommand::Click { pos })
}

fn parse_double_click(args: &[&str]) -> Result<ConsoleCommand, ConsoleParseError> {
    let pos = parse_point(args, "dblclick <x> <y>")?;
    Ok(ConsoleCommand::DoubleClick { pos })
}

fn parse_tap(args: &[&str]) -> Result<ConsoleCommand, ConsoleParseError> {
    let pos = parse_point(args, "tap <x> <y>")?;
    Ok(ConsoleCommand::Tap { pos })
}

fn parse_resize(args: &[&str]) -> Result<ConsoleCommand, ConsoleParseError> {
    let usage = "resize <w> <h>";
    let size = parse_point(args, usage)?;
    if size.x <= 0.0 || size.y <= 0.0 {
        return Err(ConsoleParseError {
            reason: format!("scene size must be positive, got {}x{}", size.x, size.y),
            usage,
        });
    }
    Ok(ConsoleCommand::Resize {
        width: size.x,
        height: size.y,
    })
}

fn parse_plan(args: &[&str]) -> Result<ConsoleCommand, ConsoleParseError> {
    require_no_args(args, "plan")?;
    Ok(ConsoleCommand::Plan)
}

fn parse_status(args: &[&str]) -> Result<ConsoleCommand, ConsoleParseError> {
    require_no_args(args, "status")?;
    Ok(ConsoleCommand::Status)
}

fn parse_help(args: &[&str]) -> Result<ConsoleCommand, ConsoleParseError> {
    require_no_args(args, "help")?;
    Ok(ConsoleCommand::Help)
}

fn parse_quit(args: &[&str]) -> Result<ConsoleCommand, ConsoleParseError> {
    require_no_args(args, "quit")?;
    Ok(ConsoleCommand::Quit)
}

fn parse_point(args: &[&str], usage: &'static str) -> Result<Vec2, ConsoleParseError> {
    let [x, y] = args else {
        return Err(ConsoleParseError {
            reason: format!("expected two numbers, got {} argument(s)", args.len()),
            usage,
        });
    };
    Ok(Vec2::new(parse_coord(x, usage)?, parse_coord(y, usage)?))
}

fn parse_coord(raw: &str, usage: &'static str) -> Result<f32, ConsoleParseError> {
    match raw.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ConsoleParseError {
            reason: format!("invalid number '{raw}'"),
            usage,
        }),
    }
}

fn require_no_args(args: &[&str], usage: &'static str) -> Result<(), ConsoleParseError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(ConsoleParseError {
            reason: "unexpected arguments".to_string(),
            usage,
        })
    }
}

impl fmt::Display for ConsoleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleCommand::Click { pos } => write!(f, "click {} {}", pos.x, pos.y),
            ConsoleCommand::DoubleClick { pos } => write!(f, "dblclick {} {}", pos.x, pos.y),
            ConsoleCommand::Tap { pos } => write!(f, "tap {} {}", pos.x, pos.y),
            ConsoleCommand::Resize { width, height } => write!(f, "resize {width} {height}"),
            ConsoleCommand::Plan => f.write_str("plan"),
            ConsoleCommand::Status => f.write_str("status"),
            ConsoleCommand::Help => f.write_str("help"),
            ConsoleCommand::Quit => f.write_str("quit"),
        }
    }
}
