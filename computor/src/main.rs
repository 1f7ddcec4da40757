//! computor CLI

use clap::{Parser, Subcommand};
use computor::engine::{Engine, EngineOutput};
use computor::error::report_error;
use computor::repl::Repl;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "computor", version, about = "Interactive evaluator for numbers, matrices and functions")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive session (the default)
    Repl {
        /// Skip the welcome banner
        #[arg(long)]
        no_banner: bool,
        /// Line history file (default: ~/.computor_history)
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Evaluate each argument as one line of a single session
    Eval {
        /// Lines to evaluate, in order
        #[arg(required = true)]
        lines: Vec<String>,
        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
    },
    /// Evaluate a script file line by line
    Run {
        /// Script to run
        file: PathBuf,
    },
}

fn main() {
    computor::init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        None => run_repl(false, None),
        Some(Command::Repl { no_banner, history }) => run_repl(no_banner, history),
        Some(Command::Eval { lines, json }) => eval_lines(&lines, json),
        Some(Command::Run { file }) => run_file(&file),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Every runner reports whether all lines succeeded
type RunResult = Result<bool, Box<dyn std::error::Error>>;

fn run_repl(no_banner: bool, history: Option<PathBuf>) -> RunResult {
    let mut repl = match history {
        Some(path) => Repl::with_history(Some(path))?,
        None => Repl::new()?,
    };
    repl.run(!no_banner)?;
    Ok(true)
}

fn eval_lines(lines: &[String], json: bool) -> RunResult {
    let mut engine = Engine::new();
    let mut ok = true;
    for line in lines {
        let output = engine.evaluate(line);
        ok &= !output.is_failed();
        if json {
            let mut value = serde_json::to_value(&output)?;
            value["input"] = line.as_str().into();
            if let Some(error) = output.error() {
                value["kind"] = error.kind().to_string().into();
                value["message"] = error.to_string().into();
            }
            println!("{value}");
        } else {
            print_output(&output);
        }
    }
    Ok(ok)
}

fn run_file(path: &Path) -> RunResult {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();
    let mut engine = Engine::new();
    let mut ok = true;

    for (lineno, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let output = engine.evaluate(line);
        match output.error() {
            Some(error) => {
                ok = false;
                report_error(&format!("{filename}:{}", lineno + 1), line, error);
            }
            None => print_output(&output),
        }
    }
    Ok(ok)
}

fn print_output(output: &EngineOutput) {
    match output {
        EngineOutput::Printed { text } if text.is_empty() => {}
        EngineOutput::Printed { text } => println!("{text}"),
        EngineOutput::Failed { .. } => eprintln!("{output}"),
    }
}
