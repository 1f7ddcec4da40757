//! REPL (Read-Eval-Print Loop) for computor

use crate::engine::{Engine, EngineOutput};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "> ";
/// Marker in front of printed results; matrix rows are indented to match
const OUTPUT_PREFIX: &str = ">> ";
const HISTORY_FILE: &str = ".computor_history";

/// What the loop should do after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    engine: Engine,
    history_path: Option<PathBuf>,
    /// Lines entered this session, for the `history` command
    session: Vec<String>,
}

impl Repl {
    /// Create a new REPL keeping its line history in the default file
    pub fn new() -> RlResult<Self> {
        Self::with_history(dirs_home().map(|h| h.join(HISTORY_FILE)))
    }

    /// Create a new REPL with an explicit history file (or none)
    pub fn with_history(history_path: Option<PathBuf>) -> RlResult<Self> {
        let mut editor = DefaultEditor::new()?;
        if let Some(ref path) = history_path {
            // a missing file just means a fresh history
            let _ = editor.load_history(path);
        }

        Ok(Repl {
            editor,
            engine: Engine::new(),
            history_path,
            session: Vec::new(),
        })
    }

    /// Run the REPL
    pub fn run(&mut self, banner: bool) -> RlResult<()> {
        if banner {
            println!("computor v{}", env!("CARGO_PKG_VERSION"));
            println!("Type help for help, exit to quit.\n");
        }

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(line);
                    if self.handle_line(line) == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Handle one non-empty line: a session command or a statement for the engine
    fn handle_line(&mut self, line: &str) -> Flow {
        self.session.push(line.to_string());
        match line.to_ascii_lowercase().as_str() {
            "exit" | "quit" => {
                println!("Goodbye!");
                Flow::Exit
            }
            "help" => {
                print_help();
                Flow::Continue
            }
            "history" => {
                for entry in self.history_lines() {
                    println!("{entry}");
                }
                Flow::Continue
            }
            _ => {
                let output = self.engine.evaluate(line);
                match &output {
                    EngineOutput::Printed { text } if text.is_empty() => {}
                    EngineOutput::Printed { text } => println!("{}", format_output(text)),
                    EngineOutput::Failed { .. } => eprintln!("{output}"),
                }
                Flow::Continue
            }
        }
    }

    /// Numbered listing of the lines entered this session
    fn history_lines(&self) -> Vec<String> {
        self.session
            .iter()
            .enumerate()
            .map(|(n, entry)| format!("{:>4}  {entry}", n + 1))
            .collect()
    }
}

/// Prefix a result with the output marker
fn format_output(text: &str) -> String {
    format!("{OUTPUT_PREFIX}{text}")
}

fn print_help() {
    println!("computor commands:");
    println!("  help            Show this help");
    println!("  history         List the lines entered this session");
    println!("  exit, quit      Leave (Ctrl-D also works)");
    println!("  variables       List every variable and function");
    println!();
    println!("You can enter:");
    println!("  - Expressions: 2 + 3 * 4, 3x ^ 2, (1 + 2i) * i");
    println!("  - Assignments: a = b = 42");
    println!("  - Functions: f(x) = x ^ 2 + 1, then f(3)");
    println!("  - Queries: a = ?");
    println!("  - Matrices: [[1,2];[3,4]] ** [[1,0];[0,1]]");
}

/// Get home directory
fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
