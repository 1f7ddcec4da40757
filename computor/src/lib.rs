//! computor library
//!
//! Interactive evaluator for integers, floats, complex numbers, integer
//! matrices and one-variable functions, with a session-long variable
//! environment. [`Engine`] is the entry point: feed it one line at a time.

pub mod ast;
pub mod engine;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod util;

pub use ast::Span;
pub use engine::{Engine, EngineOutput};
pub use error::{ErrorKind, EvalError, Result};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a tracing subscriber, once, and only when `RUST_LOG` is set
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
