//! Expression tree and source locations

mod expr;
mod span;

pub use expr::*;
pub use span::*;
