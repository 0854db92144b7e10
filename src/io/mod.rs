//! DIMACS minimum-cost flow files and solution files.

mod dimacs;
mod solution;

pub use self::dimacs::{read_dimacs_min, read_dimacs_min_file, DimacsInstance};
pub use self::solution::{read_solution, write_solution, SolutionFile};

/// Failure while reading a `.min` or `.sol` file.
#[derive(Debug, thiserror::Error)]
pub enum DimacsError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl DimacsError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
