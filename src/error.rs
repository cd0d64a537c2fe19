//! The error type shared by SDD operations and homomorphism evaluation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// An operation tried to combine two incompatible levels, e.g. a union
    /// of nodes whose top variables disagree. `steps` is the trace of
    /// operator boundaries the error crossed, innermost first.
    #[error("incompatible levels: {what}{}", render_steps(.steps))]
    Top { what: String, steps: Vec<String> },

    /// A cons homomorphism was evaluated on something other than the `One`
    /// terminal.
    #[error("cons evaluated on a non-terminal operand")]
    ConsOnNonOne,

    /// Deep search for an identifier through an order found nothing.
    #[error("identifier {0:?} not found in the order")]
    IdentifierNotFound(String),

    /// A sum or an intersection was built with zero operands.
    #[error("empty operand list")]
    EmptyOperandList,

    /// An internal invariant was broken; this is never expected to be
    /// observed.
    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),
}

impl Error {
    pub(crate) fn top(what: impl Into<String>) -> Error {
        Error::Top {
            what: what.into(),
            steps: Vec::new(),
        }
    }

    /// Record the operator whose boundary this error just crossed.
    pub(crate) fn add_step(mut self, step: String) -> Error {
        if let Error::Top { steps, .. } = &mut self {
            steps.push(step);
        }
        self
    }

    /// The trace of operator steps of a `Top` error, innermost first.
    pub fn steps(&self) -> &[String] {
        match self {
            Error::Top { steps, .. } => steps,
            _ => &[],
        }
    }
}

fn render_steps(steps: &[String]) -> String {
    if steps.is_empty() {
        String::new()
    } else {
        format!(" in {}", steps.join(" <- "))
    }
}
