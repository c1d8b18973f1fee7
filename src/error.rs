//! Error types for the motion pipeline
//!
//! Provides a single comprehensive error type using thiserror, mirroring the
//! flat error-enum style used throughout this codebase's lineage.

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the motion pipeline
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed word, unmatched parenthesis, or numeric overflow while lexing a line
    #[error("parse error at line {line_number}{}: {reason}", column.map(|c| format!(", column {c}")).unwrap_or_default())]
    Parse {
        /// Source line number
        line_number: u32,
        /// Column within the line, if known
        column: Option<usize>,
        /// Human-readable reason
        reason: String,
    },

    /// Conflicting G-words within the same modal group on one line
    #[error("modal error at line {line_number}: {reason}")]
    Modal {
        /// Source line number
        line_number: u32,
        /// Human-readable reason
        reason: String,
    },

    /// Arc radius/center geometry failed validation
    #[error("arc geometry error at line {line_number}: {reason}")]
    ArcGeometry {
        /// Source line number
        line_number: u32,
        /// Human-readable reason
        reason: String,
    },

    /// A linear or arc move was commanded with no feedrate ever resolved
    #[error("unresolved feedrate at line {line_number}")]
    UnresolvedFeedrate {
        /// Source line number
        line_number: u32,
    },

    /// A primitive endpoint falls outside the configured soft-limit envelope
    #[error("soft limit violation at line {line_number}: axis {axis} value {value} outside [{min}, {max}]")]
    SoftLimitViolation {
        /// Source line number, if known
        line_number: Option<u32>,
        /// Axis name ("X", "Y", "Z", ...)
        axis: String,
        /// Offending value
        value: f64,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// The motion backend reported an unrecoverable error
    #[error("executor error: {0}")]
    Executor(String),

    /// An attempted controller state transition is not legal from the current state
    #[error("illegal state transition: {from} -> {event}")]
    IllegalStateTransition {
        /// The state the controller was in
        from: String,
        /// The event/method that was attempted
        event: String,
    },

    /// Generic configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Line number this error originated at, if any
    pub fn line_number(&self) -> Option<u32> {
        match self {
            Error::Parse { line_number, .. } => Some(*line_number),
            Error::Modal { line_number, .. } => Some(*line_number),
            Error::ArcGeometry { line_number, .. } => Some(*line_number),
            Error::UnresolvedFeedrate { line_number } => Some(*line_number),
            Error::SoftLimitViolation { line_number, .. } => *line_number,
            Error::Executor(_) | Error::IllegalStateTransition { .. } | Error::Config(_) => None,
        }
    }

    /// Create a parse error
    pub fn parse(line_number: u32, column: Option<usize>, reason: impl Into<String>) -> Self {
        Error::Parse {
            line_number,
            column,
            reason: reason.into(),
        }
    }

    /// Create a modal error
    pub fn modal(line_number: u32, reason: impl Into<String>) -> Self {
        Error::Modal {
            line_number,
            reason: reason.into(),
        }
    }

    /// Create an arc geometry error
    pub fn arc_geometry(line_number: u32, reason: impl Into<String>) -> Self {
        Error::ArcGeometry {
            line_number,
            reason: reason.into(),
        }
    }

    /// Create an executor error
    pub fn executor(msg: impl Into<String>) -> Self {
        Error::Executor(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse(5, Some(3), "unexpected character");
        let msg = format!("{err}");
        assert!(msg.contains("line 5"));
        assert!(msg.contains("column 3"));
    }

    #[test]
    fn test_line_number_extraction() {
        assert_eq!(Error::modal(7, "conflict").line_number(), Some(7));
        assert_eq!(Error::executor("backend down").line_number(), None);
    }
}
