use std::fmt;

/// Errors produced by the ignore-rule subsystem.
///
/// Compilation and load-time errors abort rule-list construction; no partial
/// list is ever used for matching. Evaluation-time engine errors are fatal to
/// the walk. Every variant carries the offending text so the operator can
/// correct the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreError {
    /// Malformed rule text: bad modifier, unknown prefix, or bad syntax.
    InvalidRule {
        /// The rule text as given by the user.
        pattern: String,
        /// What was wrong with it.
        reason: String,
    },
    /// The underlying regex engine rejected the (translated) matcher source.
    PatternCompile {
        /// The rule text as given by the user.
        pattern: String,
        /// The matcher source handed to the engine.
        source: String,
        /// The engine's own report.
        message: String,
    },
    /// The persisted rule list has a corrupt header.
    InvalidListFormat {
        /// Description of the corruption.
        detail: String,
    },
    /// An insertion index beyond the current user-rule count.
    InvalidRange {
        /// The requested position.
        index: usize,
        /// The number of user rules currently in the list.
        len: usize,
    },
    /// Matcher invocation failed at evaluation time.
    ///
    /// This indicates a corrupted compiled matcher or rule view and is fatal:
    /// a tree walk cannot safely continue past it.
    MatchEngine {
        /// Description of the failure.
        detail: String,
    },
}

impl IgnoreError {
    /// Build an `InvalidRule` error from the offending text and a reason.
    #[must_use]
    pub fn invalid_rule(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    /// Get a short description of the error kind.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRule { .. } => "Invalid Rule",
            Self::PatternCompile { .. } => "Pattern Compile Error",
            Self::InvalidListFormat { .. } => "Invalid Rule List Format",
            Self::InvalidRange { .. } => "Invalid Range",
            Self::MatchEngine { .. } => "Match Engine Error",
        }
    }
}

impl fmt::Display for IgnoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRule { pattern, reason } => {
                write!(f, "invalid ignore rule '{pattern}': {reason}")
            }
            Self::PatternCompile {
                pattern,
                source,
                message,
            } => {
                write!(
                    f,
                    "pattern '{pattern}' not valid; compiled source <{source}>; engine says: {message}"
                )
            }
            Self::InvalidListFormat { detail } => {
                write!(f, "ignore list header is invalid: {detail}")
            }
            Self::InvalidRange { index, len } => {
                write!(
                    f,
                    "the position {index} where the pattern should be inserted is invalid (list has {len} user rules)"
                )
            }
            Self::MatchEngine { detail } => {
                write!(f, "match engine failure: {detail}")
            }
        }
    }
}

impl std::error::Error for IgnoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_offending_text() {
        let err = IgnoreError::invalid_rule("XYZ:foo", "unknown prefix");
        assert!(err.to_string().contains("XYZ:foo"));
        assert_eq!(err.error_type(), "Invalid Rule");
    }

    #[test]
    fn test_range_error_reports_bounds() {
        let err = IgnoreError::InvalidRange { index: 9, len: 2 };
        let msg = err.to_string();
        assert!(msg.contains('9'));
        assert!(msg.contains('2'));
    }
}
