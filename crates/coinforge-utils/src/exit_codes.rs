//! CLI exit codes for coinforge
//!
//! Exit codes are part of the CLI contract so wrappers and scripts can
//! react to specific failure classes without parsing stderr.

use crate::error::CoinforgeError;

/// Exit codes emitted by the coinforge CLI.
///
/// | Code | Meaning |
/// |------|---------|
/// | 0 | Success |
/// | 1 | Generic error |
/// | 2 | Configuration/CLI argument error |
/// | 3 | Launch plan validation error |
/// | 4 | Generation run failed (one or more tasks errored) |
/// | 5 | Project store error (not found, already exists, IO) |
/// | 70 | LLM backend error outside a generation run |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    GenericError,
    ConfigError,
    ValidationError,
    RunFailed,
    StoreError,
    LlmError,
}

impl ExitCode {
    /// Numeric value passed to `std::process::exit`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::GenericError => 1,
            Self::ConfigError => 2,
            Self::ValidationError => 3,
            Self::RunFailed => 4,
            Self::StoreError => 5,
            Self::LlmError => 70,
        }
    }

    /// Map a library error to its exit code.
    #[must_use]
    pub fn from_error(err: &CoinforgeError) -> Self {
        match err {
            CoinforgeError::Config(_) => Self::ConfigError,
            CoinforgeError::Validation(_) => Self::ValidationError,
            CoinforgeError::Task(_) => Self::RunFailed,
            CoinforgeError::Llm(_) => Self::LlmError,
            CoinforgeError::Store(_) => Self::StoreError,
            CoinforgeError::Io(_) => Self::GenericError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, LlmError, StoreError, ValidationError};

    #[test]
    fn exit_codes_are_stable() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GenericError.as_i32(), 1);
        assert_eq!(ExitCode::ConfigError.as_i32(), 2);
        assert_eq!(ExitCode::ValidationError.as_i32(), 3);
        assert_eq!(ExitCode::RunFailed.as_i32(), 4);
        assert_eq!(ExitCode::StoreError.as_i32(), 5);
        assert_eq!(ExitCode::LlmError.as_i32(), 70);
    }

    #[test]
    fn errors_map_to_expected_codes() {
        let cases: Vec<(CoinforgeError, ExitCode)> = vec![
            (
                ConfigError::MissingRequired("x".into()).into(),
                ExitCode::ConfigError,
            ),
            (
                ValidationError::MissingField { field: "name".into() }.into(),
                ExitCode::ValidationError,
            ),
            (LlmError::EmptyResponse.into(), ExitCode::LlmError),
            (
                StoreError::NotFound {
                    owner: "a".into(),
                    id: "b".into(),
                }
                .into(),
                ExitCode::StoreError,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(ExitCode::from_error(&err), code);
        }
    }
}
