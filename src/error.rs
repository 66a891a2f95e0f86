//! Error types shared by every layer of the crate.
//!
//! Configuration problems are raised while a campaign is being built, before
//! any solver process exists. The only execution-time error is
//! [`CampaignError::Launch`]: non-zero exits and timeouts are recorded as
//! failed trials instead.

use std::path::PathBuf;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CampaignError>;

/// Errors produced while building or executing a campaign.
#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    /// An override names a hyperparameter that is not part of the schema.
    #[error("unknown hyperparameter `{name}`")]
    UnknownParameter { name: String },

    /// An override carries a value of the wrong type or range.
    #[error("invalid value for `{name}`: {reason}")]
    InvalidValue { name: String, reason: String },

    /// An override sets a hyperparameter the run mode never reads.
    #[error("hyperparameter `{name}` is not used in {mode} mode")]
    UnusedParameter { name: String, mode: String },

    /// The merged hyperparameter set is inconsistent for its mode.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The problem instance could not be described.
    #[error("invalid problem instance `{name}`: {reason}")]
    InvalidInstance { name: String, reason: String },

    /// A run mode string did not match any known mode.
    #[error("unknown run mode `{0}` (expected eas, ga or hybrid)")]
    UnknownMode(String),

    /// A campaign row failed to build.
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<CampaignError>,
    },

    /// The solver executable could not be started at all.
    #[error("failed to launch `{}`: {source}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A campaign definition file could not be read or parsed.
    #[error("campaign definition: {0}")]
    Definition(String),
}

impl CampaignError {
    /// Returns `true` for errors raised while building configurations.
    pub fn is_configuration(&self) -> bool {
        match self {
            CampaignError::Row { source, .. } => source.is_configuration(),
            CampaignError::Launch { .. } | CampaignError::Definition(_) => false,
            _ => true,
        }
    }

    /// Wraps an error with the index of the campaign row that produced it.
    pub(crate) fn at_row(self, row: usize) -> Self {
        CampaignError::Row {
            row,
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_wrapping_keeps_configuration_kind() {
        let err = CampaignError::UnknownParameter {
            name: "populaton_size".into(),
        }
        .at_row(3);
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "row 3: unknown hyperparameter `populaton_size`");
    }

    #[test]
    fn test_launch_is_not_configuration() {
        let err = CampaignError::Launch {
            program: PathBuf::from("/missing/solver"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(!err.is_configuration());
    }
}
