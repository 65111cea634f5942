use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Whether a split is still editable or has been locked.
///
/// The only transition is `Draft -> Finalized`, performed by
/// [`Split::finalize`](super::Split::finalize).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStatus {
    #[default]
    Draft,
    Finalized,
}

impl SplitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitStatus::Draft => "draft",
            SplitStatus::Finalized => "finalized",
        }
    }
}

impl fmt::Display for SplitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(SplitStatus::Draft),
            "finalized" => Ok(SplitStatus::Finalized),
            other => Err(DomainError::validation(format!(
                "unknown split status: {}",
                other
            ))),
        }
    }
}
