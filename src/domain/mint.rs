use crate::error::{AutoWithdrawError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an e-cash mint.
///
/// Normalized on construction: surrounding whitespace and trailing slashes are
/// stripped so that `https://mint.example/` and `https://mint.example` compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MintUrl(String);

impl MintUrl {
    pub fn new(url: impl AsRef<str>) -> Result<Self> {
        let normalized = url.as_ref().trim().trim_end_matches('/');
        if normalized.is_empty() {
            return Err(AutoWithdrawError::ValidationError(
                "Mint URL must not be empty".to_string(),
            ));
        }
        Ok(Self(normalized.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MintUrl {
    type Error = AutoWithdrawError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<MintUrl> for String {
    fn from(mint: MintUrl) -> Self {
        mint.0
    }
}

impl FromStr for MintUrl {
    type Err = AutoWithdrawError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for MintUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
