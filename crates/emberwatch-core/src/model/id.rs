// ── Emergency identity ──
//
// Ids are opaque strings minted by whichever side created the record:
// the document store (server-assigned document ids), the sample generator
// (`mock-N`), or the local board (`local-N`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier of an [`Emergency`](super::Emergency), stable for the
/// entity's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmergencyId(String);

impl EmergencyId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EmergencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EmergencyId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for EmergencyId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EmergencyId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for EmergencyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
