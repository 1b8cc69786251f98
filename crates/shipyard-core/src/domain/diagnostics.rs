//! Diagnostics - the configuration decoder's report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One problem found while decoding a configuration body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Zero or more decode errors.
///
/// An empty `Diagnostics` means the body was accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn error(summary: impl Into<String>) -> Self {
        let mut d = Self::new();
        d.push(summary, None::<String>);
        d
    }

    pub fn push(&mut self, summary: impl Into<String>, detail: Option<impl Into<String>>) {
        self.0.push(Diagnostic {
            summary: summary.into(),
            detail: detail.map(Into::into),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            f.write_str(&d.summary)?;
            if let Some(detail) = &d.detail {
                write!(f, ": {detail}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}
