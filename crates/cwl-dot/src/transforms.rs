use crate::CwlDotError;
use std::str::FromStr;

/// A literal substring replacement applied to identifiers before they are
/// written out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdRewrite {
    pub from: String,
    pub to: String,
}

impl IdRewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn apply(&self, id: &str) -> String {
        if self.from.is_empty() {
            return id.to_string();
        }
        id.replace(&self.from, &self.to)
    }
}

impl FromStr for IdRewrite {
    type Err = CwlDotError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (from, to) = raw.split_once('=').ok_or_else(|| {
            CwlDotError::Document(format!("rewrite '{raw}' must have the form FROM=TO"))
        })?;
        if from.is_empty() {
            return Err(CwlDotError::Document(format!(
                "rewrite '{raw}' has an empty FROM part"
            )));
        }
        Ok(Self::new(from, to))
    }
}

/// Applies `rewrites` in order; later rewrites see the output of earlier ones.
pub fn apply_rewrites(id: &str, rewrites: &[IdRewrite]) -> String {
    rewrites
        .iter()
        .fold(id.to_string(), |current, rewrite| rewrite.apply(&current))
}
