//! Default Configuration
//!
//! The interpolation marker pair and its validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CompilerError, Result};

static UNUSABLE_INTERPOLATION_REGEXPS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^$",    // empty
        r"\s",    // whitespace
        r"[<>]",  // html tag
        r"^//",   // comment
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpolationConfig {
    pub start: String,
    pub end: String,
}

impl InterpolationConfig {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        InterpolationConfig {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn from_array(markers: Option<&[String]>) -> Result<Self> {
        match markers {
            None => Ok(InterpolationConfig::default()),
            Some(m) => {
                if m.len() != 2 {
                    return Err(CompilerError::InvalidInterpolationConfig(
                        "Expected 'interpolation' to be an array, [start, end].".to_string(),
                    ));
                }
                let config = InterpolationConfig::new(m[0].clone(), m[1].clone());
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Reject markers the markup lexer could never match unambiguously.
    pub fn validate(&self) -> Result<()> {
        let unusable = UNUSABLE_INTERPOLATION_REGEXPS
            .iter()
            .any(|re| re.is_match(&self.start) || re.is_match(&self.end));
        if unusable {
            return Err(CompilerError::InvalidInterpolationConfig(format!(
                "['{}', '{}'] contains unusable interpolation symbol.",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        InterpolationConfig::new("{{", "}}")
    }
}
