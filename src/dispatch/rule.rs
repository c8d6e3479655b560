//! Dispatch rules

use crate::core::{EncoderFactory, LogLevel};
use std::collections::BTreeSet;
use std::fmt;

/// Routes a set of severities to `base_filename` + `suffix`.
///
/// # Example
///
/// ```
/// use logit::{DispatchRule, LogLevel};
///
/// let rules = vec![
///     DispatchRule::new("", [LogLevel::Debug, LogLevel::Info]),
///     DispatchRule::new("wf", [LogLevel::Warn, LogLevel::Error]),
/// ];
/// assert!(rules.iter().all(|r| r.is_valid()));
/// ```
#[derive(Clone, Default)]
pub struct DispatchRule {
    pub suffix: String,
    pub levels: BTreeSet<LogLevel>,
    /// Overrides the builder's encoder for this destination only
    pub encoder: Option<EncoderFactory>,
}

impl DispatchRule {
    pub fn new(suffix: impl Into<String>, levels: impl IntoIterator<Item = LogLevel>) -> Self {
        Self {
            suffix: suffix.into(),
            levels: levels.into_iter().collect(),
            encoder: None,
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.levels.insert(level);
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_encoder(mut self, encoder: EncoderFactory) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Rules without severities are skipped when building
    pub fn is_valid(&self) -> bool {
        !self.levels.is_empty()
    }

    /// `base` with this rule's suffix appended
    pub fn destination(&self, base: &str) -> String {
        format!("{}{}", base, normalize_suffix(&self.suffix))
    }
}

impl fmt::Debug for DispatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchRule")
            .field("suffix", &self.suffix)
            .field("levels", &self.levels)
            .field("encoder", &self.encoder.as_ref().map(|_| "<factory>"))
            .finish()
    }
}

/// `""` stays empty, anything else gets a leading dot if it lacks one
pub fn normalize_suffix(suffix: &str) -> String {
    if suffix.is_empty() || suffix.starts_with('.') {
        suffix.to_string()
    } else {
        format!(".{}", suffix)
    }
}
