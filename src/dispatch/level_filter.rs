//! Severity set membership

use crate::core::LogLevel;
use std::collections::BTreeSet;
use std::fmt;

/// Accepts exactly the severities it was built with.
///
/// This is not a threshold: a filter over `{Warn, Error}` rejects `Fatal`.
///
/// # Example
///
/// ```
/// use logit::{LevelFilter, LogLevel};
///
/// let filter = LevelFilter::new([LogLevel::Warn, LogLevel::Error]);
/// assert!(filter.accepts(LogLevel::Error));
/// assert!(!filter.accepts(LogLevel::Fatal));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelFilter {
    levels: BTreeSet<LogLevel>,
}

impl LevelFilter {
    pub fn new(levels: impl IntoIterator<Item = LogLevel>) -> Self {
        Self {
            levels: levels.into_iter().collect(),
        }
    }

    /// Every severity at or above `min`
    pub fn at_least(min: LogLevel) -> Self {
        Self::new(min.and_above())
    }

    #[inline]
    pub fn accepts(&self, level: LogLevel) -> bool {
        self.levels.contains(&level)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> impl Iterator<Item = LogLevel> + '_ {
        self.levels.iter().copied()
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.levels.iter().map(|l| l.to_str()).collect();
        write!(f, "{{{}}}", names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_not_threshold() {
        let filter = LevelFilter::new([LogLevel::Debug, LogLevel::Info]);
        assert!(filter.accepts(LogLevel::Debug));
        assert!(filter.accepts(LogLevel::Info));
        assert!(!filter.accepts(LogLevel::Warn));
        assert_eq!(filter.to_string(), "{DEBUG,INFO}");
    }

    #[test]
    fn test_at_least() {
        let filter = LevelFilter::at_least(LogLevel::Error);
        let levels: Vec<LogLevel> = filter.levels().collect();
        assert_eq!(levels, vec![LogLevel::Error, LogLevel::Panic, LogLevel::Fatal]);
        assert!(LevelFilter::new([]).is_empty());
    }
}
