//! Builds a [`DispatchCore`] from dispatch rules

use super::core::{DispatchCore, SubCore};
use super::level_filter::LevelFilter;
use super::rule::DispatchRule;
use super::shutdown::ShutdownHandle;
use crate::appenders::default_writer_factory;
use crate::core::{
    EncoderFactory, ErrorCallback, LoggerError, Result, WriteHandle, WriterFactory,
    WriterOptions,
};
use crate::encoders::default_encoder;
use std::collections::HashMap;
use std::sync::Arc;

/// Holds the writers created so far; releases them unless disarmed
struct CleanupGuard {
    writers: Vec<Arc<dyn WriteHandle>>,
    on_error: Option<ErrorCallback>,
    armed: bool,
}

impl CleanupGuard {
    fn new(on_error: Option<ErrorCallback>) -> Self {
        Self {
            writers: Vec::new(),
            on_error,
            armed: true,
        }
    }

    fn track(&mut self, writer: Arc<dyn WriteHandle>) {
        self.writers.push(writer);
    }

    fn disarm(mut self) -> Vec<Arc<dyn WriteHandle>> {
        self.armed = false;
        std::mem::take(&mut self.writers)
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // Release failures are reported through the callback; the build error wins
        let writers = std::mem::take(&mut self.writers);
        let _ = ShutdownHandle::new(writers, self.on_error.take()).shutdown();
    }
}

/// Build a fan-out core from `rules`.
///
/// Each valid rule gets a writer for `base_filename` plus its normalised
/// suffix, made by `writer_factory` (default: rotating file writer), and an
/// encoder from the rule, else `encoder_factory`, else JSON. Rules with no
/// severities are skipped. Rules resolving to the same destination share one
/// writer; the factory runs once per distinct destination.
///
/// # Errors
///
/// - `InvalidConfiguration` when no rule is valid; no writer is created.
/// - `WriterConstruction` when the factory fails; writers already created by
///   this call are flushed and closed first.
///
/// # Example
///
/// ```no_run
/// use logit::{build_dispatch_core, DispatchRule, LogLevel, WriterOptions};
///
/// let rules = vec![
///     DispatchRule::new("", [LogLevel::Debug, LogLevel::Info]),
///     DispatchRule::new("wf", [LogLevel::Warn, LogLevel::Error]),
/// ];
/// let (core, shutdown) =
///     build_dispatch_core("1hour", "/var/log/app.log", &rules, None, None, &WriterOptions::new())
///         .unwrap();
/// // ... emit through a Logger built on `core` ...
/// shutdown.shutdown().unwrap();
/// ```
pub fn build_dispatch_core(
    rule_set_name: &str,
    base_filename: &str,
    rules: &[DispatchRule],
    writer_factory: Option<WriterFactory>,
    encoder_factory: Option<EncoderFactory>,
    options: &WriterOptions,
) -> Result<(DispatchCore, ShutdownHandle)> {
    let valid: Vec<&DispatchRule> = rules.iter().filter(|r| r.is_valid()).collect();
    if valid.is_empty() {
        return Err(LoggerError::config(
            "DispatchRule",
            format!("rule set '{}' has no rule with any severity", rule_set_name),
        ));
    }

    let writer_factory = writer_factory.unwrap_or_else(default_writer_factory);
    let encoder_factory = encoder_factory.unwrap_or_else(default_encoder);

    let mut guard = CleanupGuard::new(options.on_error.clone());
    let mut opened: HashMap<String, Arc<dyn WriteHandle>> = HashMap::new();
    let mut subs = Vec::with_capacity(valid.len());

    for rule in valid {
        let destination = rule.destination(base_filename);
        let writer = match opened.get(&destination) {
            Some(writer) => Arc::clone(writer),
            None => {
                let writer = writer_factory(rule_set_name, &destination, options)
                    .map_err(|e| LoggerError::writer_construction(destination.clone(), e))?;
                guard.track(Arc::clone(&writer));
                opened.insert(destination, Arc::clone(&writer));
                writer
            }
        };

        let encoder = match &rule.encoder {
            Some(factory) => factory(),
            None => encoder_factory(),
        };
        subs.push(SubCore::new(
            encoder,
            writer,
            LevelFilter::new(rule.levels.iter().copied()),
        ));
    }

    let writers = guard.disarm();
    Ok((
        DispatchCore::new(subs, options.on_error.clone()),
        ShutdownHandle::new(writers, options.on_error.clone()),
    ))
}

/// [`build_dispatch_core`] with the default writer and encoder factories
pub fn build_default_core(
    rule_set_name: &str,
    base_filename: &str,
    rules: &[DispatchRule],
    options: &WriterOptions,
) -> Result<(DispatchCore, ShutdownHandle)> {
    build_dispatch_core(rule_set_name, base_filename, rules, None, None, options)
}
