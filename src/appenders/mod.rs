//! Writer implementations and the default writer factory

pub mod console;
pub mod rotating_file;

pub use console::{ConsoleStream, ConsoleWriter};
pub use rotating_file::{RotatingFileWriter, RotationPolicy, RotationStrategy};

pub use crate::core::{WriteHandle, WriterFactory, WriterOptions};

use crate::core::Result;
use std::sync::Arc;

/// Rotating file per destination; `stdout` and `stderr` map to the console.
///
/// The rule-set name selects the rotation strategy, see
/// [`RotationStrategy::from_rule_name`].
pub fn default_writer_factory() -> WriterFactory {
    Arc::new(
        |rule_set_name: &str, destination: &str, options: &WriterOptions| -> Result<Arc<dyn WriteHandle>> {
            match destination {
                "stdout" => Ok(Arc::new(ConsoleWriter::stdout())),
                "stderr" => Ok(Arc::new(ConsoleWriter::stderr())),
                path => Ok(Arc::new(RotatingFileWriter::from_options(
                    rule_set_name,
                    path,
                    options,
                )?)),
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_factory_destinations() {
        let factory = default_writer_factory();
        let options = WriterOptions::new();

        let console = factory("never", "stderr", &options).unwrap();
        assert_eq!(console.destination(), "stderr");

        let dir = tempdir().unwrap();
        let path = dir.path().join("svc.log");
        let file = factory("daily", path.to_str().unwrap(), &options).unwrap();
        assert_eq!(file.destination(), path.to_str().unwrap());
        file.close().unwrap();

        assert!(factory("fortnightly", path.to_str().unwrap(), &options).is_err());
    }
}
