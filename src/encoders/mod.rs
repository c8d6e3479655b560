//! Encoder implementations and factories

pub mod console;
pub mod json;

pub use console::ConsoleEncoder;
pub use json::JsonEncoder;

pub use crate::core::{Encoder, EncoderConfig, EncoderFactory, LevelEncoding};

use std::sync::Arc;

/// JSON with the dispatch preset (`ts`, ISO 8601 timestamps, lowercase levels)
pub fn default_encoder() -> EncoderFactory {
    json_encoder(EncoderConfig::dispatch())
}

pub fn json_encoder(config: EncoderConfig) -> EncoderFactory {
    Arc::new(move || Box::new(JsonEncoder::new(config.clone())) as Box<dyn Encoder>)
}

pub fn console_encoder(config: EncoderConfig) -> EncoderFactory {
    Arc::new(move || Box::new(ConsoleEncoder::new(config.clone())) as Box<dyn Encoder>)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factories_build_named_encoders() {
        assert_eq!(default_encoder()().name(), "json");
        assert_eq!(console_encoder(EncoderConfig::dispatch())().name(), "console");
    }
}
