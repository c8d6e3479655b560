//! JSON encoder for structured logging

use crate::core::{Encoder, EncoderConfig, LogEntry, Result};
use serde::ser::{SerializeMap, Serializer};

/// One JSON object per line (JSONL), compatible with log aggregation tools
/// like ELK and Loki.
///
/// Reserved keys come first (`ts`, `level`, `logger`, `caller`, `msg`), then the
/// record's fields in merged order, then the stack trace if present.
#[derive(Debug, Clone, Default)]
pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl Encoder for JsonEncoder {
    fn encode(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        let cfg = &self.config;
        let mut buf = Vec::with_capacity(256);

        let mut ser = serde_json::Serializer::new(&mut buf);
        let mut map = ser.serialize_map(None)?;

        if !cfg.time_key.is_empty() {
            let ts = cfg.timestamp_format.to_json_value(&entry.timestamp);
            map.serialize_entry(&cfg.time_key, &ts)?;
        }
        if !cfg.level_key.is_empty() {
            map.serialize_entry(&cfg.level_key, cfg.level_encoding.render(entry.level))?;
        }
        if let (false, Some(name)) = (cfg.name_key.is_empty(), &entry.logger_name) {
            map.serialize_entry(&cfg.name_key, name)?;
        }
        if let (false, Some(caller)) = (cfg.caller_key.is_empty(), &entry.caller) {
            map.serialize_entry(&cfg.caller_key, &caller.short())?;
        }
        if !cfg.message_key.is_empty() {
            map.serialize_entry(&cfg.message_key, &entry.message)?;
        }
        for field in &entry.fields {
            map.serialize_entry(&field.key, &field.value)?;
        }
        if let (false, Some(stack)) = (cfg.stacktrace_key.is_empty(), &entry.stack) {
            map.serialize_entry(&cfg.stacktrace_key, stack)?;
        }
        map.end()?;

        buf.extend_from_slice(cfg.line_ending.as_bytes());
        Ok(buf)
    }

    fn name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Caller, Field, LogLevel, TimestampFormat};

    fn encode_line(encoder: &JsonEncoder, entry: &LogEntry) -> String {
        String::from_utf8(encoder.encode(entry).unwrap()).unwrap()
    }

    #[test]
    fn test_reserved_keys_and_fields() {
        let encoder = JsonEncoder::new(EncoderConfig::dispatch());
        let entry = LogEntry::new(LogLevel::Info, "User logged in")
            .with_fields(vec![Field::new("user_id", 123), Field::new("action", "login")])
            .with_caller(Caller::new("src/handlers/auth.rs", 17));

        let line = encode_line(&encoder, &entry);
        assert!(line.ends_with('\n'));

        let parsed: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["msg"], "User logged in");
        assert_eq!(parsed["caller"], "handlers/auth.rs:17");
        assert_eq!(parsed["user_id"], 123);
        assert_eq!(parsed["action"], "login");
        assert!(parsed["ts"].is_string());
    }

    #[test]
    fn test_field_order_is_preserved() {
        let encoder = JsonEncoder::new(EncoderConfig::dispatch());
        let entry = LogEntry::new(LogLevel::Warn, "slow").with_fields(vec![
            Field::new("zeta", 1),
            Field::new("alpha", 2),
            Field::new("mid", 3),
        ]);

        let line = encode_line(&encoder, &entry);
        let zeta = line.find("\"zeta\"").unwrap();
        let alpha = line.find("\"alpha\"").unwrap();
        let mid = line.find("\"mid\"").unwrap();
        let msg = line.find("\"msg\"").unwrap();
        assert!(msg < zeta && zeta < alpha && alpha < mid);
    }

    #[test]
    fn test_file_preset_keys() {
        let config = EncoderConfig::file().with_timestamp_format(TimestampFormat::UnixMillis);
        let encoder = JsonEncoder::new(config);
        let entry = LogEntry::new(LogLevel::Error, "boom")
            .with_logger_name("billing")
            .with_stack("frame 0");

        let parsed: serde_json::Value =
            serde_json::from_str(encode_line(&encoder, &entry).trim_end()).unwrap();
        assert!(parsed["time"].is_number());
        assert_eq!(parsed["logger"], "billing");
        assert_eq!(parsed["stack"], "frame 0");
        assert!(parsed.get("ts").is_none());
    }

    #[test]
    fn test_empty_key_is_omitted() {
        let config = EncoderConfig::dispatch().with_time_key("");
        let encoder = JsonEncoder::new(config);
        let entry = LogEntry::new(LogLevel::Debug, "x");

        let parsed: serde_json::Value =
            serde_json::from_str(encode_line(&encoder, &entry).trim_end()).unwrap();
        assert!(parsed.get("ts").is_none());
        assert!(parsed.get("caller").is_none());
    }
}
