//! This module defines `Settings`, the user-facing configuration of a simulation: the raw
//! instruction text, the tape seed, the blank symbol, the scheduler's rate limit and whether
//! records are pulled automatically. Settings are imported from and exported to JSON.

use crate::parser::parse_tape;
use crate::types::{TuringMachineError, DEFAULT_BLANK_SYMBOL};
use serde::{Deserialize, Serialize};

/// Instructions used when none are configured: walk right over `1`s and turn the first `0`
/// into a `1`.
pub const DEFAULT_INSTRUCTIONS: &str = "0(1) => 0(1) R\n0(0) => -1(1) S";
/// Tape seed used when none is configured.
pub const DEFAULT_TAPE: &str = "1 1 1 1 1 1 1 1";
/// Honored ticks per second when none is configured.
pub const DEFAULT_RATE_LIMIT: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Instruction block, one instruction per line.
    pub instructions: String,
    /// Whitespace-separated tape seed.
    pub tape: String,
    /// Symbol used to extend the tape.
    pub blank: String,
    /// Maximum number of automatically pulled records per second. Unbounded is
    /// `f64::INFINITY`, stored as `null`.
    #[serde(with = "unbounded_rate")]
    pub rate_limit: f64,
    /// Pull a record on every scheduler render.
    pub auto: bool,
}

/// JSON has no infinity: an unbounded rate limit is written as `null` and `null` reads back
/// as unbounded.
mod unbounded_rate {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(rate: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        rate.is_finite().then_some(*rate).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            tape: DEFAULT_TAPE.to_string(),
            blank: DEFAULT_BLANK_SYMBOL.to_string(),
            rate_limit: DEFAULT_RATE_LIMIT,
            auto: true,
        }
    }
}

impl Settings {
    /// Reads settings from JSON. Missing fields keep their defaults.
    ///
    /// # Returns
    ///
    /// * `Err(TuringMachineError::InvalidSettings)` if the source is not a JSON object or a
    ///   field has the wrong type.
    pub fn import(source: &str) -> Result<Self, TuringMachineError> {
        serde_json::from_str(source)
            .map_err(|e| TuringMachineError::InvalidSettings(e.to_string()))
    }

    /// Writes the settings as pretty-printed JSON.
    pub fn export(&self) -> Result<String, TuringMachineError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TuringMachineError::InvalidSettings(e.to_string()))
    }

    /// Checks values that deserialize fine but cannot drive a run.
    pub fn validate(&self) -> Result<(), TuringMachineError> {
        if !(self.rate_limit > 0.0) {
            return Err(TuringMachineError::InvalidRateLimit(self.rate_limit));
        }

        if self.blank.is_empty() || self.blank.contains(char::is_whitespace) {
            return Err(TuringMachineError::InvalidSettings(format!(
                "blank symbol '{}' must be a single non-empty token",
                self.blank
            )));
        }

        parse_tape(&self.tape).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.instructions, DEFAULT_INSTRUCTIONS);
        assert_eq!(settings.tape, DEFAULT_TAPE);
        assert_eq!(settings.blank, "0");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_import_partial() {
        let settings = Settings::import(r#"{ "tape": "1 0", "rateLimit": 10 }"#).unwrap();

        assert_eq!(settings.tape, "1 0");
        assert_eq!(settings.rate_limit, 10.0);
        assert_eq!(settings.instructions, DEFAULT_INSTRUCTIONS);
        assert!(settings.auto);
    }

    #[test]
    fn test_import_wrong_type() {
        let error = Settings::import(r#"{ "instructions": 42 }"#).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Type);

        let error = Settings::import("[1, 2]").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Type);
    }

    #[test]
    fn test_export_round_trip() {
        let settings = Settings {
            tape: "a b".to_string(),
            auto: false,
            ..Settings::default()
        };

        let json = settings.export().unwrap();
        assert!(json.contains("\"rateLimit\""));
        assert_eq!(Settings::import(&json).unwrap(), settings);
    }

    #[test]
    fn test_unbounded_rate_limit_round_trip() {
        let settings = Settings {
            rate_limit: f64::INFINITY,
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());

        let json = settings.export().unwrap();
        assert!(json.contains("\"rateLimit\": null"));
        assert_eq!(Settings::import(&json).unwrap(), settings);
    }

    #[test]
    fn test_import_null_rate_limit_is_unbounded() {
        let settings = Settings::import(r#"{ "rateLimit": null }"#).unwrap();
        assert_eq!(settings.rate_limit, f64::INFINITY);

        let settings = Settings::import("{}").unwrap();
        assert_eq!(settings.rate_limit, DEFAULT_RATE_LIMIT);
    }

    #[test]
    fn test_validate() {
        let mut settings = Settings {
            rate_limit: 0.0,
            ..Settings::default()
        };
        assert_eq!(settings.validate().unwrap_err().kind(), ErrorKind::Range);

        settings.rate_limit = 1.0;
        settings.blank = "a b".to_string();
        assert_eq!(settings.validate().unwrap_err().kind(), ErrorKind::Type);

        settings.blank = "_".to_string();
        settings.tape = " ".to_string();
        assert_eq!(settings.validate().unwrap_err().kind(), ErrorKind::Type);
    }
}
