//! Custom serde helpers for proxy wire formats.

/// Deserializes a JSON string or bare number into a `String`.
///
/// The trade-history API sends amounts and prices as decimal strings such as
/// `"1.25"`, but some deployments emit bare numbers. `null` becomes an empty
/// string, which later parses to `NaN`.
pub mod string_or_number {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
        Null(()),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s,
            Raw::Num(n) => n.to_string(),
            Raw::Null(()) => String::new(),
        })
    }
}

/// Parse a decimal string, yielding `NaN` on malformed input.
///
/// One malformed record must not abort a whole fetch; the `NaN` propagates
/// into the affected wallet's totals instead.
pub fn parse_lenient_f64(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(f64::NAN)
}
