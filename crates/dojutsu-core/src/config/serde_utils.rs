//! Serde helpers for configuration types

/// Duration stored as a number of seconds
///
/// Whole durations serialize as integers so the TOML stays readable;
/// sub-second durations serialize as floats. Both forms deserialize.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Config {
///     #[serde(with = "dojutsu_core::config::serde_utils::duration_secs")]
///     timeout: Duration,
/// }
/// ```
pub mod duration_secs {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serialize a Duration as seconds
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_nanos() == 0 {
            serializer.serialize_u64(duration.as_secs())
        } else {
            serializer.serialize_f64(duration.as_secs_f64())
        }
    }

    /// Deserialize a Duration from integer or fractional seconds
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(de::Error::custom(format!(
                "duration must be a non-negative number of seconds, got {}",
                secs
            )));
        }
        Duration::try_from_secs_f64(secs).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Limits {
        #[serde(with = "duration_secs")]
        timeout: Duration,
    }

    #[test]
    fn test_whole_seconds_serialize_as_integer() {
        let limits = Limits {
            timeout: Duration::from_secs(120),
        };
        assert_eq!(serde_json::to_string(&limits).unwrap(), r#"{"timeout":120}"#);
    }

    #[test]
    fn test_fractional_seconds() {
        let limits = Limits {
            timeout: Duration::from_millis(1500),
        };
        let json = serde_json::to_string(&limits).unwrap();
        assert_eq!(json, r#"{"timeout":1.5}"#);
        assert_eq!(serde_json::from_str::<Limits>(&json).unwrap(), limits);
    }

    #[test]
    fn test_integer_from_toml() {
        let limits: Limits = toml::from_str("timeout = 30").unwrap();
        assert_eq!(limits.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = toml::from_str::<Limits>("timeout = 1e30").unwrap_err();
        assert!(err.to_string().contains("too big"), "{}", err);
    }

    #[test]
    fn test_negative_rejected() {
        let err = serde_json::from_str::<Limits>(r#"{"timeout":-1}"#).unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }
}
