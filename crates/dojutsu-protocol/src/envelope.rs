//! Request and response envelopes

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// Reserved response key signalling a failed operation
pub const ERROR_FIELD: &str = "error";

/// Request envelope sent to the daemon
///
/// Serializes as `{"package": ..., "function": ..., "args": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    package: String,
    function: String,
    args: Vec<String>,
}

impl Request {
    /// Create a request for `function` inside `package`
    ///
    /// Fails if the operation name is empty. Arguments are positional and
    /// kept in the order given.
    pub fn new<I, S>(
        package: impl Into<String>,
        function: impl Into<String>,
        args: I,
    ) -> Result<Self, ProtocolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let function = function.into();
        if function.trim().is_empty() {
            return Err(ProtocolError::EmptyOperation);
        }

        Ok(Self {
            package: package.into(),
            function,
            args: args.into_iter().map(Into::into).collect(),
        })
    }

    /// Target module identifier
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Operation name
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Positional arguments
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("Request serialization should not fail")
    }
}

/// Decoded response envelope
///
/// Every key except `error` is kept as-is. The protocol layer does not know
/// which fields an operation returns; callers pick the ones they expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    #[serde(flatten)]
    fields: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Response {
    /// Build a response from result fields and an optional error message
    ///
    /// An empty error message is treated as no error.
    pub fn new(fields: Map<String, Value>, error: Option<String>) -> Self {
        Self {
            fields,
            error: error.filter(|e| !e.is_empty()),
        }
    }

    /// Result fields, without the `error` key
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Error message reported by the daemon, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the daemon reported a failure
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Split into success or the daemon's error message
    pub fn into_result(self) -> Result<Self, String> {
        match self.error {
            Some(message) => Err(message),
            None => Ok(self),
        }
    }

    /// Raw value of a result field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String field
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Numeric field as a float
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    /// Numeric field as an unsigned integer
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.fields.get(key).and_then(Value::as_u64)
    }

    /// List-of-strings field
    ///
    /// Returns `None` if the field is missing, not an array, or contains a
    /// non-string element.
    pub fn get_strings(&self, key: &str) -> Option<Vec<&str>> {
        self.fields
            .get(key)?
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect()
    }

    /// Deserialize the result fields into a typed view
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.fields.clone()))
    }
}
