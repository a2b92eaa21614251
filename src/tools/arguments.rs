//! Typed access to tool call arguments.

use crate::error::RoundtableError;

/// Wrapper around tool call arguments providing typed extraction.
///
/// Arguments may arrive either as a JSON object or as a JSON-encoded string
/// (the wire form some backends produce); [`ToolArguments::parsed`] resolves
/// both to a value, rejecting strings that are not valid JSON.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Parse a raw JSON-encoded argument string.
    pub fn from_json_str(raw: &str) -> Result<Self, RoundtableError> {
        let value = serde_json::from_str(raw)
            .map_err(|e| RoundtableError::InvalidArgument(format!("arguments are not JSON: {e}")))?;
        Ok(Self { value })
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Resolve the arguments to a JSON value, decoding a string payload.
    pub fn parsed(&self) -> Result<serde_json::Value, RoundtableError> {
        match &self.value {
            serde_json::Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(serde_json::json!({}));
                }
                serde_json::from_str(trimmed).map_err(|e| {
                    RoundtableError::InvalidArgument(format!("arguments are not JSON: {e}"))
                })
            }
            other => Ok(other.clone()),
        }
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, RoundtableError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| RoundtableError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get a boolean argument.
    pub fn get_bool(&self, key: &str) -> Result<bool, RoundtableError> {
        self.value
            .get(key)
            .and_then(|v| v.as_bool())
            .ok_or_else(|| RoundtableError::InvalidArgument(format!("Missing boolean argument: {key}")))
    }

    /// Deserialize the entire arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, RoundtableError> {
        serde_json::from_value(self.parsed()?).map_err(|e| {
            RoundtableError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json_str_rejects_non_json() {
        let result = ToolArguments::from_json_str("draw me a fox");

        assert!(matches!(
            result,
            Err(RoundtableError::InvalidArgument(_))
        ));
    }

    #[test]
    fn parsed_decodes_string_payload() {
        let args = ToolArguments::new(serde_json::Value::String(
            r#"{"prompt": "a red fox"}"#.into(),
        ));

        let value = args.parsed().unwrap();

        assert_eq!(value["prompt"], "a red fox");
    }

    #[test]
    fn parsed_rejects_non_json_string_payload() {
        let args = ToolArguments::new(serde_json::Value::String("not json".into()));

        assert!(args.parsed().is_err());
    }

    #[test]
    fn get_str_returns_value() {
        let args = ToolArguments::new(serde_json::json!({ "prompt": "a red fox" }));

        assert_eq!(args.get_str("prompt").unwrap(), "a red fox");
        assert!(args.get_str("missing").is_err());
    }
}
