//! Response envelope shared by every endpoint of the dashboard API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a payload came from the live upstream or was synthesized locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    #[default]
    Live,
    Mock,
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTag::Live => f.write_str("live"),
            SourceTag::Mock => f.write_str("mock"),
        }
    }
}

/// `{ success, data?, error?, source }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub source: SourceTag,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            source: SourceTag::Live,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            source: SourceTag::Live,
        }
    }

    /// Returns the payload when the envelope reports success and carries data.
    ///
    /// Otherwise returns the server-provided message, or a generic one.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err("response envelope carried no data".to_string()),
            (false, _) => Err(self
                .error
                .unwrap_or_else(|| "upstream reported failure".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn success_without_data_is_a_failure() {
        let env: ApiEnvelope<Value> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(env.into_result().is_err());
    }

    #[test]
    fn failure_carries_server_message() {
        let env: ApiEnvelope<Value> =
            serde_json::from_str(r#"{"success":false,"error":"rate limited","source":"live"}"#)
                .unwrap();
        assert_eq!(env.into_result().unwrap_err(), "rate limited");
    }

    #[test]
    fn source_defaults_to_live() {
        let env: ApiEnvelope<Value> =
            serde_json::from_str(r#"{"success":true,"data":[1,2]}"#).unwrap();
        assert_eq!(env.source, SourceTag::Live);
        assert_eq!(env.into_result().unwrap(), json!([1, 2]));
    }

    #[test]
    fn wire_shape() {
        let env = ApiEnvelope::ok(json!({"n": 1}));
        insta::assert_json_snapshot!(env, @r#"
        {
          "success": true,
          "data": {
            "n": 1
          },
          "source": "live"
        }
        "#);
    }
}
