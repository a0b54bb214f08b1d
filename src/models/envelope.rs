// src/models/envelope.rs

//! The `{ code, message, data }` wrapper every JSON response uses.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};

/// Response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ApiEnvelope {
    /// Codes the server uses for success.
    pub fn is_success(&self) -> bool {
        self.code == 200 || self.code == 201
    }

    /// Fail with `Rejected` unless the envelope reports success.
    pub fn into_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            let message = if self.message.is_empty() {
                "request failed".to_string()
            } else {
                self.message
            };
            Err(AppError::rejected(self.code, message))
        }
    }

    /// Raw payload, failing when the server sent none.
    pub fn into_value(self, context: &str) -> Result<Value> {
        match self.data {
            Some(Value::Null) | None => Err(AppError::missing_data(context)),
            Some(value) => Ok(value),
        }
    }

    /// Typed payload, failing when the server sent none.
    pub fn into_data<T: DeserializeOwned>(self, context: &str) -> Result<T> {
        Ok(serde_json::from_value(self.into_value(context)?)?)
    }

    /// Typed payload, falling back to the default for an empty one.
    pub fn into_data_or_default<T: DeserializeOwned + Default>(self) -> Result<T> {
        match self.data {
            Some(Value::Null) | None => Ok(T::default()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: Value) -> ApiEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_success_codes() {
        assert!(envelope(json!({ "code": 200 })).is_success());
        assert!(envelope(json!({ "code": 201 })).is_success());
        assert!(!envelope(json!({ "code": 400 })).is_success());
    }

    #[test]
    fn test_rejected_carries_message() {
        let err = envelope(json!({ "code": 1001, "message": "状态冲突" }))
            .into_success()
            .unwrap_err();
        assert!(matches!(err, AppError::Rejected { code: 1001, ref message } if message == "状态冲突"));
    }

    #[test]
    fn test_null_data_is_missing() {
        let err = envelope(json!({ "code": 200, "data": null }))
            .into_value("history")
            .unwrap_err();
        assert!(matches!(err, AppError::MissingData(ref ctx) if ctx == "history"));
    }

    #[test]
    fn test_default_for_empty_data() {
        let list: Vec<u32> = envelope(json!({ "code": 200 })).into_data_or_default().unwrap();
        assert!(list.is_empty());
    }
}
