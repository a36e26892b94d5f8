// This file is part of the terraform-provider-ncloud project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Deserialize;
use thiserror::Error;

/// `returnCode` of "no such instance / already deleted".
pub const NOT_FOUND_RETURN_CODE: &str = "5001017";

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid API endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("{action} request failed: {source}")]
    Transport {
        action: String,
        source: reqwest::Error,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("unable to decode {action} response: {source}")]
    Decode {
        action: String,
        source: serde_json::Error,
    },
    #[error("{action} response has no `{key}` payload")]
    MissingPayload { action: String, key: String },
}

impl SdkError {
    /// The API reported that the resource does not exist (any more).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_not_found())
    }
}

/// Error reported by the API itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{action} failed (HTTP {http_status}, returnCode {return_code}): {message}")]
pub struct ApiError {
    pub action: String,
    pub http_status: u16,
    pub return_code: String,
    pub message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope {
    response_error: Option<ResponseError>,
    error: Option<GatewayError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseError {
    #[serde(default)]
    return_code: serde_json::Value,
    #[serde(default)]
    return_message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayError {
    #[serde(default)]
    error_code: serde_json::Value,
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Option<String>,
}

/// `returnCode`s are strings in most payloads, numbers in some.
pub(crate) fn code_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(code) => Some(code.clone()),
        serde_json::Value::Number(code) => Some(code.to_string()),
        _ => None,
    }
}

impl ApiError {
    pub fn new(
        action: impl Into<String>,
        http_status: u16,
        return_code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            http_status,
            return_code: return_code.into(),
            message: message.into(),
        }
    }

    /// Build an error from a failed response body.
    pub fn from_body(action: &str, http_status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope {
                response_error: Some(error),
                ..
            }) => Self::new(
                action,
                http_status,
                code_string(&error.return_code).unwrap_or_default(),
                error.return_message,
            ),
            Ok(ErrorEnvelope {
                error: Some(error), ..
            }) => {
                let message = match error.details {
                    Some(details) if !details.is_empty() => {
                        format!("{}: {}", error.message, details)
                    }
                    _ => error.message,
                };
                Self::new(
                    action,
                    http_status,
                    code_string(&error.error_code).unwrap_or_default(),
                    message,
                )
            }
            // Unstructured body: only the not-found code is worth recognizing
            _ => {
                let return_code = if body.contains(NOT_FOUND_RETURN_CODE) {
                    NOT_FOUND_RETURN_CODE
                } else {
                    ""
                };
                Self::new(action, http_status, return_code, body.trim())
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.return_code == NOT_FOUND_RETURN_CODE
    }
}
