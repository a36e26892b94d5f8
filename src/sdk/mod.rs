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

//! Signed client for the API gateway.
//!
//! Every call is a `GET {endpoint}/{service}/v2/{action}?{params}` answered by
//! a JSON document wrapping the payload under `{action}Response`.

use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, trace};
use url::Url;

mod error;
pub mod signer;
pub mod vmongodb;
pub mod vmysql;
pub mod vpc;
pub mod vredis;
pub mod vserver;

pub use error::{ApiError, SdkError};

const USER_AGENT: &str = concat!("terraform-provider-ncloud/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// `{"code": "...", "codeName": "..."}` objects used for statuses and enums.
/// Only the code is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonCode {
    #[serde(default)]
    pub code: String,
}

pub(crate) fn code_of(code: &Option<CommonCode>) -> &str {
    code.as_ref().map_or("", |code| code.code.as_str())
}

/// First element of a list payload; create calls answer with the new
/// resource as a one-element list.
pub(crate) fn single<T>(action: &str, key: &str, list: Vec<T>) -> Result<T, SdkError> {
    list.into_iter()
        .next()
        .ok_or_else(|| SdkError::MissingPayload {
            action: action.to_owned(),
            key: key.to_owned(),
        })
}

/// Query parameters of a call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(region_code: &str) -> Self {
        Self::new().set("regionCode", region_code)
    }

    pub fn set(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_owned(), value.to_string()));
        self
    }

    pub fn set_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    /// Lists are flattened as `key.1`, `key.2`, ...
    pub fn set_list<V: ToString>(mut self, key: &str, values: impl IntoIterator<Item = V>) -> Self {
        for (i, value) in values.into_iter().enumerate() {
            self.0.push((format!("{key}.{}", i + 1), value.to_string()));
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// HTTP client shared by every resource.
///
/// `reqwest::Client` pools its connections internally, so a single
/// `ApiClient` serves all concurrent operations.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoint: Url,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(endpoint: &str, credentials: Credentials) -> Result<Self, SdkError> {
        let mut endpoint = Url::parse(endpoint)?;
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|source| SdkError::Transport {
                action: "client setup".to_owned(),
                source,
            })?;
        Ok(Self {
            http,
            endpoint,
            credentials,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Perform `action` on `service` and decode its payload.
    pub async fn call<R: DeserializeOwned>(
        &self,
        service: &str,
        action: &str,
        params: &Params,
    ) -> Result<R, SdkError> {
        let mut url = self.endpoint.join(&format!("{service}/v2/{action}"))?;
        url.query_pairs_mut()
            .extend_pairs(params.iter())
            .append_pair("responseFormatType", "json");

        let uri = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_owned(),
        };
        let timestamp = signer::timestamp();
        let signature = signer::sign(
            "GET",
            &uri,
            &timestamp,
            &self.credentials.access_key,
            &self.credentials.secret_key,
        );

        debug!(service, action, "calling API");
        let transport = |source| SdkError::Transport {
            action: action.to_owned(),
            source,
        };
        let response = self
            .http
            .get(url)
            .header(signer::TIMESTAMP_HEADER, &timestamp)
            .header(signer::ACCESS_KEY_HEADER, &self.credentials.access_key)
            .header(signer::SIGNATURE_HEADER, signature)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        trace!(service, action, status = status.as_u16(), body = %body, "API response");

        if !status.is_success() {
            let err = ApiError::from_body(action, status.as_u16(), &body);
            debug!(service, action, return_code = %err.return_code, "API error");
            return Err(err.into());
        }
        decode(action, status.as_u16(), &body)
    }
}

fn decode<R: DeserializeOwned>(action: &str, http_status: u16, body: &str) -> Result<R, SdkError> {
    let decode_error = |source| SdkError::Decode {
        action: action.to_owned(),
        source,
    };
    let mut envelope: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(body).map_err(decode_error)?;

    let key = format!("{action}Response");
    let Some(payload) = envelope.remove(&key) else {
        // Some failures come back with a 200 and an error envelope
        if envelope.contains_key("responseError") || envelope.contains_key("error") {
            return Err(ApiError::from_body(action, http_status, body).into());
        }
        return Err(SdkError::MissingPayload {
            action: action.to_owned(),
            key,
        });
    };

    if let Some(code) = payload.get("returnCode").and_then(error::code_string) {
        if code != "0" {
            let message = payload
                .get("returnMessage")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default();
            return Err(ApiError::new(action, http_status, code, message).into());
        }
    }

    serde_json::from_value(payload).map_err(decode_error)
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::testing::{client, response};
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Regions {
        region_list: Vec<serde_json::Value>,
    }

    #[test]
    fn list_params_are_flattened() {
        let params = Params::region("KR")
            .set_list("accessControlGroupNoList", ["11", "12"])
            .set_opt("port", Some(6379))
            .set_opt::<String>("description", None);
        assert_eq!(
            params.iter().collect::<Vec<_>>(),
            vec![
                ("regionCode", "KR"),
                ("accessControlGroupNoList.1", "11"),
                ("accessControlGroupNoList.2", "12"),
                ("port", "6379"),
            ]
        );
    }

    #[test]
    fn secret_is_not_printed() {
        let credentials = Credentials {
            access_key: "AK".to_owned(),
            secret_key: "very secret".to_owned(),
        };
        assert!(!format!("{credentials:?}").contains("very secret"));
    }

    #[tokio::test]
    async fn signed_call_decodes_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vserver/v2/getRegionList"))
            .and(query_param("responseFormatType", "json"))
            .and(header_exists(signer::TIMESTAMP_HEADER))
            .and(header_exists(signer::SIGNATURE_HEADER))
            .and(wiremock::matchers::header(
                signer::ACCESS_KEY_HEADER,
                "ACCESSKEY",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(response(
                "getRegionList",
                json!({"regionList": [{"regionCode": "KR", "regionName": "Korea"}]}),
            )))
            .mount(&server)
            .await;

        let regions: Regions = client(&server)
            .call("vserver", "getRegionList", &Params::new())
            .await
            .unwrap();

        assert_eq!(regions.region_list.len(), 1);
    }

    #[tokio::test]
    async fn http_error_is_structured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vmysql/v2/getCloudMysqlInstanceDetail"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "responseError": {"returnCode": "5001017", "returnMessage": "no instance"}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .call::<serde_json::Value>(
                "vmysql",
                "getCloudMysqlInstanceDetail",
                &Params::region("KR").set("cloudMysqlInstanceNo", "1"),
            )
            .await
            .unwrap_err();

        assert!(err.is_not_found(), "{err}");
    }

    #[tokio::test]
    async fn non_zero_return_code_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vpc/v2/createVpc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "createVpcResponse": {"returnCode": "1000036", "returnMessage": "CIDR overlaps"}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .call::<serde_json::Value>("vpc", "createVpc", &Params::region("KR"))
            .await
            .unwrap_err();

        match err {
            SdkError::Api(err) => {
                assert_eq!(err.return_code, "1000036");
                assert_eq!(err.message, "CIDR overlaps");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"other": {}})))
            .mount(&server)
            .await;

        let err = client(&server)
            .call::<serde_json::Value>("vpc", "getVpcList", &Params::region("KR"))
            .await
            .unwrap_err();

        assert!(matches!(err, SdkError::MissingPayload { .. }), "{err}");
    }
}
