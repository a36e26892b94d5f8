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

use std::sync::Arc;

use async_trait::async_trait;

use tf_provider::{AttributePath, DataSource, Diagnostics, schema::Schema, value::ValueEmpty};

use crate::ncloud_provider::ProviderContext;
use crate::utils::{as_str, WithSchema};

use super::state::RedisDataState;

#[derive(Debug)]
pub struct RedisDataSource {
    context: Arc<ProviderContext>,
}

impl RedisDataSource {
    pub fn new(context: Arc<ProviderContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl DataSource for RedisDataSource {
    type State<'a> = RedisDataState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(RedisDataState::schema())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.context.client(diags)?;
        let Some(instance_no) = as_str(&config.id).map(str::to_owned) else {
            diags.error_short("`id` is required", AttributePath::new("id"));
            return None;
        };

        match client
            .api
            .get_redis_instance(&client.region, &instance_no)
            .await
        {
            Ok(Some(instance)) => {
                let mut state = config;
                state.apply(instance);
                Some(state)
            }
            Ok(None) => {
                diags.error_short(
                    format!("Redis instance {instance_no} not found"),
                    AttributePath::new("id"),
                );
                None
            }
            Err(err) => {
                diags.error(
                    "Failed to read Redis instance",
                    err.to_string(),
                    AttributePath::new("id"),
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tf_provider::value::Value;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::ncloud_provider::{NcloudClient, ProviderContext};
    use crate::sdk::testing::{client, response};

    use super::*;

    fn data_source(server: &MockServer) -> RedisDataSource {
        RedisDataSource::new(ProviderContext::configured(NcloudClient {
            api: client(server),
            regions: Default::default(),
            region: "KR".to_owned(),
        }))
    }

    async fn mock_detail(server: &MockServer, instances: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/vredis/v2/getCloudRedisInstanceDetail"))
            .and(query_param("cloudRedisInstanceNo", "700"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response(
                "getCloudRedisInstanceDetail",
                json!({ "cloudRedisInstanceList": instances }),
            )))
            .expect(1)
            .mount(server)
            .await;
    }

    fn lookup() -> RedisDataState<'static> {
        RedisDataState {
            id: Value::Value(Cow::Borrowed("700")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn read_fills_computed_attributes() {
        let server = MockServer::start().await;
        mock_detail(
            &server,
            json!([{
                "cloudRedisInstanceNo": "700",
                "cloudRedisServiceName": "cache",
                "cloudRedisInstanceStatusName": "running",
                "mode": {"code": "CLUSTER"},
                "configGroupNo": "11",
                "cloudRedisPort": 6379,
                "accessControlGroupNoList": ["88", "89"]
            }]),
        )
        .await;

        let mut diags = Diagnostics::default();
        let state = data_source(&server)
            .read(&mut diags, lookup(), Default::default())
            .await
            .unwrap();

        let set = |value: &'static str| Value::Value(Cow::Borrowed(value));
        assert!(diags.errors.is_empty());
        assert_eq!(state.service_name, set("cache"));
        assert_eq!(state.mode, set("CLUSTER"));
        assert_eq!(state.config_group_no, set("11"));
        assert_eq!(state.port, Value::Value(6379));
        assert_eq!(
            state.access_control_group_no_list,
            Value::Value(vec![set("88"), set("89")])
        );
    }

    #[tokio::test]
    async fn missing_instance_is_an_error_on_id() {
        let server = MockServer::start().await;
        mock_detail(&server, json!([])).await;

        let mut diags = Diagnostics::default();
        let state = data_source(&server)
            .read(&mut diags, lookup(), Default::default())
            .await;

        assert_eq!(state, None);
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(diags.errors[0].attribute, AttributePath::new("id"));
    }
}
