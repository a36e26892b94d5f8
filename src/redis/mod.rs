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

use std::time::Duration;

use crate::sdk::vredis::{CloudRedisConfigGroup, CloudRedisInstance};
use crate::sdk::{code_of, ApiClient, SdkError};
use crate::wait::phase::{self, classify_instance, classify_status};
use crate::wait::{Refresh, WaitConfig};

mod config_group;
mod data_source;
mod resource;
mod state;

pub use config_group::RedisConfigGroupResource;
pub use data_source::RedisDataSource;
pub use resource::RedisResource;

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(3);

const CREATE_WAIT: WaitConfig = WaitConfig::new(
    &[phase::CREATING, phase::SETTING_UP],
    &[phase::RUNNING],
)
.with_poll_interval(POLL_INTERVAL)
.with_min_poll_interval(MIN_POLL_INTERVAL);

const DELETE_WAIT: WaitConfig = WaitConfig::new(&[phase::DELETING], &[phase::DELETED])
    .with_poll_interval(POLL_INTERVAL)
    .with_min_poll_interval(MIN_POLL_INTERVAL);

// Config groups settle within seconds
const CONFIG_GROUP_CREATE_WAIT: WaitConfig = WaitConfig::new(&[phase::CREATING], &[phase::RUNNING])
    .with_poll_interval(Duration::from_secs(2));

const CONFIG_GROUP_DELETE_WAIT: WaitConfig = WaitConfig::new(&[phase::DELETING], &[phase::DELETED])
    .with_poll_interval(Duration::from_secs(2));

async fn refresh(
    api: &ApiClient,
    region: &str,
    instance_no: &str,
) -> Result<Refresh<CloudRedisInstance>, SdkError> {
    Ok(match api.get_redis_instance(region, instance_no).await? {
        Some(instance) => {
            let phase = classify_instance(
                code_of(&instance.cloud_redis_instance_status),
                code_of(&instance.cloud_redis_instance_operation),
            );
            Refresh::found(instance, phase)
        }
        None => Refresh::gone(),
    })
}

async fn refresh_config_group(
    api: &ApiClient,
    region: &str,
    config_group_no: &str,
) -> Result<Refresh<CloudRedisConfigGroup>, SdkError> {
    Ok(match api.get_redis_config_group(region, config_group_no).await? {
        Some(group) => {
            let phase = classify_status(code_of(&group.config_group_status));
            Refresh::found(group, phase)
        }
        None => Refresh::gone(),
    })
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tf_provider::value::Value;
    use tf_provider::{Diagnostics, Resource};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::ncloud_provider::{NcloudClient, ProviderContext};
    use crate::sdk::testing::{client, response};

    use super::state::RedisState;
    use super::*;

    fn instance(action: &str, status: &str, operation: &str) -> serde_json::Value {
        response(
            action,
            json!({"cloudRedisInstanceList": [{
                "cloudRedisInstanceNo": "700",
                "cloudRedisServiceName": "cache",
                "cloudRedisInstanceStatus": {"code": status},
                "cloudRedisInstanceOperation": {"code": operation},
                "mode": {"code": "SIMPLE"},
                "configGroupNo": "11",
                "engineVersion": "7.0.13",
                "vpcNo": "1",
                "cloudRedisPort": 6379,
                "isHa": false,
                "accessControlGroupNoList": ["88"],
                "cloudRedisServerInstanceList": [
                    {"cloudRedisServerInstanceNo": "701", "subnetNo": "2"}
                ]
            }]}),
        )
    }

    #[tokio::test]
    async fn refresh_classifies_instance() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vredis/v2/getCloudRedisInstanceDetail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance(
                "getCloudRedisInstanceDetail",
                "INIT",
                "CREAT",
            )))
            .mount(&server)
            .await;

        let refreshed = refresh(&client(&server), "KR", "700").await.unwrap();
        assert_eq!(refreshed.phase, phase::CREATING);
    }

    #[tokio::test]
    async fn refresh_config_group_uses_single_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vredis/v2/getCloudRedisConfigGroupList"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response(
                "getCloudRedisConfigGroupList",
                json!({"cloudRedisConfigGroupList": [
                    {"configGroupNo": "11", "configGroupName": "cache", "configGroupStatus": {"code": "RUN"}}
                ]}),
            )))
            .mount(&server)
            .await;
        let api = client(&server);

        let refreshed = refresh_config_group(&api, "KR", "11").await.unwrap();
        assert_eq!(refreshed.phase, phase::RUNNING);
        let refreshed = refresh_config_group(&api, "KR", "12").await.unwrap();
        assert_eq!(refreshed.phase, phase::DELETED);
        assert!(refreshed.snapshot.is_none());
    }

    #[tokio::test]
    async fn create_fills_computed_attributes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vredis/v2/createCloudRedisInstance"))
            .and(query_param("cloudRedisModeCode", "SIMPLE"))
            .and(query_param("configGroupNo", "11"))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance(
                "createCloudRedisInstance",
                "INIT",
                "CREAT",
            )))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vredis/v2/getCloudRedisInstanceDetail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance(
                "getCloudRedisInstanceDetail",
                "CREAT",
                "NULL",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let set = |value: &'static str| Value::Value(Cow::Borrowed(value));
        let mut planned = RedisState {
            vpc_no: set("1"),
            subnet_no: set("2"),
            service_name: set("cache"),
            server_name_prefix: set("cache"),
            mode: set("SIMPLE"),
            config_group_no: set("11"),
            ..Default::default()
        };
        planned.mark_computed_unknown();
        let resource = RedisResource::new(ProviderContext::configured(NcloudClient {
            api: client(&server),
            regions: Default::default(),
            region: "KR".to_owned(),
        }));
        let mut diags = Diagnostics::default();
        let (state, _) = resource
            .create(
                &mut diags,
                planned.clone(),
                planned,
                Default::default(),
                Default::default(),
            )
            .await
            .unwrap();

        assert!(diags.errors.is_empty());
        assert_eq!(state.id, set("700"));
        assert_eq!(state.port, Value::Value(6379));
        assert_eq!(state.is_ha, Value::Value(false));
        // Never reported, so the planned unknowns resolve to null
        assert_eq!(state.backup_time, Value::Null);
        assert_eq!(state.image_product_code, Value::Null);
    }
}
