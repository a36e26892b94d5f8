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

use crate::sdk::vpc::Vpc;
use crate::sdk::{code_of, ApiClient, SdkError};
use crate::wait::{phase::classify_status, Refresh};

mod data_source;
mod resource;
mod state;

pub use data_source::VpcDataSource;
pub use resource::VpcResource;

/// One poll of a VPC: its detail classified by status code.
async fn refresh(api: &ApiClient, region: &str, vpc_no: &str) -> Result<Refresh<Vpc>, SdkError> {
    Ok(match api.get_vpc(region, vpc_no).await? {
        Some(vpc) => {
            let phase = classify_status(code_of(&vpc.vpc_status));
            Refresh::found(vpc, phase)
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
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::ncloud_provider::{NcloudClient, ProviderContext};
    use crate::sdk::testing::{client, response};
    use crate::wait::phase;

    use super::state::VpcState;
    use super::*;

    fn resource(server: &MockServer) -> VpcResource {
        VpcResource::new(ProviderContext::configured(NcloudClient {
            api: client(server),
            regions: Default::default(),
            region: "KR".to_owned(),
        }))
    }

    fn vpc_list(action: &str, status: &str) -> serde_json::Value {
        response(
            action,
            json!({"vpcList": [{
                "vpcNo": "3812",
                "vpcName": "main",
                "ipv4CidrBlock": "10.0.0.0/16",
                "vpcStatus": {"code": status},
                "regionCode": "KR"
            }]}),
        )
    }

    #[tokio::test]
    async fn refresh_classifies_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vpc/v2/getVpcDetail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vpc_list("getVpcDetail", "TERMTING")))
            .mount(&server)
            .await;

        let refreshed = refresh(&client(&server), "KR", "3812").await.unwrap();
        assert_eq!(refreshed.phase, phase::DELETING);
        assert_eq!(refreshed.snapshot.unwrap().vpc_no, "3812");
    }

    #[tokio::test]
    async fn create_waits_until_running() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vpc/v2/createVpc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vpc_list("createVpc", "INIT")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vpc/v2/getVpcDetail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vpc_list("getVpcDetail", "RUN")))
            .expect(1)
            .mount(&server)
            .await;

        let planned = VpcState {
            id: Value::Unknown,
            name: Value::Unknown,
            ipv4_cidr_block: Value::Value(Cow::Borrowed("10.0.0.0/16")),
            status: Value::Unknown,
            timeouts: Value::Null,
        };
        let mut diags = Diagnostics::default();
        let (state, _) = resource(&server)
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
        assert_eq!(state.id, Value::Value(Cow::Borrowed("3812")));
        assert_eq!(state.name, Value::Value(Cow::Borrowed("main")));
        assert_eq!(state.status, Value::Value(Cow::Borrowed("RUN")));
    }

    #[tokio::test]
    async fn destroy_accepts_not_found_as_deleted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vpc/v2/deleteVpc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vpc_list("deleteVpc", "TERMTING")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vpc/v2/getVpcDetail"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "responseError": {"returnCode": "5001017", "returnMessage": "VPC not found"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = VpcState {
            id: Value::Value(Cow::Borrowed("3812")),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        let destroyed = resource(&server)
            .destroy(&mut diags, state, Default::default(), Default::default())
            .await;

        assert_eq!(destroyed, Some(()));
        assert!(diags.errors.is_empty());
    }

    #[tokio::test]
    async fn read_of_missing_vpc_removes_it() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vpc/v2/getVpcDetail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response(
                "getVpcDetail",
                json!({"vpcList": []}),
            )))
            .mount(&server)
            .await;

        let state = VpcState {
            id: Value::Value(Cow::Borrowed("3812")),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        let read = resource(&server)
            .read(&mut diags, state, Default::default(), Default::default())
            .await;

        assert!(read.is_none());
        assert!(diags.errors.is_empty());
    }
}
