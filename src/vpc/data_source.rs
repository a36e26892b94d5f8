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

use super::state::VpcDataState;

#[derive(Debug)]
pub struct VpcDataSource {
    context: Arc<ProviderContext>,
}

impl VpcDataSource {
    pub fn new(context: Arc<ProviderContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl DataSource for VpcDataSource {
    type State<'a> = VpcDataState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(VpcDataState::schema())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.context.client(diags)?;
        let Some(vpc_no) = as_str(&config.id).map(str::to_owned) else {
            diags.error_short("`id` is required", AttributePath::new("id"));
            return None;
        };

        match client.api.get_vpc(&client.region, &vpc_no).await {
            Ok(Some(vpc)) => {
                let mut state = config;
                state.apply(vpc);
                Some(state)
            }
            Ok(None) => {
                diags.error_short(format!("VPC {vpc_no} not found"), AttributePath::new("id"));
                None
            }
            Err(err) => {
                diags.error("Failed to read VPC", err.to_string(), AttributePath::new("id"));
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

    fn data_source(server: &MockServer) -> VpcDataSource {
        VpcDataSource::new(ProviderContext::configured(NcloudClient {
            api: client(server),
            regions: Default::default(),
            region: "KR".to_owned(),
        }))
    }

    async fn mock_detail(server: &MockServer, vpcs: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/vpc/v2/getVpcDetail"))
            .and(query_param("vpcNo", "3812"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(response("getVpcDetail", json!({ "vpcList": vpcs }))),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    fn lookup() -> VpcDataState<'static> {
        VpcDataState {
            id: Value::Value(Cow::Borrowed("3812")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn read_fills_computed_attributes() {
        let server = MockServer::start().await;
        mock_detail(
            &server,
            json!([{
                "vpcNo": "3812",
                "vpcName": "main",
                "ipv4CidrBlock": "10.0.0.0/16",
                "vpcStatus": {"code": "RUN"},
                "regionCode": "KR"
            }]),
        )
        .await;

        let mut diags = Diagnostics::default();
        let state = data_source(&server)
            .read(&mut diags, lookup(), Default::default())
            .await
            .unwrap();

        assert!(diags.errors.is_empty());
        assert_eq!(state.name, Value::Value(Cow::Borrowed("main")));
        assert_eq!(state.ipv4_cidr_block, Value::Value(Cow::Borrowed("10.0.0.0/16")));
        assert_eq!(state.status, Value::Value(Cow::Borrowed("RUN")));
        assert_eq!(state.region_code, Value::Value(Cow::Borrowed("KR")));
    }

    #[tokio::test]
    async fn missing_vpc_is_an_error_on_id() {
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
