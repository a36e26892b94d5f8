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

use std::borrow::Cow;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description};
use tf_provider::value::{Value, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, schema::Schema};

use crate::sdk::vmysql::{role, CloudMysqlServerInstance, CreateCloudMysqlSlaveInstance};
use crate::sdk::{ApiClient, SdkError};
use crate::timeouts::{Timeouts, WithTimeouts};
use crate::utils::{
    as_bool, as_str, attribute, replace_if_changed, require, string_value, unknown_if_null,
    OrKeep, WithSchema, WithValidate,
};

use super::server::{MysqlServerResource, ServerRole, ServerState};

/// Read replica of a MySQL instance.
#[derive(Debug, Default)]
pub struct Slave;

pub type MysqlSlaveResource = MysqlServerResource<Slave>;

#[async_trait]
impl ServerRole for Slave {
    const ROLE: &'static str = role::SLAVE;
    const NAME: &'static str = "MySQL slave server";

    type State<'a> = MysqlSlaveState<'a>;

    async fn create<'a>(
        api: &ApiClient,
        region: &str,
        instance_no: &str,
        state: &Self::State<'a>,
    ) -> Result<(), SdkError> {
        api.create_mysql_slave(&CreateCloudMysqlSlaveInstance {
            region_code: region.to_owned(),
            instance_no: instance_no.to_owned(),
            subnet_no: as_str(&state.subnet_no).map(str::to_owned),
            is_multi_zone: as_bool(&state.is_multi_zone),
        })
        .await
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MysqlSlaveState<'a> {
    pub id: ValueString<'a>,
    pub mysql_instance_no: ValueString<'a>,
    pub subnet_no: ValueString<'a>,
    pub is_multi_zone: Value<bool>,
    pub server_name: ValueString<'a>,
    pub zone_code: ValueString<'a>,
    pub private_domain: ValueString<'a>,
    pub timeouts: Value<Timeouts<'a>>,
}

impl<'a> ServerState for MysqlSlaveState<'a> {
    fn imported(instance_no: String, server_no: String) -> Self {
        Self {
            id: Value::Value(Cow::Owned(server_no)),
            mysql_instance_no: Value::Value(Cow::Owned(instance_no)),
            ..Default::default()
        }
    }

    fn instance_no(&self) -> Option<&str> {
        as_str(&self.mysql_instance_no)
    }

    fn server_no(&self) -> Option<&str> {
        as_str(&self.id)
    }

    fn apply(&mut self, server: &CloudMysqlServerInstance) {
        self.id = string_value(Some(server.cloud_mysql_server_instance_no.clone()));
        self.subnet_no = string_value(server.subnet_no.clone()).or_keep(&self.subnet_no);
        self.server_name = string_value(Some(server.cloud_mysql_server_name.clone()));
        self.zone_code = string_value(server.zone_code.clone());
        self.private_domain = string_value(server.private_domain.clone());
    }

    fn mark_computed_unknown(&mut self) {
        self.id = Value::Unknown;
        self.server_name = Value::Unknown;
        self.zone_code = Value::Unknown;
        self.private_domain = Value::Unknown;
        unknown_if_null(&mut self.subnet_no);
    }

    fn replaced_attributes(&self, proposed: &Self) -> Vec<AttributePath> {
        let mut paths = Vec::new();
        replace_if_changed(
            &mut paths,
            "mysql_instance_no",
            &self.mysql_instance_no,
            &proposed.mysql_instance_no,
        );
        replace_if_changed(&mut paths, "subnet_no", &self.subnet_no, &proposed.subnet_no);
        replace_if_changed(
            &mut paths,
            "is_multi_zone",
            &self.is_multi_zone,
            &proposed.is_multi_zone,
        );
        paths
    }
}

impl<'a> WithSchema for MysqlSlaveState<'a> {
    fn schema() -> Schema {
        let computed = |description| {
            attribute(
                AttributeType::String,
                AttributeConstraint::Computed,
                description,
            )
        };
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Read-only slave server of a MySQL instance"),
                attributes: map! {
                    "id" => computed("Server instance number"),
                    "mysql_instance_no" => attribute(AttributeType::String, AttributeConstraint::Required, "Parent MySQL instance"),
                    "subnet_no" => attribute(AttributeType::String, AttributeConstraint::OptionalComputed, "Subnet of the slave, the master's when omitted"),
                    "is_multi_zone" => attribute(AttributeType::Bool, AttributeConstraint::Optional, "Place the slave in another zone"),
                    "server_name" => computed("Server name"),
                    "zone_code" => computed("Zone hosting the server"),
                    "private_domain" => computed("Private domain of the server"),
                },
                blocks: map! {
                    "timeouts" => Timeouts::block(),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for MysqlSlaveState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        require(diags, &attr_path, "mysql_instance_no", &self.mysql_instance_no);
        if let Value::Value(timeouts) = &self.timeouts {
            timeouts.validate(diags, attr_path.attribute("timeouts"));
        }
    }
}

impl<'a> WithTimeouts for MysqlSlaveState<'a> {
    fn timeouts(&self) -> &Value<Timeouts<'_>> {
        &self.timeouts
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tf_provider::Resource;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::ncloud_provider::{NcloudClient, ProviderContext};
    use crate::sdk::testing::{client, response};

    use super::super::tests::instance;
    use super::*;

    fn resource(server: &MockServer) -> MysqlSlaveResource {
        MysqlSlaveResource::new(ProviderContext::configured(NcloudClient {
            api: client(server),
            regions: Default::default(),
            region: "KR".to_owned(),
        }))
    }

    fn set(value: &'static str) -> ValueString<'static> {
        Value::Value(Cow::Borrowed(value))
    }

    #[tokio::test]
    async fn create_picks_the_new_slave() {
        let server = MockServer::start().await;
        // First detail call lists the existing slave, later ones the new one too
        Mock::given(method("GET"))
            .and(path("/vmysql/v2/getCloudMysqlInstanceDetail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance(
                "NULL",
                json!([
                    {"cloudMysqlServerInstanceNo": "501", "cloudMysqlServerRole": {"code": "M"}},
                    {"cloudMysqlServerInstanceNo": "503", "cloudMysqlServerRole": {"code": "S"}}
                ]),
            )))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vmysql/v2/createCloudMysqlSlaveInstance"))
            .and(query_param("cloudMysqlInstanceNo", "500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response(
                "createCloudMysqlSlaveInstance",
                json!({"cloudMysqlInstanceList": []}),
            )))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vmysql/v2/getCloudMysqlInstanceDetail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance(
                "NULL",
                json!([
                    {"cloudMysqlServerInstanceNo": "501", "cloudMysqlServerRole": {"code": "M"}},
                    {"cloudMysqlServerInstanceNo": "503", "cloudMysqlServerRole": {"code": "S"}},
                    {"cloudMysqlServerInstanceNo": "504", "cloudMysqlServerRole": {"code": "S"},
                     "cloudMysqlServerName": "shop-s2", "subnetNo": "2", "zoneCode": "KR-1"}
                ]),
            )))
            .mount(&server)
            .await;

        let mut planned = MysqlSlaveState {
            mysql_instance_no: set("500"),
            ..Default::default()
        };
        planned.mark_computed_unknown();
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
        assert_eq!(state.id, set("504"));
        assert_eq!(state.server_name, set("shop-s2"));
        assert_eq!(state.subnet_no, set("2"));
        assert_eq!(state.private_domain, Value::Null);
    }

    #[tokio::test]
    async fn read_of_removed_slave_drops_it() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vmysql/v2/getCloudMysqlInstanceDetail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance(
                "NULL",
                json!([{"cloudMysqlServerInstanceNo": "501", "cloudMysqlServerRole": {"code": "M"}}]),
            )))
            .mount(&server)
            .await;

        let state = MysqlSlaveState::imported("500".to_owned(), "504".to_owned());
        let mut diags = Diagnostics::default();
        let read = resource(&server)
            .read(&mut diags, state, Default::default(), Default::default())
            .await;

        assert!(read.is_none());
        assert!(diags.errors.is_empty());
    }

    #[tokio::test]
    async fn import_needs_both_numbers() {
        let server = MockServer::start().await;
        let mut diags = Diagnostics::default();
        let imported = resource(&server)
            .import(&mut diags, "500:504".to_owned())
            .await
            .unwrap()
            .0;
        assert_eq!(imported.mysql_instance_no, set("500"));
        assert_eq!(imported.id, set("504"));

        assert!(resource(&server)
            .import(&mut diags, "504".to_owned())
            .await
            .is_none());
        assert_eq!(diags.errors.len(), 1);
    }
}
