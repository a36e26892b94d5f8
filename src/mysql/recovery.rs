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
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::sdk::vmysql::{role, CloudMysqlServerInstance, CreateCloudMysqlRecoveryInstance};
use crate::sdk::{ApiClient, SdkError};
use crate::timeouts::{Timeouts, WithTimeouts};
use crate::utils::{
    as_str, attribute, replace_if_changed, require, string_value, unknown_if_null, OrKeep,
    WithSchema, WithValidate,
};

use super::server::{MysqlServerResource, ServerRole, ServerState};

/// Layout of `recovery_time`, e.g. `2024-03-01T10:00:00+0900`
const RECOVERY_TIME_FORMAT: &[FormatItem<'_>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
);

/// Server restored from a backup or a point in time of a MySQL instance.
#[derive(Debug, Default)]
pub struct Recovery;

pub type MysqlRecoveryResource = MysqlServerResource<Recovery>;

#[async_trait]
impl ServerRole for Recovery {
    const ROLE: &'static str = role::RECOVERY;
    const NAME: &'static str = "MySQL recovery server";

    type State<'a> = MysqlRecoveryState<'a>;

    async fn create<'a>(
        api: &ApiClient,
        region: &str,
        instance_no: &str,
        state: &Self::State<'a>,
    ) -> Result<(), SdkError> {
        let text = |value: &ValueString<'_>| as_str(value).map(str::to_owned);
        api.create_mysql_recovery(&CreateCloudMysqlRecoveryInstance {
            region_code: region.to_owned(),
            instance_no: instance_no.to_owned(),
            recovery_server_name: text(&state.recovery_server_name).unwrap_or_default(),
            subnet_no: text(&state.subnet_no),
            recovery_time: text(&state.recovery_time),
            file_name: text(&state.file_name),
        })
        .await
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MysqlRecoveryState<'a> {
    pub id: ValueString<'a>,
    pub mysql_instance_no: ValueString<'a>,
    pub recovery_server_name: ValueString<'a>,
    pub subnet_no: ValueString<'a>,
    pub recovery_time: ValueString<'a>,
    pub file_name: ValueString<'a>,
    pub server_name: ValueString<'a>,
    pub zone_code: ValueString<'a>,
    pub private_domain: ValueString<'a>,
    pub timeouts: Value<Timeouts<'a>>,
}

impl<'a> ServerState for MysqlRecoveryState<'a> {
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
        if self.recovery_server_name.is_null() {
            self.recovery_server_name = self.server_name.clone();
        }
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
        for (name, prior, proposed) in [
            ("mysql_instance_no", &self.mysql_instance_no, &proposed.mysql_instance_no),
            (
                "recovery_server_name",
                &self.recovery_server_name,
                &proposed.recovery_server_name,
            ),
            ("subnet_no", &self.subnet_no, &proposed.subnet_no),
            ("recovery_time", &self.recovery_time, &proposed.recovery_time),
            ("file_name", &self.file_name, &proposed.file_name),
        ] {
            replace_if_changed(&mut paths, name, prior, proposed);
        }
        paths
    }
}

impl<'a> WithSchema for MysqlRecoveryState<'a> {
    fn schema() -> Schema {
        let computed = |description| {
            attribute(
                AttributeType::String,
                AttributeConstraint::Computed,
                description,
            )
        };
        let optional = |description| {
            attribute(
                AttributeType::String,
                AttributeConstraint::Optional,
                description,
            )
        };
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Recovery server of a MySQL instance"),
                attributes: map! {
                    "id" => computed("Server instance number"),
                    "mysql_instance_no" => attribute(AttributeType::String, AttributeConstraint::Required, "Parent MySQL instance"),
                    "recovery_server_name" => attribute(AttributeType::String, AttributeConstraint::Required, "Name of the recovery server"),
                    "subnet_no" => attribute(AttributeType::String, AttributeConstraint::OptionalComputed, "Subnet of the recovery server"),
                    "recovery_time" => optional("Point in time to restore, `yyyy-MM-ddTHH:mm:ss+0900`"),
                    "file_name" => optional("Backup file to restore"),
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

impl<'a> WithValidate for MysqlRecoveryState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        require(diags, &attr_path, "mysql_instance_no", &self.mysql_instance_no);
        require(
            diags,
            &attr_path,
            "recovery_server_name",
            &self.recovery_server_name,
        );

        match (&self.recovery_time, &self.file_name) {
            (Value::Null, Value::Null) => diags.error_short(
                "One of `recovery_time` or `file_name` is required",
                attr_path.clone().attribute("recovery_time"),
            ),
            (Value::Value(_), Value::Value(_)) => diags.error_short(
                "`recovery_time` and `file_name` are mutually exclusive",
                attr_path.clone().attribute("file_name"),
            ),
            _ => (),
        }
        if let Some(recovery_time) = as_str(&self.recovery_time) {
            if let Err(err) = OffsetDateTime::parse(recovery_time, RECOVERY_TIME_FORMAT) {
                diags.error(
                    "Invalid recovery time",
                    format!("`{recovery_time}` is not `yyyy-MM-ddTHH:mm:ss+0900`: {err}"),
                    attr_path.clone().attribute("recovery_time"),
                );
            }
        }

        if let Value::Value(timeouts) = &self.timeouts {
            timeouts.validate(diags, attr_path.attribute("timeouts"));
        }
    }
}

impl<'a> WithTimeouts for MysqlRecoveryState<'a> {
    fn timeouts(&self) -> &Value<Timeouts<'_>> {
        &self.timeouts
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;
    use tf_provider::Resource;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::ncloud_provider::{NcloudClient, ProviderContext};
    use crate::sdk::testing::{client, response};

    use super::super::tests::instance;
    use super::*;

    fn set(value: &'static str) -> ValueString<'static> {
        Value::Value(Cow::Borrowed(value))
    }

    fn config(
        recovery_time: ValueString<'static>,
        file_name: ValueString<'static>,
    ) -> MysqlRecoveryState<'static> {
        MysqlRecoveryState {
            mysql_instance_no: set("500"),
            recovery_server_name: set("restore-1"),
            recovery_time,
            file_name,
            ..Default::default()
        }
    }

    #[test_case(set("2024-03-01T10:00:00+0900"), Value::Null, 0; "point in time")]
    #[test_case(Value::Null, set("20240301.tar.gz"), 0; "backup file")]
    #[test_case(Value::Null, Value::Null, 1; "neither")]
    #[test_case(set("2024-03-01T10:00:00+0900"), set("20240301.tar.gz"), 1; "both")]
    #[test_case(set("2024-03-01 10:00"), Value::Null, 1; "malformed time")]
    fn recovery_source(
        recovery_time: ValueString<'static>,
        file_name: ValueString<'static>,
        errors: usize,
    ) {
        let mut diags = Diagnostics::default();
        config(recovery_time, file_name).validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), errors);
    }

    #[tokio::test]
    async fn destroy_waits_for_server_removal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vmysql/v2/deleteCloudMysqlServerInstance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response(
                "deleteCloudMysqlServerInstance",
                json!({"cloudMysqlInstanceList": []}),
            )))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vmysql/v2/getCloudMysqlInstanceDetail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance(
                "NULL",
                json!([{"cloudMysqlServerInstanceNo": "501", "cloudMysqlServerRole": {"code": "M"}}]),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let resource = MysqlRecoveryResource::new(ProviderContext::configured(NcloudClient {
            api: client(&server),
            regions: Default::default(),
            region: "KR".to_owned(),
        }));
        let state = MysqlRecoveryState::imported("500".to_owned(), "505".to_owned());
        let mut diags = Diagnostics::default();
        let destroyed = resource
            .destroy(&mut diags, state, Default::default(), Default::default())
            .await;

        assert_eq!(destroyed, Some(()));
        assert!(diags.errors.is_empty());
    }
}
