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

use serde::{Deserialize, Serialize};
use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Block, Description};
use tf_provider::value::{Value, ValueList, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, schema::Schema};

use crate::sdk::vmysql::{role, CloudMysqlInstance, CreateCloudMysqlInstance};
use crate::timeouts::{Timeouts, WithTimeouts};
use crate::utils::{
    as_bool, as_i64, as_str, attribute, bool_value, number_value, require, string_list_type,
    string_list_value, string_value, unknown_if_null, OrKeep, WithSchema, WithValidate,
};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MysqlState<'a> {
    pub id: ValueString<'a>,
    pub vpc_no: ValueString<'a>,
    pub subnet_no: ValueString<'a>,
    pub service_name: ValueString<'a>,
    pub server_name_prefix: ValueString<'a>,
    pub user_name: ValueString<'a>,
    pub user_password: ValueString<'a>,
    pub host_ip: ValueString<'a>,
    pub database_name: ValueString<'a>,
    pub image_product_code: ValueString<'a>,
    pub product_code: ValueString<'a>,
    pub data_storage_type: ValueString<'a>,
    pub is_ha: Value<bool>,
    pub is_multi_zone: Value<bool>,
    pub is_storage_encryption: Value<bool>,
    pub is_backup: Value<bool>,
    pub backup_file_retention_period: ValueNumber,
    pub backup_time: ValueString<'a>,
    pub standby_master_subnet_no: ValueString<'a>,
    pub port: ValueNumber,
    pub engine_version: ValueString<'a>,
    pub access_control_group_no_list: ValueList<ValueString<'a>>,
    pub timeouts: Value<Timeouts<'a>>,
}

impl<'a> MysqlState<'a> {
    pub(super) fn request(&self, region_code: &str) -> CreateCloudMysqlInstance {
        let text = |value: &ValueString<'_>| as_str(value).unwrap_or_default().to_owned();
        let opt_text = |value: &ValueString<'_>| as_str(value).map(str::to_owned);
        CreateCloudMysqlInstance {
            region_code: region_code.to_owned(),
            vpc_no: text(&self.vpc_no),
            subnet_no: text(&self.subnet_no),
            service_name: text(&self.service_name),
            server_name_prefix: text(&self.server_name_prefix),
            user_name: text(&self.user_name),
            user_password: text(&self.user_password),
            host_ip: text(&self.host_ip),
            database_name: text(&self.database_name),
            image_product_code: opt_text(&self.image_product_code),
            product_code: opt_text(&self.product_code),
            data_storage_type_code: opt_text(&self.data_storage_type),
            is_ha: as_bool(&self.is_ha),
            is_multi_zone: as_bool(&self.is_multi_zone),
            is_storage_encryption: as_bool(&self.is_storage_encryption),
            is_backup: as_bool(&self.is_backup),
            backup_file_retention_period: as_i64(&self.backup_file_retention_period),
            backup_time: opt_text(&self.backup_time),
            standby_master_subnet_no: opt_text(&self.standby_master_subnet_no),
            port: as_i64(&self.port),
        }
    }

    pub(super) fn apply(&mut self, instance: CloudMysqlInstance) {
        if let Some(master) = instance.servers_with_role(role::MASTER).next() {
            self.subnet_no = string_value(master.subnet_no.clone()).or_keep(&self.subnet_no);
            self.product_code =
                string_value(master.cloud_mysql_product_code.clone()).or_keep(&self.product_code);
        }
        self.id = string_value(Some(instance.cloud_mysql_instance_no));
        self.service_name = string_value(Some(instance.cloud_mysql_service_name));
        self.vpc_no = string_value(instance.vpc_no).or_keep(&self.vpc_no);
        self.image_product_code =
            string_value(instance.cloud_mysql_image_product_code).or_keep(&self.image_product_code);
        self.is_ha = bool_value(instance.is_ha).or_keep(&self.is_ha);
        self.is_multi_zone = bool_value(instance.is_multi_zone).or_keep(&self.is_multi_zone);
        self.is_backup = bool_value(instance.is_backup).or_keep(&self.is_backup);
        self.backup_file_retention_period = number_value(instance.backup_file_retention_period)
            .or_keep(&self.backup_file_retention_period);
        self.backup_time = string_value(instance.backup_time).or_keep(&self.backup_time);
        self.port = number_value(instance.cloud_mysql_port).or_keep(&self.port);
        self.engine_version = string_value(instance.engine_version);
        self.access_control_group_no_list =
            string_list_value(instance.access_control_group_no_list);
    }

    pub(super) fn mark_computed_unknown(&mut self) {
        self.id = Value::Unknown;
        self.engine_version = Value::Unknown;
        self.access_control_group_no_list = Value::Unknown;
        unknown_if_null(&mut self.image_product_code);
        unknown_if_null(&mut self.product_code);
        unknown_if_null(&mut self.is_ha);
        unknown_if_null(&mut self.is_multi_zone);
        unknown_if_null(&mut self.is_backup);
        unknown_if_null(&mut self.backup_file_retention_period);
        unknown_if_null(&mut self.backup_time);
        unknown_if_null(&mut self.port);
    }
}

impl<'a> WithSchema for MysqlState<'a> {
    fn schema() -> Schema {
        let required = |description| {
            attribute(
                AttributeType::String,
                AttributeConstraint::Required,
                description,
            )
        };
        let optional = |attr_type, description| {
            attribute(attr_type, AttributeConstraint::Optional, description)
        };
        let optional_computed = |attr_type, description| {
            attribute(attr_type, AttributeConstraint::OptionalComputed, description)
        };
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Cloud DB for MySQL instance"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Instance number"),
                    "vpc_no" => required("VPC hosting the instance"),
                    "subnet_no" => required("Subnet of the master server"),
                    "service_name" => required("Service name, 3 to 30 characters"),
                    "server_name_prefix" => required("Prefix of the server names"),
                    "user_name" => required("Database user name"),
                    "user_password" => Attribute {
                        sensitive: true,
                        ..required("Database user password")
                    },
                    "host_ip" => required("Hosts allowed to connect as the user, e.g. `%` or `192.168.0.%`"),
                    "database_name" => required("Initial database"),
                    "image_product_code" => optional_computed(AttributeType::String, "Engine image, latest when omitted"),
                    "product_code" => optional_computed(AttributeType::String, "Server product code"),
                    "data_storage_type" => optional(AttributeType::String, "SSD or HDD"),
                    "is_ha" => optional_computed(AttributeType::Bool, "Run a standby master"),
                    "is_multi_zone" => optional_computed(AttributeType::Bool, "Spread master and standby over two zones"),
                    "is_storage_encryption" => optional(AttributeType::Bool, "Encrypt the data storage"),
                    "is_backup" => optional_computed(AttributeType::Bool, "Enable daily backups"),
                    "backup_file_retention_period" => optional_computed(AttributeType::Number, "Days of backup retention"),
                    "backup_time" => optional_computed(AttributeType::String, "Daily backup time, HH:mm"),
                    "standby_master_subnet_no" => optional(AttributeType::String, "Subnet of the standby master of a multi-zone instance"),
                    "port" => optional_computed(AttributeType::Number, "MySQL port"),
                    "engine_version" => attribute(AttributeType::String, AttributeConstraint::Computed, "MySQL version"),
                    "access_control_group_no_list" => attribute(
                        string_list_type(),
                        AttributeConstraint::Computed,
                        "Access control groups created for the instance",
                    ),
                },
                blocks: map! {
                    "timeouts" => Timeouts::block(),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for MysqlState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        for (name, value) in [
            ("vpc_no", &self.vpc_no),
            ("subnet_no", &self.subnet_no),
            ("service_name", &self.service_name),
            ("server_name_prefix", &self.server_name_prefix),
            ("user_name", &self.user_name),
            ("user_password", &self.user_password),
            ("host_ip", &self.host_ip),
            ("database_name", &self.database_name),
        ] {
            require(diags, &attr_path, name, value);
        }
        if as_bool(&self.is_multi_zone) == Some(true) {
            if as_bool(&self.is_ha) == Some(false) {
                diags.error(
                    "Invalid multi-zone configuration",
                    "`is_multi_zone` requires `is_ha`",
                    attr_path.clone().attribute("is_multi_zone"),
                );
            }
            if self.standby_master_subnet_no.is_null() {
                diags.error(
                    "Invalid multi-zone configuration",
                    "`standby_master_subnet_no` is required when `is_multi_zone` is set",
                    attr_path.clone().attribute("standby_master_subnet_no"),
                );
            }
        }
        if let Some(days) = as_i64(&self.backup_file_retention_period) {
            if !(1..=30).contains(&days) {
                diags.error(
                    "Invalid backup retention",
                    "Backups are kept between 1 and 30 days",
                    attr_path.clone().attribute("backup_file_retention_period"),
                );
            }
        }
        if let Value::Value(timeouts) = &self.timeouts {
            timeouts.validate(diags, attr_path.attribute("timeouts"));
        }
    }
}

impl<'a> WithTimeouts for MysqlState<'a> {
    fn timeouts(&self) -> &Value<Timeouts<'_>> {
        &self.timeouts
    }
}

/// `data "ncloud_mysql"`: lookup by id.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MysqlDataState<'a> {
    pub id: ValueString<'a>,
    pub service_name: ValueString<'a>,
    pub status: ValueString<'a>,
    pub engine_version: ValueString<'a>,
    pub vpc_no: ValueString<'a>,
    pub is_ha: Value<bool>,
    pub port: ValueNumber,
    pub access_control_group_no_list: ValueList<ValueString<'a>>,
    pub server_names: ValueList<ValueString<'a>>,
}

impl<'a> MysqlDataState<'a> {
    pub(super) fn apply(&mut self, instance: CloudMysqlInstance) {
        self.service_name = string_value(Some(instance.cloud_mysql_service_name));
        self.status = string_value(Some(instance.cloud_mysql_instance_status_name));
        self.engine_version = string_value(instance.engine_version);
        self.vpc_no = string_value(instance.vpc_no);
        self.is_ha = bool_value(instance.is_ha);
        self.port = number_value(instance.cloud_mysql_port);
        self.access_control_group_no_list =
            string_list_value(instance.access_control_group_no_list);
        self.server_names = string_list_value(
            instance
                .cloud_mysql_server_instance_list
                .into_iter()
                .map(|server| server.cloud_mysql_server_name)
                .collect(),
        );
    }
}

impl<'a> WithSchema for MysqlDataState<'a> {
    fn schema() -> Schema {
        let computed = |attr_type, description| {
            attribute(attr_type, AttributeConstraint::Computed, description)
        };
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Existing Cloud DB for MySQL instance"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Required, "Instance number"),
                    "service_name" => computed(AttributeType::String, "Service name"),
                    "status" => computed(AttributeType::String, "Status reported by the API"),
                    "engine_version" => computed(AttributeType::String, "MySQL version"),
                    "vpc_no" => computed(AttributeType::String, "VPC hosting the instance"),
                    "is_ha" => computed(AttributeType::Bool, "Whether a standby master runs"),
                    "port" => computed(AttributeType::Number, "MySQL port"),
                    "access_control_group_no_list" => computed(string_list_type(), "Access control groups"),
                    "server_names" => computed(string_list_type(), "Names of the servers"),
                },
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn set(value: &str) -> ValueString<'_> {
        Value::Value(Cow::Borrowed(value))
    }

    fn config() -> MysqlState<'static> {
        MysqlState {
            vpc_no: set("1"),
            subnet_no: set("2"),
            service_name: set("shop"),
            server_name_prefix: set("shop"),
            user_name: set("app"),
            user_password: set("Secret123!"),
            host_ip: set("%"),
            database_name: set("shop"),
            ..Default::default()
        }
    }

    #[test]
    fn multi_zone_needs_standby_subnet() {
        let mut diags = Diagnostics::default();
        MysqlState {
            is_multi_zone: Value::Value(true),
            is_ha: Value::Value(false),
            ..config()
        }
        .validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), 2);

        let mut diags = Diagnostics::default();
        MysqlState {
            is_multi_zone: Value::Value(true),
            standby_master_subnet_no: set("3"),
            ..config()
        }
        .validate(&mut diags, AttributePath::default());
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn apply_reads_master_server() {
        let instance: CloudMysqlInstance = serde_json::from_value(json!({
            "cloudMysqlInstanceNo": "500",
            "cloudMysqlServiceName": "shop",
            "isHa": true,
            "cloudMysqlPort": 3306,
            "cloudMysqlServerInstanceList": [
                {"cloudMysqlServerInstanceNo": "502", "cloudMysqlServerRole": {"code": "H"}, "subnetNo": "3"},
                {"cloudMysqlServerInstanceNo": "501", "cloudMysqlServerRole": {"code": "M"}, "subnetNo": "2",
                 "cloudMysqlProductCode": "SVR.VDBAS.STAND.C002.M008.NET.SSD.B050.G002"}
            ]
        }))
        .unwrap();

        let mut state = config();
        state.mark_computed_unknown();
        state.apply(instance);

        assert_eq!(state.id, set("500"));
        assert_eq!(state.subnet_no, set("2"));
        assert_eq!(state.is_ha, Value::Value(true));
        assert_eq!(state.port, Value::Value(3306));
        assert_eq!(state.backup_time, Value::Null);
        assert_eq!(state.user_password, set("Secret123!"));
    }
}
