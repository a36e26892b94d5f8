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

use crate::sdk::vmongodb::{CloudMongoDbInstance, CreateCloudMongoDbInstance};
use crate::timeouts::{Timeouts, WithTimeouts};
use crate::utils::{
    as_i64, as_str, attribute, number_value, require, string_list_type, string_list_value,
    string_value, unknown_if_null, OrKeep, WithSchema, WithValidate,
};

const CLUSTER_TYPES: [&str; 3] = ["STAND_ALONE", "SINGLE_REPLICA_SET", "SHARDED_CLUSTER"];

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MongoDbState<'a> {
    pub id: ValueString<'a>,
    pub vpc_no: ValueString<'a>,
    pub subnet_no: ValueString<'a>,
    pub service_name: ValueString<'a>,
    pub server_name_prefix: ValueString<'a>,
    pub user_name: ValueString<'a>,
    pub user_password: ValueString<'a>,
    pub cluster_type_code: ValueString<'a>,
    pub image_product_code: ValueString<'a>,
    pub member_product_code: ValueString<'a>,
    pub mongos_product_code: ValueString<'a>,
    pub config_product_code: ValueString<'a>,
    pub member_server_count: ValueNumber,
    pub arbiter_server_count: ValueNumber,
    pub mongos_server_count: ValueNumber,
    pub config_server_count: ValueNumber,
    pub shard_count: ValueNumber,
    pub replica_set_name: ValueString<'a>,
    pub backup_file_retention_period: ValueNumber,
    pub backup_time: ValueString<'a>,
    pub data_storage_type: ValueString<'a>,
    pub member_port: ValueNumber,
    pub mongos_port: ValueNumber,
    pub config_port: ValueNumber,
    pub engine_version: ValueString<'a>,
    pub access_control_group_no_list: ValueList<ValueString<'a>>,
    pub timeouts: Value<Timeouts<'a>>,
}

impl<'a> MongoDbState<'a> {
    pub(super) fn request(&self, region_code: &str) -> CreateCloudMongoDbInstance {
        let text = |value: &ValueString<'_>| as_str(value).unwrap_or_default().to_owned();
        let opt_text = |value: &ValueString<'_>| as_str(value).map(str::to_owned);
        CreateCloudMongoDbInstance {
            region_code: region_code.to_owned(),
            vpc_no: text(&self.vpc_no),
            subnet_no: text(&self.subnet_no),
            service_name: text(&self.service_name),
            server_name_prefix: text(&self.server_name_prefix),
            user_name: text(&self.user_name),
            user_password: text(&self.user_password),
            cluster_type_code: text(&self.cluster_type_code),
            image_product_code: opt_text(&self.image_product_code),
            member_product_code: opt_text(&self.member_product_code),
            mongos_product_code: opt_text(&self.mongos_product_code),
            config_product_code: opt_text(&self.config_product_code),
            member_server_count: as_i64(&self.member_server_count),
            arbiter_server_count: as_i64(&self.arbiter_server_count),
            mongos_server_count: as_i64(&self.mongos_server_count),
            config_server_count: as_i64(&self.config_server_count),
            shard_count: as_i64(&self.shard_count),
            replica_set_name: opt_text(&self.replica_set_name),
            backup_file_retention_period: as_i64(&self.backup_file_retention_period),
            backup_time: opt_text(&self.backup_time),
            data_storage_type_code: opt_text(&self.data_storage_type),
            member_port: as_i64(&self.member_port),
            mongos_port: as_i64(&self.mongos_port),
            config_port: as_i64(&self.config_port),
            ..Default::default()
        }
    }

    /// Copy what the API reports; credentials and sizing inputs it does not
    /// echo back are left untouched.
    pub(super) fn apply(&mut self, instance: CloudMongoDbInstance) {
        self.cluster_type_code = string_value(instance.cluster_type.map(|code| code.code))
            .or_keep(&self.cluster_type_code);
        if let Some(member) = instance.cloud_mongo_db_server_instance_list.first() {
            self.subnet_no = string_value(member.subnet_no.clone()).or_keep(&self.subnet_no);
            self.replica_set_name =
                string_value(member.replica_set_name.clone()).or_keep(&self.replica_set_name);
        }
        self.id = string_value(Some(instance.cloud_mongo_db_instance_no));
        self.service_name = string_value(Some(instance.cloud_mongo_db_service_name));
        self.vpc_no = string_value(instance.vpc_no).or_keep(&self.vpc_no);
        self.image_product_code = string_value(instance.cloud_mongo_db_image_version_name)
            .or_keep(&self.image_product_code);
        self.backup_file_retention_period = number_value(instance.backup_file_retention_period)
            .or_keep(&self.backup_file_retention_period);
        self.backup_time = string_value(instance.backup_time).or_keep(&self.backup_time);
        self.member_port = number_value(instance.member_port).or_keep(&self.member_port);
        self.mongos_port = number_value(instance.mongos_port).or_keep(&self.mongos_port);
        self.config_port = number_value(instance.config_port).or_keep(&self.config_port);
        self.engine_version = string_value(instance.engine_version);
        self.access_control_group_no_list =
            string_list_value(instance.access_control_group_no_list);
    }

    /// Computed attributes the API fills in on creation. Inputs it never
    /// echoes back stay null when omitted.
    pub(super) fn mark_computed_unknown(&mut self) {
        self.id = Value::Unknown;
        self.engine_version = Value::Unknown;
        self.access_control_group_no_list = Value::Unknown;
        unknown_if_null(&mut self.image_product_code);
        unknown_if_null(&mut self.replica_set_name);
        unknown_if_null(&mut self.backup_file_retention_period);
        unknown_if_null(&mut self.backup_time);
        unknown_if_null(&mut self.member_port);
        unknown_if_null(&mut self.mongos_port);
        unknown_if_null(&mut self.config_port);
    }
}

fn optional_computed(attr_type: AttributeType, description: &str) -> Attribute {
    attribute(attr_type, AttributeConstraint::OptionalComputed, description)
}

impl<'a> WithSchema for MongoDbState<'a> {
    fn schema() -> Schema {
        let required = |description| {
            attribute(
                AttributeType::String,
                AttributeConstraint::Required,
                description,
            )
        };
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Cloud DB for MongoDB instance"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Instance number"),
                    "vpc_no" => required("VPC hosting the instance"),
                    "subnet_no" => required("Subnet of the servers"),
                    "service_name" => required("Service name, 3 to 30 characters"),
                    "server_name_prefix" => required("Prefix of the server names"),
                    "user_name" => required("Administrator user name"),
                    "user_password" => Attribute {
                        sensitive: true,
                        ..required("Administrator password")
                    },
                    "cluster_type_code" => required("STAND_ALONE, SINGLE_REPLICA_SET or SHARDED_CLUSTER"),
                    "image_product_code" => optional_computed(AttributeType::String, "Engine image, latest when omitted"),
                    "member_product_code" => optional_computed(AttributeType::String, "Server product of the members"),
                    "mongos_product_code" => optional_computed(AttributeType::String, "Server product of the mongos routers"),
                    "config_product_code" => optional_computed(AttributeType::String, "Server product of the config servers"),
                    "member_server_count" => optional_computed(AttributeType::Number, "Members per replica set"),
                    "arbiter_server_count" => optional_computed(AttributeType::Number, "Arbiters per replica set"),
                    "mongos_server_count" => optional_computed(AttributeType::Number, "Number of mongos routers"),
                    "config_server_count" => optional_computed(AttributeType::Number, "Number of config servers"),
                    "shard_count" => optional_computed(AttributeType::Number, "Number of shards of a sharded cluster"),
                    "replica_set_name" => optional_computed(AttributeType::String, "Name of the replica set"),
                    "backup_file_retention_period" => optional_computed(AttributeType::Number, "Days of backup retention"),
                    "backup_time" => optional_computed(AttributeType::String, "Daily backup time, HH:mm"),
                    "data_storage_type" => optional_computed(AttributeType::String, "SSD or HDD"),
                    "member_port" => optional_computed(AttributeType::Number, "Port of the members"),
                    "mongos_port" => optional_computed(AttributeType::Number, "Port of the mongos routers"),
                    "config_port" => optional_computed(AttributeType::Number, "Port of the config servers"),
                    "engine_version" => attribute(AttributeType::String, AttributeConstraint::Computed, "MongoDB version"),
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

impl<'a> WithValidate for MongoDbState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        for (name, value) in [
            ("vpc_no", &self.vpc_no),
            ("subnet_no", &self.subnet_no),
            ("service_name", &self.service_name),
            ("server_name_prefix", &self.server_name_prefix),
            ("user_name", &self.user_name),
            ("user_password", &self.user_password),
            ("cluster_type_code", &self.cluster_type_code),
        ] {
            require(diags, &attr_path, name, value);
        }
        if let Some(cluster_type) = as_str(&self.cluster_type_code) {
            if !CLUSTER_TYPES.contains(&cluster_type) {
                diags.error(
                    "Invalid cluster type",
                    format!(
                        "`{cluster_type}` is not one of {}",
                        CLUSTER_TYPES.join(", ")
                    ),
                    attr_path.clone().attribute("cluster_type_code"),
                );
            }
        }
        if let Some(count) = as_i64(&self.member_server_count) {
            if !(2..=7).contains(&count) {
                diags.error(
                    "Invalid member count",
                    "A replica set has between 2 and 7 members",
                    attr_path.clone().attribute("member_server_count"),
                );
            }
        }
        if let Value::Value(timeouts) = &self.timeouts {
            timeouts.validate(diags, attr_path.attribute("timeouts"));
        }
    }
}

impl<'a> WithTimeouts for MongoDbState<'a> {
    fn timeouts(&self) -> &Value<Timeouts<'_>> {
        &self.timeouts
    }
}

/// `data "ncloud_mongodb"`: lookup by id.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MongoDbDataState<'a> {
    pub id: ValueString<'a>,
    pub service_name: ValueString<'a>,
    pub status: ValueString<'a>,
    pub cluster_type_code: ValueString<'a>,
    pub engine_version: ValueString<'a>,
    pub vpc_no: ValueString<'a>,
    pub member_port: ValueNumber,
    pub access_control_group_no_list: ValueList<ValueString<'a>>,
    pub server_names: ValueList<ValueString<'a>>,
}

impl<'a> MongoDbDataState<'a> {
    pub(super) fn apply(&mut self, instance: CloudMongoDbInstance) {
        self.status = string_value(Some(instance.cloud_mongo_db_instance_status_name));
        self.cluster_type_code = string_value(instance.cluster_type.map(|code| code.code));
        self.service_name = string_value(Some(instance.cloud_mongo_db_service_name));
        self.engine_version = string_value(instance.engine_version);
        self.vpc_no = string_value(instance.vpc_no);
        self.member_port = number_value(instance.member_port);
        self.access_control_group_no_list =
            string_list_value(instance.access_control_group_no_list);
        self.server_names = string_list_value(
            instance
                .cloud_mongo_db_server_instance_list
                .into_iter()
                .map(|server| server.cloud_mongo_db_server_name)
                .collect(),
        );
    }
}

impl<'a> WithSchema for MongoDbDataState<'a> {
    fn schema() -> Schema {
        let computed = |attr_type, description| {
            attribute(attr_type, AttributeConstraint::Computed, description)
        };
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Existing Cloud DB for MongoDB instance"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Required, "Instance number"),
                    "service_name" => computed(AttributeType::String, "Service name"),
                    "status" => computed(AttributeType::String, "Status reported by the API"),
                    "cluster_type_code" => computed(AttributeType::String, "Cluster type"),
                    "engine_version" => computed(AttributeType::String, "MongoDB version"),
                    "vpc_no" => computed(AttributeType::String, "VPC hosting the instance"),
                    "member_port" => computed(AttributeType::Number, "Port of the members"),
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

    use super::*;

    fn set(value: &str) -> ValueString<'_> {
        Value::Value(Cow::Borrowed(value))
    }

    fn config() -> MongoDbState<'static> {
        MongoDbState {
            vpc_no: set("1"),
            subnet_no: set("2"),
            service_name: set("orders"),
            server_name_prefix: set("orders"),
            user_name: set("admin"),
            user_password: set("Secret123!"),
            cluster_type_code: set("SINGLE_REPLICA_SET"),
            member_server_count: Value::Value(3),
            ..Default::default()
        }
    }

    #[test]
    fn valid_configuration() {
        let mut diags = Diagnostics::default();
        config().validate(&mut diags, AttributePath::default());
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn invalid_configuration() {
        let mut diags = Diagnostics::default();
        MongoDbState {
            user_password: Value::Null,
            cluster_type_code: set("MULTI_MASTER"),
            member_server_count: Value::Value(9),
            ..config()
        }
        .validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), 3);
    }

    #[test]
    fn request_carries_configuration() {
        let request = config().request("KR");
        assert_eq!(request.region_code, "KR");
        assert_eq!(request.cluster_type_code, "SINGLE_REPLICA_SET");
        assert_eq!(request.member_server_count, Some(3));
        assert_eq!(request.mongos_port, None);
    }

    #[test]
    fn apply_keeps_inputs_not_echoed() {
        let mut state = config();
        state.apply(CloudMongoDbInstance {
            cloud_mongo_db_instance_no: "1001".to_owned(),
            cloud_mongo_db_service_name: "orders".to_owned(),
            member_port: Some(17017),
            ..Default::default()
        });

        assert_eq!(state.id, set("1001"));
        assert_eq!(state.user_password, set("Secret123!"));
        assert_eq!(state.cluster_type_code, set("SINGLE_REPLICA_SET"));
        assert_eq!(state.member_port, Value::Value(17017));
    }
}
