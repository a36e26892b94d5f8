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
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description};
use tf_provider::value::{Value, ValueList, ValueNumber, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, schema::Schema};

use crate::sdk::code_of;
use crate::sdk::vredis::{
    CloudRedisConfigGroup, CloudRedisInstance, CreateCloudRedisConfigGroup,
    CreateCloudRedisInstance,
};
use crate::timeouts::{Timeouts, WithTimeouts};
use crate::utils::{
    as_bool, as_i64, as_str, attribute, bool_value, number_value, require, string_list_type,
    string_list_value, string_value, unknown_if_null, OrKeep, WithSchema, WithValidate,
};

const MODES: [&str; 2] = ["SIMPLE", "CLUSTER"];

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisState<'a> {
    pub id: ValueString<'a>,
    pub vpc_no: ValueString<'a>,
    pub subnet_no: ValueString<'a>,
    pub service_name: ValueString<'a>,
    pub server_name_prefix: ValueString<'a>,
    pub mode: ValueString<'a>,
    pub config_group_no: ValueString<'a>,
    pub image_product_code: ValueString<'a>,
    pub product_code: ValueString<'a>,
    pub port: ValueNumber,
    pub is_ha: Value<bool>,
    pub is_backup: Value<bool>,
    pub backup_file_retention_period: ValueNumber,
    pub backup_time: ValueString<'a>,
    pub shard_count: ValueNumber,
    pub shard_copy_count: ValueNumber,
    pub engine_version: ValueString<'a>,
    pub access_control_group_no_list: ValueList<ValueString<'a>>,
    pub timeouts: Value<Timeouts<'a>>,
}

impl<'a> RedisState<'a> {
    pub(super) fn request(&self, region_code: &str) -> CreateCloudRedisInstance {
        let text = |value: &ValueString<'_>| as_str(value).unwrap_or_default().to_owned();
        let opt_text = |value: &ValueString<'_>| as_str(value).map(str::to_owned);
        CreateCloudRedisInstance {
            region_code: region_code.to_owned(),
            vpc_no: text(&self.vpc_no),
            subnet_no: text(&self.subnet_no),
            service_name: text(&self.service_name),
            server_name_prefix: text(&self.server_name_prefix),
            mode_code: text(&self.mode),
            config_group_no: text(&self.config_group_no),
            image_product_code: opt_text(&self.image_product_code),
            product_code: opt_text(&self.product_code),
            port: as_i64(&self.port),
            is_ha: as_bool(&self.is_ha),
            is_backup: as_bool(&self.is_backup),
            backup_file_retention_period: as_i64(&self.backup_file_retention_period),
            backup_time: opt_text(&self.backup_time),
            shard_count: as_i64(&self.shard_count),
            shard_copy_count: as_i64(&self.shard_copy_count),
        }
    }

    pub(super) fn apply(&mut self, instance: CloudRedisInstance) {
        if let Some(server) = instance.cloud_redis_server_instance_list.first() {
            self.subnet_no = string_value(server.subnet_no.clone()).or_keep(&self.subnet_no);
        }
        self.id = string_value(Some(instance.cloud_redis_instance_no));
        self.service_name = string_value(Some(instance.cloud_redis_service_name));
        self.vpc_no = string_value(instance.vpc_no).or_keep(&self.vpc_no);
        self.mode = string_value(instance.mode.map(|code| code.code)).or_keep(&self.mode);
        self.config_group_no =
            string_value(instance.config_group_no).or_keep(&self.config_group_no);
        self.image_product_code =
            string_value(instance.cloud_redis_image_product_code).or_keep(&self.image_product_code);
        self.port = number_value(instance.cloud_redis_port).or_keep(&self.port);
        self.is_ha = bool_value(instance.is_ha).or_keep(&self.is_ha);
        self.is_backup = bool_value(instance.is_backup).or_keep(&self.is_backup);
        self.backup_file_retention_period = number_value(instance.backup_file_retention_period)
            .or_keep(&self.backup_file_retention_period);
        self.backup_time = string_value(instance.backup_time).or_keep(&self.backup_time);
        self.engine_version = string_value(instance.engine_version);
        self.access_control_group_no_list =
            string_list_value(instance.access_control_group_no_list);
    }

    pub(super) fn mark_computed_unknown(&mut self) {
        self.id = Value::Unknown;
        self.engine_version = Value::Unknown;
        self.access_control_group_no_list = Value::Unknown;
        unknown_if_null(&mut self.image_product_code);
        unknown_if_null(&mut self.port);
        unknown_if_null(&mut self.is_ha);
        unknown_if_null(&mut self.is_backup);
        unknown_if_null(&mut self.backup_file_retention_period);
        unknown_if_null(&mut self.backup_time);
    }
}

impl<'a> WithSchema for RedisState<'a> {
    fn schema() -> Schema {
        let required = |description| {
            attribute(
                AttributeType::String,
                AttributeConstraint::Required,
                description,
            )
        };
        let optional_computed = |attr_type, description| {
            attribute(attr_type, AttributeConstraint::OptionalComputed, description)
        };
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Cloud DB for Redis instance"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Instance number"),
                    "vpc_no" => required("VPC hosting the instance"),
                    "subnet_no" => required("Subnet of the servers"),
                    "service_name" => required("Service name"),
                    "server_name_prefix" => required("Prefix of the server names"),
                    "mode" => required("`SIMPLE` or `CLUSTER`"),
                    "config_group_no" => required("Config group applied to the instance"),
                    "image_product_code" => optional_computed(AttributeType::String, "Engine image, latest when omitted"),
                    "product_code" => attribute(AttributeType::String, AttributeConstraint::Optional, "Server product code"),
                    "port" => optional_computed(AttributeType::Number, "Redis port"),
                    "is_ha" => optional_computed(AttributeType::Bool, "Run a replica of every master"),
                    "is_backup" => optional_computed(AttributeType::Bool, "Enable daily backups"),
                    "backup_file_retention_period" => optional_computed(AttributeType::Number, "Days of backup retention"),
                    "backup_time" => optional_computed(AttributeType::String, "Daily backup time, HH:mm"),
                    "shard_count" => attribute(AttributeType::Number, AttributeConstraint::Optional, "Number of shards in cluster mode"),
                    "shard_copy_count" => attribute(AttributeType::Number, AttributeConstraint::Optional, "Replicas per shard in cluster mode"),
                    "engine_version" => attribute(AttributeType::String, AttributeConstraint::Computed, "Redis version"),
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

impl<'a> WithValidate for RedisState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        for (name, value) in [
            ("vpc_no", &self.vpc_no),
            ("subnet_no", &self.subnet_no),
            ("service_name", &self.service_name),
            ("server_name_prefix", &self.server_name_prefix),
            ("mode", &self.mode),
            ("config_group_no", &self.config_group_no),
        ] {
            require(diags, &attr_path, name, value);
        }

        let mode = as_str(&self.mode);
        if let Some(mode) = mode {
            if !MODES.contains(&mode) {
                diags.error(
                    "Invalid Redis mode",
                    format!("`{mode}` is not one of {}", MODES.join(", ")),
                    attr_path.clone().attribute("mode"),
                );
            }
        }
        for (name, value, range) in [
            ("shard_count", &self.shard_count, 3..=10),
            ("shard_copy_count", &self.shard_copy_count, 0..=4),
        ] {
            let Some(count) = as_i64(value) else {
                continue;
            };
            if mode.is_some_and(|mode| mode != "CLUSTER") {
                diags.error_short(
                    format!("`{name}` is only valid in `CLUSTER` mode"),
                    attr_path.clone().attribute(name),
                );
            } else if !range.contains(&count) {
                diags.error_short(
                    format!(
                        "`{name}` must be between {} and {}",
                        range.start(),
                        range.end()
                    ),
                    attr_path.clone().attribute(name),
                );
            }
        }

        if let Value::Value(timeouts) = &self.timeouts {
            timeouts.validate(diags, attr_path.attribute("timeouts"));
        }
    }
}

impl<'a> WithTimeouts for RedisState<'a> {
    fn timeouts(&self) -> &Value<Timeouts<'_>> {
        &self.timeouts
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisConfigGroupState<'a> {
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub redis_version: ValueString<'a>,
    pub description: ValueString<'a>,
    pub status: ValueString<'a>,
    pub timeouts: Value<Timeouts<'a>>,
}

impl<'a> RedisConfigGroupState<'a> {
    pub(super) fn request(&self, region_code: &str) -> CreateCloudRedisConfigGroup {
        CreateCloudRedisConfigGroup {
            region_code: region_code.to_owned(),
            name: as_str(&self.name).unwrap_or_default().to_owned(),
            redis_version: as_str(&self.redis_version).unwrap_or_default().to_owned(),
            description: as_str(&self.description).map(str::to_owned),
        }
    }

    pub(super) fn apply(&mut self, group: CloudRedisConfigGroup) {
        self.status = string_value(Some(code_of(&group.config_group_status).to_owned()));
        self.id = string_value(Some(group.config_group_no));
        self.name = string_value(Some(group.config_group_name));
        self.redis_version =
            string_value(Some(group.cloud_redis_version)).or_keep(&self.redis_version);
        self.description =
            string_value(group.config_group_description).or_keep(&self.description);
    }
}

impl<'a> WithSchema for RedisConfigGroupState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Redis configuration group"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Computed, "Config group number"),
                    "name" => attribute(AttributeType::String, AttributeConstraint::Required, "Config group name"),
                    "redis_version" => attribute(AttributeType::String, AttributeConstraint::Required, "Redis version, e.g. `7.0.13-simple`"),
                    "description" => attribute(AttributeType::String, AttributeConstraint::Optional, "Free text description"),
                    "status" => attribute(AttributeType::String, AttributeConstraint::Computed, "Status code reported by the API"),
                },
                blocks: map! {
                    "timeouts" => Timeouts::block(),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for RedisConfigGroupState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        require(diags, &attr_path, "name", &self.name);
        require(diags, &attr_path, "redis_version", &self.redis_version);
        if let Some(name) = as_str(&self.name) {
            if !(3..=15).contains(&name.len())
                || !name
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            {
                diags.error(
                    "Invalid config group name",
                    "Use 3 to 15 lowercase letters, digits or hyphens",
                    attr_path.clone().attribute("name"),
                );
            }
        }
        if let Value::Value(timeouts) = &self.timeouts {
            timeouts.validate(diags, attr_path.attribute("timeouts"));
        }
    }
}

impl<'a> WithTimeouts for RedisConfigGroupState<'a> {
    fn timeouts(&self) -> &Value<Timeouts<'_>> {
        &self.timeouts
    }
}

/// `data "ncloud_redis"`: lookup by id.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisDataState<'a> {
    pub id: ValueString<'a>,
    pub service_name: ValueString<'a>,
    pub status: ValueString<'a>,
    pub mode: ValueString<'a>,
    pub engine_version: ValueString<'a>,
    pub vpc_no: ValueString<'a>,
    pub config_group_no: ValueString<'a>,
    pub port: ValueNumber,
    pub access_control_group_no_list: ValueList<ValueString<'a>>,
}

impl<'a> RedisDataState<'a> {
    pub(super) fn apply(&mut self, instance: CloudRedisInstance) {
        self.service_name = string_value(Some(instance.cloud_redis_service_name));
        self.status = string_value(Some(instance.cloud_redis_instance_status_name));
        self.mode = string_value(instance.mode.map(|code| code.code));
        self.engine_version = string_value(instance.engine_version);
        self.vpc_no = string_value(instance.vpc_no);
        self.config_group_no = string_value(instance.config_group_no);
        self.port = number_value(instance.cloud_redis_port);
        self.access_control_group_no_list =
            string_list_value(instance.access_control_group_no_list);
    }
}

impl<'a> WithSchema for RedisDataState<'a> {
    fn schema() -> Schema {
        let computed = |attr_type, description| {
            attribute(attr_type, AttributeConstraint::Computed, description)
        };
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Existing Cloud DB for Redis instance"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Required, "Instance number"),
                    "service_name" => computed(AttributeType::String, "Service name"),
                    "status" => computed(AttributeType::String, "Status reported by the API"),
                    "mode" => computed(AttributeType::String, "`SIMPLE` or `CLUSTER`"),
                    "engine_version" => computed(AttributeType::String, "Redis version"),
                    "vpc_no" => computed(AttributeType::String, "VPC hosting the instance"),
                    "config_group_no" => computed(AttributeType::String, "Config group applied to the instance"),
                    "port" => computed(AttributeType::Number, "Redis port"),
                    "access_control_group_no_list" => computed(string_list_type(), "Access control groups"),
                },
                ..Default::default()
            },
        }
    }
}
