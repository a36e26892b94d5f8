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

use serde::Deserialize;

use super::{single, ApiClient, CommonCode, Params, SdkError};

const SERVICE: &str = "vredis";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudRedisInstance {
    pub cloud_redis_instance_no: String,
    #[serde(default)]
    pub cloud_redis_service_name: String,
    #[serde(default)]
    pub cloud_redis_instance_status_name: String,
    pub cloud_redis_instance_status: Option<CommonCode>,
    pub cloud_redis_instance_operation: Option<CommonCode>,
    pub cloud_redis_image_product_code: Option<String>,
    pub engine_version: Option<String>,
    pub vpc_no: Option<String>,
    pub mode: Option<CommonCode>,
    pub config_group_no: Option<String>,
    pub is_ha: Option<bool>,
    pub is_backup: Option<bool>,
    pub backup_file_retention_period: Option<i64>,
    pub backup_time: Option<String>,
    pub cloud_redis_port: Option<i64>,
    #[serde(default)]
    pub access_control_group_no_list: Vec<String>,
    #[serde(default)]
    pub cloud_redis_server_instance_list: Vec<CloudRedisServerInstance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudRedisServerInstance {
    pub subnet_no: Option<String>,
    pub private_domain: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudRedisConfigGroup {
    pub config_group_no: String,
    #[serde(default)]
    pub config_group_name: String,
    pub config_group_description: Option<String>,
    #[serde(default)]
    pub cloud_redis_version: String,
    pub config_group_status: Option<CommonCode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceList {
    #[serde(default)]
    cloud_redis_instance_list: Vec<CloudRedisInstance>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigGroupList {
    #[serde(default)]
    cloud_redis_config_group_list: Vec<CloudRedisConfigGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateCloudRedisInstance {
    pub region_code: String,
    pub vpc_no: String,
    pub subnet_no: String,
    pub service_name: String,
    pub server_name_prefix: String,
    pub mode_code: String,
    pub config_group_no: String,
    pub image_product_code: Option<String>,
    pub product_code: Option<String>,
    pub port: Option<i64>,
    pub is_ha: Option<bool>,
    pub is_backup: Option<bool>,
    pub backup_file_retention_period: Option<i64>,
    pub backup_time: Option<String>,
    pub shard_count: Option<i64>,
    pub shard_copy_count: Option<i64>,
}

impl CreateCloudRedisInstance {
    fn params(&self) -> Params {
        Params::region(&self.region_code)
            .set("vpcNo", &self.vpc_no)
            .set("subnetNo", &self.subnet_no)
            .set("cloudRedisServiceName", &self.service_name)
            .set("cloudRedisServerNamePrefix", &self.server_name_prefix)
            .set("cloudRedisModeCode", &self.mode_code)
            .set("configGroupNo", &self.config_group_no)
            .set_opt("cloudRedisImageProductCode", self.image_product_code.as_ref())
            .set_opt("cloudRedisProductCode", self.product_code.as_ref())
            .set_opt("port", self.port)
            .set_opt("isHa", self.is_ha)
            .set_opt("isBackup", self.is_backup)
            .set_opt(
                "backupFileRetentionPeriod",
                self.backup_file_retention_period,
            )
            .set_opt("backupTime", self.backup_time.as_ref())
            .set_opt("shardCount", self.shard_count)
            .set_opt("shardCopyCount", self.shard_copy_count)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateCloudRedisConfigGroup {
    pub region_code: String,
    pub name: String,
    pub redis_version: String,
    pub description: Option<String>,
}

impl ApiClient {
    pub async fn create_redis_instance(
        &self,
        request: &CreateCloudRedisInstance,
    ) -> Result<CloudRedisInstance, SdkError> {
        let action = "createCloudRedisInstance";
        let response: InstanceList = self.call(SERVICE, action, &request.params()).await?;
        single(action, "cloudRedisInstanceList", response.cloud_redis_instance_list)
    }

    pub async fn get_redis_instance(
        &self,
        region_code: &str,
        instance_no: &str,
    ) -> Result<Option<CloudRedisInstance>, SdkError> {
        let response: InstanceList = self
            .call(
                SERVICE,
                "getCloudRedisInstanceDetail",
                &Params::region(region_code).set("cloudRedisInstanceNo", instance_no),
            )
            .await?;
        Ok(response.cloud_redis_instance_list.into_iter().next())
    }

    pub async fn delete_redis_instance(
        &self,
        region_code: &str,
        instance_no: &str,
    ) -> Result<(), SdkError> {
        let _: serde_json::Value = self
            .call(
                SERVICE,
                "deleteCloudRedisInstance",
                &Params::region(region_code).set("cloudRedisInstanceNo", instance_no),
            )
            .await?;
        Ok(())
    }

    pub async fn create_redis_config_group(
        &self,
        request: &CreateCloudRedisConfigGroup,
    ) -> Result<CloudRedisConfigGroup, SdkError> {
        let action = "createCloudRedisConfigGroup";
        let params = Params::region(&request.region_code)
            .set("configGroupName", &request.name)
            .set("cloudRedisVersion", &request.redis_version)
            .set_opt("configGroupDescription", request.description.as_ref());
        let response: ConfigGroupList = self.call(SERVICE, action, &params).await?;
        single(
            action,
            "cloudRedisConfigGroupList",
            response.cloud_redis_config_group_list,
        )
    }

    /// Config groups have no detail call: the list is filtered client side.
    pub async fn get_redis_config_group(
        &self,
        region_code: &str,
        config_group_no: &str,
    ) -> Result<Option<CloudRedisConfigGroup>, SdkError> {
        let response: ConfigGroupList = self
            .call(
                SERVICE,
                "getCloudRedisConfigGroupList",
                &Params::region(region_code),
            )
            .await?;
        Ok(response
            .cloud_redis_config_group_list
            .into_iter()
            .find(|group| group.config_group_no == config_group_no))
    }

    pub async fn delete_redis_config_group(
        &self,
        region_code: &str,
        config_group_no: &str,
    ) -> Result<(), SdkError> {
        let _: serde_json::Value = self
            .call(
                SERVICE,
                "deleteCloudRedisConfigGroup",
                &Params::region(region_code).set("configGroupNo", config_group_no),
            )
            .await?;
        Ok(())
    }
}
