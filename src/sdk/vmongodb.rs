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

const SERVICE: &str = "vmongodb";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudMongoDbInstance {
    pub cloud_mongo_db_instance_no: String,
    #[serde(default)]
    pub cloud_mongo_db_service_name: String,
    #[serde(default)]
    pub cloud_mongo_db_instance_status_name: String,
    pub cloud_mongo_db_instance_status: Option<CommonCode>,
    pub cloud_mongo_db_instance_operation: Option<CommonCode>,
    pub cloud_mongo_db_image_version_name: Option<String>,
    pub engine_version: Option<String>,
    pub vpc_no: Option<String>,
    pub cluster_type: Option<CommonCode>,
    pub backup_file_retention_period: Option<i64>,
    pub backup_time: Option<String>,
    pub member_port: Option<i64>,
    pub arbiter_port: Option<i64>,
    pub mongos_port: Option<i64>,
    pub config_port: Option<i64>,
    #[serde(default)]
    pub access_control_group_no_list: Vec<String>,
    #[serde(default)]
    pub cloud_mongo_db_server_instance_list: Vec<CloudMongoDbServerInstance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudMongoDbServerInstance {
    #[serde(default)]
    pub cloud_mongo_db_server_name: String,
    pub subnet_no: Option<String>,
    pub private_domain: Option<String>,
    pub replica_set_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceList {
    #[serde(default)]
    cloud_mongo_db_instance_list: Vec<CloudMongoDbInstance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateCloudMongoDbInstance {
    pub region_code: String,
    pub vpc_no: String,
    pub subnet_no: String,
    pub service_name: String,
    pub server_name_prefix: String,
    pub user_name: String,
    pub user_password: String,
    pub cluster_type_code: String,
    pub image_product_code: Option<String>,
    pub member_product_code: Option<String>,
    pub arbiter_product_code: Option<String>,
    pub mongos_product_code: Option<String>,
    pub config_product_code: Option<String>,
    pub member_server_count: Option<i64>,
    pub arbiter_server_count: Option<i64>,
    pub mongos_server_count: Option<i64>,
    pub config_server_count: Option<i64>,
    pub shard_count: Option<i64>,
    pub replica_set_name: Option<String>,
    pub backup_file_retention_period: Option<i64>,
    pub backup_time: Option<String>,
    pub data_storage_type_code: Option<String>,
    pub member_port: Option<i64>,
    pub arbiter_port: Option<i64>,
    pub mongos_port: Option<i64>,
    pub config_port: Option<i64>,
    pub compress_code: Option<String>,
    pub engine_type_code: Option<String>,
}

impl CreateCloudMongoDbInstance {
    fn params(&self) -> Params {
        Params::region(&self.region_code)
            .set("vpcNo", &self.vpc_no)
            .set("subnetNo", &self.subnet_no)
            .set("cloudMongoDbServiceName", &self.service_name)
            .set("cloudMongoDbServerNamePrefix", &self.server_name_prefix)
            .set("cloudMongoDbUserName", &self.user_name)
            .set("cloudMongoDbUserPassword", &self.user_password)
            .set("clusterTypeCode", &self.cluster_type_code)
            .set_opt("cloudMongoDbImageProductCode", self.image_product_code.as_ref())
            .set_opt("memberProductCode", self.member_product_code.as_ref())
            .set_opt("arbiterProductCode", self.arbiter_product_code.as_ref())
            .set_opt("mongosProductCode", self.mongos_product_code.as_ref())
            .set_opt("configProductCode", self.config_product_code.as_ref())
            .set_opt("memberServerCount", self.member_server_count)
            .set_opt("arbiterServerCount", self.arbiter_server_count)
            .set_opt("mongosServerCount", self.mongos_server_count)
            .set_opt("configServerCount", self.config_server_count)
            .set_opt("shardCount", self.shard_count)
            .set_opt("replicaSetName", self.replica_set_name.as_ref())
            .set_opt(
                "backupFileRetentionPeriod",
                self.backup_file_retention_period,
            )
            .set_opt("backupTime", self.backup_time.as_ref())
            .set_opt("dataStorageTypeCode", self.data_storage_type_code.as_ref())
            .set_opt("memberPort", self.member_port)
            .set_opt("arbiterPort", self.arbiter_port)
            .set_opt("mongosPort", self.mongos_port)
            .set_opt("configPort", self.config_port)
            .set_opt("compressCode", self.compress_code.as_ref())
            .set_opt("engineTypeCode", self.engine_type_code.as_ref())
    }
}

impl ApiClient {
    pub async fn create_mongodb_instance(
        &self,
        request: &CreateCloudMongoDbInstance,
    ) -> Result<CloudMongoDbInstance, SdkError> {
        let action = "createCloudMongoDbInstance";
        let response: InstanceList = self.call(SERVICE, action, &request.params()).await?;
        single(
            action,
            "cloudMongoDbInstanceList",
            response.cloud_mongo_db_instance_list,
        )
    }

    /// `None` when the instance is absent from the answer; a purged instance
    /// may also be reported as a not-found [`SdkError`].
    pub async fn get_mongodb_instance(
        &self,
        region_code: &str,
        instance_no: &str,
    ) -> Result<Option<CloudMongoDbInstance>, SdkError> {
        let response: InstanceList = self
            .call(
                SERVICE,
                "getCloudMongoDbInstanceDetail",
                &Params::region(region_code).set("cloudMongoDbInstanceNo", instance_no),
            )
            .await?;
        Ok(response.cloud_mongo_db_instance_list.into_iter().next())
    }

    pub async fn delete_mongodb_instance(
        &self,
        region_code: &str,
        instance_no: &str,
    ) -> Result<(), SdkError> {
        let _: serde_json::Value = self
            .call(
                SERVICE,
                "deleteCloudMongoDbInstance",
                &Params::region(region_code).set("cloudMongoDbInstanceNo", instance_no),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::sdk::testing::{client, response};

    use super::*;

    #[tokio::test]
    async fn detail_decodes_status_and_servers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vmongodb/v2/getCloudMongoDbInstanceDetail"))
            .and(query_param("cloudMongoDbInstanceNo", "1001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response(
                "getCloudMongoDbInstanceDetail",
                json!({"totalRows": 1, "cloudMongoDbInstanceList": [{
                    "cloudMongoDbInstanceNo": "1001",
                    "cloudMongoDbServiceName": "orders",
                    "cloudMongoDbInstanceStatusName": "creating",
                    "cloudMongoDbInstanceStatus": {"code": "INIT", "codeName": "init"},
                    "cloudMongoDbInstanceOperation": {"code": "CREAT", "codeName": "create"},
                    "memberPort": 17017,
                    "accessControlGroupNoList": ["77"],
                    "cloudMongoDbServerInstanceList": [{
                        "cloudMongoDbServerInstanceNo": "2001",
                        "cloudMongoDbServerName": "orders-001",
                        "cloudMongoDbServerRole": {"code": "M", "codeName": "Member"}
                    }]
                }]}),
            )))
            .mount(&server)
            .await;

        let instance = client(&server)
            .get_mongodb_instance("KR", "1001")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(instance.cloud_mongo_db_service_name, "orders");
        assert_eq!(instance.member_port, Some(17017));
        assert_eq!(instance.access_control_group_no_list, vec!["77"]);
        assert_eq!(
            instance.cloud_mongo_db_server_instance_list[0].cloud_mongo_db_server_name,
            "orders-001"
        );
    }

    #[tokio::test]
    async fn create_sends_required_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vmongodb/v2/createCloudMongoDbInstance"))
            .and(query_param("clusterTypeCode", "SINGLE_REPLICA_SET"))
            .and(query_param("cloudMongoDbUserName", "admin"))
            .and(query_param("memberServerCount", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response(
                "createCloudMongoDbInstance",
                json!({"cloudMongoDbInstanceList": [{"cloudMongoDbInstanceNo": "1002"}]}),
            )))
            .mount(&server)
            .await;

        let instance = client(&server)
            .create_mongodb_instance(&CreateCloudMongoDbInstance {
                region_code: "KR".to_owned(),
                vpc_no: "1".to_owned(),
                subnet_no: "2".to_owned(),
                service_name: "orders".to_owned(),
                server_name_prefix: "orders".to_owned(),
                user_name: "admin".to_owned(),
                user_password: "Secret123!".to_owned(),
                cluster_type_code: "SINGLE_REPLICA_SET".to_owned(),
                member_server_count: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(instance.cloud_mongo_db_instance_no, "1002");
    }
}
