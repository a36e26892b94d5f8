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

use super::{code_of, single, ApiClient, CommonCode, Params, SdkError};

const SERVICE: &str = "vmysql";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudMysqlInstance {
    pub cloud_mysql_instance_no: String,
    #[serde(default)]
    pub cloud_mysql_service_name: String,
    #[serde(default)]
    pub cloud_mysql_instance_status_name: String,
    pub cloud_mysql_instance_status: Option<CommonCode>,
    pub cloud_mysql_instance_operation: Option<CommonCode>,
    pub cloud_mysql_image_product_code: Option<String>,
    pub engine_version: Option<String>,
    pub vpc_no: Option<String>,
    pub is_ha: Option<bool>,
    pub is_multi_zone: Option<bool>,
    pub is_backup: Option<bool>,
    pub backup_file_retention_period: Option<i64>,
    pub backup_time: Option<String>,
    pub cloud_mysql_port: Option<i64>,
    #[serde(default)]
    pub access_control_group_no_list: Vec<String>,
    #[serde(default)]
    pub cloud_mysql_server_instance_list: Vec<CloudMysqlServerInstance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudMysqlServerInstance {
    pub cloud_mysql_server_instance_no: String,
    #[serde(default)]
    pub cloud_mysql_server_name: String,
    pub cloud_mysql_server_role: Option<CommonCode>,
    pub subnet_no: Option<String>,
    pub zone_code: Option<String>,
    pub private_domain: Option<String>,
    pub cloud_mysql_product_code: Option<String>,
}

/// Role codes of the servers of an instance.
pub mod role {
    pub const MASTER: &str = "M";
    pub const SLAVE: &str = "S";
    pub const RECOVERY: &str = "R";
}

impl CloudMysqlInstance {
    pub fn server(&self, server_instance_no: &str) -> Option<&CloudMysqlServerInstance> {
        self.cloud_mysql_server_instance_list
            .iter()
            .find(|server| server.cloud_mysql_server_instance_no == server_instance_no)
    }

    pub fn servers_with_role<'s>(
        &'s self,
        role: &'s str,
    ) -> impl Iterator<Item = &'s CloudMysqlServerInstance> + 's {
        self.cloud_mysql_server_instance_list
            .iter()
            .filter(move |server| code_of(&server.cloud_mysql_server_role) == role)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstanceList {
    #[serde(default)]
    cloud_mysql_instance_list: Vec<CloudMysqlInstance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateCloudMysqlInstance {
    pub region_code: String,
    pub vpc_no: String,
    pub subnet_no: String,
    pub service_name: String,
    pub server_name_prefix: String,
    pub user_name: String,
    pub user_password: String,
    pub host_ip: String,
    pub database_name: String,
    pub image_product_code: Option<String>,
    pub product_code: Option<String>,
    pub data_storage_type_code: Option<String>,
    pub is_ha: Option<bool>,
    pub is_multi_zone: Option<bool>,
    pub is_storage_encryption: Option<bool>,
    pub is_backup: Option<bool>,
    pub backup_file_retention_period: Option<i64>,
    pub backup_time: Option<String>,
    pub standby_master_subnet_no: Option<String>,
    pub port: Option<i64>,
}

impl CreateCloudMysqlInstance {
    fn params(&self) -> Params {
        Params::region(&self.region_code)
            .set("vpcNo", &self.vpc_no)
            .set("subnetNo", &self.subnet_no)
            .set("cloudMysqlServiceName", &self.service_name)
            .set("cloudMysqlServerNamePrefix", &self.server_name_prefix)
            .set("cloudMysqlUserName", &self.user_name)
            .set("cloudMysqlUserPassword", &self.user_password)
            .set("hostIp", &self.host_ip)
            .set("cloudMysqlDatabaseName", &self.database_name)
            .set_opt("cloudMysqlImageProductCode", self.image_product_code.as_ref())
            .set_opt("cloudMysqlProductCode", self.product_code.as_ref())
            .set_opt("dataStorageTypeCode", self.data_storage_type_code.as_ref())
            .set_opt("isHa", self.is_ha)
            .set_opt("isMultiZone", self.is_multi_zone)
            .set_opt("isStorageEncryption", self.is_storage_encryption)
            .set_opt("isBackup", self.is_backup)
            .set_opt(
                "backupFileRetentionPeriod",
                self.backup_file_retention_period,
            )
            .set_opt("backupTime", self.backup_time.as_ref())
            .set_opt("standbyMasterSubnetNo", self.standby_master_subnet_no.as_ref())
            .set_opt("port", self.port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateCloudMysqlSlaveInstance {
    pub region_code: String,
    pub instance_no: String,
    pub subnet_no: Option<String>,
    pub is_multi_zone: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateCloudMysqlRecoveryInstance {
    pub region_code: String,
    pub instance_no: String,
    pub recovery_server_name: String,
    pub subnet_no: Option<String>,
    /// Point in time, `yyyy-MM-ddTHH:mm:ss+0900`
    pub recovery_time: Option<String>,
    /// Backup file to restore instead of a point in time
    pub file_name: Option<String>,
}

impl ApiClient {
    pub async fn create_mysql_instance(
        &self,
        request: &CreateCloudMysqlInstance,
    ) -> Result<CloudMysqlInstance, SdkError> {
        let action = "createCloudMysqlInstance";
        let response: InstanceList = self.call(SERVICE, action, &request.params()).await?;
        single(action, "cloudMysqlInstanceList", response.cloud_mysql_instance_list)
    }

    pub async fn get_mysql_instance(
        &self,
        region_code: &str,
        instance_no: &str,
    ) -> Result<Option<CloudMysqlInstance>, SdkError> {
        let response: InstanceList = self
            .call(
                SERVICE,
                "getCloudMysqlInstanceDetail",
                &Params::region(region_code).set("cloudMysqlInstanceNo", instance_no),
            )
            .await?;
        Ok(response.cloud_mysql_instance_list.into_iter().next())
    }

    pub async fn delete_mysql_instance(
        &self,
        region_code: &str,
        instance_no: &str,
    ) -> Result<(), SdkError> {
        let _: serde_json::Value = self
            .call(
                SERVICE,
                "deleteCloudMysqlInstance",
                &Params::region(region_code).set("cloudMysqlInstanceNo", instance_no),
            )
            .await?;
        Ok(())
    }

    pub async fn create_mysql_slave(
        &self,
        request: &CreateCloudMysqlSlaveInstance,
    ) -> Result<(), SdkError> {
        let params = Params::region(&request.region_code)
            .set("cloudMysqlInstanceNo", &request.instance_no)
            .set_opt("subnetNo", request.subnet_no.as_ref())
            .set_opt("isMultiZone", request.is_multi_zone);
        let _: serde_json::Value = self
            .call(SERVICE, "createCloudMysqlSlaveInstance", &params)
            .await?;
        Ok(())
    }

    pub async fn create_mysql_recovery(
        &self,
        request: &CreateCloudMysqlRecoveryInstance,
    ) -> Result<(), SdkError> {
        let params = Params::region(&request.region_code)
            .set("cloudMysqlInstanceNo", &request.instance_no)
            .set("recoveryServerName", &request.recovery_server_name)
            .set_opt("subnetNo", request.subnet_no.as_ref())
            .set_opt("recoveryTime", request.recovery_time.as_ref())
            .set_opt("fileName", request.file_name.as_ref());
        let _: serde_json::Value = self
            .call(SERVICE, "createCloudMysqlRecoveryInstance", &params)
            .await?;
        Ok(())
    }

    /// Remove one server (slave or recovery) from its instance.
    pub async fn delete_mysql_server(
        &self,
        region_code: &str,
        server_instance_no: &str,
    ) -> Result<(), SdkError> {
        let _: serde_json::Value = self
            .call(
                SERVICE,
                "deleteCloudMysqlServerInstance",
                &Params::region(region_code).set("cloudMysqlServerInstanceNo", server_instance_no),
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

    fn instance() -> CloudMysqlInstance {
        serde_json::from_value(json!({
            "cloudMysqlInstanceNo": "500",
            "cloudMysqlServerInstanceList": [
                {"cloudMysqlServerInstanceNo": "501", "cloudMysqlServerRole": {"code": "M"}},
                {"cloudMysqlServerInstanceNo": "502", "cloudMysqlServerRole": {"code": "H"}},
                {"cloudMysqlServerInstanceNo": "503", "cloudMysqlServerRole": {"code": "S"}},
                {"cloudMysqlServerInstanceNo": "504", "cloudMysqlServerRole": {"code": "S"}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn servers_by_role() {
        let instance = instance();
        let slaves: Vec<_> = instance
            .servers_with_role(role::SLAVE)
            .map(|server| server.cloud_mysql_server_instance_no.as_str())
            .collect();
        assert_eq!(slaves, vec!["503", "504"]);
        assert!(instance.server("502").is_some());
        assert!(instance.server("599").is_none());
    }

    #[tokio::test]
    async fn recovery_sends_point_in_time() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vmysql/v2/createCloudMysqlRecoveryInstance"))
            .and(query_param("cloudMysqlInstanceNo", "500"))
            .and(query_param("recoveryServerName", "restore-1"))
            .and(query_param("recoveryTime", "2024-03-01T10:00:00+0900"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response(
                "createCloudMysqlRecoveryInstance",
                json!({"cloudMysqlInstanceList": []}),
            )))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .create_mysql_recovery(&CreateCloudMysqlRecoveryInstance {
                region_code: "KR".to_owned(),
                instance_no: "500".to_owned(),
                recovery_server_name: "restore-1".to_owned(),
                recovery_time: Some("2024-03-01T10:00:00+0900".to_owned()),
                ..Default::default()
            })
            .await
            .unwrap();
    }
}
