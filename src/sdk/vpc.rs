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

const SERVICE: &str = "vpc";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vpc {
    pub vpc_no: String,
    #[serde(default)]
    pub vpc_name: String,
    #[serde(default)]
    pub ipv4_cidr_block: String,
    pub vpc_status: Option<CommonCode>,
    #[serde(default)]
    pub region_code: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VpcList {
    #[serde(default)]
    vpc_list: Vec<Vpc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateVpc {
    pub region_code: String,
    pub vpc_name: Option<String>,
    pub ipv4_cidr_block: String,
}

impl CreateVpc {
    fn params(&self) -> Params {
        Params::region(&self.region_code)
            .set("ipv4CidrBlock", &self.ipv4_cidr_block)
            .set_opt("vpcName", self.vpc_name.as_ref())
    }
}

impl ApiClient {
    pub async fn create_vpc(&self, request: &CreateVpc) -> Result<Vpc, SdkError> {
        let action = "createVpc";
        let response: VpcList = self.call(SERVICE, action, &request.params()).await?;
        single(action, "vpcList", response.vpc_list)
    }

    /// `None` when the VPC does not exist.
    pub async fn get_vpc(&self, region_code: &str, vpc_no: &str) -> Result<Option<Vpc>, SdkError> {
        let response: VpcList = self
            .call(
                SERVICE,
                "getVpcDetail",
                &Params::region(region_code).set("vpcNo", vpc_no),
            )
            .await?;
        Ok(response.vpc_list.into_iter().next())
    }

    pub async fn delete_vpc(&self, region_code: &str, vpc_no: &str) -> Result<(), SdkError> {
        let _: serde_json::Value = self
            .call(
                SERVICE,
                "deleteVpc",
                &Params::region(region_code).set("vpcNo", vpc_no),
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
    async fn create_sends_cidr_and_returns_vpc() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vpc/v2/createVpc"))
            .and(query_param("regionCode", "KR"))
            .and(query_param("ipv4CidrBlock", "10.0.0.0/16"))
            .and(query_param("vpcName", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response(
                "createVpc",
                json!({"totalRows": 1, "vpcList": [{
                    "vpcNo": "3812",
                    "vpcName": "main",
                    "ipv4CidrBlock": "10.0.0.0/16",
                    "vpcStatus": {"code": "INIT", "codeName": "init"},
                    "regionCode": "KR"
                }]}),
            )))
            .mount(&server)
            .await;

        let vpc = client(&server)
            .create_vpc(&CreateVpc {
                region_code: "KR".to_owned(),
                vpc_name: Some("main".to_owned()),
                ipv4_cidr_block: "10.0.0.0/16".to_owned(),
            })
            .await
            .unwrap();

        assert_eq!(vpc.vpc_no, "3812");
        assert_eq!(vpc.vpc_status.unwrap().code, "INIT");
    }

    #[tokio::test]
    async fn missing_vpc_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vpc/v2/getVpcDetail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response(
                "getVpcDetail",
                json!({"totalRows": 0, "vpcList": []}),
            )))
            .mount(&server)
            .await;

        let vpc = client(&server).get_vpc("KR", "404").await.unwrap();

        assert_eq!(vpc, None);
    }
}
