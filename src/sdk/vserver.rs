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

use super::{ApiClient, Params, SdkError};

const SERVICE: &str = "vserver";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub region_code: String,
    #[serde(default)]
    pub region_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionList {
    #[serde(default)]
    region_list: Vec<Region>,
}

impl ApiClient {
    pub async fn get_region_list(&self) -> Result<Vec<Region>, SdkError> {
        let response: RegionList = self
            .call(SERVICE, "getRegionList", &Params::new())
            .await?;
        Ok(response.region_list)
    }
}
