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

use std::time::Duration;

use crate::sdk::vmongodb::CloudMongoDbInstance;
use crate::sdk::{code_of, ApiClient, SdkError};
use crate::wait::phase::{self, classify_instance};
use crate::wait::{Refresh, WaitConfig};

mod data_source;
mod resource;
mod state;

pub use data_source::MongoDbDataSource;
pub use resource::MongoDbResource;

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(3);

const CREATE_WAIT: WaitConfig = WaitConfig::new(
    &[phase::CREATING, phase::SETTING_UP],
    &[phase::RUNNING],
)
.with_poll_interval(POLL_INTERVAL)
.with_min_poll_interval(MIN_POLL_INTERVAL);

const DELETE_WAIT: WaitConfig = WaitConfig::new(&[phase::DELETING], &[phase::DELETED])
    .with_poll_interval(POLL_INTERVAL)
    .with_min_poll_interval(MIN_POLL_INTERVAL);

async fn refresh(
    api: &ApiClient,
    region: &str,
    instance_no: &str,
) -> Result<Refresh<CloudMongoDbInstance>, SdkError> {
    Ok(match api.get_mongodb_instance(region, instance_no).await? {
        Some(instance) => {
            let phase = classify_instance(
                code_of(&instance.cloud_mongo_db_instance_status),
                code_of(&instance.cloud_mongo_db_instance_operation),
            );
            Refresh::found(instance, phase)
        }
        None => Refresh::gone(),
    })
}
