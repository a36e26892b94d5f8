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
use std::collections::BTreeSet;
use std::time::Duration;

use crate::sdk::vmysql::{CloudMysqlInstance, CloudMysqlServerInstance};
use crate::sdk::{code_of, ApiClient, SdkError};
use crate::wait::phase::{self, classify_instance};
use crate::wait::{Refresh, WaitConfig};

mod data_source;
mod recovery;
mod resource;
mod server;
mod slave;
mod state;

pub use data_source::MysqlDataSource;
pub use recovery::MysqlRecoveryResource;
pub use resource::MysqlResource;
pub use slave::MysqlSlaveResource;

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(3);

const CREATE_WAIT: WaitConfig = WaitConfig::new(
    &[phase::CREATING, phase::SETTING_UP],
    &[phase::RUNNING],
)
.with_poll_interval(POLL_INTERVAL)
.with_min_poll_interval(MIN_POLL_INTERVAL);

/// Parent instance while one of its servers is added.
const SERVER_CREATE_WAIT: WaitConfig = WaitConfig::new(
    &[phase::CREATING, phase::SETTING_UP, phase::UPDATING],
    &[phase::RUNNING],
)
.with_poll_interval(POLL_INTERVAL)
.with_min_poll_interval(MIN_POLL_INTERVAL);

/// Parent instance while one of its servers is removed. A parent deleted
/// in the meantime took the server with it.
const SERVER_DELETE_WAIT: WaitConfig = WaitConfig::new(
    &[phase::DELETING, phase::UPDATING],
    &[phase::RUNNING, phase::DELETED],
)
.with_poll_interval(POLL_INTERVAL)
.with_min_poll_interval(MIN_POLL_INTERVAL);

const DELETE_WAIT: WaitConfig = WaitConfig::new(&[phase::DELETING], &[phase::DELETED])
    .with_poll_interval(POLL_INTERVAL)
    .with_min_poll_interval(MIN_POLL_INTERVAL);

fn instance_phase(instance: &CloudMysqlInstance) -> Cow<'static, str> {
    classify_instance(
        code_of(&instance.cloud_mysql_instance_status),
        code_of(&instance.cloud_mysql_instance_operation),
    )
}

async fn refresh(
    api: &ApiClient,
    region: &str,
    instance_no: &str,
) -> Result<Refresh<CloudMysqlInstance>, SdkError> {
    Ok(match api.get_mysql_instance(region, instance_no).await? {
        Some(instance) => {
            let phase = instance_phase(&instance);
            Refresh::found(instance, phase)
        }
        None => Refresh::gone(),
    })
}

/// Server of `role` absent from `known`, the one a create call added.
fn new_server<'i>(
    instance: &'i CloudMysqlInstance,
    role: &'i str,
    known: &BTreeSet<String>,
) -> Option<&'i CloudMysqlServerInstance> {
    instance
        .servers_with_role(role)
        .find(|server| !known.contains(&server.cloud_mysql_server_instance_no))
}

/// Refresh the parent instance after a server creation request.
///
/// A running parent that does not list the new server yet has not picked
/// the request up, so it is still reported as `updating`.
async fn refresh_server_creation(
    api: &ApiClient,
    region: &str,
    instance_no: &str,
    role: &str,
    known: &BTreeSet<String>,
) -> Result<Refresh<CloudMysqlInstance>, SdkError> {
    Ok(match refresh(api, region, instance_no).await? {
        Refresh {
            snapshot: Some(instance),
            phase: current,
        } if current == phase::RUNNING && new_server(&instance, role, known).is_none() => {
            Refresh::found(instance, phase::UPDATING)
        }
        refreshed => refreshed,
    })
}

/// Refresh the parent instance after a server deletion request.
async fn refresh_server_removal(
    api: &ApiClient,
    region: &str,
    instance_no: &str,
    server_no: &str,
) -> Result<Refresh<CloudMysqlInstance>, SdkError> {
    Ok(match api.get_mysql_instance(region, instance_no).await? {
        Some(instance) => {
            let phase = if instance.server(server_no).is_some() {
                Cow::Borrowed(phase::DELETING)
            } else {
                instance_phase(&instance)
            };
            Refresh::found(instance, phase)
        }
        None => Refresh::gone(),
    })
}
