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

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use tf_provider::value::{Value, ValueEmpty};
use tf_provider::{schema::Schema, AttributePath, Diagnostics, Resource};

use crate::ncloud_provider::ProviderContext;
use crate::sdk::SdkError;
use crate::timeouts::{wait_failure, WithTimeouts};
use crate::utils::{as_str, replace_if_changed, WithSchema, WithValidate};
use crate::wait::{phase, Waiter};

use super::state::RedisState;
use super::{refresh, CREATE_WAIT, DELETE_WAIT};

const CREATE_TIMEOUT: Duration = Duration::from_secs(6 * 3600);
const DELETE_TIMEOUT: Duration = Duration::from_secs(3600);

#[derive(Debug)]
pub struct RedisResource {
    context: Arc<ProviderContext>,
}

impl RedisResource {
    pub fn new(context: Arc<ProviderContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Resource for RedisResource {
    type State<'a> = RedisState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(RedisState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        config.validate(diags, AttributePath::default());

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.context.client(diags)?;
        let instance_no = as_str(&state.id)?.to_owned();

        match client
            .api
            .get_redis_instance(&client.region, &instance_no)
            .await
        {
            Ok(Some(instance)) => {
                let mut state = state;
                state.apply(instance);
                Some((state, private_state))
            }
            Ok(None) => None,
            Err(err) if err.is_not_found() => None,
            Err(err) => {
                diags.root_error("Failed to read Redis instance", err.to_string());
                None
            }
        }
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = proposed_state;
        state.mark_computed_unknown();
        Some((state, Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        let (prior, proposed) = (&prior_state, &proposed_state);
        let mut trigger_replace = Vec::new();
        for (name, prior, proposed) in [
            ("vpc_no", &prior.vpc_no, &proposed.vpc_no),
            ("subnet_no", &prior.subnet_no, &proposed.subnet_no),
            ("service_name", &prior.service_name, &proposed.service_name),
            ("server_name_prefix", &prior.server_name_prefix, &proposed.server_name_prefix),
            ("mode", &prior.mode, &proposed.mode),
            ("config_group_no", &prior.config_group_no, &proposed.config_group_no),
            ("image_product_code", &prior.image_product_code, &proposed.image_product_code),
            ("product_code", &prior.product_code, &proposed.product_code),
            ("backup_time", &prior.backup_time, &proposed.backup_time),
        ] {
            replace_if_changed(&mut trigger_replace, name, prior, proposed);
        }
        for (name, prior, proposed) in [
            ("is_ha", &prior.is_ha, &proposed.is_ha),
            ("is_backup", &prior.is_backup, &proposed.is_backup),
        ] {
            replace_if_changed(&mut trigger_replace, name, prior, proposed);
        }
        for (name, prior, proposed) in [
            ("port", &prior.port, &proposed.port),
            (
                "backup_file_retention_period",
                &prior.backup_file_retention_period,
                &proposed.backup_file_retention_period,
            ),
            ("shard_count", &prior.shard_count, &proposed.shard_count),
            ("shard_copy_count", &prior.shard_copy_count, &proposed.shard_copy_count),
        ] {
            replace_if_changed(&mut trigger_replace, name, prior, proposed);
        }

        let mut state = proposed_state.clone();
        if !trigger_replace.is_empty() {
            state.mark_computed_unknown();
        }
        Some((state, prior_private_state, trigger_replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(prior_private_state)
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.context.client(diags)?;
        let timeout = planned_state.create_timeout(CREATE_TIMEOUT);

        let instance = match client
            .api
            .create_redis_instance(&planned_state.request(&client.region))
            .await
        {
            Ok(instance) => instance,
            Err(err) => {
                diags.root_error("Failed to create Redis instance", err.to_string());
                return None;
            }
        };
        let instance_no = instance.cloud_redis_instance_no.clone();
        info!(%instance_no, "Redis instance creation requested");

        let mut state = planned_state;
        state.apply(instance);

        match Waiter::new(
            format!("Redis instance {instance_no}"),
            CREATE_WAIT.with_timeout(timeout),
        )
        .cancel_on(self.context.shutdown())
        .wait(|| refresh(&client.api, &client.region, &instance_no))
        .await
        {
            Ok(Some(instance)) => state.apply(instance),
            Ok(None) => (),
            Err(err) => {
                diags.root_error(
                    "Failed waiting for Redis instance to be created",
                    wait_failure(&err),
                );
            }
        }
        Some((state, private_state))
    }

    async fn update<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        Some((planned_state, private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let client = self.context.client(diags)?;
        let timeout = state.delete_timeout(DELETE_TIMEOUT);
        let instance_no = as_str(&state.id)?;

        match client
            .api
            .delete_redis_instance(&client.region, instance_no)
            .await
        {
            Ok(()) => (),
            Err(err) if err.is_not_found() => return Some(()),
            Err(err) => {
                diags.root_error("Failed to delete Redis instance", err.to_string());
                return None;
            }
        }

        if let Err(err) = Waiter::new(
            format!("Redis instance {instance_no}"),
            DELETE_WAIT.with_timeout(timeout),
        )
        .cancel_on(self.context.shutdown())
        .not_found_as(phase::DELETED, SdkError::is_not_found)
        .wait(|| refresh(&client.api, &client.region, instance_no))
        .await
        {
            diags.root_error(
                "Failed waiting for Redis instance to be deleted",
                wait_failure(&err),
            );
            return None;
        }
        Some(())
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = RedisState {
            id: Value::Value(id.into()),
            ..Default::default()
        };
        Some((state, Default::default()))
    }
}
