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

use super::state::RedisConfigGroupState;
use super::{refresh_config_group, CONFIG_GROUP_CREATE_WAIT, CONFIG_GROUP_DELETE_WAIT};

const CREATE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const DELETE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Debug)]
pub struct RedisConfigGroupResource {
    context: Arc<ProviderContext>,
}

impl RedisConfigGroupResource {
    pub fn new(context: Arc<ProviderContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Resource for RedisConfigGroupResource {
    type State<'a> = RedisConfigGroupState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(RedisConfigGroupState::schema())
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
        let config_group_no = as_str(&state.id)?.to_owned();

        match client
            .api
            .get_redis_config_group(&client.region, &config_group_no)
            .await
        {
            Ok(Some(group)) => {
                let mut state = state;
                state.apply(group);
                Some((state, private_state))
            }
            Ok(None) => None,
            Err(err) if err.is_not_found() => None,
            Err(err) => {
                diags.root_error("Failed to read Redis config group", err.to_string());
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
        state.id = Value::Unknown;
        state.status = Value::Unknown;
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
        let mut trigger_replace = Vec::new();
        for (name, prior, proposed) in [
            ("name", &prior_state.name, &proposed_state.name),
            ("redis_version", &prior_state.redis_version, &proposed_state.redis_version),
            ("description", &prior_state.description, &proposed_state.description),
        ] {
            replace_if_changed(&mut trigger_replace, name, prior, proposed);
        }

        let mut state = proposed_state;
        if !trigger_replace.is_empty() {
            state.id = Value::Unknown;
            state.status = Value::Unknown;
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

        let group = match client
            .api
            .create_redis_config_group(&planned_state.request(&client.region))
            .await
        {
            Ok(group) => group,
            Err(err) => {
                diags.error(
                    "Failed to create Redis config group",
                    err.to_string(),
                    AttributePath::new("name"),
                );
                return None;
            }
        };
        let config_group_no = group.config_group_no.clone();
        info!(%config_group_no, "Redis config group creation requested");

        let mut state = planned_state;
        state.apply(group);

        match Waiter::new(
            format!("Redis config group {config_group_no}"),
            CONFIG_GROUP_CREATE_WAIT.with_timeout(timeout),
        )
        .cancel_on(self.context.shutdown())
        .wait(|| refresh_config_group(&client.api, &client.region, &config_group_no))
        .await
        {
            Ok(Some(group)) => state.apply(group),
            Ok(None) => (),
            Err(err) => {
                diags.root_error(
                    "Failed waiting for Redis config group to be created",
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
        let config_group_no = as_str(&state.id)?;

        match client
            .api
            .delete_redis_config_group(&client.region, config_group_no)
            .await
        {
            Ok(()) => (),
            Err(err) if err.is_not_found() => return Some(()),
            Err(err) => {
                diags.root_error("Failed to delete Redis config group", err.to_string());
                return None;
            }
        }

        if let Err(err) = Waiter::new(
            format!("Redis config group {config_group_no}"),
            CONFIG_GROUP_DELETE_WAIT.with_timeout(timeout),
        )
        .cancel_on(self.context.shutdown())
        .not_found_as(phase::DELETED, SdkError::is_not_found)
        .wait(|| refresh_config_group(&client.api, &client.region, config_group_no))
        .await
        {
            diags.root_error(
                "Failed waiting for Redis config group to be deleted",
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
        let state = RedisConfigGroupState {
            id: Value::Value(id.into()),
            ..Default::default()
        };
        Some((state, Default::default()))
    }
}
