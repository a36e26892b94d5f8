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
use crate::sdk::vpc::CreateVpc;
use crate::sdk::SdkError;
use crate::timeouts::{wait_failure, WithTimeouts};
use crate::utils::{as_str, replace_if_changed, unknown_if_null, WithSchema, WithValidate};
use crate::wait::{phase, WaitConfig, Waiter};

use super::refresh;
use super::state::VpcState;

const CREATE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const DELETE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

pub(super) const CREATE_WAIT: WaitConfig =
    WaitConfig::new(&[phase::CREATING], &[phase::RUNNING]).with_poll_interval(Duration::from_secs(2));
pub(super) const DELETE_WAIT: WaitConfig =
    WaitConfig::new(&[phase::DELETING], &[phase::DELETED]).with_poll_interval(Duration::from_secs(2));

#[derive(Debug)]
pub struct VpcResource {
    context: Arc<ProviderContext>,
}

impl VpcResource {
    pub fn new(context: Arc<ProviderContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Resource for VpcResource {
    type State<'a> = VpcState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(VpcState::schema())
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
        let vpc_no = as_str(&state.id)?.to_owned();

        match client.api.get_vpc(&client.region, &vpc_no).await {
            Ok(Some(vpc)) => {
                let mut state = state;
                state.apply(vpc);
                Some((state, private_state))
            }
            // Removed outside of Terraform
            Ok(None) => None,
            Err(err) if err.is_not_found() => None,
            Err(err) => {
                diags.root_error("Failed to read VPC", err.to_string());
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
        unknown_if_null(&mut state.name);

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
        replace_if_changed(
            &mut trigger_replace,
            "ipv4_cidr_block",
            &prior_state.ipv4_cidr_block,
            &proposed_state.ipv4_cidr_block,
        );
        replace_if_changed(
            &mut trigger_replace,
            "name",
            &prior_state.name,
            &proposed_state.name,
        );

        let mut state = proposed_state;
        if !trigger_replace.is_empty() {
            state.id = Value::Unknown;
            state.status = Value::Unknown;
            unknown_if_null(&mut state.name);
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

        let request = CreateVpc {
            region_code: client.region.clone(),
            vpc_name: as_str(&planned_state.name).map(str::to_owned),
            ipv4_cidr_block: as_str(&planned_state.ipv4_cidr_block)
                .unwrap_or_default()
                .to_owned(),
        };
        let vpc = match client.api.create_vpc(&request).await {
            Ok(vpc) => vpc,
            Err(err) => {
                diags.error(
                    "Failed to create VPC",
                    err.to_string(),
                    AttributePath::new("ipv4_cidr_block"),
                );
                return None;
            }
        };
        let vpc_no = vpc.vpc_no.clone();
        info!(%vpc_no, "VPC creation requested");

        let mut state = planned_state;
        state.apply(vpc);

        // The id is kept even if the wait fails so that Terraform taints the VPC
        match Waiter::new(format!("VPC {vpc_no}"), CREATE_WAIT.with_timeout(timeout))
            .cancel_on(self.context.shutdown())
            .wait(|| refresh(&client.api, &client.region, &vpc_no))
            .await
        {
            Ok(Some(vpc)) => state.apply(vpc),
            Ok(None) => (),
            Err(err) => {
                diags.root_error("Failed waiting for VPC to be created", wait_failure(&err));
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
        // Only `timeouts` can change in place
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
        let vpc_no = as_str(&state.id)?;

        match client.api.delete_vpc(&client.region, vpc_no).await {
            Ok(()) => (),
            Err(err) if err.is_not_found() => return Some(()),
            Err(err) => {
                diags.root_error("Failed to delete VPC", err.to_string());
                return None;
            }
        }

        if let Err(err) = Waiter::new(format!("VPC {vpc_no}"), DELETE_WAIT.with_timeout(timeout))
            .cancel_on(self.context.shutdown())
            .not_found_as(phase::DELETED, SdkError::is_not_found)
            .wait(|| refresh(&client.api, &client.region, vpc_no))
            .await
        {
            diags.root_error("Failed waiting for VPC to be deleted", wait_failure(&err));
            return None;
        }
        Some(())
    }

    async fn import<'a>(
        &self,
        _diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let state = VpcState {
            id: Value::Value(id.into()),
            ..Default::default()
        };
        Some((state, Default::default()))
    }
}
