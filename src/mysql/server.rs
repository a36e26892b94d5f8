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

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use tf_provider::value::ValueEmpty;
use tf_provider::{schema::Schema, AttributePath, Diagnostics, Resource};

use crate::ncloud_provider::ProviderContext;
use crate::sdk::vmysql::CloudMysqlServerInstance;
use crate::sdk::{ApiClient, SdkError};
use crate::timeouts::{wait_failure, WithTimeouts};
use crate::utils::{WithSchema, WithValidate};
use crate::wait::{phase, Waiter};

use super::{
    new_server, refresh_server_creation, refresh_server_removal, SERVER_CREATE_WAIT,
    SERVER_DELETE_WAIT,
};

const CREATE_TIMEOUT: Duration = Duration::from_secs(6 * 3600);
const DELETE_TIMEOUT: Duration = Duration::from_secs(3600);
/// Servers of one instance are often added together and poll the same parent
const POLL_JITTER: f64 = 0.2;

/// State of a server attached to an existing MySQL instance.
pub trait ServerState: WithSchema + WithValidate + WithTimeouts {
    /// State of an imported server, before its first read
    fn imported(instance_no: String, server_no: String) -> Self;

    fn instance_no(&self) -> Option<&str>;
    fn server_no(&self) -> Option<&str>;

    /// Update the computed attributes from the API.
    fn apply(&mut self, server: &CloudMysqlServerInstance);
    fn mark_computed_unknown(&mut self);

    /// Attributes whose change from `self` to `proposed` needs a new server
    fn replaced_attributes(&self, proposed: &Self) -> Vec<AttributePath>;
}

/// A kind of server added to a MySQL instance after its creation.
#[async_trait]
pub trait ServerRole: Send + Sync + 'static {
    /// Role code reported in the server list
    const ROLE: &'static str;
    /// Name used in diagnostics
    const NAME: &'static str;

    type State<'a>: ServerState
        + Send
        + Sync
        + Clone
        + Debug
        + Default
        + Serialize
        + Deserialize<'a>;

    /// Request a new server on `instance_no`.
    async fn create<'a>(
        api: &ApiClient,
        region: &str,
        instance_no: &str,
        state: &Self::State<'a>,
    ) -> Result<(), SdkError>;
}

#[derive(Debug)]
pub struct MysqlServerResource<K: ServerRole> {
    context: Arc<ProviderContext>,
    role: PhantomData<K>,
}

impl<K: ServerRole> MysqlServerResource<K> {
    pub fn new(context: Arc<ProviderContext>) -> Self {
        Self {
            context,
            role: PhantomData,
        }
    }
}

#[async_trait]
impl<K> Resource for MysqlServerResource<K>
where
    K: ServerRole,
{
    type State<'a> = K::State<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(<K::State<'static> as WithSchema>::schema())
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
        let instance_no = state.instance_no()?.to_owned();
        let server_no = state.server_no()?.to_owned();

        match client
            .api
            .get_mysql_instance(&client.region, &instance_no)
            .await
        {
            Ok(Some(instance)) => {
                let server = instance.server(&server_no)?;
                let mut state = state;
                state.apply(server);
                Some((state, private_state))
            }
            Ok(None) => None,
            Err(err) if err.is_not_found() => None,
            Err(err) => {
                diags.root_error(format!("Failed to read {}", K::NAME), err.to_string());
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
        let trigger_replace = prior_state.replaced_attributes(&proposed_state);
        let mut state = proposed_state;
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
        let Some(instance_no) = planned_state.instance_no().map(str::to_owned) else {
            diags.error_short(
                "`mysql_instance_no` is required",
                AttributePath::new("mysql_instance_no"),
            );
            return None;
        };

        // Servers of the same role that exist before the request
        let known: BTreeSet<String> = match client
            .api
            .get_mysql_instance(&client.region, &instance_no)
            .await
        {
            Ok(Some(instance)) => instance
                .servers_with_role(K::ROLE)
                .map(|server| server.cloud_mysql_server_instance_no.clone())
                .collect(),
            Ok(None) => {
                diags.error_short(
                    format!("MySQL instance {instance_no} not found"),
                    AttributePath::new("mysql_instance_no"),
                );
                return None;
            }
            Err(err) => {
                diags.root_error("Failed to read MySQL instance", err.to_string());
                return None;
            }
        };

        if let Err(err) =
            K::create(&client.api, &client.region, &instance_no, &planned_state).await
        {
            diags.root_error(format!("Failed to create {}", K::NAME), err.to_string());
            return None;
        }
        info!(%instance_no, role = K::ROLE, "MySQL server creation requested");

        let mut state = planned_state;
        let waited = Waiter::new(
            format!("MySQL instance {instance_no}"),
            SERVER_CREATE_WAIT
                .with_timeout(timeout)
                .with_jitter(POLL_JITTER),
        )
        .cancel_on(self.context.shutdown())
        .wait(|| {
            refresh_server_creation(&client.api, &client.region, &instance_no, K::ROLE, &known)
        })
        .await;

        let instance = match waited {
            Ok(Some(instance)) => instance,
            Ok(None) => {
                diags.root_error_short(format!("MySQL instance {instance_no} disappeared"));
                return None;
            }
            Err(err) => {
                diags.root_error(
                    format!("Failed waiting for {} to be created", K::NAME),
                    wait_failure(&err),
                );
                // Record the server if it already shows up so it gets tainted
                let instance = client
                    .api
                    .get_mysql_instance(&client.region, &instance_no)
                    .await
                    .ok()
                    .flatten()?;
                state.apply(new_server(&instance, K::ROLE, &known)?);
                return Some((state, private_state));
            }
        };

        match new_server(&instance, K::ROLE, &known) {
            Some(server) => {
                info!(
                    %instance_no,
                    server_no = %server.cloud_mysql_server_instance_no,
                    "MySQL server created"
                );
                state.apply(server);
                Some((state, private_state))
            }
            None => {
                diags.root_error_short(format!(
                    "No new {} found on MySQL instance {instance_no}",
                    K::NAME
                ));
                None
            }
        }
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
        let instance_no = state.instance_no()?;
        let server_no = state.server_no()?;

        match client
            .api
            .delete_mysql_server(&client.region, server_no)
            .await
        {
            Ok(()) => (),
            Err(err) if err.is_not_found() => return Some(()),
            Err(err) => {
                diags.root_error(format!("Failed to delete {}", K::NAME), err.to_string());
                return None;
            }
        }

        if let Err(err) = Waiter::new(
            format!("MySQL instance {instance_no}"),
            SERVER_DELETE_WAIT
                .with_timeout(timeout)
                .with_jitter(POLL_JITTER),
        )
        .cancel_on(self.context.shutdown())
        .not_found_as(phase::DELETED, SdkError::is_not_found)
        .wait(|| refresh_server_removal(&client.api, &client.region, instance_no, server_no))
        .await
        {
            diags.root_error(
                format!("Failed waiting for {} to be deleted", K::NAME),
                wait_failure(&err),
            );
            return None;
        }
        Some(())
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Some((instance_no, server_no)) = id.split_once(':') else {
            diags.root_error_short(format!(
                "Invalid import id `{id}`, expected `<mysql_instance_no>:<server_instance_no>`"
            ));
            return None;
        };
        let state =
            <K::State<'a> as ServerState>::imported(instance_no.to_owned(), server_no.to_owned());
        Some((state, Default::default()))
    }
}
