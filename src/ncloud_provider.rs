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

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use tf_provider::{map, AttributePath, Diagnostics, Provider, schema::Schema, value::ValueEmpty};

use crate::config::ProviderConfig;
use crate::mongodb::{MongoDbDataSource, MongoDbResource};
use crate::mysql::{MysqlDataSource, MysqlRecoveryResource, MysqlResource, MysqlSlaveResource};
use crate::redis::{RedisConfigGroupResource, RedisDataSource, RedisResource};
use crate::region::{RegionTable, RegionsDataSource};
use crate::sdk::ApiClient;
use crate::utils::{DisplayJoinable, WithSchema, WithValidate};
use crate::vpc::{VpcDataSource, VpcResource};

/// Everything a resource needs once the provider is configured.
#[derive(Debug)]
pub struct NcloudClient {
    pub api: ApiClient,
    pub regions: RegionTable,
    /// Region every resource is created in
    pub region: String,
}

/// State shared by the provider and all its resources and data sources.
///
/// Resources are instantiated before `configure` runs, so the client is
/// filled in later, exactly once.
#[derive(Debug, Default)]
pub struct ProviderContext {
    client: OnceCell<Arc<NcloudClient>>,
    shutdown: CancellationToken,
}

impl ProviderContext {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            client: OnceCell::new(),
            shutdown,
        }
    }

    /// Client of a configured provider; reports an error otherwise.
    pub fn client(&self, diags: &mut Diagnostics) -> Option<Arc<NcloudClient>> {
        match self.client.get() {
            Some(client) => Some(client.clone()),
            None => {
                diags.root_error_short("The ncloud provider has not been configured");
                None
            }
        }
    }

    /// Cancelled when the plugin is asked to stop; every wait races it.
    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }

    fn set_client(&self, client: NcloudClient) -> bool {
        self.client.set(Arc::new(client)).is_ok()
    }

    #[cfg(test)]
    pub(crate) fn configured(client: NcloudClient) -> Arc<Self> {
        let context = Self::default();
        context.set_client(client);
        Arc::new(context)
    }
}

#[derive(Debug, Clone)]
pub struct NcloudProvider {
    context: Arc<ProviderContext>,
}

impl NcloudProvider {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            context: Arc::new(ProviderContext::new(shutdown)),
        }
    }
}

#[async_trait]
impl Provider for NcloudProvider {
    type Config<'a> = ProviderConfig<'a>;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ProviderConfig::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::Config<'a>) -> Option<()> {
        config.validate(diags, AttributePath::default());

        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        let settings = match config.resolve() {
            Ok(settings) => settings,
            Err(errors) => {
                for err in errors {
                    diags.error(
                        "Invalid provider configuration",
                        err.to_string(),
                        AttributePath::new(err.attribute()),
                    );
                }
                return None;
            }
        };

        let api = match ApiClient::new(&settings.endpoint, settings.credentials) {
            Ok(api) => api,
            Err(err) => {
                diags.error(
                    "Invalid API endpoint",
                    err.to_string(),
                    AttributePath::new("endpoint"),
                );
                return None;
            }
        };

        let regions = match api.get_region_list().await {
            Ok(regions) => RegionTable::new(regions),
            Err(err) => {
                diags.root_error("Failed to list regions", err.to_string());
                return None;
            }
        };
        if !regions.is_empty() && !regions.contains(&settings.region) {
            diags.error(
                "Unknown region",
                format!(
                    "`{}` is not one of the available regions: {}",
                    settings.region,
                    regions.codes().join_with(", ")
                ),
                AttributePath::new("region"),
            );
            return None;
        }

        info!(
            %terraform_version,
            endpoint = %api.endpoint(),
            region = %settings.region,
            regions = regions.iter().count(),
            "provider configured"
        );
        let configured = self.context.set_client(NcloudClient {
            api,
            regions,
            region: settings.region,
        });
        if !configured {
            warn!("provider configured more than once, keeping the first configuration");
        }
        Some(())
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<std::collections::HashMap<String, Box<dyn tf_provider::DynamicResource>>>
    {
        let context = &self.context;
        Some(map! {
            "ncloud_vpc"                => VpcResource::new(context.clone()),
            "ncloud_mongodb"            => MongoDbResource::new(context.clone()),
            "ncloud_mysql"              => MysqlResource::new(context.clone()),
            "ncloud_mysql_slave"        => MysqlSlaveResource::new(context.clone()),
            "ncloud_mysql_recovery"     => MysqlRecoveryResource::new(context.clone()),
            "ncloud_redis"              => RedisResource::new(context.clone()),
            "ncloud_redis_config_group" => RedisConfigGroupResource::new(context.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<
        std::collections::HashMap<String, Box<dyn tf_provider::DynamicDataSource>>,
    > {
        let context = &self.context;
        Some(map! {
            "ncloud_regions" => RegionsDataSource::new(context.clone()),
            "ncloud_vpc"     => VpcDataSource::new(context.clone()),
            "ncloud_mongodb" => MongoDbDataSource::new(context.clone()),
            "ncloud_mysql"   => MysqlDataSource::new(context.clone()),
            "ncloud_redis"   => RedisDataSource::new(context.clone()),
        })
    }
}
