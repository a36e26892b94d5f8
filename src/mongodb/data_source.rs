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

use tf_provider::{AttributePath, DataSource, Diagnostics, schema::Schema, value::ValueEmpty};

use crate::ncloud_provider::ProviderContext;
use crate::utils::{as_str, WithSchema};

use super::state::MongoDbDataState;

#[derive(Debug)]
pub struct MongoDbDataSource {
    context: Arc<ProviderContext>,
}

impl MongoDbDataSource {
    pub fn new(context: Arc<ProviderContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl DataSource for MongoDbDataSource {
    type State<'a> = MongoDbDataState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(MongoDbDataState::schema())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.context.client(diags)?;
        let Some(instance_no) = as_str(&config.id).map(str::to_owned) else {
            diags.error_short("`id` is required", AttributePath::new("id"));
            return None;
        };

        match client
            .api
            .get_mongodb_instance(&client.region, &instance_no)
            .await
        {
            Ok(Some(instance)) => {
                let mut state = config;
                state.apply(instance);
                Some(state)
            }
            Ok(None) => {
                diags.error_short(
                    format!("MongoDB instance {instance_no} not found"),
                    AttributePath::new("id"),
                );
                None
            }
            Err(err) => {
                diags.error(
                    "Failed to read MongoDB instance",
                    err.to_string(),
                    AttributePath::new("id"),
                );
                None
            }
        }
    }
}
