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
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description};
use tf_provider::value::{Value, ValueEmpty, ValueList, ValueMap, ValueString};
use tf_provider::{map, AttributePath, DataSource, Diagnostics, schema::Schema};

use crate::ncloud_provider::ProviderContext;
use crate::sdk::vserver::Region;
use crate::utils::{as_str, attribute, string_list_type, DisplayJoinable, WithSchema};

/// Regions available to the configured account, fetched once at configure
/// time and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionTable {
    regions: BTreeMap<String, Region>,
}

impl RegionTable {
    pub fn new(regions: impl IntoIterator<Item = Region>) -> Self {
        Self {
            regions: regions
                .into_iter()
                .map(|region| (region.region_code.clone(), region))
                .collect(),
        }
    }

    pub fn get(&self, code: &str) -> Option<&Region> {
        self.regions.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.regions.contains_key(code)
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions ordered by code.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionsState<'a> {
    pub id: ValueString<'a>,
    pub code: ValueString<'a>,
    pub region_codes: ValueList<ValueString<'a>>,
    pub region_names: ValueMap<'a, ValueString<'a>>,
}

impl<'a> WithSchema for RegionsState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Regions available to the configured account"),
                attributes: map! {
                    "id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "Configured region of the provider",
                    ),
                    "code" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Only return the region with this code",
                    ),
                    "region_codes" => attribute(
                        string_list_type(),
                        AttributeConstraint::Computed,
                        "Codes of the matching regions",
                    ),
                    "region_names" => attribute(
                        AttributeType::Map(Box::new(AttributeType::String)),
                        AttributeConstraint::Computed,
                        "Name of each matching region, by code",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

#[derive(Debug)]
pub struct RegionsDataSource {
    context: Arc<ProviderContext>,
}

impl RegionsDataSource {
    pub fn new(context: Arc<ProviderContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl DataSource for RegionsDataSource {
    type State<'a> = RegionsState<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(RegionsState::schema())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.context.client(diags)?;
        let regions = &client.regions;

        let matching: Vec<&Region> = match as_str(&config.code) {
            Some(code) => match regions.get(code) {
                Some(region) => vec![region],
                None => {
                    diags.error(
                        "Unknown region",
                        format!(
                            "`{code}` is not one of the available regions: {}",
                            regions.codes().join_with(", ")
                        ),
                        AttributePath::new("code"),
                    );
                    return None;
                }
            },
            None => regions.iter().collect(),
        };

        let mut state = config;
        state.id = Value::Value(Cow::Owned(client.region.clone()));
        state.region_codes = Value::Value(
            matching
                .iter()
                .map(|region| Value::Value(Cow::Owned(region.region_code.clone())))
                .collect(),
        );
        state.region_names = Value::Value(
            matching
                .iter()
                .map(|region| {
                    (
                        Cow::Owned(region.region_code.clone()),
                        Value::Value(Cow::Owned(region.region_name.clone())),
                    )
                })
                .collect(),
        );
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wiremock::MockServer;

    use crate::ncloud_provider::NcloudClient;
    use crate::sdk::testing::client;

    use super::*;

    fn region(code: &str, name: &str) -> Region {
        Region {
            region_code: code.to_owned(),
            region_name: name.to_owned(),
        }
    }

    #[test]
    fn table_is_ordered_by_code() {
        let table = RegionTable::new([
            region("SGN", "Singapore"),
            region("KR", "Korea"),
            region("JPN", "Japan"),
        ]);

        assert_eq!(table.codes().collect::<Vec<_>>(), vec!["JPN", "KR", "SGN"]);
        assert_eq!(table.get("KR").map(|r| r.region_name.as_str()), Some("Korea"));
        assert!(!table.contains("USWN"));
        assert!(RegionTable::default().is_empty());
    }

    fn data_source(server: &MockServer) -> RegionsDataSource {
        RegionsDataSource::new(ProviderContext::configured(NcloudClient {
            api: client(server),
            regions: RegionTable::new([region("KR", "Korea"), region("JPN", "Japan")]),
            region: "KR".to_owned(),
        }))
    }

    fn filter(code: &'static str) -> RegionsState<'static> {
        RegionsState {
            code: Value::Value(Cow::Borrowed(code)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn code_selects_a_single_region() {
        let server = MockServer::start().await;
        let mut diags = Diagnostics::default();
        let state = data_source(&server)
            .read(&mut diags, filter("KR"), Default::default())
            .await
            .unwrap();

        let set = |value: &'static str| Value::Value(Cow::Borrowed(value));
        assert!(diags.errors.is_empty());
        assert_eq!(state.id, set("KR"));
        assert_eq!(state.region_codes, Value::Value(vec![set("KR")]));
        assert_eq!(
            state.region_names,
            Value::Value(BTreeMap::from([(Cow::Borrowed("KR"), set("Korea"))]))
        );
    }

    #[tokio::test]
    async fn without_code_every_region_is_listed() {
        let server = MockServer::start().await;
        let mut diags = Diagnostics::default();
        let state = data_source(&server)
            .read(&mut diags, RegionsState::default(), Default::default())
            .await
            .unwrap();

        let set = |value: &'static str| Value::Value(Cow::Borrowed(value));
        assert_eq!(state.region_codes, Value::Value(vec![set("JPN"), set("KR")]));
    }

    #[tokio::test]
    async fn unknown_code_is_an_error_on_code() {
        let server = MockServer::start().await;
        let mut diags = Diagnostics::default();
        let state = data_source(&server)
            .read(&mut diags, filter("USWN"), Default::default())
            .await;

        assert_eq!(state, None);
        assert_eq!(diags.errors.len(), 1);
        assert_eq!(diags.errors[0].attribute, AttributePath::new("code"));
        assert!(diags.errors[0].detail.contains("JPN, KR"), "{}", diags.errors[0].detail);
    }
}
