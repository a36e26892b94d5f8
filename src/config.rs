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

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description};
use tf_provider::value::ValueString;
use tf_provider::{map, AttributePath, Diagnostics, schema::Schema};

use crate::sdk::Credentials;
use crate::utils::{as_str, attribute, WithSchema, WithValidate};

pub const ACCESS_KEY_ENV: &str = "NCLOUD_ACCESS_KEY";
pub const SECRET_KEY_ENV: &str = "NCLOUD_SECRET_KEY";
pub const REGION_ENV: &str = "NCLOUD_REGION";
pub const SITE_ENV: &str = "NCLOUD_SITE";
pub const ENDPOINT_ENV: &str = "NCLOUD_API_GW";

pub const DEFAULT_REGION: &str = "KR";

/// `provider "ncloud" { ... }` block.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig<'a> {
    pub access_key: ValueString<'a>,
    pub secret_key: ValueString<'a>,
    pub region: ValueString<'a>,
    pub site: ValueString<'a>,
    pub endpoint: ValueString<'a>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Site {
    #[default]
    Public,
    Gov,
    Fin,
}

impl Site {
    pub fn endpoint(self) -> &'static str {
        match self {
            Site::Public => "https://ncloud.apigw.ntruss.com",
            Site::Gov => "https://ncloud.apigw.gov-ntruss.com",
            Site::Fin => "https://fin-ncloud.apigw.fin-ntruss.com",
        }
    }
}

impl FromStr for Site {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "public" => Ok(Site::Public),
            "gov" => Ok(Site::Gov),
            "fin" => Ok(Site::Fin),
            _ => Err(ConfigError::UnknownSite(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no access key: set `access_key` or {ACCESS_KEY_ENV}")]
    MissingAccessKey,
    #[error("no secret key: set `secret_key` or {SECRET_KEY_ENV}")]
    MissingSecretKey,
    #[error("unknown site `{0}`: expected one of public, gov, fin")]
    UnknownSite(String),
}

impl ConfigError {
    /// Provider attribute the error relates to.
    pub fn attribute(&self) -> &'static str {
        match self {
            ConfigError::MissingAccessKey => "access_key",
            ConfigError::MissingSecretKey => "secret_key",
            ConfigError::UnknownSite(_) => "site",
        }
    }
}

/// Configuration with environment fallbacks applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub credentials: Credentials,
    pub region: String,
    pub site: Site,
    pub endpoint: String,
}

impl<'a> ProviderConfig<'a> {
    pub fn resolve(&self) -> Result<Settings, Vec<ConfigError>> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve against `lookup` for the environment. Every problem is
    /// reported, not only the first one.
    pub fn resolve_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Settings, Vec<ConfigError>> {
        let pick = |value: &ValueString<'_>, env: &str| -> Option<String> {
            as_str(value)
                .map(str::to_owned)
                .or_else(|| lookup(env))
                .filter(|value| !value.is_empty())
        };

        let mut errors = Vec::new();
        let access_key = pick(&self.access_key, ACCESS_KEY_ENV);
        if access_key.is_none() {
            errors.push(ConfigError::MissingAccessKey);
        }
        let secret_key = pick(&self.secret_key, SECRET_KEY_ENV);
        if secret_key.is_none() {
            errors.push(ConfigError::MissingSecretKey);
        }
        let site = match pick(&self.site, SITE_ENV).as_deref().map(Site::from_str) {
            None => Site::default(),
            Some(Ok(site)) => site,
            Some(Err(err)) => {
                errors.push(err);
                Site::default()
            }
        };
        let region = pick(&self.region, REGION_ENV).unwrap_or_else(|| DEFAULT_REGION.to_owned());
        let endpoint =
            pick(&self.endpoint, ENDPOINT_ENV).unwrap_or_else(|| site.endpoint().to_owned());

        match (access_key, secret_key) {
            (Some(access_key), Some(secret_key)) if errors.is_empty() => Ok(Settings {
                credentials: Credentials {
                    access_key,
                    secret_key,
                },
                region,
                site,
                endpoint,
            }),
            _ => Err(errors),
        }
    }
}

impl<'a> WithSchema for ProviderConfig<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("NAVER Cloud Platform"),
                attributes: map! {
                    "access_key" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "API access key, defaults to $NCLOUD_ACCESS_KEY",
                    ),
                    "secret_key" => tf_provider::schema::Attribute {
                        sensitive: true,
                        ..attribute(
                            AttributeType::String,
                            AttributeConstraint::Optional,
                            "API secret key, defaults to $NCLOUD_SECRET_KEY",
                        )
                    },
                    "region" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "Region code, defaults to $NCLOUD_REGION or KR",
                    ),
                    "site" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "`public`, `gov` or `fin`, defaults to $NCLOUD_SITE or public",
                    ),
                    "endpoint" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Optional,
                        "API gateway URL overriding the site default, defaults to $NCLOUD_API_GW",
                    ),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for ProviderConfig<'a> {
    /// Static checks only: credentials may still come from the environment.
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        if let Some(site) = as_str(&self.site) {
            if let Err(err) = Site::from_str(site) {
                diags.error(
                    "Invalid site",
                    err.to_string(),
                    attr_path.clone().attribute("site"),
                );
            }
        }
        if let Some(endpoint) = as_str(&self.endpoint) {
            if let Err(err) = url::Url::parse(endpoint) {
                diags.error(
                    "Invalid endpoint",
                    err.to_string(),
                    attr_path.attribute("endpoint"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use tf_provider::value::Value;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn set(value: &str) -> ValueString<'_> {
        Value::Value(Cow::Borrowed(value))
    }

    #[test]
    fn falls_back_to_environment() {
        let settings = ProviderConfig::default()
            .resolve_with(env(&[
                (ACCESS_KEY_ENV, "ak"),
                (SECRET_KEY_ENV, "sk"),
                (SITE_ENV, "gov"),
            ]))
            .unwrap();

        assert_eq!(settings.credentials.access_key, "ak");
        assert_eq!(settings.region, DEFAULT_REGION);
        assert_eq!(settings.site, Site::Gov);
        assert_eq!(settings.endpoint, "https://ncloud.apigw.gov-ntruss.com");
    }

    #[test]
    fn attributes_win_over_environment() {
        let config = ProviderConfig {
            access_key: set("from-config"),
            secret_key: set("secret"),
            region: set("JPN"),
            endpoint: set("http://localhost:8080"),
            ..Default::default()
        };
        let settings = config
            .resolve_with(env(&[(ACCESS_KEY_ENV, "from-env"), (REGION_ENV, "SGN")]))
            .unwrap();

        assert_eq!(settings.credentials.access_key, "from-config");
        assert_eq!(settings.region, "JPN");
        assert_eq!(settings.endpoint, "http://localhost:8080");
    }

    #[test]
    fn reports_every_problem() {
        let config = ProviderConfig {
            site: set("moon"),
            ..Default::default()
        };
        let errors = config.resolve_with(env(&[])).unwrap_err();

        assert_eq!(
            errors,
            vec![
                ConfigError::MissingAccessKey,
                ConfigError::MissingSecretKey,
                ConfigError::UnknownSite("moon".to_owned()),
            ]
        );
        assert_eq!(errors[2].attribute(), "site");
    }

    #[test]
    fn empty_values_are_unset() {
        let errors = ProviderConfig::default()
            .resolve_with(env(&[(ACCESS_KEY_ENV, ""), (SECRET_KEY_ENV, "sk")]))
            .unwrap_err();
        assert_eq!(errors, vec![ConfigError::MissingAccessKey]);
    }

    #[test]
    fn validate_flags_bad_site() {
        let mut diags = Diagnostics::default();
        ProviderConfig {
            site: set("FIN"),
            ..Default::default()
        }
        .validate(&mut diags, AttributePath::default());
        assert!(diags.errors.is_empty());

        ProviderConfig {
            site: set("private"),
            ..Default::default()
        }
        .validate(&mut diags, AttributePath::default());
        assert_eq!(diags.errors.len(), 1);
    }
}
