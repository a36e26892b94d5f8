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

use serde::{Deserialize, Serialize};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description, NestedBlock};
use tf_provider::value::{Value, ValueString};
use tf_provider::{map, AttributePath, Diagnostics};

use crate::utils::{as_str, attribute};
use crate::wait::WaitError;

/// `timeouts { create = "..." delete = "..." }` block of a resource.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeouts<'a> {
    pub create: ValueString<'a>,
    pub delete: ValueString<'a>,
}

impl<'a> Timeouts<'a> {
    pub fn block() -> NestedBlock {
        NestedBlock::Optional(Block {
            description: Description::plain("Overrides of the default operation timeouts"),
            attributes: map! {
                "create" => attribute(
                    AttributeType::String,
                    AttributeConstraint::Optional,
                    "How long to wait for the resource to be created (e.g. `30m`, `6h`)",
                ),
                "delete" => attribute(
                    AttributeType::String,
                    AttributeConstraint::Optional,
                    "How long to wait for the resource to be deleted (e.g. `30m`, `6h`)",
                ),
            },
            ..Default::default()
        })
    }

    pub fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        for (name, value) in [("create", &self.create), ("delete", &self.delete)] {
            if let Some(text) = as_str(value) {
                if let Err(err) = parse_duration(text) {
                    diags.error(
                        "Invalid timeout",
                        err.to_string(),
                        attr_path.clone().attribute(name),
                    );
                }
            }
        }
    }
}

/// Effective timeouts of an operation, falling back to per-resource defaults.
pub(crate) trait WithTimeouts {
    fn timeouts(&self) -> &Value<Timeouts<'_>>;

    fn create_timeout(&self, default: Duration) -> Duration {
        match self.timeouts() {
            Value::Value(timeouts) => parse_or(as_str(&timeouts.create), default),
            _ => default,
        }
    }

    fn delete_timeout(&self, default: Duration) -> Duration {
        match self.timeouts() {
            Value::Value(timeouts) => parse_or(as_str(&timeouts.delete), default),
            _ => default,
        }
    }
}

/// Detail of a failed wait. A timeout points at the `timeouts` block.
pub(crate) fn wait_failure<E: std::fmt::Display>(err: &WaitError<E>) -> String {
    if err.is_timeout() {
        format!("{err}; raise the `timeouts` of the resource if the operation is slow")
    } else {
        err.to_string()
    }
}

fn parse_or(text: Option<&str>, default: Duration) -> Duration {
    text.and_then(|text| parse_duration(text).ok())
        .unwrap_or(default)
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration `{0}`: expected a sequence of <number><unit> with unit in h, m, s, ms")]
    Invalid(String),
}

/// Parse a duration such as `90s`, `30m`, `6h` or `1h30m`.
pub fn parse_duration(text: &str) -> Result<Duration, DurationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DurationError::Empty);
    }
    let invalid = || DurationError::Invalid(text.to_owned());

    let mut total = Duration::ZERO;
    let mut rest = text;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
        if digits == 0 {
            return Err(invalid());
        }
        let amount: u64 = rest[..digits].parse().map_err(|_| invalid())?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let unit = match &rest[..unit_len] {
            "h" => Duration::from_secs(3600),
            "m" => Duration::from_secs(60),
            "s" => Duration::from_secs(1),
            "ms" => Duration::from_millis(1),
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];

        total += unit
            .checked_mul(u32::try_from(amount).map_err(|_| invalid())?)
            .ok_or_else(invalid)?;
    }
    Ok(total)
}
