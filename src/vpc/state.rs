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

use serde::{Deserialize, Serialize};
use tf_provider::schema::{AttributeConstraint, AttributeType, Block, Description};
use tf_provider::value::{Value, ValueString};
use tf_provider::{map, AttributePath, Diagnostics, schema::Schema};

use crate::sdk::{code_of, vpc::Vpc};
use crate::timeouts::{Timeouts, WithTimeouts};
use crate::utils::{as_str, attribute, require, string_value, WithSchema, WithValidate};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpcState<'a> {
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub ipv4_cidr_block: ValueString<'a>,
    pub status: ValueString<'a>,
    pub timeouts: Value<Timeouts<'a>>,
}

impl<'a> VpcState<'a> {
    pub(super) fn apply(&mut self, vpc: Vpc) {
        self.status = string_value(Some(code_of(&vpc.vpc_status).to_owned()));
        self.id = string_value(Some(vpc.vpc_no));
        self.name = string_value(Some(vpc.vpc_name));
        self.ipv4_cidr_block = string_value(Some(vpc.ipv4_cidr_block));
    }
}

impl<'a> WithSchema for VpcState<'a> {
    fn schema() -> Schema {
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Virtual private cloud"),
                attributes: map! {
                    "id" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "VPC number",
                    ),
                    "name" => attribute(
                        AttributeType::String,
                        AttributeConstraint::OptionalComputed,
                        "Name of the VPC, generated when omitted",
                    ),
                    "ipv4_cidr_block" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Required,
                        "IPv4 range of the VPC, within a private range and between /16 and /28",
                    ),
                    "status" => attribute(
                        AttributeType::String,
                        AttributeConstraint::Computed,
                        "Status code reported by the API",
                    ),
                },
                blocks: map! {
                    "timeouts" => Timeouts::block(),
                },
                ..Default::default()
            },
        }
    }
}

impl<'a> WithValidate for VpcState<'a> {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath) {
        require(diags, &attr_path, "ipv4_cidr_block", &self.ipv4_cidr_block);
        if let Some(cidr) = as_str(&self.ipv4_cidr_block) {
            if !is_cidr(cidr) {
                diags.error(
                    "Invalid CIDR block",
                    format!("`{cidr}` is not an IPv4 CIDR block"),
                    attr_path.clone().attribute("ipv4_cidr_block"),
                );
            }
        }
        if let Value::Value(timeouts) = &self.timeouts {
            timeouts.validate(diags, attr_path.attribute("timeouts"));
        }
    }
}

impl<'a> WithTimeouts for VpcState<'a> {
    fn timeouts(&self) -> &Value<Timeouts<'_>> {
        &self.timeouts
    }
}

fn is_cidr(text: &str) -> bool {
    let Some((addr, prefix)) = text.split_once('/') else {
        return false;
    };
    addr.parse::<std::net::Ipv4Addr>().is_ok()
        && prefix.parse::<u8>().is_ok_and(|prefix| prefix <= 32)
}

/// `data "ncloud_vpc"`: lookup by id.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcDataState<'a> {
    pub id: ValueString<'a>,
    pub name: ValueString<'a>,
    pub ipv4_cidr_block: ValueString<'a>,
    pub status: ValueString<'a>,
    pub region_code: ValueString<'a>,
}

impl<'a> VpcDataState<'a> {
    pub(super) fn apply(&mut self, vpc: Vpc) {
        self.status = string_value(Some(code_of(&vpc.vpc_status).to_owned()));
        self.name = string_value(Some(vpc.vpc_name));
        self.ipv4_cidr_block = string_value(Some(vpc.ipv4_cidr_block));
        self.region_code = string_value(Some(vpc.region_code));
    }
}

impl<'a> WithSchema for VpcDataState<'a> {
    fn schema() -> Schema {
        let computed = |description| {
            attribute(
                AttributeType::String,
                AttributeConstraint::Computed,
                description,
            )
        };
        Schema {
            version: 1,
            block: Block {
                description: Description::plain("Existing VPC"),
                attributes: map! {
                    "id" => attribute(AttributeType::String, AttributeConstraint::Required, "VPC number"),
                    "name" => computed("Name of the VPC"),
                    "ipv4_cidr_block" => computed("IPv4 range of the VPC"),
                    "status" => computed("Status code reported by the API"),
                    "region_code" => computed("Region of the VPC"),
                },
                ..Default::default()
            },
        }
    }
}
