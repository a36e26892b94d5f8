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
use std::cell::RefCell;

use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Description};
use tf_provider::value::{Value, ValueList, ValueNumber, ValueString};
use tf_provider::{AttributePath, Diagnostics, schema::Schema};

pub(crate) trait WithSchema {
    fn schema() -> Schema;
}

pub(crate) trait WithValidate {
    fn validate(&self, diags: &mut Diagnostics, attr_path: AttributePath);
}

/// Build an attribute of the given type.
pub(crate) fn attribute(
    attr_type: AttributeType,
    constraint: AttributeConstraint,
    description: &str,
) -> Attribute {
    Attribute {
        attr_type,
        description: Description::plain(description),
        constraint,
        ..Default::default()
    }
}

pub(crate) fn string_list_type() -> AttributeType {
    AttributeType::List(Box::new(AttributeType::String))
}

pub(crate) fn as_str<'v>(value: &'v ValueString<'_>) -> Option<&'v str> {
    match value {
        Value::Value(value) => Some(value.as_ref()),
        _ => None,
    }
}

pub(crate) fn as_i64(value: &ValueNumber) -> Option<i64> {
    match value {
        Value::Value(value) => Some(*value),
        _ => None,
    }
}

pub(crate) fn as_bool(value: &Value<bool>) -> Option<bool> {
    match value {
        Value::Value(value) => Some(*value),
        _ => None,
    }
}

pub(crate) fn string_value<'a>(value: Option<String>) -> ValueString<'a> {
    match value {
        Some(value) => Value::Value(Cow::Owned(value)),
        None => Value::Null,
    }
}

pub(crate) fn number_value(value: Option<i64>) -> ValueNumber {
    match value {
        Some(value) => Value::Value(value),
        None => Value::Null,
    }
}

pub(crate) fn bool_value(value: Option<bool>) -> Value<bool> {
    match value {
        Some(value) => Value::Value(value),
        None => Value::Null,
    }
}

pub(crate) fn string_list_value<'a>(values: Vec<String>) -> ValueList<ValueString<'a>> {
    Value::Value(
        values
            .into_iter()
            .map(|value| Value::Value(Cow::Owned(value)))
            .collect(),
    )
}

/// Replace a null or unknown computed attribute by `Unknown`.
pub(crate) fn unknown_if_null<T>(value: &mut Value<T>) {
    if value.is_null() {
        *value = Value::Unknown;
    }
}

pub(crate) trait OrKeep {
    /// `self` when it holds a value, `previous` otherwise. A planned
    /// `Unknown` the API did not resolve becomes null.
    fn or_keep(self, previous: &Self) -> Self;
}

impl<T: Clone> OrKeep for Value<T> {
    fn or_keep(self, previous: &Self) -> Self {
        match (self, previous) {
            (Value::Value(value), _) => Value::Value(value),
            (_, Value::Unknown) => Value::Null,
            (_, previous) => previous.clone(),
        }
    }
}

/// Record `name` as requiring replacement when its planned value differs
/// from the prior one.
pub(crate) fn replace_if_changed<T: PartialEq>(
    paths: &mut Vec<AttributePath>,
    name: &'static str,
    prior: &Value<T>,
    proposed: &Value<T>,
) {
    if prior != proposed {
        paths.push(AttributePath::new(name));
    }
}

/// Report a required attribute missing from the configuration.
pub(crate) fn require<T>(
    diags: &mut Diagnostics,
    attr_path: &AttributePath,
    name: &'static str,
    value: &Value<T>,
) {
    if value.is_null() {
        diags.error_short(
            format!("`{name}` is required"),
            attr_path.clone().attribute(name),
        );
    }
}

pub struct DisplayJoiner<'a, T, I>
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    iter: RefCell<T>,
    sep: &'a str,
}

pub trait DisplayJoinable {
    type Joiner<'a>;
    fn join_with(self, sep: &str) -> Self::Joiner<'_>;
}

impl<T, I> DisplayJoinable for T
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    type Joiner<'a> = DisplayJoiner<'a, T, I>;

    fn join_with(self, sep: &str) -> Self::Joiner<'_> {
        DisplayJoiner {
            iter: RefCell::new(self),
            sep,
        }
    }
}

impl<'a, T, I> std::fmt::Display for DisplayJoiner<'a, T, I>
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sep = "";
        let mut iter = self.iter.try_borrow_mut().or(Err(std::fmt::Error))?;
        for elt in iter.by_ref() {
            f.write_str(sep)?;
            f.write_fmt(format_args!("{elt}"))?;
            sep = self.sep;
        }
        Ok(())
    }
}
