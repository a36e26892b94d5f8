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

//! Phase labels shared by every resource that provisions asynchronously.

use std::borrow::Cow;

pub const CREATING: &str = "creating";
pub const SETTING_UP: &str = "settingUp";
pub const UPDATING: &str = "updating";
pub const RUNNING: &str = "running";
pub const DELETING: &str = "deleting";
pub const DELETED: &str = "deleted";

/// Map an instance `(status, operation)` code pair to a phase label.
///
/// Unknown pairs are reported verbatim as `STATUS/OP`, which no wait lists
/// as pending or target, so the poller aborts on them.
pub fn classify_instance(status: &str, operation: &str) -> Cow<'static, str> {
    match (status, operation) {
        ("INIT", "CREAT") => Cow::Borrowed(CREATING),
        ("CREAT", "SETUP") => Cow::Borrowed(SETTING_UP),
        ("CREAT", "NULL") => Cow::Borrowed(RUNNING),
        (_, "DEL") => Cow::Borrowed(DELETING),
        ("CREAT", "UPDAT" | "RESTA" | "MOD" | "ADD" | "RECOV" | "REBOT") => {
            Cow::Borrowed(UPDATING)
        }
        (status, operation) => Cow::Owned(format!("{status}/{operation}")),
    }
}

/// Map a single lifecycle status code (VPC, config groups) to a phase label.
pub fn classify_status(status: &str) -> Cow<'static, str> {
    match status {
        "INIT" | "CREATING" | "CREAT" => Cow::Borrowed(CREATING),
        "RUN" => Cow::Borrowed(RUNNING),
        "TERMTING" | "DEL" | "DELETING" => Cow::Borrowed(DELETING),
        "TERMINATED" => Cow::Borrowed(DELETED),
        status => Cow::Owned(status.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    #[test_case("INIT", "CREAT", CREATING)]
    #[test_case("CREAT", "SETUP", SETTING_UP)]
    #[test_case("CREAT", "NULL", RUNNING)]
    #[test_case("DEL", "DEL", DELETING)]
    #[test_case("CREAT", "DEL", DELETING)]
    #[test_case("CREAT", "UPDAT", UPDATING)]
    #[test_case("CREAT", "RECOV", UPDATING)]
    #[test_case("INIT", "NULL", "INIT/NULL")]
    #[test_case("FAIL", "CREAT", "FAIL/CREAT")]
    fn instance_pairs(status: &str, operation: &str, expected: &str) {
        assert_eq!(classify_instance(status, operation), expected);
    }

    #[test_case("INIT", CREATING)]
    #[test_case("CREATING", CREATING)]
    #[test_case("RUN", RUNNING)]
    #[test_case("TERMTING", DELETING)]
    #[test_case("TERMINATED", DELETED)]
    #[test_case("BROKEN", "BROKEN")]
    fn status_codes(status: &str, expected: &str) {
        assert_eq!(classify_status(status), expected);
    }
}
