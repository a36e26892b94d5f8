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

use base64::{engine::general_purpose::STANDARD, Engine as _};
use crypto::{hmac::Hmac, mac::Mac, sha2::Sha256};

pub const TIMESTAMP_HEADER: &str = "x-ncp-apigw-timestamp";
pub const ACCESS_KEY_HEADER: &str = "x-ncp-iam-access-key";
pub const SIGNATURE_HEADER: &str = "x-ncp-apigw-signature-v2";

/// Milliseconds since the epoch, as expected by the gateway.
pub fn timestamp() -> String {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).to_string()
}

/// Signature of a request: base64 HMAC-SHA256 of
/// `"{method} {uri}\n{timestamp}\n{access_key}"` keyed by the secret key.
///
/// `uri` is the path followed by the encoded query string.
pub fn sign(method: &str, uri: &str, timestamp: &str, access_key: &str, secret_key: &str) -> String {
    let message = format!("{method} {uri}\n{timestamp}\n{access_key}");
    let mut hmac = Hmac::new(Sha256::new(), secret_key.as_bytes());
    hmac.input(message.as_bytes());
    STANDARD.encode(hmac.result().code())
}
