// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-ecosystem push payloads.
//!
//! The push service takes a JSON object whose single key selects the
//! ecosystem and whose value is the platform payload as a *string*. Both
//! layers go through the serializer, so message text ends up properly
//! escaped inside the stringified inner document.

use serde_json::json;

use fanout_core::error::FanoutError;
use fanout_core::types::Ecosystem;

fn queue_err(e: serde_json::Error) -> FanoutError {
    FanoutError::Channel {
        message: "encoding push payload".into(),
        source: Some(Box::new(e)),
    }
}

/// Builds the publish payload for one device.
///
/// `urn` is the scheme-less deep-link path; the platform's scheme prefixes
/// it to form the URI handed to the client.
pub fn payload(
    ecosystem: Ecosystem,
    scheme: &str,
    urn: &str,
    text: &str,
) -> Result<String, FanoutError> {
    let uri = format!("{scheme}://{urn}");

    let (key, inner) = match ecosystem {
        Ecosystem::Ios | Ecosystem::IosSandbox => {
            let key = if ecosystem == Ecosystem::Ios {
                "APNS"
            } else {
                "APNS_SANDBOX"
            };
            (
                key,
                json!({
                    "aps": {
                        "alert": text,
                    },
                    "urn": uri,
                }),
            )
        }
        Ecosystem::Android => (
            "GCM",
            json!({
                "notification": {
                    "title": text,
                    "data": {
                        "urn": uri,
                    },
                },
            }),
        ),
    };

    let inner = serde_json::to_string(&inner).map_err(queue_err)?;
    serde_json::to_string(&json!({ key: inner })).map_err(queue_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn inner(payload: &str, key: &str) -> Value {
        let outer: Value = serde_json::from_str(payload).unwrap();
        serde_json::from_str(outer[key].as_str().unwrap()).unwrap()
    }

    #[test]
    fn ios_payload_shape() {
        let p = payload(Ecosystem::Ios, "demoapp", "tapglue/users/7", "hi there").unwrap();

        let inner = inner(&p, "APNS");
        assert_eq!(inner["aps"]["alert"], "hi there");
        assert_eq!(inner["urn"], "demoapp://tapglue/users/7");
    }

    #[test]
    fn sandbox_payload_uses_sandbox_key() {
        let p = payload(Ecosystem::IosSandbox, "demoapp", "tapglue/users/7", "hi").unwrap();
        assert!(inner(&p, "APNS_SANDBOX")["aps"]["alert"] == "hi");
    }

    #[test]
    fn android_payload_shape() {
        let p = payload(Ecosystem::Android, "demoapp", "tapglue/posts/100", "new post").unwrap();

        let inner = inner(&p, "GCM");
        assert_eq!(inner["notification"]["title"], "new post");
        assert_eq!(inner["notification"]["data"]["urn"], "demoapp://tapglue/posts/100");
    }

    #[test]
    fn text_with_quotes_is_escaped() {
        let p = payload(Ecosystem::Ios, "demoapp", "tapglue/users/7", r#"say "hi""#).unwrap();

        // The outer document must stay parseable and the text intact.
        let inner = inner(&p, "APNS");
        assert_eq!(inner["aps"]["alert"], r#"say "hi""#);
    }
}
