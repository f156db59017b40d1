// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template localization by BCP 47 primary subtag.

use std::collections::HashMap;

use language_tags::LanguageTag;

use fanout_core::types::device::DEFAULT_LANGUAGE;

/// Picks the text for a device language.
///
/// Matching is on the primary subtag ("de" from "de-CH"). Falls back to the
/// default language, then to the empty string; a device with no matching
/// translation still gets its push.
pub fn localize(messages: &HashMap<String, String>, language: &str) -> String {
    let base = LanguageTag::parse(language)
        .map(|tag| tag.primary_language().to_owned())
        .unwrap_or_else(|_| DEFAULT_LANGUAGE.to_owned());

    messages
        .get(&base)
        .or_else(|| messages.get(DEFAULT_LANGUAGE))
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages() -> HashMap<String, String> {
        HashMap::from([
            ("en".to_owned(), "hello".to_owned()),
            ("de".to_owned(), "hallo".to_owned()),
        ])
    }

    #[test]
    fn base_subtag_wins() {
        assert_eq!(localize(&messages(), "de-CH"), "hallo");
        assert_eq!(localize(&messages(), "de"), "hallo");
    }

    #[test]
    fn unknown_language_falls_back_to_default() {
        assert_eq!(localize(&messages(), "fr-FR"), "hello");
    }

    #[test]
    fn unparsable_tag_falls_back_to_default() {
        assert_eq!(localize(&messages(), "not a tag"), "hello");
    }

    #[test]
    fn missing_default_yields_empty_text() {
        let only_de = HashMap::from([("de".to_owned(), "hallo".to_owned())]);
        assert_eq!(localize(&only_de, "fr"), "");
    }
}
