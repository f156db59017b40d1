// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message text and URN rendering.
//!
//! Templates are printf-style with a single `%s` slot for the subject's
//! display name. URN patterns carry `{origin_id}`, `{id}`, and `{parent_id}`
//! placeholders filled from the matched change.

/// Substitutes the subject name into the first `%s` of the template.
pub fn render(template: &str, name: &str) -> String {
    template.replacen("%s", name, 1)
}

/// Ids available to URN patterns for one matched change.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrnContext {
    /// Id of the acting user.
    pub origin_id: u64,
    /// Id of the changed entity.
    pub id: u64,
    /// Id of the parent object, when the entity is attached to one.
    pub parent_id: u64,
}

/// Fills the placeholders of a URN pattern.
pub fn render_urn(pattern: &str, ctx: &UrnContext) -> String {
    pattern
        .replace("{origin_id}", &ctx.origin_id.to_string())
        .replace("{id}", &ctx.id.to_string())
        .replace("{parent_id}", &ctx.parent_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_once() {
        assert_eq!(
            render("%s started following you", "alice"),
            "alice started following you"
        );
        assert_eq!(render("%s wrote %s", "a"), "a wrote %s");
        assert_eq!(render("no slot", "a"), "no slot");
    }

    #[test]
    fn render_urn_fills_placeholders() {
        let ctx = UrnContext {
            origin_id: 7,
            id: 100,
            parent_id: 42,
        };
        assert_eq!(render_urn("tapglue/users/{origin_id}", &ctx), "tapglue/users/7");
        assert_eq!(
            render_urn("tapglue/posts/{parent_id}/comments/{id}", &ctx),
            "tapglue/posts/42/comments/100"
        );
    }
}
