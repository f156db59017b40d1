// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in rule set.
//!
//! These reproduce the stock notification behavior: follows, friend
//! requests and confirmations, likes, comments, and new posts. Tenants get
//! them seeded on provisioning and can deactivate or extend per namespace.
//!
//! The friend-confirm trigger fires on `old.type == friend AND new.state ==
//! pending`, which reads inverted but matches the long-observed production
//! transition; keep it until the write path changes.

use std::collections::HashMap;

use fanout_core::error::FanoutError;
use fanout_core::traits::store::SharedStore;
use fanout_core::types::connection::{ConnectionState, ConnectionType};
use fanout_core::types::rule::{
    Criteria, Recipient, RecipientQuery, Rule, TemplateSubject,
};
use fanout_core::types::{connection, event, object, reaction};

const URN_USER: &str = "tapglue/users/{origin_id}";
const URN_POST: &str = "tapglue/posts/{id}";
const URN_PARENT_POST: &str = "tapglue/posts/{parent_id}";
const URN_COMMENT: &str = "tapglue/posts/{parent_id}/comments/{id}";

fn templates(en: &str) -> HashMap<String, String> {
    HashMap::from([("en".to_owned(), en.to_owned())])
}

fn rule(name: &str, criteria: Criteria, recipients: Vec<Recipient>) -> Rule {
    Rule {
        name: name.to_owned(),
        criteria,
        recipients,
        ..Rule::default()
    }
}

pub fn follow_rule() -> Rule {
    rule(
        "follow",
        Criteria::Connection {
            new: Some(connection::QueryOptions {
                states: vec![ConnectionState::Confirmed],
                types: vec![ConnectionType::Follow],
                ..connection::QueryOptions::default()
            }),
            old: None,
            old_absent: true,
        },
        vec![Recipient {
            query: RecipientQuery::UserTo,
            subject: TemplateSubject::Origin,
            urn: URN_USER.to_owned(),
            templates: templates("%s started following you"),
        }],
    )
}

pub fn friend_request_rule() -> Rule {
    rule(
        "friend-request",
        Criteria::Connection {
            new: Some(connection::QueryOptions {
                states: vec![ConnectionState::Pending],
                types: vec![ConnectionType::Friend],
                ..connection::QueryOptions::default()
            }),
            old: None,
            old_absent: true,
        },
        vec![Recipient {
            query: RecipientQuery::UserTo,
            subject: TemplateSubject::Origin,
            urn: URN_USER.to_owned(),
            templates: templates("%s sent you a friend request."),
        }],
    )
}

pub fn friend_confirmed_rule() -> Rule {
    rule(
        "friend-confirmed",
        Criteria::Connection {
            new: Some(connection::QueryOptions {
                states: vec![ConnectionState::Pending],
                types: vec![ConnectionType::Friend],
                ..connection::QueryOptions::default()
            }),
            old: Some(connection::QueryOptions {
                types: vec![ConnectionType::Friend],
                ..connection::QueryOptions::default()
            }),
            old_absent: false,
        },
        vec![Recipient {
            query: RecipientQuery::UserFrom,
            subject: TemplateSubject::Target,
            urn: URN_USER.to_owned(),
            templates: templates("%s accepted your friend request."),
        }],
    )
}

pub fn event_like_rule() -> Rule {
    rule(
        "event-like",
        Criteria::Event {
            new: Some(event::QueryOptions {
                enabled: Some(true),
                types: vec![event::TYPE_LIKE.to_owned()],
                ..event::QueryOptions::default()
            }),
            old: None,
            old_absent: true,
        },
        vec![
            Recipient {
                query: RecipientQuery::Audience {
                    exclude_parent_owner: true,
                },
                subject: TemplateSubject::Origin,
                urn: URN_PARENT_POST.to_owned(),
                templates: templates("%s liked a Post."),
            },
            Recipient {
                query: RecipientQuery::ParentOwner,
                subject: TemplateSubject::Origin,
                urn: URN_PARENT_POST.to_owned(),
                templates: templates("%s liked your Post."),
            },
        ],
    )
}

pub fn comment_created_rule() -> Rule {
    rule(
        "comment-created",
        Criteria::Object {
            new: Some(object::QueryOptions {
                deleted: Some(false),
                types: vec![object::TYPE_COMMENT.to_owned()],
                ..object::QueryOptions::default()
            }),
            old: None,
            old_absent: true,
        },
        vec![
            Recipient {
                query: RecipientQuery::Audience {
                    exclude_parent_owner: true,
                },
                subject: TemplateSubject::Origin,
                urn: URN_COMMENT.to_owned(),
                templates: templates("%s commented on a Post."),
            },
            Recipient {
                query: RecipientQuery::ParentOwner,
                subject: TemplateSubject::Origin,
                urn: URN_COMMENT.to_owned(),
                templates: templates("%s commented on your Post."),
            },
        ],
    )
}

pub fn post_created_rule() -> Rule {
    rule(
        "post-created",
        Criteria::Object {
            new: Some(object::QueryOptions {
                deleted: Some(false),
                types: vec![object::TYPE_POST.to_owned()],
                ..object::QueryOptions::default()
            }),
            old: None,
            old_absent: true,
        },
        vec![Recipient {
            query: RecipientQuery::Audience {
                exclude_parent_owner: false,
            },
            subject: TemplateSubject::Origin,
            urn: URN_POST.to_owned(),
            templates: templates("%s created a new Post."),
        }],
    )
}

pub fn reaction_like_rule() -> Rule {
    rule(
        "reaction-like",
        Criteria::Reaction {
            new: Some(reaction::QueryOptions {
                deleted: Some(false),
                types: vec![reaction::ReactionType::Like],
                ..reaction::QueryOptions::default()
            }),
            old: None,
            old_absent: true,
        },
        vec![
            Recipient {
                query: RecipientQuery::Audience {
                    exclude_parent_owner: true,
                },
                subject: TemplateSubject::Origin,
                urn: URN_PARENT_POST.to_owned(),
                templates: templates("%s liked a Post."),
            },
            Recipient {
                query: RecipientQuery::ParentOwner,
                subject: TemplateSubject::Origin,
                urn: URN_PARENT_POST.to_owned(),
                templates: templates("%s liked your Post."),
            },
        ],
    )
}

/// The full built-in set, in seeding order.
pub fn default_rules() -> Vec<Rule> {
    vec![
        follow_rule(),
        friend_request_rule(),
        friend_confirmed_rule(),
        event_like_rule(),
        comment_created_rule(),
        post_created_rule(),
        reaction_like_rule(),
    ]
}

/// Seeds the built-in rules into a tenant namespace.
pub async fn seed(store: &SharedStore<Rule>, namespace: &str) -> Result<(), FanoutError> {
    for rule in default_rules() {
        store.put(namespace, rule).await?;
    }
    Ok(())
}
