// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recipient resolution: social-graph queries plus the per-rule query
//! dispatch.
//!
//! The audience of a user is their followers united with their friends.
//! De-duplication is ordered and first-wins, so a recipient entry listed
//! later in a rule never overrides the template an earlier entry assigned.

use std::collections::HashSet;

use fanout_core::error::FanoutError;
use fanout_core::traits::store::SharedStore;
use fanout_core::types::connection::{Connection, ConnectionState, ConnectionType, QueryOptions};
use fanout_core::types::rule::RecipientQuery;

/// Users following `user_id` with a confirmed follow edge.
pub async fn follower_ids(
    connections: &SharedStore<Connection>,
    namespace: &str,
    user_id: u64,
) -> Result<Vec<u64>, FanoutError> {
    let edges = connections
        .query(
            namespace,
            QueryOptions {
                states: vec![ConnectionState::Confirmed],
                to_ids: vec![user_id],
                types: vec![ConnectionType::Follow],
                ..QueryOptions::default()
            },
        )
        .await?;

    Ok(edges.into_iter().map(|c| c.from_id).collect())
}

/// Users sharing a confirmed friend edge with `user_id`, either direction.
pub async fn friend_ids(
    connections: &SharedStore<Connection>,
    namespace: &str,
    user_id: u64,
) -> Result<Vec<u64>, FanoutError> {
    let outgoing = connections
        .query(
            namespace,
            QueryOptions {
                from_ids: vec![user_id],
                states: vec![ConnectionState::Confirmed],
                types: vec![ConnectionType::Friend],
                ..QueryOptions::default()
            },
        )
        .await?;
    let incoming = connections
        .query(
            namespace,
            QueryOptions {
                states: vec![ConnectionState::Confirmed],
                to_ids: vec![user_id],
                types: vec![ConnectionType::Friend],
                ..QueryOptions::default()
            },
        )
        .await?;

    Ok(outgoing
        .into_iter()
        .map(|c| c.to_id)
        .chain(incoming.into_iter().map(|c| c.from_id))
        .collect())
}

/// Followers and friends of `user_id`, de-duplicated in query order.
pub async fn audience_ids(
    connections: &SharedStore<Connection>,
    namespace: &str,
    user_id: u64,
) -> Result<Vec<u64>, FanoutError> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for id in follower_ids(connections, namespace, user_id)
        .await?
        .into_iter()
        .chain(friend_ids(connections, namespace, user_id).await?)
    {
        if seen.insert(id) {
            ids.push(id);
        }
    }

    Ok(ids)
}

/// Resolved per-change inputs a recipient query draws from.
#[derive(Debug, Clone, Default)]
pub struct RecipientContext {
    /// From side of a connection change.
    pub from: Option<u64>,
    /// To side of a connection change.
    pub to: Option<u64>,
    /// The acting user, whose audience is fanned out to.
    pub origin: u64,
    /// Owner of the parent object, when the change is attached to one.
    pub parent_owner: Option<u64>,
}

/// Resolves one recipient query to an ordered id list.
pub async fn resolve(
    connections: &SharedStore<Connection>,
    namespace: &str,
    query: &RecipientQuery,
    ctx: &RecipientContext,
) -> Result<Vec<u64>, FanoutError> {
    match query {
        RecipientQuery::UserFrom => Ok(ctx.from.into_iter().collect()),
        RecipientQuery::UserTo => Ok(ctx.to.into_iter().collect()),
        RecipientQuery::Audience {
            exclude_parent_owner,
        } => {
            let mut ids = audience_ids(connections, namespace, ctx.origin).await?;
            if *exclude_parent_owner {
                if let Some(owner) = ctx.parent_owner {
                    ids.retain(|id| *id != owner);
                }
            }
            Ok(ids)
        }
        RecipientQuery::ParentOwner => Ok(ctx.parent_owner.into_iter().collect()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use fanout_core::traits::store::Store;
    use fanout_store::MemStore;

    async fn graph() -> SharedStore<Connection> {
        let store: SharedStore<Connection> = Arc::new(MemStore::new());
        store.setup("app_1").await.unwrap();

        let edges = [
            // U3 and U4 follow U2.
            (3, 2, ConnectionType::Follow, ConnectionState::Confirmed),
            (4, 2, ConnectionType::Follow, ConnectionState::Confirmed),
            // U2 is friends with U1 and U4.
            (2, 1, ConnectionType::Friend, ConnectionState::Confirmed),
            (4, 2, ConnectionType::Friend, ConnectionState::Confirmed),
            // Noise that must not count.
            (5, 2, ConnectionType::Follow, ConnectionState::Pending),
            (2, 6, ConnectionType::Friend, ConnectionState::Rejected),
        ];
        for (from, to, kind, state) in edges {
            store
                .put(
                    "app_1",
                    Connection {
                        from_id: from,
                        to_id: to,
                        kind,
                        state,
                        ..Connection::default()
                    },
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn followers_and_friends_compose_the_audience() {
        let store = graph().await;

        assert_eq!(follower_ids(&store, "app_1", 2).await.unwrap(), vec![3, 4]);
        assert_eq!(friend_ids(&store, "app_1", 2).await.unwrap(), vec![1, 4]);
        // U4 appears once even though both follower and friend.
        assert_eq!(
            audience_ids(&store, "app_1", 2).await.unwrap(),
            vec![3, 4, 1]
        );
    }

    #[tokio::test]
    async fn audience_query_can_exclude_parent_owner() {
        let store = graph().await;
        let ctx = RecipientContext {
            origin: 2,
            parent_owner: Some(1),
            ..RecipientContext::default()
        };

        let ids = resolve(
            &store,
            "app_1",
            &RecipientQuery::Audience {
                exclude_parent_owner: true,
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(ids, vec![3, 4]);

        let ids = resolve(&store, "app_1", &RecipientQuery::ParentOwner, &ctx)
            .await
            .unwrap();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn side_queries_read_the_context() {
        let store = graph().await;
        let ctx = RecipientContext {
            from: Some(7),
            to: Some(8),
            origin: 7,
            parent_owner: None,
        };

        assert_eq!(
            resolve(&store, "app_1", &RecipientQuery::UserFrom, &ctx)
                .await
                .unwrap(),
            vec![7]
        );
        assert_eq!(
            resolve(&store, "app_1", &RecipientQuery::UserTo, &ctx)
                .await
                .unwrap(),
            vec![8]
        );
    }
}
