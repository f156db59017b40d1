// SPDX-FileCopyrightText: 2026 Fanout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fanout serve` command implementation.
//!
//! Wires the stores, queue sources, rule engine, pipelines, and the push
//! channel into a [`Coordinator`] and runs it until a shutdown signal.
//! The process model is crash-on-error: any loop failing takes the process
//! down non-zero and unacked changes are redelivered on restart.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use fanout_config::FanoutConfig;
use fanout_core::error::FanoutError;
use fanout_core::namespace::NAMESPACE_DEFAULT;
use fanout_core::traits::channel::SharedChannel;
use fanout_core::traits::source::SharedSource;
use fanout_core::traits::store::{Entity, SharedStore, Store};
use fanout_core::types::app::App;
use fanout_core::types::connection::Connection;
use fanout_core::types::device::Device;
use fanout_core::types::event::Event;
use fanout_core::types::object::Object;
use fanout_core::types::platform::Platform;
use fanout_core::types::reaction::Reaction;
use fanout_core::types::rule::Rule;
use fanout_core::types::user::User;
use fanout_pipeline::{Pipelines, RuleEngine};
use fanout_prometheus::PrometheusAdapter;
use fanout_push::{MemoryPushProvider, PushChannel};
use fanout_queue::{MemoryRawSource, MemorySource};
use fanout_store::MemStore;
use fanout_worker::{Coordinator, install_signal_handler};

/// Runs the `fanout serve` command.
pub async fn run_serve(config: FanoutConfig) -> Result<(), FanoutError> {
    init_tracing(&config.telemetry.log_level);

    info!("starting fanout serve");
    debug!(
        postgres = %config.postgres.url,
        aws_region = %config.aws.region,
        "configured backends"
    );

    let adapter = Arc::new(PrometheusAdapter::new()?);
    let telemetry_addr = config.telemetry.addr.clone();
    tokio::spawn({
        let adapter = adapter.clone();
        async move {
            if let Err(err) = fanout_prometheus::serve(&telemetry_addr, adapter).await {
                tracing::error!(error = %err, "telemetry server failed");
            }
        }
    });

    let apps = store::<App>();
    let connections = store::<Connection>();
    let devices = store::<Device>();
    let objects = store::<Object>();
    let platforms = store::<Platform>();
    let rules = store::<Rule>();
    let users = store::<User>();

    // Apps and platform registrations live in the top-level namespace.
    apps.setup(NAMESPACE_DEFAULT).await?;
    platforms.setup(NAMESPACE_DEFAULT).await?;

    let provider = Arc::new(MemoryPushProvider::new());
    let channel: SharedChannel = Arc::new(PushChannel::new(
        devices.clone(),
        platforms.clone(),
        provider,
    ));

    let wait = Duration::from_secs(config.queue.wait_seconds);
    let visibility = Duration::from_secs(config.queue.visibility_seconds);

    let coordinator = Coordinator {
        apps,
        devices,
        platforms,
        engine: Arc::new(RuleEngine::new(rules)),
        pipelines: Arc::new(Pipelines::new(connections, objects, users)),
        channels: vec![channel],
        connections: source::<Connection>(wait, visibility),
        events: source::<Event>(wait, visibility),
        objects: source::<Object>(wait, visibility),
        reactions: source::<Reaction>(wait, visibility),
        feedback: Arc::new(MemoryRawSource::new(wait, visibility)),
    };

    let shutdown = install_signal_handler();
    coordinator.run(shutdown).await
}

fn store<T: Entity>() -> SharedStore<T> {
    fanout_store::stack(Arc::new(MemStore::new()))
}

fn source<T>(wait: Duration, visibility: Duration) -> SharedSource<T>
where
    T: Entity + serde::Serialize + serde::de::DeserializeOwned,
{
    fanout_queue::stack(Arc::new(MemorySource::new(wait, visibility)))
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fanout={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
