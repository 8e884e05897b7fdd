// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NATS-backed transport for deployment: subjects `<sender>.<receiver>.<kind>`,
//! each node subscribing to the wildcard `*.<receiver>.*`.

use futures_util::StreamExt;
use tracing::info;

use crate::error::RaymondError;
use crate::message::{Envelope, Kind};

#[derive(Clone)]
pub struct NatsTransport {
    client: async_nats::Client,
}

impl NatsTransport {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        info!(url, "connecting to NATS broker");
        let client = async_nats::ConnectOptions::new().retry_on_initial_connect().connect(url).await?;
        info!("NATS transport connected");
        Ok(Self { client })
    }

    pub async fn register(&self, name: &str) -> Result<NatsInbox, RaymondError> {
        let subject = format!("*.{name}.*");
        let subscriber = self
            .client
            .subscribe(subject)
            .await
            .map_err(|e| RaymondError::TransportSend { peer: name.to_string(), reason: e.to_string() })?;
        Ok(NatsInbox { subscriber })
    }

    pub async fn send(&self, from: &str, to: &str, kind: Kind, body: &str) -> Result<(), RaymondError> {
        let subject = format!("{from}.{to}.{}", kind.as_str());
        self.client
            .publish(subject, body.to_string().into())
            .await
            .map_err(|e| RaymondError::TransportSend { peer: to.to_string(), reason: e.to_string() })
    }
}

pub struct NatsInbox {
    subscriber: async_nats::Subscriber,
}

impl NatsInbox {
    /// Parses `<sender>.<receiver>.<kind>` out of the routing key, skipping
    /// any message whose key or kind segment we don't recognize rather than
    /// terminating the stream.
    pub async fn recv(&mut self) -> Option<Envelope> {
        loop {
            let msg = self.subscriber.next().await?;
            let mut segments = msg.subject.as_str().splitn(3, '.');
            let (Some(sender), Some(_receiver), Some(kind_str)) =
                (segments.next(), segments.next(), segments.next())
            else {
                continue;
            };
            let Ok(kind) = kind_str.parse::<Kind>() else { continue };
            let body = String::from_utf8_lossy(&msg.payload).into_owned();
            return Some(Envelope { sender: sender.to_string(), kind, body });
        }
    }
}
