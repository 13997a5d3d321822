/* Licensed to the Apache Software Foundation (ASF) under one
 * or more contributor license agreements.  See the NOTICE file
 * distributed with this work for additional information
 * regarding copyright ownership.  The ASF licenses this file
 * to you under the Apache License, Version 2.0 (the
 * "License"); you may not use this file except in compliance
 * with the License.  You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing,
 * software distributed under the License is distributed on an
 * "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
 * KIND, either express or implied.  See the License for the
 * specific language governing permissions and limitations
 * under the License.
 */

use crate::config::ConnectorConfig;
use crate::engine::ElasticsearchEngine;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Host notification that an operator updated the connector settings.
#[derive(Debug, Clone)]
pub struct ConfigUpdatedEvent {
    pub config: ConnectorConfig,
}

/// Subscribes the engine to configuration updates. The task ends when the
/// host drops the sender.
pub fn spawn_config_listener(
    engine: Arc<ElasticsearchEngine>,
    mut events: mpsc::Receiver<ConfigUpdatedEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            engine.on_config_updated(event).await;
        }
        debug!("Configuration update channel closed, stopping listener");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SearchEngine;

    #[tokio::test]
    async fn test_listener_applies_events_and_stops_on_close() {
        let engine = Arc::new(ElasticsearchEngine::new());
        let (tx, rx) = mpsc::channel(4);
        let handle = spawn_config_listener(engine.clone(), rx);

        // blank host is ignored, engine stays unconfigured
        tx.send(ConfigUpdatedEvent {
            config: ConnectorConfig::default(),
        })
        .await
        .unwrap();
        drop(tx);

        handle.await.unwrap();
        assert!(!engine.available());
    }
}
