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

use crate::client::ClientManager;
use crate::config::{ConnectorConfig, SETTINGS_ENTRY, SettingsProvider};
use crate::error::{ConnectorError, ConnectorResult};
use crate::events::ConfigUpdatedEvent;
use crate::types::{ContentDocument, SearchQuery, SearchResponse};
use crate::{query, schema, sync};
use async_trait::async_trait;
use elasticsearch::Elasticsearch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

/// Search capability the host depends on. Every operation is fail-soft:
/// backend problems surface as logged no-ops or empty results, never as
/// errors in the host's request path.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    async fn add_or_update(&self, documents: Vec<ContentDocument>);
    async fn delete_documents(&self, doc_ids: Vec<String>);
    async fn delete_all(&self);
    async fn search(&self, query: SearchQuery) -> SearchResponse;
    fn available(&self) -> bool;
}

/// One configuration generation. Operations clone this snapshot once and
/// use it for their whole duration, so a concurrent reconfiguration never
/// mixes an old handle with a new index name.
#[derive(Clone)]
struct EngineState {
    client: Arc<Elasticsearch>,
    index_name: String,
}

pub struct ElasticsearchEngine {
    clients: Arc<ClientManager>,
    state: RwLock<Option<EngineState>>,
    available: AtomicBool,
    // serializes teardown + bootstrap across concurrent reconfigurations
    apply_lock: Mutex<()>,
}

impl Default for ElasticsearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ElasticsearchEngine {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(ClientManager::new()),
            state: RwLock::new(None),
            available: AtomicBool::new(false),
            apply_lock: Mutex::new(()),
        }
    }

    /// Shared client manager, used by the diagnostic endpoint.
    pub fn client_manager(&self) -> Arc<ClientManager> {
        self.clients.clone()
    }

    /// Reads the `basic` settings entry and applies it. A missing entry,
    /// malformed blob or blank host leaves the engine unconfigured.
    pub async fn init_from_settings(&self, settings: &dyn SettingsProvider) {
        let Some(raw) = settings.fetch(SETTINGS_ENTRY).await else {
            warn!("Search backend configuration not found");
            return;
        };

        let config: ConnectorConfig = match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to parse search backend configuration: {}", e);
                return;
            }
        };

        if config.host.is_empty() {
            warn!("Search backend host is not configured");
            return;
        }

        self.apply(config).await;
    }

    /// Entry point for host-pushed configuration updates.
    pub async fn on_config_updated(&self, event: ConfigUpdatedEvent) {
        if event.config.host.is_empty() {
            warn!("Search backend host is not configured, ignoring config update");
            return;
        }

        self.apply(event.config).await;
    }

    /// Tears down the current generation (when available) and bootstraps
    /// the new one. On any bootstrap failure the engine stays inert until
    /// the next configuration update.
    pub async fn apply(&self, config: ConnectorConfig) {
        let _guard = self.apply_lock.lock().await;

        if self.available.load(Ordering::SeqCst) {
            self.teardown();
        }
        self.clients.reset().await;

        match self.bootstrap(&config).await {
            Ok(state) => {
                *self.state.write().await = Some(state);
                self.available.store(true, Ordering::SeqCst);
                info!(
                    "Search backend client initialized successfully, index: {}",
                    config.index_name
                );
            }
            Err(e) => {
                self.available.store(false, Ordering::SeqCst);
                error!("Failed to initialize search backend client: {}", e);
            }
        }
    }

    async fn bootstrap(&self, config: &ConnectorConfig) -> ConnectorResult<EngineState> {
        config
            .validate()
            .map_err(|message| ConnectorError::Configuration { message })?;
        let client = self.clients.get_or_create(config).await?;
        schema::ensure_index(&client, &config.index_name).await?;
        Ok(EngineState {
            client,
            index_name: config.index_name.clone(),
        })
    }

    /// Marks the engine unavailable. The cached state is abandoned rather
    /// than closed; the backend protocol requires no explicit disconnect.
    pub fn teardown(&self) {
        self.available.store(false, Ordering::SeqCst);
        debug!("Search backend engine torn down");
    }

    async fn snapshot(&self) -> Option<EngineState> {
        if !self.available.load(Ordering::SeqCst) {
            return None;
        }
        self.state.read().await.clone()
    }
}

#[async_trait]
impl SearchEngine for ElasticsearchEngine {
    async fn add_or_update(&self, documents: Vec<ContentDocument>) {
        let Some(state) = self.snapshot().await else {
            warn!("Search backend is not available, skipping add_or_update");
            return;
        };
        sync::bulk_upsert(&state.client, &state.index_name, &documents).await;
    }

    async fn delete_documents(&self, doc_ids: Vec<String>) {
        let Some(state) = self.snapshot().await else {
            warn!("Search backend is not available, skipping delete_documents");
            return;
        };
        sync::bulk_delete(&state.client, &state.index_name, &doc_ids).await;
    }

    async fn delete_all(&self) {
        let Some(state) = self.snapshot().await else {
            warn!("Search backend is not available, skipping delete_all");
            return;
        };
        sync::delete_all(&state.client, &state.index_name).await;
    }

    async fn search(&self, query: SearchQuery) -> SearchResponse {
        let Some(state) = self.snapshot().await else {
            return SearchResponse::default();
        };
        query::execute(&state.client, &state.index_name, &query).await
    }

    fn available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}
