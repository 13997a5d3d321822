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

//! Elasticsearch search connector for content-management hosts.
//!
//! Bridges a host's content documents into an Elasticsearch index and
//! serves relevance-ranked, highlighted search results back. The host
//! talks to the [`engine::SearchEngine`] capability; configuration comes
//! from the host's settings store and live [`events::ConfigUpdatedEvent`]
//! notifications. Backend problems never crash the host: the engine goes
//! unavailable, indexing becomes a logged no-op and search returns empty
//! results until the next working configuration is applied.

pub mod api;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod query;
pub mod sanitize;
pub mod schema;
pub mod sync;
pub mod types;

pub use api::{ApiState, router};
pub use client::ClientManager;
pub use config::{ConnectorConfig, SETTINGS_ENTRY, SettingsProvider, StaticSettingsProvider};
pub use engine::{ElasticsearchEngine, SearchEngine};
pub use error::{ConnectorError, ConnectorResult};
pub use events::{ConfigUpdatedEvent, spawn_config_listener};
pub use types::{ContentDocument, SearchQuery, SearchResponse};
