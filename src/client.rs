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
use crate::error::{ConnectorError, ConnectorResult};
use elasticsearch::{
    Elasticsearch,
    auth::Credentials,
    http::{
        Url,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Builds a backend client from one configuration generation. Transport
/// construction does not contact the backend; the first request does.
pub fn build_client(config: &ConnectorConfig) -> ConnectorResult<Elasticsearch> {
    let url = Url::parse(&config.url()).map_err(|e| ConnectorError::Connection {
        message: format!("Invalid backend URL '{}': {}", config.url(), e),
    })?;

    let mut builder = TransportBuilder::new(SingleNodeConnectionPool::new(url));
    if !config.username.is_empty() {
        builder = builder.auth(Credentials::Basic(
            config.username.clone(),
            config.password.clone(),
        ));
    }

    let transport = builder.build().map_err(|e| ConnectorError::Connection {
        message: format!("Failed to build transport: {}", e),
    })?;

    Ok(Elasticsearch::new(transport))
}

/// Owns the single shared backend handle. Creation is double-checked so
/// concurrent first callers observe one handle; `reset` drops the cached
/// handle so the next bootstrap recreates it from the new configuration.
#[derive(Default)]
pub struct ClientManager {
    handle: RwLock<Option<Arc<Elasticsearch>>>,
}

impl ClientManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_create(
        &self,
        config: &ConnectorConfig,
    ) -> ConnectorResult<Arc<Elasticsearch>> {
        if let Some(client) = self.handle.read().await.as_ref() {
            return Ok(client.clone());
        }

        let mut handle = self.handle.write().await;
        if let Some(client) = handle.as_ref() {
            return Ok(client.clone());
        }

        let client = Arc::new(build_client(config)?);
        *handle = Some(client.clone());
        info!("Created backend client for {}", config.url());
        Ok(client)
    }

    pub async fn reset(&self) {
        *self.handle.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ConnectorConfig {
        ConnectorConfig {
            host: "localhost".to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_client_rejects_invalid_url() {
        let config = ConnectorConfig {
            host: "bad host".to_owned(),
            ..Default::default()
        };
        assert!(build_client(&config).is_err());
    }

    #[test]
    fn test_build_client_with_credentials() {
        let config = ConnectorConfig {
            host: "localhost".to_owned(),
            username: "admin".to_owned(),
            password: "secret".to_owned(),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_handle() {
        let manager = ClientManager::new();
        let first = manager.get_or_create(&test_config()).await.unwrap();
        let second = manager.get_or_create(&test_config()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_reset_forces_new_handle() {
        let manager = ClientManager::new();
        let first = manager.get_or_create(&test_config()).await.unwrap();
        manager.reset().await;
        let second = manager.get_or_create(&test_config()).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
