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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the settings entry holding the JSON-encoded connector config.
pub const SETTINGS_ENTRY: &str = "basic";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectorConfig {
    /// Backend host name, without scheme. Empty means not configured.
    pub host: String,

    /// Backend port.
    pub port: u16,

    /// Basic-auth username. Empty disables authentication.
    pub username: String,

    /// Basic-auth password.
    pub password: String,

    /// Name of the index holding the content documents.
    pub index_name: String,

    /// Use https for the backend transport.
    pub secure: bool,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 9200,
            username: String::new(),
            password: String::new(),
            index_name: "documents".to_owned(),
            secure: false,
        }
    }
}

impl ConnectorConfig {
    pub fn url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("host cannot be empty".to_owned());
        }

        if self.index_name.is_empty() {
            return Err("index_name cannot be empty".to_owned());
        }

        Ok(())
    }
}

/// Key/value settings store exposed by the host. The connector only ever
/// reads the `basic` entry, which carries a JSON-encoded `ConnectorConfig`.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn fetch(&self, entry: &str) -> Option<String>;
}

/// In-memory settings provider for embedding and tests.
#[derive(Debug, Default)]
pub struct StaticSettingsProvider {
    entries: HashMap<String, String>,
}

impl StaticSettingsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, entry: &str, value: &str) -> Self {
        self.entries.insert(entry.to_owned(), value.to_owned());
        self
    }
}

#[async_trait]
impl SettingsProvider for StaticSettingsProvider {
    async fn fetch(&self, entry: &str) -> Option<String> {
        self.entries.get(entry).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings_blob() {
        let blob = r#"{
            "host": "search.internal",
            "port": 9201,
            "username": "admin",
            "password": "secret",
            "indexName": "posts"
        }"#;
        let config: ConnectorConfig = serde_json::from_str(blob).unwrap();
        assert_eq!(config.host, "search.internal");
        assert_eq!(config.port, 9201);
        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "secret");
        assert_eq!(config.index_name, "posts");
        assert!(!config.secure);
    }

    #[test]
    fn test_parse_settings_blob_with_missing_fields() {
        let config: ConnectorConfig = serde_json::from_str(r#"{"host": "localhost"}"#).unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 9200);
        assert!(config.username.is_empty());
    }

    #[test]
    fn test_url_scheme_follows_secure_flag() {
        let mut config = ConnectorConfig {
            host: "localhost".to_owned(),
            ..Default::default()
        };
        assert_eq!(config.url(), "http://localhost:9200");
        config.secure = true;
        assert_eq!(config.url(), "https://localhost:9200");
    }

    #[test]
    fn test_validate_rejects_blank_host() {
        let config = ConnectorConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_index_name() {
        let config = ConnectorConfig {
            host: "localhost".to_owned(),
            index_name: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_static_settings_provider() {
        let provider = StaticSettingsProvider::new().with_entry(SETTINGS_ENTRY, "{}");
        assert_eq!(provider.fetch(SETTINGS_ENTRY).await, Some("{}".to_owned()));
        assert_eq!(provider.fetch("advanced").await, None);
    }
}
