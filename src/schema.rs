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

use crate::error::{ConnectorError, ConnectorResult};
use elasticsearch::{
    Elasticsearch,
    indices::{IndicesCreateParts, IndicesExistsParts},
};
use serde_json::{Value, json};
use tracing::{debug, info};

pub fn index_settings() -> Value {
    json!({
        "index": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        }
    })
}

/// Fixed field mapping for content documents. Applied once at index
/// creation; never changes at runtime.
pub fn index_mapping() -> Value {
    json!({
        "properties": {
            "id": {"type": "keyword"},
            "metadataName": {"type": "keyword"},
            "title": {
                "type": "text",
                "analyzer": "hanlp_standard",
                "fields": {"keyword": {"type": "keyword"}}
            },
            "description": {"type": "text", "analyzer": "hanlp_standard"},
            "content": {"type": "text", "analyzer": "hanlp_standard"},
            "categories": {"type": "keyword"},
            "tags": {"type": "keyword"},
            "published": {"type": "boolean"},
            "recycled": {"type": "boolean"},
            "exposed": {"type": "boolean"},
            "ownerName": {"type": "keyword"},
            "type": {"type": "keyword"},
            "creationTimestamp": {"type": "date"},
            "updateTimestamp": {"type": "date"},
            "permalink": {"type": "keyword"},
            "annotations": {"type": "object", "enabled": false}
        }
    })
}

pub async fn index_exists(client: &Elasticsearch, index_name: &str) -> ConnectorResult<bool> {
    let response = client
        .indices()
        .exists(IndicesExistsParts::Index(&[index_name]))
        .send()
        .await?;

    Ok(response.status_code().is_success())
}

/// Ensures the index exists with the fixed mapping, creating it when
/// absent. Returns whether the index already existed.
pub async fn ensure_index(client: &Elasticsearch, index_name: &str) -> ConnectorResult<bool> {
    if index_exists(client, index_name).await? {
        debug!("Index '{}' already exists", index_name);
        return Ok(true);
    }

    let response = client
        .indices()
        .create(IndicesCreateParts::Index(index_name))
        .body(json!({
            "settings": index_settings(),
            "mappings": index_mapping()
        }))
        .send()
        .await?;

    if !response.status_code().is_success() {
        let reason = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_owned());
        return Err(ConnectorError::Connection {
            message: format!("Failed to create index '{}': {}", index_name, reason),
        });
    }

    info!("Created index '{}'", index_name);
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_settings_use_one_shard_one_replica() {
        let settings = index_settings();
        assert_eq!(settings["index"]["number_of_shards"], 1);
        assert_eq!(settings["index"]["number_of_replicas"], 1);
    }

    #[test]
    fn test_mapping_covers_all_document_fields() {
        let mapping = index_mapping();
        let properties = mapping["properties"].as_object().unwrap();
        for field in [
            "id",
            "metadataName",
            "title",
            "description",
            "content",
            "categories",
            "tags",
            "published",
            "recycled",
            "exposed",
            "ownerName",
            "type",
            "creationTimestamp",
            "updateTimestamp",
            "permalink",
            "annotations",
        ] {
            assert!(properties.contains_key(field), "missing field {}", field);
        }
        assert_eq!(properties.len(), 16);
    }

    #[test]
    fn test_mapping_field_types() {
        let mapping = index_mapping();
        assert_eq!(mapping["properties"]["metadataName"]["type"], "keyword");
        assert_eq!(mapping["properties"]["title"]["type"], "text");
        assert_eq!(mapping["properties"]["title"]["analyzer"], "hanlp_standard");
        assert_eq!(
            mapping["properties"]["title"]["fields"]["keyword"]["type"],
            "keyword"
        );
        assert_eq!(mapping["properties"]["published"]["type"], "boolean");
        assert_eq!(mapping["properties"]["creationTimestamp"]["type"], "date");
        assert_eq!(mapping["properties"]["annotations"]["type"], "object");
        assert_eq!(mapping["properties"]["annotations"]["enabled"], false);
    }
}
