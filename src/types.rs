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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical content record as stored in the index. `metadata_name` is the
/// document identity within an index; `annotations` is stored but never
/// indexed for search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentDocument {
    pub id: String,
    pub metadata_name: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub recycled: bool,
    pub exposed: bool,
    pub owner_name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub creation_timestamp: Option<DateTime<Utc>>,
    pub update_timestamp: Option<DateTime<Utc>>,
    pub permalink: String,
    pub annotations: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchQuery {
    pub keyword: String,
    pub limit: usize,
    pub highlight_pre_tag: String,
    pub highlight_post_tag: String,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            limit: 10,
            highlight_pre_tag: "<B>".to_owned(),
            highlight_post_tag: "</B>".to_owned(),
        }
    }
}

/// Hits preserve backend relevance ordering; free-text fields may carry
/// embedded highlight markers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchResponse {
    pub total: u64,
    pub keyword: String,
    pub limit: usize,
    pub processing_time_millis: u64,
    pub hits: Vec<ContentDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_serializes_with_camel_case_field_names() {
        let document = ContentDocument {
            metadata_name: "post-1".to_owned(),
            owner_name: "jane".to_owned(),
            doc_type: "post".to_owned(),
            ..Default::default()
        };
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["metadataName"], "post-1");
        assert_eq!(value["ownerName"], "jane");
        assert_eq!(value["type"], "post");
        assert!(value.get("metadata_name").is_none());
    }

    #[test]
    fn test_document_deserializes_with_missing_fields() {
        let document: ContentDocument =
            serde_json::from_str(r#"{"metadataName": "abc", "title": "Hello"}"#).unwrap();
        assert_eq!(document.metadata_name, "abc");
        assert_eq!(document.title, "Hello");
        assert!(!document.published);
        assert!(document.categories.is_empty());
        assert!(document.annotations.is_none());
    }

    #[test]
    fn test_search_query_defaults() {
        let query = SearchQuery::default();
        assert!(query.keyword.is_empty());
        assert_eq!(query.limit, 10);
        assert_eq!(query.highlight_pre_tag, "<B>");
        assert_eq!(query.highlight_post_tag, "</B>");
    }
}
