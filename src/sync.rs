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

use crate::sanitize::sanitize;
use crate::types::ContentDocument;
use elasticsearch::{BulkParts, DeleteByQueryParts, Elasticsearch, http::request::JsonBody};
use serde_json::{Value, json};
use tracing::{error, info, warn};

/// Recovers the document identity from a host identifier of the form
/// `<prefix>-<metadataName>`. An identifier with no separator is used
/// verbatim.
pub fn metadata_name_of(doc_id: &str) -> &str {
    match doc_id.split_once('-') {
        Some((_, name)) => name,
        None => doc_id,
    }
}

/// Builds the action/source pairs for a bulk upsert. Documents are
/// sanitized before serialization; a document that fails to serialize is
/// skipped.
pub fn build_upsert_operations(documents: &[ContentDocument]) -> Vec<Value> {
    let mut operations = Vec::with_capacity(documents.len() * 2);
    for document in documents {
        let sanitized = sanitize(document);
        let source = match serde_json::to_value(&sanitized) {
            Ok(source) => source,
            Err(e) => {
                warn!(
                    "Failed to serialize document '{}', skipping: {}",
                    document.metadata_name, e
                );
                continue;
            }
        };
        operations.push(json!({"index": {"_id": sanitized.metadata_name}}));
        operations.push(source);
    }
    operations
}

pub fn build_delete_operations(doc_ids: &[String]) -> Vec<Value> {
    doc_ids
        .iter()
        .map(|doc_id| json!({"delete": {"_id": metadata_name_of(doc_id)}}))
        .collect()
}

/// Counts (succeeded, failed) items in a bulk response body.
pub fn count_bulk_outcomes(response_body: &Value) -> (usize, usize) {
    let Some(items) = response_body.get("items").and_then(|items| items.as_array()) else {
        return (0, 0);
    };

    let failed = items
        .iter()
        .filter(|item| {
            item.get("index")
                .or_else(|| item.get("delete"))
                .and_then(|result| result.get("error"))
                .is_some()
        })
        .count();

    (items.len() - failed, failed)
}

pub async fn bulk_upsert(client: &Elasticsearch, index_name: &str, documents: &[ContentDocument]) {
    let operations = build_upsert_operations(documents);
    if operations.is_empty() {
        return;
    }
    send_bulk(client, index_name, operations, "index").await;
}

pub async fn bulk_delete(client: &Elasticsearch, index_name: &str, doc_ids: &[String]) {
    let operations = build_delete_operations(doc_ids);
    if operations.is_empty() {
        return;
    }
    send_bulk(client, index_name, operations, "delete").await;
}

/// Issues a match-all delete-by-query against the index. Failures are
/// logged and swallowed.
pub async fn delete_all(client: &Elasticsearch, index_name: &str) {
    let response = client
        .delete_by_query(DeleteByQueryParts::Index(&[index_name]))
        .body(json!({"query": {"match_all": {}}}))
        .send()
        .await;

    match response {
        Ok(response) => match response.json::<Value>().await {
            Ok(body) => {
                let deleted = body.get("deleted").and_then(|d| d.as_u64()).unwrap_or(0);
                info!(
                    "Deleted all documents from index '{}' ({} removed)",
                    index_name, deleted
                );
            }
            Err(e) => warn!("Failed to parse delete-by-query response: {}", e),
        },
        Err(e) => error!(
            "Failed to delete all documents from index '{}': {}",
            index_name, e
        ),
    }
}

async fn send_bulk(client: &Elasticsearch, index_name: &str, operations: Vec<Value>, action: &str) {
    let item_count = operations.len();
    let body: Vec<JsonBody<Value>> = operations.into_iter().map(JsonBody::from).collect();

    let response = match client.bulk(BulkParts::Index(index_name)).body(body).send().await {
        Ok(response) => response,
        Err(e) => {
            error!(
                "Bulk {} request against index '{}' failed ({} lines): {}",
                action, index_name, item_count, e
            );
            return;
        }
    };

    let response_body: Value = match response.json().await {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to parse bulk {} response: {}", action, e);
            return;
        }
    };

    let has_errors = response_body
        .get("errors")
        .and_then(|errors| errors.as_bool())
        .unwrap_or(false);

    if has_errors {
        if let Some(items) = response_body.get("items").and_then(|items| items.as_array()) {
            for item in items {
                if let Some(item_error) = item
                    .get("index")
                    .or_else(|| item.get("delete"))
                    .and_then(|result| result.get("error"))
                {
                    error!("Bulk {} item error: {}", action, item_error);
                }
            }
        }
        let (succeeded, failed) = count_bulk_outcomes(&response_body);
        warn!(
            "Bulk {} against index '{}' completed with {} failures, {} items succeeded",
            action, index_name, failed, succeeded
        );
    } else {
        let (succeeded, _) = count_bulk_outcomes(&response_body);
        info!(
            "Successfully processed {} bulk {} items against index '{}'",
            succeeded, action, index_name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_name_strips_prefix() {
        assert_eq!(metadata_name_of("post-abc123"), "abc123");
    }

    #[test]
    fn test_metadata_name_without_separator_is_verbatim() {
        assert_eq!(metadata_name_of("abc123"), "abc123");
    }

    #[test]
    fn test_metadata_name_strips_only_first_separator() {
        assert_eq!(metadata_name_of("post-abc-123"), "abc-123");
    }

    #[test]
    fn test_empty_upsert_batch_builds_no_operations() {
        assert!(build_upsert_operations(&[]).is_empty());
    }

    #[test]
    fn test_upsert_operations_are_keyed_by_metadata_name() {
        let documents = vec![
            ContentDocument {
                metadata_name: "abc".to_owned(),
                title: "First".to_owned(),
                ..Default::default()
            },
            ContentDocument {
                metadata_name: "def".to_owned(),
                title: "Second".to_owned(),
                ..Default::default()
            },
        ];
        let operations = build_upsert_operations(&documents);
        assert_eq!(operations.len(), 4);
        assert_eq!(operations[0]["index"]["_id"], "abc");
        assert_eq!(operations[1]["title"], "First");
        assert_eq!(operations[2]["index"]["_id"], "def");
        assert_eq!(operations[3]["title"], "Second");
    }

    #[test]
    fn test_upsert_operations_sanitize_free_text() {
        let documents = vec![ContentDocument {
            metadata_name: "abc".to_owned(),
            content: "<p>Hello</p>".to_owned(),
            description: "<b>Short</b>".to_owned(),
            ..Default::default()
        }];
        let operations = build_upsert_operations(&documents);
        assert_eq!(operations[1]["content"], "Hello");
        assert_eq!(operations[1]["description"], "Short");
    }

    #[test]
    fn test_delete_operations_parse_identifiers() {
        let doc_ids = vec!["post-abc123".to_owned(), "xyz".to_owned()];
        let operations = build_delete_operations(&doc_ids);
        assert_eq!(operations.len(), 2);
        assert_eq!(operations[0]["delete"]["_id"], "abc123");
        assert_eq!(operations[1]["delete"]["_id"], "xyz");
    }

    #[test]
    fn test_count_bulk_outcomes_with_partial_failure() {
        let mut items = Vec::new();
        for i in 0..10 {
            if i == 3 {
                items.push(json!({"index": {"_id": i.to_string(), "status": 400,
                    "error": {"type": "mapper_parsing_exception"}}}));
            } else {
                items.push(json!({"index": {"_id": i.to_string(), "status": 200}}));
            }
        }
        let body = json!({"errors": true, "items": items});
        assert_eq!(count_bulk_outcomes(&body), (9, 1));
    }

    #[test]
    fn test_count_bulk_outcomes_with_delete_items() {
        let body = json!({"errors": false, "items": [
            {"delete": {"_id": "abc", "status": 200}},
            {"delete": {"_id": "def", "status": 200}}
        ]});
        assert_eq!(count_bulk_outcomes(&body), (2, 0));
    }

    #[test]
    fn test_count_bulk_outcomes_without_items() {
        assert_eq!(count_bulk_outcomes(&json!({})), (0, 0));
    }
}
