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

use crate::types::{ContentDocument, SearchQuery, SearchResponse};
use elasticsearch::{Elasticsearch, SearchParts};
use serde_json::{Value, json};
use tracing::{error, warn};

const HIGHLIGHT_FIELDS: [&str; 3] = ["title", "description", "content"];
const HIGHLIGHT_FRAGMENT_SIZE: u32 = 200;

/// Builds the backend query body. Keyword matches span title, description
/// and content with title boosted above description above content; the
/// three visibility filters are structural and always applied.
pub fn build_search_body(query: &SearchQuery) -> Value {
    let must = if query.keyword.is_empty() {
        json!({"match_all": {}})
    } else {
        json!({
            "multi_match": {
                "query": query.keyword,
                "fields": ["title^3", "description^2", "content^1"]
            }
        })
    };

    let mut highlight_fields = serde_json::Map::new();
    for field in HIGHLIGHT_FIELDS {
        highlight_fields.insert(
            field.to_owned(),
            json!({
                "fragment_size": HIGHLIGHT_FRAGMENT_SIZE,
                "number_of_fragments": 1,
                "pre_tags": [query.highlight_pre_tag],
                "post_tags": [query.highlight_post_tag]
            }),
        );
    }

    json!({
        "query": {
            "bool": {
                "must": must,
                "filter": [
                    {"term": {"recycled": false}},
                    {"term": {"exposed": true}},
                    {"term": {"published": true}}
                ]
            }
        },
        "from": 0,
        "size": query.limit,
        "highlight": {"fields": Value::Object(highlight_fields)}
    })
}

/// Executes the search and materializes the response. Backend failures
/// yield an empty result; they never propagate to the caller.
pub async fn execute(
    client: &Elasticsearch,
    index_name: &str,
    query: &SearchQuery,
) -> SearchResponse {
    let body = build_search_body(query);

    let response = match client
        .search(SearchParts::Index(&[index_name]))
        .body(body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            error!("Search against index '{}' failed: {}", index_name, e);
            return SearchResponse::default();
        }
    };

    let response_body: Value = match response.json().await {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to parse search response: {}", e);
            return SearchResponse::default();
        }
    };

    let total = match response_body
        .pointer("/hits/total/value")
        .and_then(|total| total.as_u64())
    {
        Some(total) => total,
        None => {
            warn!("Search response carried no readable total hit count");
            0
        }
    };

    let processing_time_millis = response_body
        .get("took")
        .and_then(|took| took.as_u64())
        .unwrap_or(0);

    let hits = response_body
        .pointer("/hits/hits")
        .and_then(|hits| hits.as_array())
        .map(|hits| convert_hits(hits))
        .unwrap_or_default();

    SearchResponse {
        total,
        keyword: query.keyword.clone(),
        limit: query.limit,
        processing_time_millis,
        hits,
    }
}

/// Deserializes raw hits, dropping any that fail, and substitutes
/// highlight fragments into the highlightable fields.
fn convert_hits(hits: &[Value]) -> Vec<ContentDocument> {
    let mut documents = Vec::with_capacity(hits.len());
    for hit in hits {
        let source = hit.get("_source").cloned().unwrap_or_default();
        let mut document: ContentDocument = match serde_json::from_value(source) {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to convert search hit, skipping: {}", e);
                continue;
            }
        };
        if let Some(highlight) = hit.get("highlight") {
            apply_highlights(&mut document, highlight);
        }
        documents.push(document);
    }
    documents
}

fn apply_highlights(document: &mut ContentDocument, highlight: &Value) {
    if let Some(text) = highlighted_text(highlight, "title") {
        document.title = text;
    }
    if let Some(text) = highlighted_text(highlight, "description") {
        document.description = text;
    }
    if let Some(text) = highlighted_text(highlight, "content") {
        document.content = text;
    }
}

fn highlighted_text(highlight: &Value, field: &str) -> Option<String> {
    let fragments = highlight.get(field)?.as_array()?;
    let joined = fragments
        .iter()
        .filter_map(|fragment| fragment.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Some(joined.trim().to_owned())
}
