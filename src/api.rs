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
use crate::schema;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiState {
    pub settings: Arc<dyn SettingsProvider>,
    pub clients: Arc<ClientManager>,
}

/// Read-only diagnostic routes, mounted by the host.
pub fn router(state: ApiState) -> Router {
    Router::new().route("/stats", get(get_stats)).with_state(state)
}

/// Reports whether the configured index currently exists on the backend.
async fn get_stats(State(state): State<ApiState>) -> Result<Json<bool>, ApiError> {
    let Some(raw) = state.settings.fetch(SETTINGS_ENTRY).await else {
        return Err(ApiError::BadRequest(
            "Search backend is not configured".to_owned(),
        ));
    };

    let config: ConnectorConfig = serde_json::from_str(&raw).map_err(|_| {
        ApiError::BadRequest("Failed to parse search backend configuration".to_owned())
    })?;

    if config.host.is_empty() || config.index_name.is_empty() {
        return Err(ApiError::BadRequest(
            "Search backend host or index name is not configured".to_owned(),
        ));
    }

    let client = state
        .clients
        .get_or_create(&config)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to create backend client: {}", e)))?;

    let exists = schema::index_exists(&client, &config.index_name)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to check index existence: {}", e)))?;

    Ok(Json(exists))
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}
