//! REST gateway
//!
//! Serves the `/v1/...` JSON surface of the cloud KMS API on top of
//! [`KmsService`]. Binary payloads travel base64-encoded; errors use the
//! `{"error": {"code", "message", "status"}}` body.
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::authz::PRINCIPAL_HEADER;
use crate::messages::*;
use crate::service::KmsService;
use crate::status::{Code, Status};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use kms_emulator_core::{
    CryptoKeyPurpose, Labels, ResourceName, VersionState, VersionTemplate,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Custom method on a crypto key (`.../cryptoKeys/{k}:{action}`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Encrypt,
    Decrypt,
    UpdatePrimaryVersion,
}

/// A resolved `/v1/` path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    KeyRings { parent: String },
    KeyRing { name: String },
    CryptoKeys { parent: String },
    CryptoKey { name: String },
    CryptoKeyAction { name: String, action: KeyAction },
    CryptoKeyVersions { parent: String },
    CryptoKeyVersion { name: String },
    DestroyCryptoKeyVersion { name: String },
}

impl Route {
    /// Resolve a path relative to `/v1/`
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim_start_matches('/');
        let (resource, verb) = match path.rsplit_once(':') {
            Some((resource, verb)) if !verb.contains('/') => (resource, Some(verb)),
            _ => (path, None),
        };

        if let Some(route) = Self::collection(resource) {
            return verb.is_none().then_some(route);
        }

        let name = ResourceName::parse(resource)?;
        let resource = resource.to_string();
        match (name, verb) {
            (ResourceName::KeyRing { .. }, None) => Some(Route::KeyRing { name: resource }),
            (ResourceName::CryptoKey { .. }, None) => Some(Route::CryptoKey { name: resource }),
            (ResourceName::CryptoKey { .. }, Some(verb)) => {
                let action = match verb {
                    "encrypt" => KeyAction::Encrypt,
                    "decrypt" => KeyAction::Decrypt,
                    "updatePrimaryVersion" => KeyAction::UpdatePrimaryVersion,
                    _ => return None,
                };
                Some(Route::CryptoKeyAction {
                    name: resource,
                    action,
                })
            }
            (ResourceName::CryptoKeyVersion { .. }, None) => {
                Some(Route::CryptoKeyVersion { name: resource })
            }
            (ResourceName::CryptoKeyVersion { .. }, Some("destroy")) => {
                Some(Route::DestroyCryptoKeyVersion { name: resource })
            }
            _ => None,
        }
    }

    fn collection(resource: &str) -> Option<Self> {
        let (parent, collection) = resource.rsplit_once('/')?;
        let parsed = ResourceName::parse(parent)?;
        let parent = parent.to_string();
        match collection {
            "keyRings" if parsed.is_location() => Some(Route::KeyRings { parent }),
            "cryptoKeys" if parsed.is_key_ring() => Some(Route::CryptoKeys { parent }),
            "cryptoKeyVersions" if parsed.is_crypto_key() => {
                Some(Route::CryptoKeyVersions { parent })
            }
            _ => None,
        }
    }
}

/// Why a request produced no result
#[derive(Debug)]
pub enum Rejection {
    MethodNotAllowed,
    Status(Status),
}

impl From<Status> for Rejection {
    fn from(status: Status) -> Self {
        Rejection::Status(status)
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::MethodNotAllowed => error_body(
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed",
                "METHOD_NOT_ALLOWED",
            ),
            Rejection::Status(status) => error_body(
                status.code.http_status(),
                &status.message,
                status.code.as_str(),
            ),
        }
    }
}

fn error_body(http: StatusCode, message: &str, status: &str) -> Response {
    let body = json!({
        "error": {
            "code": http.as_u16(),
            "message": message,
            "status": status,
        }
    });
    (http, Json(body)).into_response()
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct CryptoKeyBody {
    purpose: Option<CryptoKeyPurpose>,
    version_template: Option<VersionTemplate>,
    labels: Labels,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LabelsBody {
    labels: Labels,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct EncryptBody {
    plaintext: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DecryptBody {
    ciphertext: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PrimaryVersionBody {
    crypto_key_version_id: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct VersionBody {
    state: Option<VersionState>,
}

/// Parse a JSON body; an empty body is the default message
fn json_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, Status> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| Status::invalid_argument(format!("Invalid JSON body: {}", e)))
}

fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>, Status> {
    STANDARD
        .decode(value)
        .map_err(|e| Status::invalid_argument(format!("{} is not valid base64: {}", field, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, Status> {
    serde_json::to_value(value).map_err(|e| Status::new(Code::Internal, e.to_string()))
}

fn query_param(query: &HashMap<String, String>, key: &str) -> String {
    query.get(key).cloned().unwrap_or_default()
}

/// Run one request against the service
///
/// Creates answer `201 Created`, everything else `200 OK`.
pub async fn dispatch(
    service: &KmsService,
    method: &Method,
    route: Route,
    query: &HashMap<String, String>,
    principal: Option<&str>,
    body: &Bytes,
) -> Result<(StatusCode, Value), Rejection> {
    let value = match route {
        Route::KeyRings { parent } => match *method {
            Method::GET => {
                to_json(&service.list_key_rings(ListKeyRingsRequest { parent }, principal).await?)?
            }
            Method::POST => {
                let req = CreateKeyRingRequest {
                    parent,
                    key_ring_id: query_param(query, "keyRingId"),
                };
                let key_ring = service.create_key_ring(req, principal).await?;
                return Ok((StatusCode::CREATED, to_json(&key_ring)?));
            }
            _ => return Err(Rejection::MethodNotAllowed),
        },
        Route::KeyRing { name } => match *method {
            Method::GET => {
                to_json(&service.get_key_ring(GetKeyRingRequest { name }, principal).await?)?
            }
            _ => return Err(Rejection::MethodNotAllowed),
        },
        Route::CryptoKeys { parent } => match *method {
            Method::GET => to_json(
                &service
                    .list_crypto_keys(ListCryptoKeysRequest { parent }, principal)
                    .await?,
            )?,
            Method::POST => {
                let body: CryptoKeyBody = json_body(body)?;
                let req = CreateCryptoKeyRequest {
                    parent,
                    crypto_key_id: query_param(query, "cryptoKeyId"),
                    purpose: body.purpose,
                    version_template: body.version_template,
                    labels: body.labels,
                };
                let crypto_key = service.create_crypto_key(req, principal).await?;
                return Ok((StatusCode::CREATED, to_json(&crypto_key)?));
            }
            _ => return Err(Rejection::MethodNotAllowed),
        },
        Route::CryptoKey { name } => match *method {
            Method::GET => {
                to_json(&service.get_crypto_key(GetCryptoKeyRequest { name }, principal).await?)?
            }
            Method::PATCH => {
                let body: LabelsBody = json_body(body)?;
                let req = UpdateCryptoKeyRequest {
                    name,
                    labels: body.labels,
                };
                to_json(&service.update_crypto_key(req, principal).await?)?
            }
            _ => return Err(Rejection::MethodNotAllowed),
        },
        Route::CryptoKeyAction { name, action } => {
            if *method != Method::POST {
                return Err(Rejection::MethodNotAllowed);
            }
            match action {
                KeyAction::Encrypt => {
                    let body: EncryptBody = json_body(body)?;
                    let req = EncryptRequest {
                        name,
                        plaintext: decode_base64("plaintext", &body.plaintext)?,
                    };
                    let resp = service.encrypt(req, principal).await?;
                    json!({
                        "name": resp.name,
                        "ciphertext": STANDARD.encode(&resp.ciphertext),
                    })
                }
                KeyAction::Decrypt => {
                    let body: DecryptBody = json_body(body)?;
                    let req = DecryptRequest {
                        name,
                        ciphertext: decode_base64("ciphertext", &body.ciphertext)?,
                    };
                    let resp = service.decrypt(req, principal).await?;
                    json!({ "plaintext": STANDARD.encode(&resp.plaintext) })
                }
                KeyAction::UpdatePrimaryVersion => {
                    let body: PrimaryVersionBody = json_body(body)?;
                    let req = UpdateCryptoKeyPrimaryVersionRequest {
                        name,
                        crypto_key_version_id: body.crypto_key_version_id,
                    };
                    to_json(&service.update_crypto_key_primary_version(req, principal).await?)?
                }
            }
        }
        Route::CryptoKeyVersions { parent } => match *method {
            Method::GET => to_json(
                &service
                    .list_crypto_key_versions(ListCryptoKeyVersionsRequest { parent }, principal)
                    .await?,
            )?,
            Method::POST => {
                let version = service
                    .create_crypto_key_version(CreateCryptoKeyVersionRequest { parent }, principal)
                    .await?;
                return Ok((StatusCode::CREATED, to_json(&version)?));
            }
            _ => return Err(Rejection::MethodNotAllowed),
        },
        Route::CryptoKeyVersion { name } => match *method {
            Method::GET => to_json(
                &service
                    .get_crypto_key_version(GetCryptoKeyVersionRequest { name }, principal)
                    .await?,
            )?,
            Method::PATCH => {
                let body: VersionBody = json_body(body)?;
                let req = UpdateCryptoKeyVersionRequest {
                    name,
                    state: body.state,
                };
                to_json(&service.update_crypto_key_version(req, principal).await?)?
            }
            _ => return Err(Rejection::MethodNotAllowed),
        },
        Route::DestroyCryptoKeyVersion { name } => match *method {
            Method::POST => to_json(
                &service
                    .destroy_crypto_key_version(DestroyCryptoKeyVersionRequest { name }, principal)
                    .await?,
            )?,
            _ => return Err(Rejection::MethodNotAllowed),
        },
    };

    Ok((StatusCode::OK, value))
}

async fn handle_v1(
    State(service): State<Arc<KmsService>>,
    method: Method,
    Path(path): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), Rejection> {
    let route = Route::parse(&path)
        .ok_or_else(|| Status::not_found(format!("No route for /v1/{}", path)))?;
    let principal = headers
        .get(PRINCIPAL_HEADER)
        .and_then(|value| value.to_str().ok());

    dispatch(&service, &method, route, &query, principal, &body)
        .await
        .map(|(status, value)| (status, Json(value)))
}

/// Health check handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": crate::SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn not_found() -> Rejection {
    Rejection::Status(Status::not_found("Not found"))
}

/// Build the gateway router
pub fn router(service: Arc<KmsService>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/*path", any(handle_v1))
        .fallback(not_found)
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCATION: &str = "projects/p/locations/global";
    const RING: &str = "projects/p/locations/global/keyRings/r";
    const KEY: &str = "projects/p/locations/global/keyRings/r/cryptoKeys/k";

    #[test]
    fn test_collection_routes() {
        assert_eq!(
            Route::parse(&format!("{}/keyRings", LOCATION)),
            Some(Route::KeyRings {
                parent: LOCATION.into()
            })
        );
        assert_eq!(
            Route::parse(&format!("{}/cryptoKeys", RING)),
            Some(Route::CryptoKeys { parent: RING.into() })
        );
        assert_eq!(
            Route::parse(&format!("{}/cryptoKeyVersions", KEY)),
            Some(Route::CryptoKeyVersions { parent: KEY.into() })
        );
    }

    #[test]
    fn test_resource_routes() {
        assert_eq!(Route::parse(RING), Some(Route::KeyRing { name: RING.into() }));
        assert_eq!(Route::parse(KEY), Some(Route::CryptoKey { name: KEY.into() }));

        let version = format!("{}/cryptoKeyVersions/3", KEY);
        assert_eq!(
            Route::parse(&version),
            Some(Route::CryptoKeyVersion {
                name: version.clone()
            })
        );
        assert_eq!(
            Route::parse(&format!("{}:destroy", version)),
            Some(Route::DestroyCryptoKeyVersion { name: version })
        );
    }

    #[test]
    fn test_custom_methods() {
        for (verb, action) in [
            ("encrypt", KeyAction::Encrypt),
            ("decrypt", KeyAction::Decrypt),
            ("updatePrimaryVersion", KeyAction::UpdatePrimaryVersion),
        ] {
            assert_eq!(
                Route::parse(&format!("{}:{}", KEY, verb)),
                Some(Route::CryptoKeyAction {
                    name: KEY.into(),
                    action
                })
            );
        }
    }

    #[test]
    fn test_unknown_routes() {
        assert_eq!(Route::parse(""), None);
        assert_eq!(Route::parse("projects/p"), None);
        assert_eq!(Route::parse(LOCATION), None);
        assert_eq!(Route::parse(&format!("{}:sign", KEY)), None);
        assert_eq!(Route::parse(&format!("{}:encrypt", RING)), None);
        assert_eq!(Route::parse(&format!("{}/keyRings:list", LOCATION)), None);
        assert_eq!(Route::parse(&format!("{}/cryptoKeys", LOCATION)), None);
        assert_eq!(Route::parse(&format!("{}/cryptoKeyVersions/0", KEY)), None);
    }

    #[test]
    fn test_empty_body_is_default_message() {
        let body: VersionBody = json_body(&Bytes::new()).unwrap();
        assert!(body.state.is_none());

        let err = json_body::<VersionBody>(&Bytes::from_static(b"{not json")).unwrap_err();
        assert_eq!(err.code, Code::InvalidArgument);
    }
}
