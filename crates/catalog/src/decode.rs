//! Ingestion decoding of the upstream registry wire format.
//!
//! Publisher-provided metadata arrives as a loosely typed, doubly nested map
//! (`namespace -> package identifier -> fields`). It is decoded here, once,
//! into the typed fields of [`CatalogEntry`] so no later stage re-parses it.

use crate::cursor::Cursor;
use crate::error::Result;
use crate::model::{CatalogEntry, EnvVarSource, EnvVarSpec, Metrics, Package};
use crate::source::Page;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
struct RawServerList {
    #[serde(default)]
    servers: Vec<RawServerResponse>,
    #[serde(default)]
    metadata: RawListMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct RawListMetadata {
    #[serde(default, rename = "nextCursor")]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawServerResponse {
    server: RawServer,
}

#[derive(Debug, Deserialize)]
struct RawWrappedServer {
    #[serde(default)]
    server: Option<RawServer>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    packages: Vec<RawPackage>,
    #[serde(default)]
    repository: Option<RawRepository>,
    #[serde(default, rename = "_meta")]
    meta: Option<RawServerMeta>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    #[serde(default, rename = "registryType")]
    registry_type: String,
    #[serde(default)]
    identifier: String,
    #[serde(default)]
    transport: Option<RawTransport>,
    #[serde(default, rename = "runtimeHint")]
    runtime_hint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTransport {
    #[serde(default, rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct RawServerMeta {
    #[serde(
        default,
        rename = "io.modelcontextprotocol.registry/publisher-provided"
    )]
    publisher_provided: Option<Map<String, Value>>,
}

/// Decode a `GET /v0/servers` payload into a page.
pub fn decode_server_list(bytes: &[u8]) -> Result<Page> {
    let raw: RawServerList = serde_json::from_slice(bytes)?;
    Ok(Page {
        entries: raw
            .servers
            .into_iter()
            .map(|resp| into_entry(resp.server))
            .collect(),
        next_cursor: Cursor::from(raw.metadata.next_cursor),
    })
}

/// Decode a single server, accepting both `{"server": {...}}` and the bare object.
pub fn decode_server(bytes: &[u8]) -> Result<CatalogEntry> {
    if let Ok(RawWrappedServer {
        server: Some(server),
    }) = serde_json::from_slice::<RawWrappedServer>(bytes)
    {
        if !server.name.is_empty() {
            return Ok(into_entry(server));
        }
    }
    let server: RawServer = serde_json::from_slice(bytes)?;
    Ok(into_entry(server))
}

fn into_entry(raw: RawServer) -> CatalogEntry {
    let publisher = raw
        .meta
        .and_then(|meta| meta.publisher_provided)
        .and_then(first_package_metadata)
        .unwrap_or_default();

    let metrics = publisher
        .get("metadata")
        .and_then(Value::as_object)
        .map(decode_metrics)
        .filter(|m| !m.is_empty());

    CatalogEntry {
        name: raw.name,
        version: raw.version,
        description: raw.description,
        tools: string_list(&publisher, "tools"),
        tags: string_list(&publisher, "tags"),
        packages: raw
            .packages
            .into_iter()
            .map(|pkg| Package {
                registry_type: pkg.registry_type,
                identifier: pkg.identifier,
                transport: pkg.transport.map(|t| t.kind).unwrap_or_default(),
                runtime_hint: pkg.runtime_hint.filter(|h| !h.is_empty()),
            })
            .collect(),
        metrics,
        tier: string_field(&publisher, "tier"),
        status: string_field(&publisher, "status"),
        repository_url: raw
            .repository
            .map(|r| r.url)
            .filter(|url| !url.is_empty()),
        env_vars: decode_env(&publisher),
    }
}

// Namespaces and package identifiers are visited in key order, so the choice is stable.
fn first_package_metadata(publisher_provided: Map<String, Value>) -> Option<Map<String, Value>> {
    publisher_provided
        .into_iter()
        .filter_map(|(_, namespace)| match namespace {
            Value::Object(packages) => Some(packages),
            _ => None,
        })
        .find_map(|packages| {
            packages.into_iter().find_map(|(_, package)| match package {
                Value::Object(fields) => Some(fields),
                _ => None,
            })
        })
}

fn string_list(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn decode_metrics(fields: &Map<String, Value>) -> Metrics {
    Metrics {
        stars: count_field(fields, "stars"),
        pulls: count_field(fields, "pulls"),
        last_updated: ["last_updated", "updated_at"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .and_then(parse_timestamp),
    }
}

fn count_field(fields: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = fields.get(key)?;
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let n = value.as_f64()?;
    if !n.is_finite() {
        return None;
    }
    Some(n.max(0.0).trunc() as u64)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn decode_env(fields: &Map<String, Value>) -> Vec<EnvVarSpec> {
    let Some(env) = fields.get("env").and_then(Value::as_object) else {
        return Vec::new();
    };

    env.iter()
        .map(|(name, config)| {
            let config = config.as_object();
            let text = |key: &str| {
                config
                    .and_then(|c| c.get(key))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            EnvVarSpec {
                name: name.clone(),
                description: text("description"),
                required: config
                    .and_then(|c| c.get("required"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                example: text("example"),
                source: EnvVarSource::Metadata,
            }
        })
        .collect()
}
