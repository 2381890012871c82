// One-shot mind-map data fetch per matter id.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::graph_utils::catalog::{EntityCatalog, EntitySet, Relationship, null_as_default};

pub const FALLBACK_MESSAGE: &str = "Unable to load mind map data";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MindMapStats {
    #[serde(deserialize_with = "null_as_default")]
    pub total_companies: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_persons: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_directors: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_shareholders: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_secretaries: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_office_holders: u32,
    pub total_addresses: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub total_relationships: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MindMapData {
    #[serde(deserialize_with = "null_as_default")]
    pub entities: EntitySet,
    #[serde(deserialize_with = "null_as_default")]
    pub relationships: Vec<Relationship>,
    #[serde(deserialize_with = "null_as_default")]
    pub stats: MindMapStats,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<MindMapData>,
    #[serde(default)]
    pub matter_name: Option<String>,
}

/// A successful fetch, normalized and ready for graph construction.
#[derive(Clone, Debug)]
pub struct MindMapPayload {
    pub matter_id: String,
    pub matter_name: Option<String>,
    pub catalog: EntityCatalog,
    pub relationships: Vec<Relationship>,
    pub stats: MindMapStats,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[cfg(feature = "http")]
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with HTTP {0}")]
    Status(u16),
    #[error("{0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("could not read mind map file: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Text for the user: the server's own message when it gave one.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Rejected(msg) => msg.clone(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }
}

pub fn into_payload(matter_id: &str, response: MindMapResponse) -> Result<MindMapPayload, FetchError> {
    let message = response
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
    if !response.success {
        return Err(FetchError::Rejected(message));
    }
    let data = response.data.ok_or(FetchError::Rejected(message))?;
    Ok(MindMapPayload {
        matter_id: matter_id.to_string(),
        matter_name: response.matter_name,
        catalog: EntityCatalog::from_entity_set(data.entities),
        relationships: data.relationships,
        stats: data.stats,
    })
}

pub trait MindMapSource: Send + Sync {
    fn fetch(&self, matter_id: &str) -> Result<MindMapPayload, FetchError>;
    fn describe(&self) -> String;
}

/// Reads a saved response body (same shape as the HTTP endpoint) from disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
}

impl MindMapSource for FileSource {
    fn fetch(&self, matter_id: &str) -> Result<MindMapPayload, FetchError> {
        let body = std::fs::read_to_string(&self.path)?;
        let response: MindMapResponse = serde_json::from_str(&body)?;
        into_payload(matter_id, response)
    }

    fn describe(&self) -> String { format!("file {}", self.path.display()) }
}

#[cfg(feature = "http")]
pub struct HttpSource {
    client: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string(), token })
    }

    pub fn endpoint(&self, matter_id: &str) -> String {
        format!("{}/matters/{}/mind-map", self.base_url, matter_id)
    }
}

#[cfg(feature = "http")]
impl MindMapSource for HttpSource {
    fn fetch(&self, matter_id: &str) -> Result<MindMapPayload, FetchError> {
        let mut request = self.client.get(self.endpoint(matter_id));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        // error bodies usually still carry {success:false, message}
        match serde_json::from_str::<MindMapResponse>(&body) {
            Ok(parsed) => into_payload(matter_id, parsed),
            Err(_) if !status.is_success() => Err(FetchError::Status(status.as_u16())),
            Err(e) => Err(FetchError::Malformed(e)),
        }
    }

    fn describe(&self) -> String { self.base_url.clone() }
}
