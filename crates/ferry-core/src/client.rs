//! Blocking HTTP client for the content-addressed storage network.
//!
//! All calls accept a [`Sink`] for diagnostic passthrough and return
//! opaque string results; errors propagate unchanged to the caller.

use crate::error::{FerryError, Result};
use crate::sink::Sink;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Blocking operations against the storage network.
pub trait ContentClient: Send + Sync {
    fn get(&self, hash: &str, dest: &Path, sink: &dyn Sink) -> Result<()>;
    fn put(&self, path: &Path, gateway: bool, sink: &dyn Sink) -> Result<String>;
    fn pin(&self, hash: &str, sink: &dyn Sink) -> Result<String>;
    fn cat(&self, hash: &str, sink: &dyn Sink) -> Result<String>;
    fn ls(&self, hash: &str, sink: &dyn Sink) -> Result<String>;
    fn ls_pinned(&self, sink: &dyn Sink) -> Result<String>;
}

/// Local node API host.
pub const DEFAULT_API: &str = "http://127.0.0.1:5001";
/// Alternate upload target selected by the gateway flag.
pub const DEFAULT_GATEWAY: &str = "https://gateway.ipfs.io";

pub struct HttpClient {
    api: String,
    gateway: String,
    http: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "Pins", default)]
    pins: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LsResponse {
    #[serde(rename = "Objects", default)]
    objects: Vec<LsObject>,
}

#[derive(Debug, Deserialize)]
struct LsObject {
    #[serde(rename = "Links", default)]
    links: Vec<LsLink>,
}

#[derive(Debug, Deserialize)]
struct LsLink {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Hash")]
    hash: String,
    #[serde(rename = "Size", default)]
    size: u64,
}

#[derive(Debug, Deserialize)]
struct PinLsResponse {
    #[serde(rename = "Keys", default)]
    keys: BTreeMap<String, PinInfo>,
}

#[derive(Debug, Deserialize)]
struct PinInfo {
    #[serde(rename = "Type")]
    kind: String,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_hosts(DEFAULT_API, DEFAULT_GATEWAY)
    }

    /// Point the client at explicit hosts (tests use a local mock server).
    pub fn with_hosts(api: impl Into<String>, gateway: impl Into<String>) -> Result<Self> {
        // No client-side timeout: a hung node call hangs the invocation,
        // and callers own any cancellation wrapper.
        let http = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self {
            api: api.into(),
            gateway: gateway.into(),
            http,
        })
    }

    fn check(resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(FerryError::Network(format!("{status}: {}", body.trim())));
        }
        Ok(resp)
    }
}

impl ContentClient for HttpClient {
    fn get(&self, hash: &str, dest: &Path, sink: &dyn Sink) -> Result<()> {
        sink.emit(&format!("fetching {hash} -> {}", dest.display()));
        let url = format!("{}/ipfs/{hash}", self.gateway);
        let resp = Self::check(self.http.get(&url).send()?)?;
        let bytes = resp.bytes()?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, &bytes)?;
        sink.emit(&format!("wrote {} bytes", bytes.len()));
        Ok(())
    }

    fn put(&self, path: &Path, gateway: bool, sink: &dyn Sink) -> Result<String> {
        let host = if gateway { &self.gateway } else { &self.api };
        sink.emit(&format!("adding {} via {host}", path.display()));
        let form = reqwest::blocking::multipart::Form::new().file("file", path)?;
        let url = format!("{host}/api/v0/add");
        let resp = Self::check(self.http.post(&url).multipart(form).send()?)?;
        let added: AddResponse = resp.json()?;
        if added.hash.is_empty() {
            return Err(FerryError::Network("node returned an empty hash".into()));
        }
        Ok(added.hash)
    }

    fn pin(&self, hash: &str, sink: &dyn Sink) -> Result<String> {
        sink.emit(&format!("pinning {hash}"));
        let url = format!("{}/api/v0/pin/add?arg={hash}", self.api);
        let resp = Self::check(self.http.post(&url).send()?)?;
        let pinned: PinResponse = resp.json()?;
        pinned
            .pins
            .into_iter()
            .next()
            .ok_or_else(|| FerryError::Network("node reported nothing pinned".into()))
    }

    fn cat(&self, hash: &str, sink: &dyn Sink) -> Result<String> {
        sink.emit(&format!("reading {hash}"));
        let url = format!("{}/api/v0/cat?arg={hash}", self.api);
        let resp = Self::check(self.http.post(&url).send()?)?;
        Ok(resp.text()?)
    }

    fn ls(&self, hash: &str, sink: &dyn Sink) -> Result<String> {
        sink.emit(&format!("listing {hash}"));
        let url = format!("{}/api/v0/ls?arg={hash}", self.api);
        let resp = Self::check(self.http.post(&url).send()?)?;
        let listing: LsResponse = resp.json()?;
        let mut lines = Vec::new();
        for object in listing.objects {
            for link in object.links {
                lines.push(format!("{} {} {}", link.hash, link.size, link.name));
            }
        }
        Ok(lines.join("\n"))
    }

    fn ls_pinned(&self, sink: &dyn Sink) -> Result<String> {
        sink.emit("listing pinned objects");
        let url = format!("{}/api/v0/pin/ls", self.api);
        let resp = Self::check(self.http.post(&url).send()?)?;
        let pins: PinLsResponse = resp.json()?;
        let lines: Vec<String> = pins
            .keys
            .into_iter()
            .map(|(hash, info)| format!("{hash} {}", info.kind))
            .collect();
        Ok(lines.join("\n"))
    }
}
