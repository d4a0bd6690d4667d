//! Payload and bundle types moved through the pipeline

use std::fmt;

use uuid::Uuid;

/// Opaque file contents
pub type Payload = Vec<u8>;

/// Unique identifier of one issuance request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RequestId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Certificate signing request, generated or supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Csr(pub Payload);

/// Tool configuration text used to generate a signing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig(pub Payload);

/// Key material tagged with its encoding form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub form: String,
    pub payload: Payload,
}

impl Key {
    pub fn private(payload: Payload) -> Self {
        Self {
            form: "key".to_string(),
            payload,
        }
    }

    pub fn public(payload: Payload) -> Self {
        Self {
            form: "pem".to_string(),
            payload,
        }
    }
}

/// Certificate tagged with its encoding form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub form: String,
    pub payload: Payload,
}

impl Certificate {
    pub fn new(form: impl Into<String>, payload: Payload) -> Self {
        Self {
            form: form.into(),
            payload,
        }
    }
}

/// Caller input of one issuance: exactly one of config or CSR
#[derive(Debug, Clone)]
pub enum IssueInput {
    FromConfig(ToolConfig),
    FromCsr(Csr),
}

impl IssueInput {
    /// Build from optional form parts, rejecting both or neither.
    pub fn from_parts(config: Option<Payload>, csr: Option<Payload>) -> Option<Self> {
        match (config, csr) {
            (Some(config), None) => Some(IssueInput::FromConfig(ToolConfig(config))),
            (None, Some(csr)) => Some(IssueInput::FromCsr(Csr(csr))),
            _ => None,
        }
    }
}

/// Everything produced by one successful issuance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducedBundle {
    pub certificate: Certificate,
    pub root_certificate: Certificate,
    pub request: Csr,
    /// Present only when the request was generated from a config
    pub private_key: Option<Key>,
    pub public_key: Key,
    /// Present only when the request was generated from a config
    pub config: Option<ToolConfig>,
}

impl ProducedBundle {
    /// Named archive entries in delivery order.
    pub fn entries(&self) -> Vec<(&'static str, &[u8])> {
        let mut entries = Vec::with_capacity(6);
        if let Some(config) = &self.config {
            entries.push(("server.conf", config.0.as_slice()));
        }
        if let Some(key) = &self.private_key {
            entries.push(("prv.pem", key.payload.as_slice()));
        }
        entries.push(("pub.pem", self.public_key.payload.as_slice()));
        entries.push(("csr.pem", self.request.0.as_slice()));
        entries.push(("cert.pem", self.certificate.payload.as_slice()));
        entries.push(("ca-cert.pem", self.root_certificate.payload.as_slice()));
        entries
    }
}
