//! Collects produced payloads into a [`ProducedBundle`]

use crate::models::{Certificate, Csr, Key, Payload, ProducedBundle, ToolConfig};

/// Form tag of issued certificates
pub const CERTIFICATE_FORM: &str = "crt";

/// Bundle for a request generated from a config.
pub fn assemble_generated(
    config: ToolConfig,
    private_key: Payload,
    request: Payload,
    certificate: Payload,
    public_key: Payload,
    root_certificate: &Certificate,
) -> ProducedBundle {
    ProducedBundle {
        certificate: Certificate::new(CERTIFICATE_FORM, certificate),
        root_certificate: root_certificate.clone(),
        request: Csr(request),
        private_key: Some(Key::private(private_key)),
        public_key: Key::public(public_key),
        config: Some(config),
    }
}

/// Bundle for a caller-supplied request; carries no key and no config.
pub fn assemble_signed(
    request: Csr,
    certificate: Payload,
    public_key: Payload,
    root_certificate: &Certificate,
) -> ProducedBundle {
    ProducedBundle {
        certificate: Certificate::new(CERTIFICATE_FORM, certificate),
        root_certificate: root_certificate.clone(),
        request,
        private_key: None,
        public_key: Key::public(public_key),
        config: None,
    }
}
