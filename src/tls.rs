// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TLS termination from PEM files.

use std::io;
use std::sync::Once;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;

static INSTALL_PROVIDER: Once = Once::new();

/// Install the ring crypto provider for rustls.
///
/// Must run before any TLS configuration is built. Safe to call more than
/// once.
pub fn install_crypto_provider() {
    INSTALL_PROVIDER.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            tracing::debug!("rustls crypto provider already installed");
        }
    });
}

/// Load the certificate chain and private key configured for HTTPS.
pub async fn load_rustls_config(config: &TlsConfig) -> io::Result<RustlsConfig> {
    install_crypto_provider();
    let rustls = RustlsConfig::from_pem_file(&config.cert_path, &config.key_path).await?;
    tracing::info!(
        cert = %config.cert_path.display(),
        key = %config.key_path.display(),
        "TLS credentials loaded"
    );
    Ok(rustls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn missing_pem_files_are_an_error() {
        let config = TlsConfig {
            cert_path: PathBuf::from("/nonexistent/cert.pem"),
            key_path: PathBuf::from("/nonexistent/key.pem"),
        };
        assert!(load_rustls_config(&config).await.is_err());
    }

    #[test]
    fn provider_install_is_idempotent() {
        install_crypto_provider();
        install_crypto_provider();
    }
}
