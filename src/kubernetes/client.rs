// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubeconfig resolution and client creation

use crate::config::Config;
use crate::error::{Result, ShifuError};
use crate::kubernetes::rest::EdgeDeviceRestClient;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config as KConfig};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Build the REST config: from the given kubeconfig file, or inferred
/// (in-cluster first, then the local kubeconfig) when no path is set.
#[instrument]
pub async fn rest_config(kubeconfig_path: Option<&Path>) -> Result<KConfig> {
    match kubeconfig_path {
        Some(path) => config_from_kubeconfig_file(path).await,
        None => {
            let config = KConfig::infer()
                .await
                .map_err(|e| ShifuError::KubeconfigError(format!("Failed to infer config: {}", e)))?;
            debug!("Inferred Kubernetes config for {}", config.cluster_url);
            Ok(config)
        }
    }
}

/// Create a Kubernetes client from the resolved SDK configuration
pub async fn create_client(config: &Config) -> Result<Client> {
    let client_config = rest_config(config.kubeconfig_path.as_deref()).await?;
    info!("Using Kubernetes API server {}", client_config.cluster_url);

    Client::try_from(client_config)
        .map_err(|e| ShifuError::KubeconfigError(format!("Failed to create client: {}", e)))
}

/// Create the versioned EdgeDevice REST client for the configured group/version
pub async fn create_edgedevice_client(config: &Config) -> Result<EdgeDeviceRestClient> {
    let client = create_client(config).await?;
    Ok(EdgeDeviceRestClient::new(client, &config.api, &config.namespace))
}

async fn config_from_kubeconfig_file(path: &Path) -> Result<KConfig> {
    let kubeconfig = tokio::fs::read_to_string(path).await.map_err(|e| {
        ShifuError::KubeconfigError(format!(
            "Failed to read kubeconfig {}: {}",
            path.display(),
            e
        ))
    })?;

    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(&kubeconfig)
        .map_err(|e| ShifuError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;

    KConfig::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
        .await
        .map_err(|e| ShifuError::KubeconfigError(format!("Failed to create config: {}", e)))
}
