// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The deviceShifu client: status updates, the health loop and spec accessors.

use crate::config::{ApiSettings, Config};
use crate::configmap::{load_config, DeviceShifuConfig};
use crate::constants::defaults::HEALTH_CHECK_INTERVAL_SECS;
use crate::error::{Result, ShifuError};
use crate::health::{HealthChecker, HealthReporter};
use crate::kubernetes::{create_edgedevice_client, EdgeDeviceRestClient};
use crate::types::edgedevice::{EdgeDevice, EdgeDevicePhase, EdgeDeviceSpec};
use kube::{Client, ResourceExt};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Client managing the status of a single EdgeDevice
#[derive(Clone)]
pub struct DeviceShifu {
    rest_client: Option<EdgeDeviceRestClient>,
    health_checker: Option<HealthChecker>,
    namespace: String,
    device_name: String,
    config_path: PathBuf,
    health_check_interval: Duration,
    api: ApiSettings,
}

impl DeviceShifu {
    /// Connect to the cluster described by `config`
    pub async fn new(config: Config) -> Result<Self> {
        validate_device_name(&config)?;

        let rest_client = create_edgedevice_client(&config).await?;
        let shifu = Self::with_rest_client(rest_client, config);
        info!("Edge device rest client initialized successfully");
        Ok(shifu)
    }

    /// Connect using only environment variables and defaults
    pub async fn from_env() -> Result<Self> {
        Self::new(Config::from_env()).await
    }

    /// Use an already constructed Kubernetes client
    pub fn with_client(client: Client, config: Config) -> Result<Self> {
        validate_device_name(&config)?;

        let rest_client = EdgeDeviceRestClient::new(client, &config.api, &config.namespace);
        Ok(Self::with_rest_client(rest_client, config))
    }

    fn with_rest_client(rest_client: EdgeDeviceRestClient, config: Config) -> Self {
        let mut shifu = Self::detached(config);
        shifu.rest_client = Some(rest_client);
        shifu
    }

    /// A client without cluster access. Config loading works; every
    /// API operation fails with [`ShifuError::ClientNotInitialized`].
    pub fn detached(config: Config) -> Self {
        info!(
            "DeviceShifu instance created for device: {} in namespace: {}",
            config.device_name, config.namespace
        );
        debug!(
            "Using Kubernetes API: {}, plural: {}",
            config.api.api_version(),
            config.api.plural
        );

        Self {
            rest_client: None,
            health_checker: config.health_checker,
            namespace: config.namespace,
            device_name: config.device_name,
            config_path: config.config_path,
            health_check_interval: if config.health_check_interval.is_zero() {
                Duration::from_secs(HEALTH_CHECK_INTERVAL_SECS)
            } else {
                config.health_check_interval
            },
            api: config.api,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn health_check_interval(&self) -> Duration {
        self.health_check_interval
    }

    pub fn is_initialized(&self) -> bool {
        self.rest_client.is_some()
    }

    pub fn health_checker(&self) -> Option<&HealthChecker> {
        self.health_checker.as_ref()
    }

    /// Register the callback the health loop polls
    pub fn set_health_checker(&mut self, checker: impl Into<HealthChecker>) {
        self.health_checker = Some(checker.into());
        info!(
            "Health checker registered successfully for device: {}",
            self.device_name
        );
    }

    fn rest_client(&self) -> Result<&EdgeDeviceRestClient> {
        self.rest_client
            .as_ref()
            .ok_or(ShifuError::ClientNotInitialized)
    }

    /// Fetch the EdgeDevice this client manages
    #[instrument(skip(self), fields(device = %self.device_name))]
    pub async fn get_edge_device(&self) -> Result<EdgeDevice> {
        let rest_client = self.rest_client()?;

        rest_client.get(&self.device_name).await.map_err(|e| {
            error!("Error GET EdgeDevice resource: {}", e);
            e
        })
    }

    /// Set the device phase, skipping the write when it is already current
    #[instrument(skip(self), fields(device = %self.device_name))]
    pub async fn update_phase(&self, phase: EdgeDevicePhase) -> Result<()> {
        let rest_client = self.rest_client()?;

        let mut device = self.get_edge_device().await?;
        let current = device.phase();

        if current == Some(phase) {
            debug!("EdgeDevice phase is already set to {}, no update needed", phase);
            return Ok(());
        }

        info!(
            "Updating EdgeDevice {} phase: {} -> {}",
            device.display_name(),
            current.map_or("<unset>", |p| p.as_str()),
            phase
        );

        device.set_phase(phase);
        rest_client
            .replace_status(&self.device_name, &device)
            .await
            .map_err(|e| {
                error!("Error PUT EdgeDevice resource: {}", e);
                e
            })?;

        info!("Successfully updated EdgeDevice phase to: {}", phase);
        Ok(())
    }

    /// Run the health loop until `token` is cancelled.
    ///
    /// Each tick polls the health checker on the blocking thread pool and feeds
    /// the result to [`update_phase`](Self::update_phase). Update errors are
    /// logged and the loop keeps going. Without a health checker this waits for
    /// cancellation. Always ends with [`ShifuError::Cancelled`] unless the client
    /// has no transport.
    pub async fn start(&self, token: CancellationToken) -> Result<()> {
        self.run_health_loop(self.health_checker.as_ref(), token).await
    }

    pub(crate) async fn run_health_loop(
        &self,
        checker: Option<&HealthChecker>,
        token: CancellationToken,
    ) -> Result<()> {
        self.rest_client()?;

        let Some(checker) = checker else {
            warn!(
                "No health checker configured for device {}, blocking until cancelled",
                self.device_name
            );
            token.cancelled().await;
            return Err(ShifuError::Cancelled);
        };

        info!(
            "Starting health monitoring loop for device {} ({:?} interval)",
            self.device_name, self.health_check_interval
        );

        let mut ticker = interval_at(
            Instant::now() + self.health_check_interval,
            self.health_check_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut reporter = HealthReporter::new();

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let phase = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                phase = checker.check_blocking() => phase,
            };

            match reporter.record(Instant::now()) {
                Some(count) => info!(
                    "Health Check #{} for device {}: Device status = {}",
                    count, self.device_name, phase
                ),
                None => debug!("Health check for device {}: {}", self.device_name, phase),
            }

            if let Err(e) = self.update_phase(phase).await {
                error!("failed to update edge device phase: {}", e);
            }
        }

        info!(
            "Health loop for device {} cancelled after {} checks",
            self.device_name,
            reporter.checks()
        );
        Err(ShifuError::Cancelled)
    }

    /// Spec of the managed EdgeDevice
    pub async fn device_spec(&self) -> Result<EdgeDeviceSpec> {
        Ok(self.get_edge_device().await?.spec)
    }

    /// `spec.address`, or an empty string when unset
    pub async fn device_address(&self) -> Result<String> {
        Ok(self.get_edge_device().await?.address().to_string())
    }

    /// `spec.protocol`, or an empty string when unset
    pub async fn device_protocol(&self) -> Result<String> {
        Ok(self.get_edge_device().await?.protocol().to_string())
    }

    /// Log metadata, address, protocol and current phase of the device
    pub async fn log_device_info(&self) {
        match self.get_edge_device().await {
            Ok(device) => {
                info!("EdgeDevice Name: {}", device.name_any());
                info!(
                    "EdgeDevice Namespace: {}",
                    device.namespace().unwrap_or_else(|| "unknown".to_string())
                );
                info!("Device Address: {}", device.address());
                info!("Device Protocol: {}", device.protocol());
                info!(
                    "Current Phase: {}",
                    device.phase().map_or("Unknown", |p| p.as_str())
                );
                info!(
                    "Using API: {}, plural: {}",
                    self.api.api_version(),
                    self.api.plural
                );
                if let Some(rest_client) = &self.rest_client {
                    debug!("EdgeDevice collection path: {}", rest_client.url_path());
                }
            }
            Err(e) => error!(
                "Failed to log device info for device {}: {}",
                self.device_name, e
            ),
        }
    }

    /// Load the mounted ConfigMap with untyped instruction properties
    pub async fn get_config_map(&self) -> DeviceShifuConfig {
        load_config(&self.config_path).await
    }

    /// Load the mounted ConfigMap with instruction properties of type `T`
    pub async fn get_config_map_typed<T>(&self) -> DeviceShifuConfig<T>
    where
        T: DeserializeOwned,
    {
        load_config::<T>(&self.config_path).await
    }
}

fn validate_device_name(config: &Config) -> Result<()> {
    if config.device_name.is_empty() {
        return Err(ShifuError::InvalidConfig(
            "EdgeDevice name is not set (EDGEDEVICE_NAME)".to_string(),
        ));
    }
    Ok(())
}
