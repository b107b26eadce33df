// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Process-wide convenience client for deviceShifus managing a single device.
//!
//! [`init`] connects once; the free functions here delegate to that client and
//! fail with [`ShifuError::ClientNotInitialized`] before it has succeeded.
//! A health checker registered with [`add_health_checker`] takes precedence
//! over one passed in the client's [`Config`].

use crate::config::Config;
use crate::configmap::DeviceShifuConfig;
use crate::device::DeviceShifu;
use crate::error::{Result, ShifuError};
use crate::health::HealthChecker;
use crate::types::edgedevice::{EdgeDevice, EdgeDevicePhase};
use serde::de::DeserializeOwned;
use std::sync::{PoisonError, RwLock};
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

static GLOBAL_CLIENT: OnceCell<DeviceShifu> = OnceCell::const_new();
static GLOBAL_HEALTH_CHECKER: RwLock<Option<HealthChecker>> = RwLock::new(None);

/// Connect the global client. Later calls return the existing client and
/// ignore their `config`.
pub async fn init(config: Config) -> Result<&'static DeviceShifu> {
    GLOBAL_CLIENT
        .get_or_try_init(|| DeviceShifu::new(config))
        .await
        .map_err(|e| {
            error!("failed to initialize global client: {}", e);
            e
        })
}

/// Connect the global client from environment variables and defaults
pub async fn init_from_env() -> Result<&'static DeviceShifu> {
    init(Config::from_env()).await
}

/// Connect with `checker` as the health checker and log the device info
pub async fn setup(
    config: Config,
    checker: impl Into<HealthChecker>,
) -> Result<&'static DeviceShifu> {
    add_health_checker(checker);
    let client = init(config).await?;
    client.log_device_info().await;
    info!("DeviceShifu setup completed for {}", client.device_name());
    Ok(client)
}

/// Register the health checker [`start`] polls. Can be called before or
/// after [`init`]; the last registration wins.
pub fn add_health_checker(checker: impl Into<HealthChecker>) {
    *GLOBAL_HEALTH_CHECKER
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Some(checker.into());
    info!("Health checker registered for the global client");
}

fn registered_health_checker(client: &DeviceShifu) -> Option<HealthChecker> {
    let registered = GLOBAL_HEALTH_CHECKER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    registered.or_else(|| client.health_checker().cloned())
}

/// The global client, if [`init`] has succeeded
pub fn client() -> Result<&'static DeviceShifu> {
    GLOBAL_CLIENT.get().ok_or(ShifuError::ClientNotInitialized)
}

pub async fn get_edge_device() -> Result<EdgeDevice> {
    client()?.get_edge_device().await
}

pub async fn update_phase(phase: EdgeDevicePhase) -> Result<()> {
    client()?.update_phase(phase).await
}

pub async fn start(token: CancellationToken) -> Result<()> {
    let client = client()?;
    let checker = registered_health_checker(client);
    client.run_health_loop(checker.as_ref(), token).await
}

/// ConfigMap contents via the global client; empty when it is not initialized
pub async fn get_config_map<T>() -> DeviceShifuConfig<T>
where
    T: DeserializeOwned,
{
    match GLOBAL_CLIENT.get() {
        Some(client) => client.get_config_map_typed::<T>().await,
        None => DeviceShifuConfig::default(),
    }
}
