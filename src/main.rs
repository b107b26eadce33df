// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

use shifu_sdk::{Config, DeviceShifu, EdgeDevicePhase, ShifuError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting deviceShifu");

    // Load configuration
    let config = Config::from_env();
    info!(
        "Configuration loaded: device={}, namespace={}, config_path={}",
        config.device_name,
        config.namespace,
        config.config_path.display()
    );

    let mut shifu = DeviceShifu::new(config).await?;
    shifu.log_device_info().await;

    let device_config = shifu.get_config_map().await;
    info!(
        "Driver SKU: {}, image: {}, {} instructions, {} telemetries",
        device_config
            .driver_properties
            .driver_sku
            .as_deref()
            .unwrap_or("N/A"),
        device_config
            .driver_properties
            .driver_image
            .as_deref()
            .unwrap_or("N/A"),
        device_config.instructions.instructions.len(),
        device_config.telemetries.telemetries.len()
    );

    let address = match shifu.device_address().await {
        Ok(address) => address,
        Err(e) => {
            warn!("Could not read device address: {}", e);
            String::new()
        }
    };
    shifu.set_health_checker(move || check_device(&address));

    let token = CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.cancel();
    });

    match shifu.start(token).await {
        Err(ShifuError::Cancelled) | Ok(()) => {
            info!("deviceShifu stopped");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Initialize tracing subscriber
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kube=warn,hyper=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Running when the device accepts a TCP connection, Pending when it has no address.
/// Blocks; the health loop calls it on the blocking thread pool.
fn check_device(address: &str) -> EdgeDevicePhase {
    if address.is_empty() {
        return EdgeDevicePhase::Pending;
    }

    let Some(target) = resolve_address(address) else {
        warn!("Cannot resolve device address {}", address);
        return EdgeDevicePhase::Unknown;
    };

    match TcpStream::connect_timeout(&target, CONNECT_TIMEOUT) {
        Ok(_) => EdgeDevicePhase::Running,
        Err(e) => {
            debug!("Device at {} is unreachable: {}", target, e);
            EdgeDevicePhase::Failed
        }
    }
}

/// Accepts `host:port` or a URL such as `http://host:port/path`
fn resolve_address(address: &str) -> Option<SocketAddr> {
    if address.contains("://") {
        let url = Url::parse(address).ok()?;
        let host = url.host_str()?;
        let port = url.port_or_known_default()?;
        (host, port).to_socket_addrs().ok()?.next()
    } else {
        address.to_socket_addrs().ok()?.next()
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for CTRL+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
