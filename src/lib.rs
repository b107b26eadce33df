// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod config;
pub mod configmap;
pub mod constants;
pub mod device;
pub mod error;
pub mod global;
pub mod health;
pub mod kubernetes;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use config::{ApiSettings, ClientOptions, Config};
pub use configmap::{load_config, DeviceShifuConfig};
pub use device::DeviceShifu;
pub use error::{Result, ShifuError};
pub use health::HealthChecker;
pub use types::edgedevice::{EdgeDevice, EdgeDevicePhase};
