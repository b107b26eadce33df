// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Environment variables read during config resolution
pub mod env {
    pub const DEVICE_NAME: &str = "EDGEDEVICE_NAME";
    pub const NAMESPACE: &str = "EDGEDEVICE_NAMESPACE";
    pub const KUBECONFIG: &str = "KUBECONFIG";
    pub const API_GROUP: &str = "SHIFU_API_GROUP";
    pub const API_VERSION: &str = "SHIFU_API_VERSION";
    pub const API_PLURAL: &str = "SHIFU_API_PLURAL";
}

/// Defaults applied when neither an explicit value nor an environment variable is set
pub mod defaults {
    pub const NAMESPACE: &str = "devices";
    pub const CONFIG_PATH: &str = "/etc/edgedevice/config";
    /// Health check interval in seconds
    pub const HEALTH_CHECK_INTERVAL_SECS: u64 = 30;
    pub const API_GROUP: &str = "shifu.edgenesis.io";
    pub const API_VERSION: &str = "v1alpha1";
    pub const API_PLURAL: &str = "edgedevices";
}

/// File names of the ConfigMap keys mounted into the config directory
pub mod files {
    pub const DRIVER_PROPERTIES: &str = "driverProperties";
    pub const INSTRUCTIONS: &str = "instructions";
    pub const TELEMETRIES: &str = "telemetries";
}

/// Health loop progress reporting
pub mod health {
    /// Log at info level every this many checks
    pub const REPORT_EVERY_CHECKS: u64 = 20;
    /// ... or when this many seconds passed since the last report
    pub const REPORT_MAX_SILENCE_SECS: u64 = 60;
}
