// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{defaults, env as env_vars};
use crate::health::HealthChecker;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Coordinates of the EdgeDevice custom resource on the API server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub group: String,
    pub version: String,
    pub plural: String,
}

impl ApiSettings {
    /// `group/version`, as carried in `apiVersion`
    pub fn api_version(&self) -> String {
        format!("{}/{}", self.group, self.version)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            group: defaults::API_GROUP.to_string(),
            version: defaults::API_VERSION.to_string(),
            plural: defaults::API_PLURAL.to_string(),
        }
    }
}

/// Values passed explicitly by the caller. Anything left as `None` is
/// taken from the environment, then from the defaults.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub namespace: Option<String>,
    pub device_name: Option<String>,
    pub kubeconfig_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub health_check_interval: Option<Duration>,
    pub api_group: Option<String>,
    pub api_version: Option<String>,
    pub api_plural: Option<String>,
    pub health_checker: Option<HealthChecker>,
}

/// Resolved SDK configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub namespace: String,
    /// Name of the EdgeDevice; empty when not configured anywhere
    pub device_name: String,
    /// Explicit kubeconfig file; `None` means infer (in-cluster first)
    pub kubeconfig_path: Option<PathBuf>,
    /// Directory the ConfigMap is mounted at
    pub config_path: PathBuf,
    pub health_check_interval: Duration,
    pub api: ApiSettings,
    pub health_checker: Option<HealthChecker>,
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Self {
        Self::resolve(ClientOptions::default())
    }

    /// Merge explicit options with the process environment and defaults
    pub fn resolve(options: ClientOptions) -> Self {
        Self::resolve_with(options, |key| env::var(key).ok())
    }

    /// Merge explicit options with values from `lookup` and defaults.
    /// Empty values from `lookup` count as unset.
    pub fn resolve_with<F>(options: ClientOptions, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let or_default = |explicit: Option<String>, key: &str, default: &str| {
            explicit
                .filter(|v| !v.is_empty())
                .or_else(|| from_env(key))
                .unwrap_or_else(|| default.to_string())
        };

        let namespace = or_default(options.namespace, env_vars::NAMESPACE, defaults::NAMESPACE);
        let device_name = or_default(options.device_name, env_vars::DEVICE_NAME, "");
        let kubeconfig_path = options
            .kubeconfig_path
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| from_env(env_vars::KUBECONFIG).map(PathBuf::from));
        let config_path = options
            .config_path
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(defaults::CONFIG_PATH));
        let health_check_interval = options
            .health_check_interval
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_secs(defaults::HEALTH_CHECK_INTERVAL_SECS));

        let api = ApiSettings {
            group: or_default(options.api_group, env_vars::API_GROUP, defaults::API_GROUP),
            version: or_default(
                options.api_version,
                env_vars::API_VERSION,
                defaults::API_VERSION,
            ),
            plural: or_default(options.api_plural, env_vars::API_PLURAL, defaults::API_PLURAL),
        };

        Config {
            namespace,
            device_name,
            kubeconfig_path,
            config_path,
            health_check_interval,
            api,
            health_checker: options.health_checker,
        }
    }
}
