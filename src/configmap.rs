// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Loading of the ConfigMap files mounted into the deviceShifu pod.
//!
//! Each ConfigMap key (`driverProperties`, `instructions`, `telemetries`) is
//! a separate YAML document. Single-file loaders return errors; [`load_config`]
//! substitutes empty defaults so a missing or broken file never aborts startup.

use crate::constants::files;
use crate::error::{Result, ShifuError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// A single instruction. `protocolPropertyList` is passed through as `T`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceShifuInstruction<T = serde_yaml::Value> {
    pub protocol_property_list: Option<T>,
}

impl<T> Default for DeviceShifuInstruction<T> {
    fn default() -> Self {
        Self {
            protocol_property_list: None,
        }
    }
}

/// Contents of the `instructions` file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct DeviceShifuInstructions<T = serde_yaml::Value> {
    #[serde(default, deserialize_with = "instructions_map")]
    pub instructions: HashMap<String, DeviceShifuInstruction<T>>,
}

impl<T> Default for DeviceShifuInstructions<T> {
    fn default() -> Self {
        Self {
            instructions: HashMap::new(),
        }
    }
}

/// Contents of the `driverProperties` file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceShifuDriverProperties {
    #[serde(default)]
    pub driver_sku: Option<String>,
    #[serde(default)]
    pub driver_image: Option<String>,
}

/// Contents of the `telemetries` file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceShifuTelemetries {
    #[serde(default, deserialize_with = "null_as_default")]
    pub telemetry_settings: serde_yaml::Mapping,
    #[serde(default, deserialize_with = "null_as_default")]
    pub telemetries: serde_yaml::Mapping,
}

/// Everything mounted from the deviceShifu ConfigMap
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceShifuConfig<T = serde_yaml::Value> {
    pub driver_properties: DeviceShifuDriverProperties,
    pub instructions: DeviceShifuInstructions<T>,
    pub telemetries: DeviceShifuTelemetries,
}

impl<T> Default for DeviceShifuConfig<T> {
    fn default() -> Self {
        Self {
            driver_properties: DeviceShifuDriverProperties::default(),
            instructions: DeviceShifuInstructions::default(),
            telemetries: DeviceShifuTelemetries::default(),
        }
    }
}

fn null_as_default<'de, D, V>(deserializer: D) -> std::result::Result<V, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de> + Default,
{
    Ok(Option::<V>::deserialize(deserializer)?.unwrap_or_default())
}

// Instructions without properties are written as bare keys (`read_value:`).
fn instructions_map<'de, D, T>(
    deserializer: D,
) -> std::result::Result<HashMap<String, DeviceShifuInstruction<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw: Option<HashMap<String, Option<DeviceShifuInstruction<T>>>> =
        Option::deserialize(deserializer)?;

    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, instruction)| (name, instruction.unwrap_or_default()))
        .collect())
}

/// First existing file among `basename`, `basename.yaml` and `basename.yml` in `dir`
pub async fn find_config_file(dir: &Path, basename: &str) -> Option<PathBuf> {
    for name in [
        basename.to_string(),
        format!("{}.yaml", basename),
        format!("{}.yml", basename),
    ] {
        let candidate = dir.join(name);
        if let Ok(metadata) = tokio::fs::metadata(&candidate).await {
            if metadata.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Read a YAML file. A file with no content or a null root yields `D::default()`.
pub async fn load_yaml_file<D>(path: &Path) -> Result<D>
where
    D: DeserializeOwned + Default,
{
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ShifuError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

    if is_blank_document(&content) {
        return Ok(D::default());
    }

    let parse_error = |source| ShifuError::ConfigParse {
        path: path.to_path_buf(),
        source,
    };
    match serde_yaml::from_str::<serde_yaml::Value>(&content).map_err(parse_error)? {
        serde_yaml::Value::Null => Ok(D::default()),
        value => serde_yaml::from_value(value).map_err(parse_error),
    }
}

fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

/// Load the `instructions` file at `path`
#[instrument]
pub async fn load_instructions<T>(path: &Path) -> Result<DeviceShifuInstructions<T>>
where
    T: DeserializeOwned,
{
    let instructions: DeviceShifuInstructions<T> = load_yaml_file(path).await?;
    info!(
        "Loaded {} instructions from configmap file",
        instructions.instructions.len()
    );
    Ok(instructions)
}

/// Load the `driverProperties` file at `path`
pub async fn load_driver_properties(path: &Path) -> Result<DeviceShifuDriverProperties> {
    load_yaml_file(path).await
}

/// Load the `telemetries` file at `path`
pub async fn load_telemetries(path: &Path) -> Result<DeviceShifuTelemetries> {
    load_yaml_file(path).await
}

/// Load all ConfigMap files from `config_dir`. Each file is loaded on its
/// own; a missing or unreadable one is replaced by its empty default.
pub async fn load_config<T>(config_dir: &Path) -> DeviceShifuConfig<T>
where
    T: DeserializeOwned,
{
    let driver_properties = match find_config_file(config_dir, files::DRIVER_PROPERTIES).await {
        Some(path) => load_driver_properties(&path)
            .await
            .unwrap_or_else(|e| fallback("driver properties", e)),
        None => missing(config_dir, files::DRIVER_PROPERTIES),
    };

    let instructions = match find_config_file(config_dir, files::INSTRUCTIONS).await {
        Some(path) => load_instructions::<T>(&path)
            .await
            .unwrap_or_else(|e| fallback("instructions", e)),
        None => missing(config_dir, files::INSTRUCTIONS),
    };

    let telemetries = match find_config_file(config_dir, files::TELEMETRIES).await {
        Some(path) => load_telemetries(&path)
            .await
            .unwrap_or_else(|e| fallback("telemetries", e)),
        None => missing(config_dir, files::TELEMETRIES),
    };

    DeviceShifuConfig {
        driver_properties,
        instructions,
        telemetries,
    }
}

/// Instructions from `config_dir`, empty on any error
pub async fn get_instructions<T>(config_dir: &Path) -> HashMap<String, DeviceShifuInstruction<T>>
where
    T: DeserializeOwned,
{
    load_config::<T>(config_dir).await.instructions.instructions
}

/// Driver properties from `config_dir`, empty on any error
pub async fn get_driver_properties(config_dir: &Path) -> DeviceShifuDriverProperties {
    load_config::<serde_yaml::Value>(config_dir)
        .await
        .driver_properties
}

/// Telemetries from `config_dir`, empty on any error
pub async fn get_telemetries(config_dir: &Path) -> DeviceShifuTelemetries {
    load_config::<serde_yaml::Value>(config_dir).await.telemetries
}

fn fallback<D: Default>(what: &str, error: ShifuError) -> D {
    warn!("Failed to load {} from configmap file: {}", what, error);
    D::default()
}

fn missing<D: Default>(config_dir: &Path, basename: &str) -> D {
    debug!("No {} file found in {}", basename, config_dir.display());
    D::default()
}
