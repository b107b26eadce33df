// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for loading mounted ConfigMap files
//!
//! Each test writes fixture files into a temporary directory laid out the way
//! a ConfigMap volume is mounted into a deviceShifu pod.

use serde::Deserialize;
use shifu_sdk::configmap::{
    find_config_file, get_driver_properties, get_instructions, get_telemetries,
    load_config, load_instructions, DeviceShifuConfig, DeviceShifuInstructions,
};
use shifu_sdk::{ClientOptions, Config, DeviceShifu, ShifuError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

const INSTRUCTIONS: &str = r#"instructions:
  get_reading:
    protocolPropertyList:
      address: 40001
      function: read_holding
  get_status:
    protocolPropertyList:
      address: 40010
      function: read_coil
  reset:
"#;

const DRIVER_PROPERTIES: &str = r#"driverSku: Hikvision Camera
driverImage: edgenesis/camera-python:v0.0.1
"#;

const TELEMETRIES: &str = r#"telemetrySettings:
  telemetryUpdateIntervalInMilliseconds: 1000
telemetries:
  device_health:
    properties:
      instruction: get_status
"#;

#[derive(Debug, Deserialize, PartialEq)]
struct ModbusProperties {
    address: u32,
    function: String,
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn mounted_config_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "instructions", INSTRUCTIONS);
    write(dir.path(), "driverProperties", DRIVER_PROPERTIES);
    write(dir.path(), "telemetries", TELEMETRIES);
    dir
}

// ============================================================================
// Single-file loader
// ============================================================================

#[tokio::test]
async fn test_load_instructions_untyped() {
    let dir = mounted_config_dir();

    let instructions: DeviceShifuInstructions =
        load_instructions(&dir.path().join("instructions")).await.unwrap();

    assert_eq!(instructions.instructions.len(), 3);
    let props = instructions.instructions["get_reading"]
        .protocol_property_list
        .as_ref()
        .unwrap();
    assert_eq!(props["function"].as_str(), Some("read_holding"));
    assert!(instructions.instructions["reset"]
        .protocol_property_list
        .is_none());
}

#[tokio::test]
async fn test_load_instructions_typed() {
    let dir = mounted_config_dir();

    let instructions: DeviceShifuInstructions<ModbusProperties> =
        load_instructions(&dir.path().join("instructions")).await.unwrap();

    assert_eq!(
        instructions.instructions["get_status"].protocol_property_list,
        Some(ModbusProperties {
            address: 40010,
            function: "read_coil".to_string(),
        })
    );
}

#[tokio::test]
async fn test_load_instructions_empty_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "instructions", "");

    let instructions: DeviceShifuInstructions =
        load_instructions(&dir.path().join("instructions")).await.unwrap();

    assert_eq!(instructions.instructions.len(), 0);
}

#[tokio::test]
async fn test_load_instructions_null_document() {
    let dir = TempDir::new().unwrap();

    for content in ["~\n", "null\n"] {
        write(dir.path(), "instructions", content);

        let instructions: DeviceShifuInstructions =
            load_instructions(&dir.path().join("instructions")).await.unwrap();

        assert!(instructions.instructions.is_empty());
    }
}

#[tokio::test]
async fn test_load_instructions_malformed_yaml() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "instructions", "instructions: [unterminated\n  - :");

    let result: shifu_sdk::Result<DeviceShifuInstructions> =
        load_instructions(&dir.path().join("instructions")).await;

    assert!(matches!(result, Err(ShifuError::ConfigParse { .. })));
}

#[tokio::test]
async fn test_load_instructions_missing_file() {
    let dir = TempDir::new().unwrap();

    let result: shifu_sdk::Result<DeviceShifuInstructions> =
        load_instructions(&dir.path().join("instructions")).await;

    assert!(matches!(result, Err(ShifuError::ConfigRead { .. })));
}

// ============================================================================
// File discovery
// ============================================================================

#[tokio::test]
async fn test_find_config_file_prefers_bare_name() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "instructions", INSTRUCTIONS);
    write(dir.path(), "instructions.yaml", INSTRUCTIONS);

    assert_eq!(
        find_config_file(dir.path(), "instructions").await,
        Some(dir.path().join("instructions"))
    );
}

#[tokio::test]
async fn test_find_config_file_with_extensions() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "telemetries.yml", TELEMETRIES);

    assert_eq!(
        find_config_file(dir.path(), "telemetries").await,
        Some(dir.path().join("telemetries.yml"))
    );
    assert_eq!(find_config_file(dir.path(), "instructions").await, None);
}

#[tokio::test]
async fn test_find_config_file_skips_directories() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("driverProperties")).unwrap();
    write(dir.path(), "driverProperties.yaml", DRIVER_PROPERTIES);

    assert_eq!(
        find_config_file(dir.path(), "driverProperties").await,
        Some(dir.path().join("driverProperties.yaml"))
    );
}

// ============================================================================
// Aggregate loader
// ============================================================================

#[tokio::test]
async fn test_load_config_all_files() {
    let dir = mounted_config_dir();

    let config: DeviceShifuConfig = load_config(dir.path()).await;

    assert_eq!(
        config.driver_properties.driver_sku.as_deref(),
        Some("Hikvision Camera")
    );
    assert_eq!(
        config.driver_properties.driver_image.as_deref(),
        Some("edgenesis/camera-python:v0.0.1")
    );
    assert_eq!(config.instructions.instructions.len(), 3);
    assert_eq!(config.telemetries.telemetries.len(), 1);
    assert_eq!(config.telemetries.telemetry_settings.len(), 1);
}

#[tokio::test]
async fn test_load_config_substitutes_defaults_for_broken_files() {
    let dir = mounted_config_dir();
    write(dir.path(), "instructions", "instructions: [unterminated");
    fs::remove_file(dir.path().join("telemetries")).unwrap();

    let config: DeviceShifuConfig = load_config(dir.path()).await;

    assert!(config.instructions.instructions.is_empty());
    assert!(config.telemetries.telemetries.is_empty());
    assert_eq!(
        config.driver_properties.driver_sku.as_deref(),
        Some("Hikvision Camera")
    );
}

#[tokio::test]
async fn test_load_config_missing_directory() {
    let config: DeviceShifuConfig = load_config(Path::new("/nonexistent/edgedevice/config")).await;
    assert_eq!(config, DeviceShifuConfig::default());
}

#[tokio::test]
async fn test_section_getters() {
    let dir = mounted_config_dir();

    let instructions = get_instructions::<ModbusProperties>(dir.path()).await;
    assert_eq!(instructions.len(), 3);

    let driver = get_driver_properties(dir.path()).await;
    assert_eq!(driver.driver_sku.as_deref(), Some("Hikvision Camera"));

    let telemetries = get_telemetries(dir.path()).await;
    assert_eq!(telemetries.telemetries.len(), 1);
}

#[tokio::test]
async fn test_detached_client_reads_config_map() {
    let dir = mounted_config_dir();
    let config = Config::resolve_with(
        ClientOptions {
            device_name: Some("edgedevice-camera".to_string()),
            config_path: Some(dir.path().to_path_buf()),
            ..Default::default()
        },
        |_| None,
    );
    let shifu = DeviceShifu::detached(config);

    let typed = shifu.get_config_map_typed::<ModbusProperties>().await;
    assert_eq!(
        typed.instructions.instructions["get_reading"]
            .protocol_property_list
            .as_ref()
            .map(|p| p.address),
        Some(40001)
    );

    let untyped = shifu.get_config_map().await;
    assert_eq!(untyped.instructions.instructions.len(), 3);
}
