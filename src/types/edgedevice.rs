// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "shifu.edgenesis.io",
    version = "v1alpha1",
    kind = "EdgeDevice",
    plural = "edgedevices"
)]
#[kube(namespaced)]
#[kube(status = "EdgeDeviceStatus")]
#[serde(rename_all = "camelCase")]
pub struct EdgeDeviceSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_settings: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_metadata: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_settings: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct EdgeDeviceStatus {
    #[serde(
        rename = "edgedevicephase",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub edge_device_phase: Option<EdgeDevicePhase>,
}

/// Lifecycle phase of an EdgeDevice
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, schemars::JsonSchema)]
pub enum EdgeDevicePhase {
    Running,
    Failed,
    Pending,
    Unknown,
}

impl EdgeDevicePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeDevicePhase::Running => "Running",
            EdgeDevicePhase::Failed => "Failed",
            EdgeDevicePhase::Pending => "Pending",
            EdgeDevicePhase::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EdgeDevicePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EdgeDevice {
    /// Current phase from status, if the controller has set one
    pub fn phase(&self) -> Option<EdgeDevicePhase> {
        self.status.as_ref().and_then(|s| s.edge_device_phase)
    }

    /// Set the phase, creating the status block if needed
    pub fn set_phase(&mut self, phase: EdgeDevicePhase) {
        self.status
            .get_or_insert_with(EdgeDeviceStatus::default)
            .edge_device_phase = Some(phase);
    }

    /// Device address from spec, or an empty string
    pub fn address(&self) -> &str {
        self.spec.address.as_deref().unwrap_or_default()
    }

    /// Device protocol from spec, or an empty string
    pub fn protocol(&self) -> &str {
        self.spec.protocol.as_deref().unwrap_or_default()
    }

    /// `namespace/name` for log lines
    pub fn display_name(&self) -> String {
        format!(
            "{}/{}",
            self.namespace().unwrap_or_else(|| "unknown".to_string()),
            self.name_any()
        )
    }
}
