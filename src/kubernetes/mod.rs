// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for kubeconfig resolution and the EdgeDevice REST client.

pub mod client;
pub mod rest;

pub use client::{create_client, create_edgedevice_client, rest_config};
pub use rest::EdgeDeviceRestClient;
