// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource types managed through the SDK.

pub mod edgedevice;

pub use edgedevice::{EdgeDevice, EdgeDevicePhase, EdgeDeviceSpec, EdgeDeviceStatus};
