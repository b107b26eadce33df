// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Versioned REST client bound to the EdgeDevice group/version/plural

use crate::config::ApiSettings;
use crate::error::Result;
use crate::types::edgedevice::EdgeDevice;
use kube::api::{GetParams, PostParams};
use kube::core::Request;
use kube::Client;
use tracing::{debug, instrument};

const STATUS_SUBRESOURCE: &str = "status";

/// REST client for EdgeDevices in one namespace.
///
/// The group, version and plural come from [`ApiSettings`] rather than the
/// compiled-in resource definition, so a cluster serving the CRD under a
/// different group still works.
#[derive(Clone)]
pub struct EdgeDeviceRestClient {
    client: Client,
    url_path: String,
    api_version: String,
}

impl EdgeDeviceRestClient {
    pub fn new(client: Client, api: &ApiSettings, namespace: &str) -> Self {
        let url_path = format!(
            "/apis/{}/{}/namespaces/{}/{}",
            api.group, api.version, namespace, api.plural
        );
        debug!("EdgeDevice REST client bound to {}", url_path);

        Self {
            client,
            url_path,
            api_version: api.api_version(),
        }
    }

    /// Collection path this client talks to
    pub fn url_path(&self) -> &str {
        &self.url_path
    }

    fn request(&self) -> Request {
        Request::new(self.url_path.as_str())
    }

    /// GET the named EdgeDevice
    #[instrument(skip(self))]
    pub async fn get(&self, name: &str) -> Result<EdgeDevice> {
        let request = self
            .request()
            .get(name, &GetParams::default())
            .map_err(kube::Error::BuildRequest)?;

        Ok(self.client.request::<EdgeDevice>(request).await?)
    }

    /// PUT the given object to the `status` subresource of the named EdgeDevice
    #[instrument(skip(self, device))]
    pub async fn replace_status(&self, name: &str, device: &EdgeDevice) -> Result<EdgeDevice> {
        let mut body = serde_json::to_value(device)?;
        if let Some(object) = body.as_object_mut() {
            object.insert(
                "apiVersion".to_string(),
                serde_json::Value::String(self.api_version.clone()),
            );
        }
        let data = serde_json::to_vec(&body)?;

        let request = self
            .request()
            .replace_subresource(STATUS_SUBRESOURCE, name, &PostParams::default(), data)
            .map_err(kube::Error::BuildRequest)?;

        Ok(self.client.request::<EdgeDevice>(request).await?)
    }
}
