use crate::{
    http_client::{device_http_client, handle_http_response},
    model::{Config, LightsUpdate, Status},
};
use anyhow::{Context, Result};
use log::info;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use reqwest::{Client, Url};
use serde::Serialize;
use std::{fmt::Debug, time::Duration};
use trait_variant::make;

/// Transport to the four routes of the device API.
///
/// The POST methods return the raw response body; interpreting it is up to
/// the caller.
#[make(Send)]
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait DeviceClient {
    async fn status(&self) -> Result<Status>;
    async fn config(&self) -> Result<Config>;
    async fn set_leds(&self, lights: LightsUpdate) -> Result<String>;
    async fn save_config(&self, config: Config) -> Result<String>;
}

#[derive(Clone)]
pub struct HttpDeviceClient {
    client: Client,
    base_url: String,
}

impl HttpDeviceClient {
    // API endpoint constants
    const STATUS_ENDPOINT: &str = "/api/status";
    const CONFIG_ENDPOINT: &str = "/api/config";
    const SET_LEDS_ENDPOINT: &str = "/api/set_leds";

    pub fn new(base_url: &Url, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self::with_client(device_http_client(timeout)?, base_url))
    }

    pub fn with_client(client: Client, base_url: &Url) -> Self {
        HttpDeviceClient {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    fn build_url(&self, path: &str) -> String {
        // Normalize path to always start with a single "/"
        let normalized_path = path.trim_start_matches('/');
        format!("{}/{normalized_path}", self.base_url)
    }

    async fn get(&self, path: &str) -> Result<String> {
        let url = self.build_url(path);
        info!("GET {url}");

        let res = self
            .client
            .get(&url)
            .send()
            .await
            .context(format!("failed to send GET request to {url}"))?;

        handle_http_response(res, &format!("GET {url}")).await
    }

    async fn post_json(&self, path: &str, body: impl Debug + Serialize) -> Result<String> {
        let url = self.build_url(path);
        info!("POST {url} with body: {body:?}");

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context(format!("failed to send POST request to {url}"))?;

        handle_http_response(res, &format!("POST {url}")).await
    }
}

impl DeviceClient for HttpDeviceClient {
    async fn status(&self) -> Result<Status> {
        let body = self.get(Self::STATUS_ENDPOINT).await?;
        serde_json::from_str(&body).context("failed to parse status")
    }

    async fn config(&self) -> Result<Config> {
        let body = self.get(Self::CONFIG_ENDPOINT).await?;
        serde_json::from_str(&body).context("failed to parse config")
    }

    async fn set_leds(&self, lights: LightsUpdate) -> Result<String> {
        self.post_json(Self::SET_LEDS_ENDPOINT, lights).await
    }

    async fn save_config(&self, config: Config) -> Result<String> {
        self.post_json(Self::CONFIG_ENDPOINT, config).await
    }
}
