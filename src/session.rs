use crate::{
    device_client::DeviceClient,
    model::{Config, LightsUpdate, Status},
    reload::{ReloadBroadcast, Subscription},
};
use log::{debug, error, info};
#[cfg(any(test, feature = "mock"))]
use mockall::automock;

/// Body a device answers to an accepted write.
pub const SUCCESS_SENTINEL: &str = "OK";

pub const CONFIG_SAVED_MESSAGE: &str = "Config updated the ESP will reboot";

/// Blocking, user-visible alerts.
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait Notifier {
    fn alert(&self, message: &str);
}

/// Result of a write to the device.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WriteOutcome {
    /// The device answered with the success sentinel.
    Accepted,
    /// The device answered, but with something other than the success sentinel.
    Rejected(String),
    /// No usable response: transport error or non-2xx status.
    Failed,
}

/// Local mirror of one device's `status` and `config`.
///
/// Fetches replace a mirror wholesale; edits made through
/// [`status_mut`](Self::status_mut) and [`config_mut`](Self::config_mut) stay
/// a local draft until written, and are lost on the next reload.
pub struct DeviceSession<C, N>
where
    C: DeviceClient,
    N: Notifier,
{
    client: C,
    notifier: N,
    status: Status,
    config: Config,
    status_revision: u64,
    config_revision: u64,
    reload_requests: Option<Subscription>,
}

impl<C, N> DeviceSession<C, N>
where
    C: DeviceClient,
    N: Notifier,
{
    /// Session holding placeholder documents and no reload subscription.
    pub fn new(client: C, notifier: N) -> Self {
        DeviceSession {
            client,
            notifier,
            status: Status::default(),
            config: Config::default(),
            status_revision: 0,
            config_revision: 0,
            reload_requests: None,
        }
    }

    /// Create a session, subscribe it to `reloads` and fetch both documents once.
    pub async fn mount(client: C, notifier: N, reloads: &ReloadBroadcast) -> Self {
        let mut session = Self::new(client, notifier);

        session.reload_requests = Some(reloads.subscribe());

        session.reload_status().await;
        session.reload_config().await;
        session
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Number of fetched status documents applied so far.
    pub fn status_revision(&self) -> u64 {
        self.status_revision
    }

    /// Number of fetched config documents applied so far.
    pub fn config_revision(&self) -> u64 {
        self.config_revision
    }

    /// Fetch the status and replace the local copy. Returns whether it was replaced.
    pub async fn reload_status(&mut self) -> bool {
        debug!("reload_status() called");

        match self.client.status().await {
            Ok(status) => {
                self.status = status;
                self.status_revision += 1;
                true
            }
            Err(e) => {
                error!("reload_status failed: {e:#}");
                false
            }
        }
    }

    /// Fetch the config and replace the local copy. Returns whether it was replaced.
    pub async fn reload_config(&mut self) -> bool {
        debug!("reload_config() called");

        match self.client.config().await {
            Ok(config) => {
                self.config = config;
                self.config_revision += 1;
                true
            }
            Err(e) => {
                error!("reload_config failed: {e:#}");
                false
            }
        }
    }

    /// Send brightness, speed, effect and color of the local status to the device.
    ///
    /// A rejection is only logged. The local status is not refreshed.
    pub async fn apply_lights(&self) -> WriteOutcome {
        let lights = LightsUpdate::from(&self.status.lights);
        debug!("apply_lights() called with {lights:?}");

        match self.client.set_leds(lights).await {
            Ok(body) if body == SUCCESS_SENTINEL => {
                info!("updated light config");
                WriteOutcome::Accepted
            }
            Ok(body) => {
                // TODO: surface rejected light settings to the user like save_config does
                info!("set_leds answered: {body}");
                WriteOutcome::Rejected(body)
            }
            Err(e) => {
                error!("apply_lights failed: {e:#}");
                WriteOutcome::Failed
            }
        }
    }

    /// Send the whole local config to the device, alert the outcome and reload the config.
    ///
    /// The reload follows any answer, so a rejected draft is replaced by the
    /// device's unchanged record. Without an answer nothing is reloaded.
    pub async fn save_config(&mut self) -> WriteOutcome {
        debug!("save_config() called");

        let outcome = match self.client.save_config(self.config.clone()).await {
            Ok(body) if body == SUCCESS_SENTINEL => {
                self.notifier.alert(CONFIG_SAVED_MESSAGE);
                WriteOutcome::Accepted
            }
            Ok(body) => {
                error!("save_config rejected: {body}");
                self.notifier
                    .alert(&format!("Error while updating the config: {body}"));
                WriteOutcome::Rejected(body)
            }
            Err(e) => {
                error!("save_config failed: {e:#}");
                return WriteOutcome::Failed;
            }
        };

        self.reload_config().await;
        outcome
    }

    /// Wait for the next reload request and serve it by reloading config and status.
    ///
    /// Returns `false` when the session is not subscribed or the broadcast is gone.
    pub async fn next_reload_request(&mut self) -> bool {
        let Some(requests) = self.reload_requests.as_mut() else {
            return false;
        };

        if !requests.recv().await {
            debug!("reload broadcast closed");
            return false;
        }

        self.reload_config().await;
        self.reload_status().await;
        true
    }
}
