use actix_web::{App, HttpServer, dev::ServerHandle, web::Data};
use reqwest::Url;
use serde_json::{Value, json};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use treelight_webui::{
    device_client::HttpDeviceClient,
    mock_server::{self, MockDevice, Passthrough},
    model::ConnectionStatus,
    reload::ReloadBroadcast,
    session::{CONFIG_SAVED_MESSAGE, DeviceSession, Notifier, WriteOutcome},
};

#[derive(Clone, Default)]
struct RecordingNotifier {
    alerts: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

/// Start a mock device on an ephemeral port.
fn start_mock_device() -> (Url, ServerHandle) {
    start_device(MockDevice::new())
}

fn start_device(device: MockDevice) -> (Url, ServerHandle) {
    let device = Data::new(device);
    let passthrough = Data::new(Passthrough::disabled());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(device.clone())
            .app_data(passthrough.clone())
            .configure(mock_server::api_routes)
            .configure(|cfg| mock_server::fallback_routes(cfg, None))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("failed to bind mock device");

    let addr = server.addrs()[0];
    let server = server.disable_signals().run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let url = Url::parse(&format!("http://{addr}")).unwrap();
    (url, handle)
}

fn client(url: &Url) -> HttpDeviceClient {
    HttpDeviceClient::new(url, Some(Duration::from_secs(5))).unwrap()
}

#[actix_web::test]
async fn mount_fetches_status_and_config() {
    let (url, handle) = start_mock_device();
    let reloads = ReloadBroadcast::new();

    let session =
        DeviceSession::mount(client(&url), RecordingNotifier::default(), &reloads).await;

    assert_eq!(session.status_revision(), 1);
    assert_eq!(session.config_revision(), 1);
    assert_eq!(session.status().lights.effects.len(), 9);
    assert_eq!(session.status().mqtt.status, ConnectionStatus::Connected);
    assert_eq!(session.config().mqtt.port, 1883);
    assert_eq!(reloads.subscriber_count(), 1);

    drop(session);
    assert_eq!(reloads.subscriber_count(), 0);

    handle.stop(true).await;
}

#[actix_web::test]
async fn saved_config_is_reloaded_and_alerted() {
    let (url, handle) = start_mock_device();
    let reloads = ReloadBroadcast::new();
    let notifier = RecordingNotifier::default();

    let mut session = DeviceSession::mount(client(&url), notifier.clone(), &reloads).await;
    session.config_mut().wifi.client_ssid = "HomeNet".to_string();
    session.config_mut().mqtt.enabled = true;

    assert_eq!(session.save_config().await, WriteOutcome::Accepted);
    assert_eq!(notifier.alerts(), vec![CONFIG_SAVED_MESSAGE.to_string()]);
    assert_eq!(session.config_revision(), 2);
    assert_eq!(session.config().wifi.client_ssid, "HomeNet");
    assert!(session.config().mqtt.enabled);

    // a second session sees what the first one saved
    let other = DeviceSession::mount(
        client(&url),
        RecordingNotifier::default(),
        &ReloadBroadcast::new(),
    )
    .await;
    assert_eq!(other.config(), session.config());

    handle.stop(true).await;
}

#[actix_web::test]
async fn saved_config_keeps_fields_the_model_does_not_know() {
    let device = MockDevice::new();
    let mut config = device.config();
    config["mqtt"]["topic_in"] = json!("/ESP00/cmd");
    config["ota"] = json!({ "enabled": true });
    device.replace_config(config);
    let (url, handle) = start_device(device);

    let mut session = DeviceSession::mount(
        client(&url),
        RecordingNotifier::default(),
        &ReloadBroadcast::new(),
    )
    .await;
    session.config_mut().wifi.client_ssid = "HomeNet".to_string();
    assert_eq!(session.save_config().await, WriteOutcome::Accepted);

    let stored: Value = reqwest::get(url.join("/api/config").unwrap())
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored["mqtt"]["topic_in"], json!("/ESP00/cmd"));
    assert_eq!(stored["ota"], json!({ "enabled": true }));
    assert_eq!(stored["wifi"]["client_ssid"], json!("HomeNet"));

    handle.stop(true).await;
}

#[actix_web::test]
async fn applied_lights_show_up_after_reload() {
    let (url, handle) = start_mock_device();
    let reloads = ReloadBroadcast::new();
    let notifier = RecordingNotifier::default();

    let mut session = DeviceSession::mount(client(&url), notifier.clone(), &reloads).await;
    session.status_mut().lights.brightness = 3;
    session.status_mut().lights.effect = 8;

    assert_eq!(session.apply_lights().await, WriteOutcome::Accepted);
    assert!(notifier.alerts().is_empty());

    // the draft is overwritten by what the device reports
    session.status_mut().lights.brightness = 200;
    assert!(session.reload_status().await);
    assert_eq!(session.status().lights.brightness, 3);
    assert_eq!(session.status().lights.effect, 8);
    assert_eq!(session.status().lights.effect_name(), Some("twinkleFox"));

    handle.stop(true).await;
}

#[actix_web::test]
async fn reload_request_refreshes_every_session() {
    let (url, handle) = start_mock_device();
    let reloads = ReloadBroadcast::new();

    let mut first =
        DeviceSession::mount(client(&url), RecordingNotifier::default(), &reloads).await;
    let mut second =
        DeviceSession::mount(client(&url), RecordingNotifier::default(), &reloads).await;

    assert_eq!(reloads.request_reload(), 2);

    assert!(first.next_reload_request().await);
    assert!(second.next_reload_request().await);
    assert_eq!(first.status_revision(), 2);
    assert_eq!(first.config_revision(), 2);
    assert_eq!(second.status_revision(), 2);
    assert_eq!(second.config_revision(), 2);

    drop(reloads);
    assert!(!first.next_reload_request().await);

    handle.stop(true).await;
}

#[actix_web::test]
async fn unreachable_device_keeps_placeholders() {
    // nothing listens on the discard port
    let url = Url::parse("http://127.0.0.1:9").unwrap();
    let reloads = ReloadBroadcast::new();
    let notifier = RecordingNotifier::default();

    let mut session = DeviceSession::mount(client(&url), notifier.clone(), &reloads).await;

    assert_eq!(session.status_revision(), 0);
    assert_eq!(session.config_revision(), 0);
    assert_eq!(session.status().lights.effects, vec!["off"]);

    assert_eq!(session.save_config().await, WriteOutcome::Failed);
    assert_eq!(session.apply_lights().await, WriteOutcome::Failed);
    assert!(notifier.alerts().is_empty());
    assert_eq!(session.config_revision(), 0);
}
