use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// State of a connection the device can be asked to keep up (MQTT, WiFi client).
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disabled,
    Connected,
    // the firmware reports an enabled but not yet connected client as "enabled"
    #[serde(alias = "enabled")]
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disabled => "disabled",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessPointStatus {
    #[default]
    Disabled,
    Enabled,
}

impl AccessPointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessPointStatus::Disabled => "disabled",
            AccessPointStatus::Enabled => "enabled",
        }
    }
}

/// Runtime snapshot reported by `GET /api/status`.
///
/// Every object keeps its unknown keys in `extra`, so a document survives a
/// deserialize/serialize cycle unchanged.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Status {
    /// Seconds since the device booted.
    pub uptime: f64,
    pub lights: Lights,
    pub mqtt: MqttStatus,
    pub network: NetworkStatus,
    /// Free heap in bytes, only reported by the real firmware.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heap_free: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Lights {
    pub brightness: u8,
    pub speed: u8,
    /// Index into `effects`.
    pub effect: u8,
    pub effects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Lights {
    /// Name of the selected effect, if the index is in range.
    pub fn effect_name(&self) -> Option<&str> {
        self.effects.get(usize::from(self.effect)).map(String::as_str)
    }

    /// Name of the selected color, if the device reports a color palette.
    pub fn color_name(&self) -> Option<&str> {
        let color = usize::from(self.color?);
        self.colors.as_ref()?.get(color).map(String::as_str)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MqttStatus {
    pub status: ConnectionStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct NetworkStatus {
    pub wifi_client: WifiClientStatus,
    pub wifi_ap: WifiApStatus,
    pub mac: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct WifiClientStatus {
    pub status: ConnectionStatus,
    pub ip: String,
    pub netmask: String,
    pub dns: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct WifiApStatus {
    pub status: AccessPointStatus,
    pub ip: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Persisted device settings exchanged through `GET`/`POST /api/config`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub wifi: WifiConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MqttConfig {
    pub enabled: bool,
    pub server: String,
    pub port: u16,
    pub id: String,
    pub user: String,
    pub password: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// addresses stay strings, the device does not validate them
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WifiConfig {
    pub client_enabled: bool,
    pub client_dhcp_enabled: bool,
    pub client_ssid: String,
    pub client_password: String,
    pub client_ip: String,
    pub client_mask: String,
    pub client_gateway: String,
    pub client_dns: String,
    pub ap_enabled: bool,
    pub ap_ssid: String,
    pub ap_password: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /api/set_leds`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LightsUpdate {
    pub brightness: u8,
    pub speed: u8,
    pub effect: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

impl From<&Lights> for LightsUpdate {
    fn from(lights: &Lights) -> Self {
        LightsUpdate {
            brightness: lights.brightness,
            speed: lights.speed,
            effect: lights.effect,
            color: lights.color,
        }
    }
}

const PLACEHOLDER_IP: &str = "111.222.333.444";
const PLACEHOLDER_GATEWAY: &str = "111.222.333.555";
const PLACEHOLDER_MASK: &str = "255.255.255.0";

// Placeholder shown before the first successful fetch.
impl Default for Status {
    fn default() -> Self {
        Status {
            uptime: 0.0,
            lights: Lights {
                brightness: 0,
                speed: 0,
                effect: 0,
                effects: vec!["off".to_string()],
                color: Some(0),
                colors: Some(vec!["none".to_string()]),
                extra: Map::new(),
            },
            mqtt: MqttStatus::default(),
            network: NetworkStatus {
                wifi_client: WifiClientStatus {
                    status: ConnectionStatus::Disabled,
                    ip: PLACEHOLDER_IP.to_string(),
                    netmask: PLACEHOLDER_MASK.to_string(),
                    dns: "1.3.4.5".to_string(),
                    extra: Map::new(),
                },
                wifi_ap: WifiApStatus {
                    status: AccessPointStatus::Disabled,
                    ip: PLACEHOLDER_IP.to_string(),
                    extra: Map::new(),
                },
                mac: "00:DE:AD:BE:EF:00".to_string(),
                extra: Map::new(),
            },
            heap_free: None,
            extra: Map::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mqtt: MqttConfig {
                enabled: false,
                server: PLACEHOLDER_IP.to_string(),
                port: 1883,
                id: "ESP8266-LedChristmasTree".to_string(),
                user: "xxx".to_string(),
                password: "xxx".to_string(),
                extra: Map::new(),
            },
            wifi: WifiConfig {
                client_enabled: false,
                client_dhcp_enabled: true,
                client_ssid: "YourWifi-AP".to_string(),
                client_password: "inputyourown".to_string(),
                client_ip: PLACEHOLDER_IP.to_string(),
                client_mask: PLACEHOLDER_MASK.to_string(),
                client_gateway: PLACEHOLDER_GATEWAY.to_string(),
                client_dns: PLACEHOLDER_GATEWAY.to_string(),
                ap_enabled: true,
                ap_ssid: "LedChristmasTree".to_string(),
                ap_password: String::new(),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }
}
