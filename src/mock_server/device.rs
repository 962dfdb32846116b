use log::debug;
use serde_json::{Value, json};
use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Instant,
};

/// Fields of `status.lights` a `set_leds` request writes.
const SETTABLE_LIGHTS: [&str; 3] = ["brightness", "speed", "effect"];

struct Records {
    status_data: Value,
    config_data: Value,
}

/// In-memory stand-in for a device: its status and config records plus the
/// instant it started.
///
/// Records are kept as raw JSON and never validated, so whatever was posted
/// is served back unchanged. Writes are applied in the order they acquire the
/// lock; the last one wins.
pub struct MockDevice {
    started: Instant,
    records: Mutex<Records>,
}

impl MockDevice {
    /// Device seeded with the development fixture.
    pub fn new() -> Self {
        Self::with_records(fixture_status(), fixture_config())
    }

    pub fn with_records(status_data: Value, config_data: Value) -> Self {
        MockDevice {
            started: Instant::now(),
            records: Mutex::new(Records {
                status_data,
                config_data,
            }),
        }
    }

    fn records(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Refresh `uptime` to the seconds elapsed since start and return the status.
    pub fn status(&self) -> Value {
        let mut records = self.records();
        if let Some(status) = records.status_data.as_object_mut() {
            status.insert(
                "uptime".to_string(),
                json!(self.started.elapsed().as_secs_f64()),
            );
        }
        records.status_data.clone()
    }

    pub fn config(&self) -> Value {
        self.records().config_data.clone()
    }

    /// Replace the whole config record.
    pub fn replace_config(&self, config: Value) {
        self.records().config_data = config;
    }

    /// Copy brightness, speed and effect from `update` where present. `color`
    /// is accepted but not stored.
    pub fn set_leds(&self, update: &Value) {
        let mut records = self.records();
        let Some(lights) = records
            .status_data
            .get_mut("lights")
            .and_then(Value::as_object_mut)
        else {
            debug!("set_leds: status has no lights");
            return;
        };

        for field in SETTABLE_LIGHTS {
            if let Some(value) = update.get(field) {
                lights.insert(field.to_string(), value.clone());
            }
        }

        if let Some(color) = update.get("color") {
            debug!("set_leds: ignoring color {color}");
        }
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

fn fixture_status() -> Value {
    json!({
        "uptime": 1200,
        "lights": {
            "brightness": 8,
            "speed": 2,
            "effect": 1,
            "effects": [
                "off",
                "solid",
                "twoColorChange",
                "gradientHorizontal",
                "gradientVertical",
                "rainbowHorizontal",
                "rainbowVertical",
                "runningLight",
                "twinkleFox"
            ]
        },
        "mqtt": { "status": "connected" },
        "network": {
            "wifi_client": {
                "status": "disabled",
                "ip": "111.222.333.444",
                "netmask": "255.255.255.0",
                "dns": "1.3.4.5"
            },
            "wifi_ap": { "status": "enabled", "ip": "111.222.333.444" },
            "mac": "00:DE:AD:BE:EF:00"
        }
    })
}

fn fixture_config() -> Value {
    json!({
        "mqtt": {
            "enabled": false,
            "server": "192.168.1.74",
            "port": 1883,
            "id": "ESP8266-LedChristmasTree",
            "user": "xxx",
            "password": "xxx"
        },
        "wifi": {
            "client_enabled": false,
            "client_dhcp_enabled": true,
            "client_ssid": "YourWifi-AP",
            "client_password": "inputyourown",
            "client_ip": "192.168.0.200",
            "client_mask": "255.255.255.0",
            "client_gateway": "192.168.0.1",
            "client_dns": "192.168.0.1",
            "ap_enabled": true,
            "ap_ssid": "LedChristmasTree",
            "ap_password": ""
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccessPointStatus, Config, ConnectionStatus, Status};
    use std::{thread::sleep, time::Duration};

    #[test]
    fn fixture_parses_as_device_documents() {
        let device = MockDevice::new();
        let status: Status = serde_json::from_value(device.status()).unwrap();
        let config: Config = serde_json::from_value(device.config()).unwrap();

        assert_eq!(status.lights.effect_name(), Some("solid"));
        assert_eq!(status.lights.effects.len(), 9);
        assert_eq!(status.mqtt.status, ConnectionStatus::Connected);
        assert_eq!(status.network.wifi_ap.status, AccessPointStatus::Enabled);
        assert_eq!(config.mqtt.id, "ESP8266-LedChristmasTree");
    }

    #[test]
    fn uptime_tracks_elapsed_time() {
        let device = MockDevice::new();

        let first = device.status()["uptime"].as_f64().unwrap();
        sleep(Duration::from_millis(20));
        let second = device.status()["uptime"].as_f64().unwrap();

        // the fixture value is replaced on the first read
        assert!(first < 1.0);
        assert!(second >= first + 0.015);
        assert!(second < 5.0);
    }

    #[test]
    fn set_leds_keeps_color() {
        let mut status = fixture_status();
        status["lights"]["color"] = json!(3);
        let device = MockDevice::with_records(status, fixture_config());

        device.set_leds(&json!({ "brightness": 5, "speed": 2, "effect": 1, "color": 9 }));

        let lights = &device.status()["lights"];
        assert_eq!(lights["brightness"], json!(5));
        assert_eq!(lights["speed"], json!(2));
        assert_eq!(lights["effect"], json!(1));
        assert_eq!(lights["color"], json!(3));
        assert_eq!(lights["effects"].as_array().map(Vec::len), Some(9));
    }

    #[test]
    fn set_leds_applies_only_present_fields() {
        let device = MockDevice::new();

        device.set_leds(&json!({ "speed": 7 }));

        let lights = &device.status()["lights"];
        assert_eq!(lights["brightness"], json!(8));
        assert_eq!(lights["speed"], json!(7));
        assert_eq!(lights["effect"], json!(1));
    }

    #[test]
    fn set_leds_without_lights_record_is_ignored() {
        let device = MockDevice::with_records(json!({ "uptime": 0 }), fixture_config());

        device.set_leds(&json!({ "brightness": 5 }));

        assert!(device.status().get("lights").is_none());
    }

    #[test]
    fn replace_config_is_wholesale_and_unvalidated() {
        let device = MockDevice::new();
        let config = json!({ "wifi": { "client_ssid": "x" } });

        device.replace_config(config.clone());

        assert_eq!(device.config(), config);
    }
}
