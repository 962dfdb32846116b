//! Console front-end for a LED Christmas tree
//!
//! Usage: treelight-console <status|config|set-leds|save-config|watch> [args]
//!
//! The device address is taken from `DEVICE_URL`.

use anyhow::{Context, Result, bail, ensure};
use log::error;
use std::{env, io::BufRead, path::Path};
use treelight_webui::{
    config::AppConfig,
    device_client::HttpDeviceClient,
    format::{camel_to_title, capitalize, sec_to_human},
    logging,
    model::{Config, Lights, Status},
    reload::ReloadBroadcast,
    session::{DeviceSession, Notifier, WriteOutcome},
};

const USAGE: &str = "Usage: treelight-console <command>

Commands:
  status                                       show the device status
  config                                       show the device config as JSON
  set-leds <brightness> <speed> <effect> [color]
                                               change the light settings
  save-config <file>                           send a JSON config and reboot the device
  watch                                        show the status, reload on every input line";

/// Alerts go straight to the terminal.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        println!("{message}");
    }
}

type Session = DeviceSession<HttpDeviceClient, ConsoleNotifier>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    logging::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };

    let config = AppConfig::load().context("failed to load configuration")?;
    let client = HttpDeviceClient::new(&config.device.url, config.device.timeout)?;
    let reloads = ReloadBroadcast::new();

    match (command.as_str(), &args[1..]) {
        ("status", []) => {
            let session = DeviceSession::mount(client, ConsoleNotifier, &reloads).await;
            print_status(session.status());
        }
        ("config", []) => {
            let session = DeviceSession::mount(client, ConsoleNotifier, &reloads).await;
            print_config(session.config())?;
        }
        ("set-leds", [brightness, speed, effect, color @ ..]) if color.len() <= 1 => {
            let mut session = DeviceSession::mount(client, ConsoleNotifier, &reloads).await;
            let color = color.first().map(String::as_str);
            edit_lights(
                &mut session.status_mut().lights,
                brightness,
                speed,
                effect,
                color,
            )?;
            apply_lights(&session).await?;
        }
        ("save-config", [file]) => {
            let draft = read_config(Path::new(file))?;

            let mut session = DeviceSession::mount(client, ConsoleNotifier, &reloads).await;
            *session.config_mut() = draft;
            ensure!(
                session.save_config().await != WriteOutcome::Failed,
                "failed to send config, see log"
            );
        }
        ("watch", []) => {
            let session = DeviceSession::mount(client, ConsoleNotifier, &reloads).await;
            watch(session, reloads).await;
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Parse the light settings given on the command line into `lights`.
fn edit_lights(
    lights: &mut Lights,
    brightness: &str,
    speed: &str,
    effect: &str,
    color: Option<&str>,
) -> Result<()> {
    lights.brightness = brightness.parse().context("invalid brightness")?;
    lights.speed = speed.parse().context("invalid speed")?;
    lights.effect = effect.parse().context("invalid effect")?;
    if let Some(color) = color {
        lights.color = Some(color.parse().context("invalid color")?);
    }
    Ok(())
}

async fn apply_lights(session: &Session) -> Result<()> {
    match session.apply_lights().await {
        WriteOutcome::Accepted => println!("Light settings applied"),
        WriteOutcome::Rejected(_) => {}
        WriteOutcome::Failed => bail!("failed to send light settings, see log"),
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<Config> {
    let document = std::fs::read_to_string(path)
        .context(format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&document).context("failed to parse config file")
}

async fn watch(mut session: Session, reloads: ReloadBroadcast) {
    print_status(session.status());

    // the broadcast closes with stdin, which ends the loop below
    tokio::task::spawn_blocking(move || {
        for line in std::io::stdin().lock().lines() {
            if line.is_err() {
                break;
            }
            reloads.request_reload();
        }
    });

    while session.next_reload_request().await {
        print_status(session.status());
    }
}

fn print_status(status: &Status) {
    let lights = &status.lights;
    let network = &status.network;

    println!("Uptime:       {}", sec_to_human(status.uptime));
    println!(
        "Effect:       {}",
        lights
            .effect_name()
            .map_or_else(|| format!("#{}", lights.effect), camel_to_title)
    );
    println!("Brightness:   {}", lights.brightness);
    println!("Speed:        {}", lights.speed);
    if let Some(color) = lights.color_name() {
        println!("Color:        {}", capitalize(color));
    }
    println!("MQTT:         {}", capitalize(status.mqtt.status.as_str()));
    println!(
        "WiFi client:  {} ({} / {}, dns {})",
        capitalize(network.wifi_client.status.as_str()),
        network.wifi_client.ip,
        network.wifi_client.netmask,
        network.wifi_client.dns
    );
    println!(
        "WiFi AP:      {} ({})",
        capitalize(network.wifi_ap.status.as_str()),
        network.wifi_ap.ip
    );
    println!("MAC:          {}", network.mac);
    if let Some(heap_free) = status.heap_free {
        println!("Free heap:    {heap_free} bytes");
    }
}

fn print_config(config: &Config) -> Result<()> {
    let document = serde_json::to_string_pretty(config).context("failed to serialize config")?;
    println!("{document}");
    Ok(())
}
