use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    dev::ServerHandle,
    web::{self, Data},
};
use anyhow::{Context, Result};
use log::{debug, error, info};
use tokio::signal::unix::{SignalKind, signal};
use treelight_webui::{
    config::{AppConfig, MockServerConfig},
    http_client::device_http_client,
    logging,
    mock_server::{self, MockDevice, Passthrough},
};

#[actix_web::main]
async fn main() {
    if let Err(e) = run().await {
        error!("application error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    logging::init();

    info!(
        "module version: {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_SHORT_REV")
    );

    let config = AppConfig::load().context("failed to load configuration")?;

    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;

    let (server_handle, server_task) = run_server(&config.mock_server)?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            debug!("ctrl-c received");
        },
        _ = sigterm.recv() => {
            debug!("SIGTERM received");
        },
        result = server_task => {
            match result {
                Ok(Ok(())) => debug!("server stopped normally"),
                Ok(Err(e)) => error!("server stopped with error: {e}"),
                Err(e) => error!("server task panicked: {e}"),
            }
        },
    }

    info!("shutting down");
    server_handle.stop(true).await;

    Ok(())
}

fn run_server(
    config: &MockServerConfig,
) -> Result<(
    ServerHandle,
    tokio::task::JoinHandle<Result<(), std::io::Error>>,
)> {
    // records live as long as the process and are shared by all workers
    let device = Data::new(MockDevice::new());
    let passthrough = Data::new(Passthrough::new(
        device_http_client(None)?,
        config.passthrough_url.clone(),
    ));
    let static_dir = config
        .static_dir
        .as_ref()
        .map(|dir| {
            std::fs::canonicalize(dir).context(format!("static folder not found: {dir:?}"))
        })
        .transpose()?;

    if let Some(url) = &config.passthrough_url {
        info!("passing unmatched requests through to {url}");
    }
    if let Some(dir) = &static_dir {
        info!("serving static files from {dir:?}");
    }

    let server = HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_header()
                    .allowed_methods(vec!["GET", "POST"])
                    .max_age(3600),
            )
            .app_data(device.clone())
            .app_data(passthrough.clone())
            .configure(mock_server::api_routes)
            .configure(|cfg: &mut web::ServiceConfig| {
                mock_server::fallback_routes(cfg, static_dir.as_deref())
            })
    })
    .bind((config.bind_address, config.port))
    .context("failed to bind server")?
    .disable_signals()
    .run();

    info!(
        "mock device listening on {}:{}",
        config.bind_address, config.port
    );

    Ok((server.handle(), tokio::spawn(server)))
}
