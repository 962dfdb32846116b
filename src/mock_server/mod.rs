//! Development server emulating the device's HTTP API.

mod api;
mod device;
mod passthrough;

pub use api::MockApi;
pub use device::MockDevice;
pub use passthrough::Passthrough;

use actix_files::Files;
use actix_web::web;
use std::path::Path;

/// Register the emulated device routes.
///
/// Expects `web::Data<MockDevice>` in the application data.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/status", web::get().to(MockApi::status))
        .route("/api/config", web::get().to(MockApi::config))
        .route("/api/config", web::post().to(MockApi::save_config))
        .route("/api/set_leds", web::post().to(MockApi::set_leds));
}

/// Serve everything else from `static_dir` when given, and hand what is still
/// unmatched to the [`Passthrough`] in the application data.
pub fn fallback_routes(cfg: &mut web::ServiceConfig, static_dir: Option<&Path>) {
    match static_dir {
        Some(dir) => {
            cfg.service(
                Files::new("/", dir)
                    .index_file("index.html")
                    .default_handler(web::to(Passthrough::forward)),
            );
        }
        None => {
            cfg.default_service(web::to(Passthrough::forward));
        }
    }
}
