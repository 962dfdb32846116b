use super::device::MockDevice;
use crate::session::SUCCESS_SENTINEL;
use actix_web::{HttpResponse, Responder, web};
use log::debug;
use serde_json::Value;

/// Handlers of the emulated device routes.
///
/// Bodies are taken as raw JSON, any well-formed document is accepted.
pub struct MockApi;

impl MockApi {
    pub async fn status(device: web::Data<MockDevice>) -> impl Responder {
        debug!("status() called");
        HttpResponse::Ok().json(device.status())
    }

    pub async fn config(device: web::Data<MockDevice>) -> impl Responder {
        debug!("config() called");
        HttpResponse::Ok().json(device.config())
    }

    pub async fn save_config(
        body: web::Json<Value>,
        device: web::Data<MockDevice>,
    ) -> impl Responder {
        debug!("save_config() called");
        device.replace_config(body.into_inner());
        Self::ok()
    }

    pub async fn set_leds(
        body: web::Json<Value>,
        device: web::Data<MockDevice>,
    ) -> impl Responder {
        debug!("set_leds() called: {body}");
        device.set_leds(&body);
        Self::ok()
    }

    fn ok() -> HttpResponse {
        HttpResponse::Ok()
            .content_type("text/html")
            .body(SUCCESS_SENTINEL)
    }
}
