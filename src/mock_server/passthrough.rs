use actix_web::{
    HttpRequest, HttpResponse,
    http::{StatusCode, header::CONTENT_TYPE},
    web,
};
use anyhow::{Context, Result};
use log::{debug, error};
use reqwest::{Client, Method, Url};

/// Forwards requests the mock does not emulate to a real upstream, e.g. the
/// web UI dev server or a physical device.
#[derive(Clone)]
pub struct Passthrough {
    client: Client,
    upstream: Option<Url>,
}

impl Passthrough {
    pub fn new(client: Client, upstream: Option<Url>) -> Self {
        Passthrough { client, upstream }
    }

    pub fn disabled() -> Self {
        Self::new(Client::new(), None)
    }

    fn upstream_url(upstream: &Url, path_and_query: &str) -> Result<Url> {
        upstream
            .join(path_and_query.trim_start_matches('/'))
            .context(format!("failed to build upstream url for {path_and_query}"))
    }

    pub async fn forward(
        req: HttpRequest,
        body: web::Bytes,
        passthrough: web::Data<Passthrough>,
    ) -> HttpResponse {
        let Some(upstream) = &passthrough.upstream else {
            debug!("no route for {} {}", req.method(), req.uri());
            return HttpResponse::NotFound().finish();
        };

        match passthrough.relay(upstream, &req, body).await {
            Ok(response) => response,
            Err(e) => {
                error!("passthrough failed: {e:#}");
                HttpResponse::BadGateway().body(e.to_string())
            }
        }
    }

    async fn relay(
        &self,
        upstream: &Url,
        req: &HttpRequest,
        body: web::Bytes,
    ) -> Result<HttpResponse> {
        let path_and_query = req
            .uri()
            .path_and_query()
            .map_or(req.path(), |path_and_query| path_and_query.as_str());
        let url = Self::upstream_url(upstream, path_and_query)?;
        let method =
            Method::from_bytes(req.method().as_str().as_bytes()).context("unsupported method")?;
        debug!("passthrough {method} {url}");

        let mut request = self.client.request(method, url).body(body.to_vec());
        if let Some(content_type) = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        {
            request = request.header(reqwest::header::CONTENT_TYPE, content_type);
        }

        let res = request.send().await.context("send request failed")?;

        let status_code =
            StatusCode::from_u16(res.status().as_u16()).context("get status code failed")?;
        let content_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = res.bytes().await.context("collect response body failed")?;

        let mut response = HttpResponse::build(status_code);
        if let Some(content_type) = content_type {
            response.content_type(content_type);
        }
        Ok(response.body(body.to_vec()))
    }
}
