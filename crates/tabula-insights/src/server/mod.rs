//! HTTP interface over the pipeline.
//!
//! The server exposes upload-and-analyze plus report management on a
//! small JSON API:
//!
//! | Method   | Path                            | Purpose                      |
//! |----------|---------------------------------|------------------------------|
//! | `POST`   | `/analyze`                      | Upload a CSV, run the stages |
//! | `GET`    | `/reports`                      | List stored reports          |
//! | `GET`    | `/reports/{report_id}`          | View a report as HTML        |
//! | `GET`    | `/reports/{report_id}/download` | Download a report            |
//! | `DELETE` | `/reports/{report_id}`          | Delete a report              |
//! | `GET`    | `/agents/status`                | Describe the stage table     |
//! | `GET`    | `/health`                       | Liveness probe               |
//!
//! One [`Pipeline`] is shared across workers; uploads run on the
//! blocking thread pool.

mod routes;

use std::sync::Arc;

use actix_multipart::form::MultipartFormConfig;
use actix_web::{App, HttpServer, web};
use tracing::info;

use crate::pipeline::Pipeline;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_UPLOAD_LIMIT_BYTES: usize = 50 * 1024 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub(crate) pipeline: Arc<Pipeline>,
}

/// Network settings for [`run_server`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on an uploaded multipart payload, in bytes.
    pub upload_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            upload_limit_bytes: DEFAULT_UPLOAD_LIMIT_BYTES,
        }
    }
}

/// Bind the API and serve until shutdown.
pub async fn run_server(config: ServerConfig, pipeline: Arc<Pipeline>) -> std::io::Result<()> {
    let state = web::Data::new(AppState { pipeline });
    let upload_limit = config.upload_limit_bytes;

    info!("Serving insight API on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(MultipartFormConfig::default().total_limit(upload_limit))
            .configure(routes::configure)
    })
    .bind((config.host, config.port))?
    .run()
    .await
}
