use crate::config::ServerConfig;
use crate::core::service::ConversionService;
use crate::domain::ports::ConfigProvider;
use crate::domain::model::{ConversionRequest, UploadedFile};
use crate::utils::error::{ConvertError, Result};
use actix_cors::Cors;
use actix_web::{
    dev::Server, get, http::header, post, web, App, HttpRequest, HttpResponse, HttpServer,
    Responder,
};
use serde::Serialize;
use std::net::SocketAddr;

/// Multipart field carrying the trade log.
pub const FILE_FIELD: &str = "file";

pub struct HttpState {
    pub service: ConversionService,
}

impl HttpState {
    pub fn new(service: ConversionService) -> Self {
        Self { service }
    }
}

#[derive(Serialize)]
struct ConvertSuccess<'a> {
    success: bool,
    data: &'a str,
    filename: &'a str,
}

#[derive(Serialize)]
struct ValidationFailure {
    error: String,
}

#[derive(Serialize)]
struct ConvertFailure {
    success: bool,
    error: String,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[post("/convert")]
async fn convert(data: web::Data<HttpState>, req: HttpRequest, body: web::Bytes) -> HttpResponse {
    let request = match parse_upload(&req, body).await {
        Ok(request) => request,
        Err(e) => {
            tracing::info!("🚫 Unreadable upload: {}", e);
            return error_response(&e);
        }
    };

    match data.service.convert(request).await {
        Ok(converted) => HttpResponse::Ok().json(ConvertSuccess {
            success: true,
            data: &converted.csv_content,
            filename: &converted.filename,
        }),
        Err(e) => error_response(&e),
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(Health { status: "healthy" })
}

/// 400 `{error}` for caller mistakes, 500 `{success: false, error}` for the
/// rest. Only the short user message leaves the process.
pub fn error_response(err: &ConvertError) -> HttpResponse {
    let message = err.user_friendly_message();
    if err.is_client_error() {
        HttpResponse::BadRequest().json(ValidationFailure { error: message })
    } else {
        HttpResponse::InternalServerError().json(ConvertFailure {
            success: false,
            error: message,
        })
    }
}

/// Pulls the `file` part out of a buffered multipart body.
///
/// A request that is not multipart at all, or has no `file` part, yields a
/// request without a file and is rejected by the upload validator. A body that
/// claims to be multipart but cannot be parsed is a validation error here.
pub async fn parse_upload(req: &HttpRequest, body: web::Bytes) -> Result<ConversionRequest> {
    let boundary = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|content_type| multer::parse_boundary(content_type).ok());
    let Some(boundary) = boundary else {
        return Ok(ConversionRequest::empty());
    };

    let stream = futures::stream::once(async move { Ok::<web::Bytes, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);
    let malformed = |e: multer::Error| {
        tracing::debug!("Multipart parse failure: {}", e);
        ConvertError::validation("Malformed multipart form data")
    };

    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some(FILE_FIELD) || file.is_some() {
            continue;
        }
        let filename = field.file_name().map(str::to_string).unwrap_or_default();
        let content = field.bytes().await.map_err(malformed)?;
        file = Some(UploadedFile {
            filename,
            content: content.to_vec(),
        });
    }

    Ok(ConversionRequest { file })
}

pub fn build_cors(allowed_origins: &[String]) -> Cors {
    if allowed_origins.iter().any(|origin| origin == "*") {
        return Cors::permissive();
    }

    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").service(convert).service(health));
}

/// Binds the listener and returns the server future with the bound address.
/// Port 0 picks a free port.
pub fn start_server(
    config: &ServerConfig,
    service: ConversionService,
) -> std::io::Result<(Server, SocketAddr)> {
    let state = web::Data::new(HttpState::new(service));
    let allowed_origins = config.allowed_origins().to_vec();
    let max_upload_bytes = config.max_upload_bytes();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&allowed_origins))
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .configure(configure)
    })
    .bind(config.bind_address())?;

    let addr = server.addrs().first().copied().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "no address bound")
    })?;

    Ok((server.run(), addr))
}
