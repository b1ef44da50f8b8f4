mod error;
mod upload;


use std::sync::Arc;

use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::{dev::Server, middleware, post, web, App, HttpRequest, HttpResponse, HttpServer};

use crate::application::{DataIngestionUseCase, DataRetrievalUseCase, DATA_ENDPOINT};
use crate::domain::error::AppError;
use crate::domain::patient_data::AccessToken;

pub use error::ErrorBody;

/// Legacy short path for the data endpoint.
pub const DATA_ALIAS_ENDPOINT: &str = "/data";

pub struct HttpState {
    pub ingestion: Arc<DataIngestionUseCase>,
    pub retrieval: Arc<DataRetrievalUseCase>,
    /// Header carrying the access token on data requests
    pub token_header: String,
}

#[post("/upload")]
async fn upload_file(
    data: web::Data<HttpState>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let (file_name, bytes) = upload::read_upload_file(payload).await?;
    let receipt = data.ingestion.execute(file_name, bytes).await?;
    Ok(HttpResponse::Ok().json(receipt))
}

async fn get_data(
    req: HttpRequest,
    data: web::Data<HttpState>,
) -> Result<HttpResponse, AppError> {
    let token = req
        .headers()
        .get(data.token_header.as_str())
        .and_then(|value| value.to_str().ok())
        .and_then(AccessToken::from_header_value);

    let dataset = data.retrieval.execute(token).await?;
    Ok(HttpResponse::Ok().json(dataset))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_file)
        .route(DATA_ENDPOINT, web::get().to(get_data))
        .route(DATA_ALIAS_ENDPOINT, web::get().to(get_data));
}

pub fn start_server(state: HttpState, host: &str, port: u16) -> std::io::Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((host, port))?
    .run();

    Ok(server)
}
