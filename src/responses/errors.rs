use crate::errors::ServerError;
use crate::templates::pages::error_page;
use astra::{Body, Response, ResponseBuilder};
use tracing::error;

pub type ResultResp = Result<Response, ServerError>;

/// Convert a ServerError into an HTML error page.
pub fn error_to_response(err: ServerError) -> Response {
    let (status, message) = match &err {
        ServerError::NotFound => (404, "Page introuvable".to_string()),
        ServerError::BadRequest(msg) => (400, msg.clone()),
        ServerError::Unauthorized(msg) => (401, msg.clone()),
        ServerError::DbError(_) | ServerError::InternalError => {
            error!("request failed: {err}");
            (500, "Erreur interne du serveur".to_string())
        }
        ServerError::Backend(msg) => {
            error!("backend failure: {msg}");
            (502, format!("Le service de données est indisponible: {msg}"))
        }
    };

    let html = error_page(status, &message).into_string();
    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", mime::TEXT_HTML_UTF_8.as_ref())
        .body(Body::from(html))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
