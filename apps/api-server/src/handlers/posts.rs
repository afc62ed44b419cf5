//! Post routes - adapt HTTP requests to the envelope handlers.

use actix_web::{HttpRequest, HttpResponse, web};
use posts_shared::ApiEvent;

use crate::functions;
use crate::handlers::into_http;
use crate::middleware::error::AppError;
use crate::observability::RequestId;
use crate::state::AppState;

/// POST /posts
pub async fn create_post(
    state: web::Data<AppState>,
    req: HttpRequest,
    request_id: RequestId,
    body: web::Bytes,
) -> HttpResponse {
    match to_event(&req, &request_id, body) {
        Ok(event) => into_http(functions::create(&state.posts, event).await),
        Err(rejected) => rejected,
    }
}

/// GET /posts/{postId}
pub async fn get_post(
    state: web::Data<AppState>,
    req: HttpRequest,
    request_id: RequestId,
) -> HttpResponse {
    match to_event(&req, &request_id, web::Bytes::new()) {
        Ok(event) => into_http(functions::get(&state.posts, event).await),
        Err(rejected) => rejected,
    }
}

/// GET /posts
pub async fn list_posts(
    state: web::Data<AppState>,
    req: HttpRequest,
    request_id: RequestId,
) -> HttpResponse {
    match to_event(&req, &request_id, web::Bytes::new()) {
        Ok(event) => into_http(functions::all(&state.posts, event).await),
        Err(rejected) => rejected,
    }
}

/// PUT /posts/{postId}
pub async fn update_post(
    state: web::Data<AppState>,
    req: HttpRequest,
    request_id: RequestId,
    body: web::Bytes,
) -> HttpResponse {
    match to_event(&req, &request_id, body) {
        Ok(event) => into_http(functions::update(&state.posts, event).await),
        Err(rejected) => rejected,
    }
}

/// DELETE /posts/{postId}
pub async fn delete_post(
    state: web::Data<AppState>,
    req: HttpRequest,
    request_id: RequestId,
) -> HttpResponse {
    match to_event(&req, &request_id, web::Bytes::new()) {
        Ok(event) => into_http(functions::delete(&state.posts, event).await),
        Err(rejected) => rejected,
    }
}

/// Build the event for a request. A body that is not UTF-8 never reaches a
/// handler; it is answered with a 400 problem carrying the request id.
fn to_event(
    req: &HttpRequest,
    request_id: &RequestId,
    body: web::Bytes,
) -> Result<ApiEvent, HttpResponse> {
    let mut event = ApiEvent::new().with_request_id(request_id.as_str());

    for (name, value) in req.match_info().iter() {
        event = event.with_path_parameter(name, value);
    }

    if !body.is_empty() {
        let body = String::from_utf8(body.to_vec()).map_err(|_| {
            let err = AppError::BadRequest("request body is not valid UTF-8".to_string());
            into_http(err.to_envelope(Some(request_id.as_str())))
        })?;
        event = event.with_body(body);
    }

    Ok(event)
}
