//! HTTP handlers and route configuration.

mod health;
mod posts;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use posts_shared::Envelope;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/posts")
                .route("", web::post().to(posts::create_post))
                .route("", web::get().to(posts::list_posts))
                .route("/{postId}", web::get().to(posts::get_post))
                .route("/{postId}", web::put().to(posts::update_post))
                .route("/{postId}", web::delete().to(posts::delete_post)),
        );
}

/// Turn an envelope into an HTTP response, headers and body unchanged.
pub fn into_http(envelope: Envelope) -> HttpResponse {
    let status =
        StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut builder = HttpResponse::build(status);
    for (name, value) in &envelope.headers {
        builder.insert_header((name.as_str(), value.as_str()));
    }

    match envelope.body {
        Some(body) => builder.body(body),
        None => builder.finish(),
    }
}
