use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{HttpRequest, HttpResponse, Responder};

use super::{AppState, page};
use crate::model::{build_matrix, sorted_by_loft};
use crate::view::layout::Nav;
use crate::view::matrix::render_matrix;

pub async fn index(req: HttpRequest, state: Data<AppState>) -> HttpResponse {
    let user = match state.user(&req).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let rows = build_matrix(&state.wedges(&user).await);
    page(StatusCode::OK, "Matrix", Some(&user), Some(Nav::Matrix), render_matrix(&rows))
}

/// The signed-in user's wedges, sorted by loft.
pub async fn wedges_json(req: HttpRequest, state: Data<AppState>) -> impl Responder {
    match state.user(&req).await {
        Ok(user) => HttpResponse::Ok().json(sorted_by_loft(&state.wedges(&user).await)),
        Err(_) => HttpResponse::Unauthorized().json(serde_json::json!({"error": "not signed in"})),
    }
}
