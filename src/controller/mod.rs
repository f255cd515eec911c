pub mod auth;
pub mod bag;
pub mod combine;
pub mod matrix;
pub mod profile;
pub mod state;

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, web};
use maud::Markup;

use crate::combine::CombineError;
use crate::error::AppError;
use crate::identity::AuthError;
use crate::model::User;
use crate::storage::StorageError;
use crate::view::layout::{Nav, render_page};

pub use state::AppState;

/// Register every page route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(matrix::index))
        .route("/wedges.json", web::get().to(matrix::wedges_json))
        .route("/health", web::get().to(HttpResponse::Ok))
        .route("/bag", web::get().to(bag::show))
        .route("/bag", web::post().to(bag::add))
        .route("/bag/{id}/delete", web::post().to(bag::delete))
        .route("/bag/{id}/distances", web::post().to(bag::distances))
        .route("/combine", web::get().to(combine::show))
        .route("/combine/target", web::post().to(combine::target))
        .route("/combine/shot", web::post().to(combine::add_shot))
        .route("/combine/shot/{index}/remove", web::post().to(combine::remove_shot))
        .route("/combine/next", web::post().to(combine::next))
        .route("/combine/skip", web::post().to(combine::skip))
        .route("/combine/back", web::post().to(combine::back))
        .route("/combine/save", web::post().to(combine::save))
        .route("/combine/abort", web::post().to(combine::abort))
        .route("/combine/{wedge_id}", web::get().to(combine::start))
        .route("/login", web::get().to(auth::login_form))
        .route("/login", web::post().to(auth::login))
        .route("/signup", web::get().to(auth::signup_form))
        .route("/signup", web::post().to(auth::signup))
        .route("/logout", web::post().to(auth::logout))
        .route("/profile", web::get().to(profile::show))
        .route("/profile", web::post().to(profile::update));
}

pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Redirect that also sets (or clears) the session cookie.
pub(crate) fn see_other_with(location: &str, cookie: Cookie<'static>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .cookie(cookie)
        .finish()
}

pub(crate) fn page(
    status: StatusCode,
    title: &str,
    user: Option<&User>,
    nav: Option<Nav>,
    body: Markup,
) -> HttpResponse {
    let markup = render_page(title, user, nav, None, body);
    HttpResponse::build(status)
        .content_type("text/html")
        .body(markup.into_string())
}

pub(crate) fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
        AppError::Storage(StorageError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Auth(AuthError::EmailInUse) | AppError::Combine(CombineError::SessionActive(_)) => {
            StatusCode::CONFLICT
        }
        AppError::Auth(AuthError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Auth(_) => StatusCode::UNAUTHORIZED,
        AppError::Combine(CombineError::NoActiveSession) => StatusCode::NOT_FOUND,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ValidationError, WedgeId};
    use std::time::Duration;

    #[test]
    fn errors_map_to_statuses() {
        assert_eq!(
            status_for(&ValidationError::EmptyClubName.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&StorageError::Timeout(Duration::from_secs(10)).into()),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&CombineError::SessionActive(WedgeId::from("w1")).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&AuthError::Storage(StorageError::Db("locked".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
    }
}
