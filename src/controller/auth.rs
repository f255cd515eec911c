use actix_web::http::StatusCode;
use actix_web::web::{self, Data};
use actix_web::{HttpRequest, HttpResponse};

use super::{AppState, page, see_other, see_other_with, status_for};
use crate::error::AppError;
use crate::view::auth::{LoginForm, SignupForm, render_login, render_signup};

pub async fn login_form(req: HttpRequest, state: Data<AppState>) -> HttpResponse {
    if state.user(&req).await.is_ok() {
        return see_other("/");
    }
    page(StatusCode::OK, "Sign in", None, None, render_login("", None))
}

pub async fn login(req: HttpRequest, state: Data<AppState>, form: web::Form<LoginForm>) -> HttpResponse {
    match state.identity.sign_in(&form.email, &form.password).await {
        Ok(user) => see_other_with("/", state.start_session(&req, &user).await),
        Err(e) => {
            let e = AppError::from(e);
            page(status_for(&e), "Sign in", None, None, render_login(&form.email, Some(&e.to_string())))
        }
    }
}

pub async fn signup_form() -> HttpResponse {
    page(StatusCode::OK, "Create account", None, None, render_signup(&SignupForm::default(), None))
}

pub async fn signup(req: HttpRequest, state: Data<AppState>, form: web::Form<SignupForm>) -> HttpResponse {
    match state.identity.sign_up(&form.email, &form.password, &form.name).await {
        Ok(user) => see_other_with("/bag", state.start_session(&req, &user).await),
        Err(e) => {
            let e = AppError::from(e);
            page(status_for(&e), "Create account", None, None, render_signup(&form, Some(&e.to_string())))
        }
    }
}

/// Sign this browser out. The user's combine is dropped once no other
/// browser is signed in as them.
pub async fn logout(req: HttpRequest, state: Data<AppState>) -> HttpResponse {
    see_other_with("/login", state.end_session(&req).await)
}
