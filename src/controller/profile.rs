use actix_web::http::StatusCode;
use actix_web::web::{self, Data};
use actix_web::{HttpRequest, HttpResponse};

use super::{AppState, page, status_for};
use crate::error::AppError;
use crate::model::User;
use crate::view::layout::Nav;
use crate::view::profile::{ProfileForm, render_profile};

async fn profile_page(state: &AppState, user: &User, status: StatusCode, error: Option<&str>, notice: Option<&str>) -> HttpResponse {
    let count = state.wedges(user).await.len();
    page(status, "Profile", Some(user), Some(Nav::Profile), render_profile(user, count, error, notice))
}

pub async fn show(req: HttpRequest, state: Data<AppState>) -> HttpResponse {
    match state.user(&req).await {
        Ok(user) => profile_page(&state, &user, StatusCode::OK, None, None).await,
        Err(redirect) => redirect,
    }
}

async fn apply(state: &AppState, user: &User, form: &ProfileForm) -> Result<User, AppError> {
    let mut updated = user.clone();
    if form.name.trim() != user.name {
        updated = state.identity.update_profile(&user.uid, &form.name).await?;
    }
    let email = form.email.trim();
    if !email.is_empty() && !email.eq_ignore_ascii_case(&user.email) {
        updated = state
            .identity
            .update_email(&user.uid, email, &form.current_password)
            .await?;
    }
    Ok(updated)
}

pub async fn update(req: HttpRequest, state: Data<AppState>, form: web::Form<ProfileForm>) -> HttpResponse {
    let user = match state.user(&req).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    match apply(&state, &user, &form).await {
        Ok(updated) => profile_page(&state, &updated, StatusCode::OK, None, Some("Profile updated")).await,
        Err(e) => {
            // a name change may have landed before the email change failed
            let current = state.identity.user(&user.uid).await.ok().flatten().unwrap_or(user);
            profile_page(&state, &current, status_for(&e), Some(&e.to_string()), None).await
        }
    }
}
