use actix_web::http::StatusCode;
use actix_web::web::{self, Data};
use actix_web::{HttpRequest, HttpResponse};

use super::{AppState, page, see_other, status_for};
use crate::error::AppError;
use crate::model::{User, WedgeId};
use crate::view::bag::{DistancesForm, WedgeForm, render_bag};
use crate::view::layout::Nav;

async fn bag_page(state: &AppState, user: &User, status: StatusCode, form: &WedgeForm, error: Option<&str>) -> HttpResponse {
    let wedges = state.wedges(user).await;
    page(status, "The Bag", Some(user), Some(Nav::Bag), render_bag(&wedges, form, error))
}

pub async fn show(req: HttpRequest, state: Data<AppState>) -> HttpResponse {
    match state.user(&req).await {
        Ok(user) => bag_page(&state, &user, StatusCode::OK, &WedgeForm::default(), None).await,
        Err(redirect) => redirect,
    }
}

pub async fn add(req: HttpRequest, state: Data<AppState>, form: web::Form<WedgeForm>) -> HttpResponse {
    let user = match state.user(&req).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let form = form.into_inner();
    let result = match form.to_input() {
        Ok(input) => state.bag.add_wedge(&user.uid, input).await,
        Err(e) => Err(AppError::from(e)),
    };
    match result {
        Ok(wedge) => {
            tracing::info!(uid = %user.uid, wedge_id = %wedge.id, club = %wedge.club, "wedge added");
            state.settle(&user, |ws| ws.iter().any(|w| w.id == wedge.id)).await;
            see_other("/bag")
        }
        Err(e) => {
            tracing::warn!(uid = %user.uid, error = %e, "add wedge rejected");
            bag_page(&state, &user, status_for(&e), &form, Some(&e.to_string())).await
        }
    }
}

pub async fn delete(req: HttpRequest, state: Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let user = match state.user(&req).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let id = WedgeId::from(path.into_inner());
    match state.bag.delete_wedge(&user.uid, &id).await {
        Ok(()) => {
            tracing::info!(uid = %user.uid, wedge_id = %id, "wedge deleted");
            state.settle(&user, |ws| ws.iter().all(|w| w.id != id)).await;
            see_other("/bag")
        }
        Err(e) => {
            tracing::warn!(uid = %user.uid, wedge_id = %id, error = %e, "delete failed");
            bag_page(&state, &user, status_for(&e), &WedgeForm::default(), Some(&e.to_string())).await
        }
    }
}

pub async fn distances(
    req: HttpRequest,
    state: Data<AppState>,
    path: web::Path<String>,
    form: web::Form<DistancesForm>,
) -> HttpResponse {
    let user = match state.user(&req).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let id = WedgeId::from(path.into_inner());
    let result = match form.to_patch() {
        Ok(patch) => state.bag.update_wedge(&user.uid, &id, patch).await,
        Err(e) => Err(AppError::from(e)),
    };
    match result {
        Ok(wedge) => {
            state
                .settle(&user, |ws| ws.iter().any(|w| w.id == wedge.id && w.updated_at >= wedge.updated_at))
                .await;
            see_other("/bag")
        }
        Err(e) => bag_page(&state, &user, status_for(&e), &WedgeForm::default(), Some(&e.to_string())).await,
    }
}
