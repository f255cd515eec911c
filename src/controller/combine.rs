use actix_web::http::StatusCode;
use actix_web::web::{self, Data};
use actix_web::{HttpRequest, HttpResponse};
use serde::Deserialize;

use super::{AppState, page, see_other, status_for};
use crate::combine::{CombineDriver, CombineModel, Msg, Outcome};
use crate::error::AppError;
use crate::model::{ShotTarget, User, WedgeId};
use crate::view::combine::{
    AUTO_ADVANCE_REFRESH_SECS, render_combine, render_combine_busy, render_combine_picker,
};
use crate::view::layout::{Nav, render_error, render_page};

#[derive(Deserialize, Debug)]
pub struct TargetForm {
    #[serde(default)]
    pub target: String,
}

impl TargetForm {
    /// `"manual"`, or a shot count; anything else is manual.
    #[must_use]
    pub fn shot_target(&self) -> ShotTarget {
        self.target
            .trim()
            .parse::<usize>()
            .map_or(ShotTarget::Manual, ShotTarget::Fixed)
    }
}

#[derive(Deserialize, Debug)]
pub struct ShotForm {
    #[serde(default)]
    pub distance: String,
}

/// The running combine, or the wedge picker when there is none.
pub async fn show(req: HttpRequest, state: Data<AppState>) -> HttpResponse {
    let user = match state.user(&req).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let Some(driver) = state.combines.get(&user.uid).await else {
        let wedges = state.wedges(&user).await;
        return page(
            StatusCode::OK,
            "Combine",
            Some(&user),
            Some(Nav::Combine),
            render_combine_picker(&wedges),
        );
    };
    let model = driver.snapshot().await;
    let refresh = model
        .auto_advance_pending()
        .then_some(AUTO_ADVANCE_REFRESH_SECS);
    // no navigation while a combine is running
    let markup = render_page("Combine", Some(&user), None, refresh, render_combine(&model));
    HttpResponse::Ok()
        .content_type("text/html")
        .body(markup.into_string())
}

/// Start a combine on one of the user's wedges, or return to the one in progress.
pub async fn start(req: HttpRequest, state: Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let user = match state.user(&req).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let wedge_id = WedgeId::from(path.into_inner());
    if let Some(active) = state.combines.get(&user.uid).await {
        if *active.wedge_id() == wedge_id {
            return see_other("/combine");
        }
        let busy = active.snapshot().await;
        return page(
            StatusCode::CONFLICT,
            "Combine",
            Some(&user),
            Some(Nav::Combine),
            render_combine_busy(busy.wedge()),
        );
    }

    let wedge = match state.bag.wedge_for(&user.uid, &wedge_id).await {
        Ok(wedge) => wedge,
        Err(e) => {
            let e = AppError::from(e);
            return page(
                status_for(&e),
                "Combine",
                Some(&user),
                Some(Nav::Combine),
                render_error(&e.to_string()),
            );
        }
    };
    let driver = CombineDriver::new(
        CombineModel::new(wedge, state.auto_advance_delay),
        state.bag.clone(),
    );
    if let Err(e) = state.combines.start(&user.uid, driver).await {
        // another tab got there first
        tracing::debug!(uid = %user.uid, error = %e, "combine already running");
    }
    see_other("/combine")
}

async fn send(state: &AppState, user: &User, msg: Msg) -> Option<Outcome> {
    match state.combines.dispatch(&user.uid, msg).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::debug!(uid = %user.uid, error = %e, "combine message dropped");
            None
        }
    }
}

async fn step(req: &HttpRequest, state: &AppState, msg: Msg) -> HttpResponse {
    let user = match state.user(req).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    send(state, &user, msg).await;
    see_other("/combine")
}

pub async fn next(req: HttpRequest, state: Data<AppState>) -> HttpResponse {
    step(&req, &state, Msg::Next).await
}

pub async fn skip(req: HttpRequest, state: Data<AppState>) -> HttpResponse {
    step(&req, &state, Msg::Skip).await
}

pub async fn back(req: HttpRequest, state: Data<AppState>) -> HttpResponse {
    step(&req, &state, Msg::Back).await
}

pub async fn target(req: HttpRequest, state: Data<AppState>, form: web::Form<TargetForm>) -> HttpResponse {
    step(&req, &state, Msg::ChooseTarget(form.shot_target())).await
}

pub async fn remove_shot(req: HttpRequest, state: Data<AppState>, path: web::Path<usize>) -> HttpResponse {
    step(&req, &state, Msg::RemoveShot(path.into_inner())).await
}

pub async fn add_shot(req: HttpRequest, state: Data<AppState>, form: web::Form<ShotForm>) -> HttpResponse {
    let user = match state.user(&req).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let form = form.into_inner();
    send(&state, &user, Msg::EditEntry(form.distance)).await;
    send(&state, &user, Msg::AddShot).await;
    see_other("/combine")
}

/// Save the reviewed averages. Success lands on the matrix; a failure stays on
/// review with the error shown and the shots kept.
pub async fn save(req: HttpRequest, state: Data<AppState>) -> HttpResponse {
    let user = match state.user(&req).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    let Some(driver) = state.combines.get(&user.uid).await else {
        return see_other("/combine");
    };
    let before = driver.snapshot().await.wedge().clone();
    match send(&state, &user, Msg::Save).await {
        Some(Outcome::Saved) => {
            state
                .settle(&user, |ws| ws.iter().any(|w| w.id == before.id && w.updated_at > before.updated_at))
                .await;
            see_other("/")
        }
        _ => see_other("/combine"),
    }
}

pub async fn abort(req: HttpRequest, state: Data<AppState>) -> HttpResponse {
    let user = match state.user(&req).await {
        Ok(user) => user,
        Err(redirect) => return redirect,
    };
    send(&state, &user, Msg::Abort).await;
    see_other("/bag")
}
