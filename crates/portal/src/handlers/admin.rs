//! Admin dashboard handlers
//!
//! Two-state flow: Locked renders the password prompt and reads no lead
//! data; Unlocked loads the store, computes the demand reports, and renders
//! the dashboard. Unlock state lives in a server-side session keyed by an
//! HttpOnly cookie, minted on login and dropped on logout or expiry.

use askama::Template;
use axum::{
    extract::{Form, State},
    http::{header, HeaderMap},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use rawmat_common::{
    auth,
    errors::{AppError, Result},
    leads::Lead,
    metrics,
    reports::{self, LeadSummary},
};

/// Locked view: the password prompt. Deliberately identical for a missing
/// and a wrong password.
#[derive(Template)]
#[template(path = "admin_login.html")]
struct LoginTemplate {}

/// Unlocked view over an empty store
#[derive(Template)]
#[template(path = "dashboard_empty.html")]
struct DashboardEmptyTemplate {}

/// Unlocked view: metrics, charts, listing, export
#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    summary: LeadSummary,
    leads: Vec<Lead>,
    pie_json: String,
    volume_json: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

/// `GET /admin` - Admin Dashboard (Private)
pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    if !unlocked(&state, &headers).await {
        return render(LoginTemplate {});
    }

    let leads = state.store.load_all().await?;
    let Some(summary) = reports::summarize(&leads) else {
        return render(DashboardEmptyTemplate {});
    };

    let breakdown = reports::category_breakdown(&leads);
    let pie = serde_json::json!({
        "labels": breakdown.iter().map(|c| c.category.as_str()).collect::<Vec<_>>(),
        "values": breakdown.iter().map(|c| c.count).collect::<Vec<_>>(),
    });
    let volumes = reports::volume_by_company(&leads);

    render(DashboardTemplate {
        summary,
        pie_json: json_for_script(&pie)?,
        volume_json: json_for_script(&volumes)?,
        leads,
    })
}

/// `POST /admin/login` - credential check, session mint
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if !auth::verify_credential(&form.password, &state.config.auth.admin_password) {
        metrics::record_admin_login(false);
        tracing::warn!("Admin login rejected");
        return render(LoginTemplate {});
    }

    let token = state.sessions.issue().await;
    metrics::record_admin_login(true);
    tracing::info!("Admin dashboard unlocked");

    let cookie = auth::session_cookie(
        &state.config.auth.session_cookie,
        &token,
        state.config.auth.session_ttl_secs,
    );
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to("/admin"),
    )
        .into_response())
}

/// `POST /admin/logout` - the explicit Unlocked -> Locked transition
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    if let Some(token) = session_token(&state, &headers) {
        state.sessions.revoke(&token).await;
    }
    tracing::info!("Admin session revoked");

    let cookie = auth::clear_session_cookie(&state.config.auth.session_cookie);
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to("/admin"),
    )
        .into_response())
}

/// Pull the session token out of the request's cookies
fn session_token(state: &AppState, headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    auth::extract_cookie(cookie_header, &state.config.auth.session_cookie).map(String::from)
}

/// Whether the request carries a live admin session
pub(crate) async fn unlocked(state: &AppState, headers: &HeaderMap) -> bool {
    match session_token(state, headers) {
        Some(token) => state.sessions.validate(&token).await,
        None => false,
    }
}

/// JSON embeddable inside a `<script>` block
fn json_for_script<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace('<', "\\u003c"))
}

fn render<T: Template>(template: T) -> Result<Response> {
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("template render failed: {e}"),
    })?;
    Ok(Html(html).into_response())
}
