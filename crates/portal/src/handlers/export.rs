//! Lead table export
//!
//! Streams the whole store as `leads.csv`, serialized by the same path the
//! store writes, so a download always matches the persisted schema.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};

use crate::handlers::admin;
use crate::AppState;
use rawmat_common::{errors::Result, metrics, store};

/// `GET /admin/export.csv` - Unlocked only; Locked requests bounce to the
/// password prompt.
pub async fn download_leads(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    if !admin::unlocked(&state, &headers).await {
        return Ok(Redirect::to("/admin").into_response());
    }

    let leads = state.store.load_all().await?;
    let body = store::to_csv_bytes(&leads)?;

    metrics::record_export(leads.len());
    tracing::info!(records = leads.len(), "Lead export downloaded");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"leads.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}
