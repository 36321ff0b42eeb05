// src/handlers/wizard.rs
//
// HTTP surface of the listing wizard. Every route is scoped to the vendor
// that started the wizard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequireRole, VendorAccess},
    models::listing::ListingKind,
    services::InProcessSubmitter,
    wizard::{DraftAction, RetreatOutcome, SubmitResult, WizardView},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct StartWizardPayload {
    pub kind: ListingKind,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TouchPayload {
    #[schema(example = "ownerPhone")]
    pub field: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StepResponse {
    /// `false` when the edit or move was not applied.
    pub applied: bool,
    pub wizard: WizardView,
}

#[utoipa::path(
    post,
    path = "/api/wizards",
    tag = "Wizard",
    request_body = StartWizardPayload,
    responses((status = 201, description = "Wizard started on its first step", body = WizardView)),
    security(("api_jwt" = []))
)]
pub async fn start_wizard(
    State(app_state): State<AppState>,
    access: RequireRole<VendorAccess>,
    Json(payload): Json<StartWizardPayload>,
) -> impl IntoResponse {
    let view = app_state.wizard_store.start(access.user.id, payload.kind).await;
    (StatusCode::CREATED, Json(view))
}

#[utoipa::path(
    get,
    path = "/api/wizards/{id}",
    tag = "Wizard",
    params(("id" = Uuid, Path, description = "Wizard id")),
    responses(
        (status = 200, description = "Current step", body = WizardView),
        (status = 404, description = "No such wizard for this vendor")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_wizard(
    State(app_state): State<AppState>,
    access: RequireRole<VendorAccess>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(app_state.wizard_store.get(access.user.id, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/wizards/{id}/draft",
    tag = "Wizard",
    params(("id" = Uuid, Path, description = "Wizard id")),
    request_body(content = Object, description = "Top-level draft fields to replace"),
    responses(
        (status = 200, description = "Draft updated", body = WizardView),
        (status = 400, description = "Unknown field or wrong value type"),
        (status = 409, description = "A submission is in flight")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_draft(
    State(app_state): State<AppState>,
    access: RequireRole<VendorAccess>,
    Path(id): Path<Uuid>,
    Json(patch): Json<Value>,
) -> Result<Json<WizardView>, AppError> {
    let ((), view) = app_state
        .wizard_store
        .edit(access.user.id, id, |wizard| wizard.update_draft(&patch))
        .await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/wizards/{id}/actions",
    tag = "Wizard",
    params(("id" = Uuid, Path, description = "Wizard id")),
    request_body = DraftAction,
    responses(
        (status = 200, description = "Action applied or ignored", body = StepResponse),
        (status = 400, description = "Action not valid for this listing kind"),
        (status = 409, description = "A submission is in flight"),
        (status = 422, description = "Photo limit reached")
    ),
    security(("api_jwt" = []))
)]
pub async fn apply_action(
    State(app_state): State<AppState>,
    access: RequireRole<VendorAccess>,
    Path(id): Path<Uuid>,
    Json(action): Json<DraftAction>,
) -> Result<Json<StepResponse>, AppError> {
    let (applied, wizard) = app_state
        .wizard_store
        .edit(access.user.id, id, |w| w.apply(action))
        .await?;
    Ok(Json(StepResponse { applied, wizard }))
}

#[utoipa::path(
    post,
    path = "/api/wizards/{id}/touch",
    tag = "Wizard",
    params(("id" = Uuid, Path, description = "Wizard id")),
    request_body = TouchPayload,
    responses(
        (status = 200, description = "Field marked as visited", body = WizardView),
        (status = 409, description = "A submission is in flight")
    ),
    security(("api_jwt" = []))
)]
pub async fn touch_field(
    State(app_state): State<AppState>,
    access: RequireRole<VendorAccess>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TouchPayload>,
) -> Result<Json<WizardView>, AppError> {
    let ((), view) = app_state
        .wizard_store
        .edit(access.user.id, id, |w| {
            w.touch(&payload.field);
            Ok(())
        })
        .await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/wizards/{id}/advance",
    tag = "Wizard",
    params(("id" = Uuid, Path, description = "Wizard id")),
    responses(
        (status = 200, description = "Moved forward, or stayed if the step is incomplete", body = StepResponse),
        (status = 409, description = "A submission is in flight")
    ),
    security(("api_jwt" = []))
)]
pub async fn advance(
    State(app_state): State<AppState>,
    access: RequireRole<VendorAccess>,
    Path(id): Path<Uuid>,
) -> Result<Json<StepResponse>, AppError> {
    let (applied, wizard) = app_state
        .wizard_store
        .edit(access.user.id, id, |w| Ok(w.advance()))
        .await?;
    Ok(Json(StepResponse { applied, wizard }))
}

#[utoipa::path(
    post,
    path = "/api/wizards/{id}/retreat",
    tag = "Wizard",
    params(("id" = Uuid, Path, description = "Wizard id")),
    responses(
        (status = 200, description = "Moved back, or cancelled from the first step", body = RetreatOutcome),
        (status = 409, description = "A submission is in flight")
    ),
    security(("api_jwt" = []))
)]
pub async fn retreat(
    State(app_state): State<AppState>,
    access: RequireRole<VendorAccess>,
    Path(id): Path<Uuid>,
) -> Result<Json<RetreatOutcome>, AppError> {
    Ok(Json(app_state.wizard_store.retreat(access.user.id, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/wizards/{id}/submit",
    tag = "Wizard",
    params(("id" = Uuid, Path, description = "Wizard id")),
    responses(
        (status = 200, description = "Submission outcome; the wizard stays open after a failure", body = SubmitResult),
        (status = 409, description = "Not on the last step, or already submitting"),
        (status = 422, description = "Last step incomplete")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit(
    State(app_state): State<AppState>,
    access: RequireRole<VendorAccess>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmitResult>, AppError> {
    let submitter = InProcessSubmitter::new(app_state.listing_service.clone(), access.user.id);
    let result = app_state.wizard_store.submit(access.user.id, id, &submitter).await?;
    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/api/wizards/{id}",
    tag = "Wizard",
    params(("id" = Uuid, Path, description = "Wizard id")),
    responses(
        (status = 204, description = "Wizard discarded"),
        (status = 409, description = "A submission is in flight")
    ),
    security(("api_jwt" = []))
)]
pub async fn discard(
    State(app_state): State<AppState>,
    access: RequireRole<VendorAccess>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.wizard_store.discard(access.user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
