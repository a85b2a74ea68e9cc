use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use axum_helpers::{ErrorResponse, JwtAuth, Principal, Role, ValidatedJson, jwt_auth_middleware};
use bytes::Bytes;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::{LeadError, LeadResult};
use crate::models::{
    CreateLead, LeadListResponse, LeadResponse, LeadStatus, LeadStatusUpdateRequest,
    PaginationQuery, ResumeUpload, UpdateLead,
};
use crate::publisher::LeadEventPublisher;
use crate::repository::LeadRepository;
use crate::service::LeadService;
use crate::storage::{MAX_RESUME_BYTES, ResumeStorage};

const TAG: &str = "leads";

/// Multipart headroom on top of the resume ceiling for the text fields
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Multipart form accepted by `POST /leads` and `PUT /leads/{id}`
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct LeadForm {
    first_name: String,
    last_name: String,
    email: String,
    /// `PUT` only
    status: Option<LeadStatus>,
    #[schema(value_type = String, format = Binary)]
    resume: Vec<u8>,
}

/// OpenAPI documentation for Leads API
#[derive(OpenApi)]
#[openapi(
    paths(create_lead, list_leads, get_lead, update_lead, update_lead_status),
    components(schemas(
        LeadForm,
        LeadResponse,
        LeadListResponse,
        LeadStatus,
        LeadStatusUpdateRequest,
        ErrorResponse
    )),
    tags((name = TAG, description = "Lead intake and follow-up"))
)]
pub struct ApiDoc;

type SharedService<R, S, P> = Arc<LeadService<R, S, P>>;

/// Lead routes. `POST /leads` is public; everything else requires a bearer token.
pub fn router<R, S, P>(service: LeadService<R, S, P>, auth: JwtAuth) -> Router
where
    R: LeadRepository + 'static,
    S: ResumeStorage + 'static,
    P: LeadEventPublisher + 'static,
{
    let shared_service = Arc::new(service);

    let protected = Router::new()
        .route("/leads", get(list_leads::<R, S, P>))
        .route("/leads/status", patch(update_lead_status::<R, S, P>))
        .route("/leads/{id}", get(get_lead::<R, S, P>).put(update_lead::<R, S, P>))
        .route_layer(middleware::from_fn_with_state(auth, jwt_auth_middleware));

    Router::new()
        .route("/leads", post(create_lead::<R, S, P>))
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES + FORM_OVERHEAD_BYTES))
        .with_state(shared_service)
}

/// Register a lead with a resume
#[utoipa::path(
    post,
    path = "/leads",
    tag = TAG,
    request_body(content = LeadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Lead created", body = LeadResponse),
        (status = 400, description = "Invalid form or resume", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
async fn create_lead<R, S, P>(
    State(service): State<SharedService<R, S, P>>,
    multipart: Multipart,
) -> LeadResult<impl IntoResponse>
where
    R: LeadRepository,
    S: ResumeStorage,
    P: LeadEventPublisher,
{
    let form = LeadFormData::read(multipart).await?;

    let input = CreateLead::new(
        &required("first_name", form.first_name)?,
        &required("last_name", form.last_name)?,
        &required("email", form.email)?,
    );
    let resume = form
        .resume
        .ok_or_else(|| LeadError::Validation("No file provided".to_string()))?;

    let lead = service.create_lead(input, &resume).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

/// List leads, newest first
#[utoipa::path(
    get,
    path = "/leads",
    tag = TAG,
    params(PaginationQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Page of leads", body = LeadListResponse),
        (status = 400, description = "Invalid paging", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
async fn list_leads<R, S, P>(
    State(service): State<SharedService<R, S, P>>,
    Query(query): Query<PaginationQuery>,
) -> LeadResult<Json<LeadListResponse>>
where
    R: LeadRepository,
    S: ResumeStorage,
    P: LeadEventPublisher,
{
    Ok(Json(service.get_paginated_leads(&query).await?))
}

/// Get a lead by ID
#[utoipa::path(
    get,
    path = "/leads/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Lead ID")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Lead found", body = LeadResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Lead not found", body = ErrorResponse)
    )
)]
async fn get_lead<R, S, P>(
    State(service): State<SharedService<R, S, P>>,
    Path(id): Path<String>,
) -> LeadResult<Json<LeadResponse>>
where
    R: LeadRepository,
    S: ResumeStorage,
    P: LeadEventPublisher,
{
    let id = parse_id(&id)?;
    Ok(Json(service.get_lead_by_id(id).await?))
}

/// Partially update a lead, optionally replacing its resume
#[utoipa::path(
    put,
    path = "/leads/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Lead ID")),
    request_body(content = LeadForm, content_type = "multipart/form-data"),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Lead updated", body = LeadResponse),
        (status = 400, description = "Invalid form or resume", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Lead not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
async fn update_lead<R, S, P>(
    State(service): State<SharedService<R, S, P>>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> LeadResult<Json<LeadResponse>>
where
    R: LeadRepository,
    S: ResumeStorage,
    P: LeadEventPublisher,
{
    let id = parse_id(&id)?;
    let form = LeadFormData::read(multipart).await?;

    let status = form
        .status
        .as_deref()
        .map(|raw| raw.trim().parse::<LeadStatus>())
        .transpose()?;

    let update = UpdateLead {
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
        status,
    };

    Ok(Json(service.update_lead(id, update, form.resume).await?))
}

/// Set a lead's status (attorneys only)
#[utoipa::path(
    patch,
    path = "/leads/status",
    tag = TAG,
    request_body = LeadStatusUpdateRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Status updated", body = LeadResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Attorney role required", body = ErrorResponse),
        (status = 404, description = "No lead with that email", body = ErrorResponse),
        (status = 422, description = "Unknown status value", body = ErrorResponse)
    )
)]
async fn update_lead_status<R, S, P>(
    State(service): State<SharedService<R, S, P>>,
    principal: Principal,
    ValidatedJson(request): ValidatedJson<LeadStatusUpdateRequest>,
) -> LeadResult<Json<LeadResponse>>
where
    R: LeadRepository,
    S: ResumeStorage,
    P: LeadEventPublisher,
{
    principal.require_role(Role::Attorney)?;

    let lead = service
        .update_lead_status(&request.email, request.status)
        .await?;
    Ok(Json(lead))
}

fn parse_id(raw: &str) -> LeadResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| LeadError::Validation(format!("Invalid lead id: {}", raw)))
}

/// Text fields and resume collected from a lead form
#[derive(Default)]
struct LeadFormData {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    status: Option<String>,
    resume: Option<ResumeUpload>,
}

impl LeadFormData {
    async fn read(mut multipart: Multipart) -> LeadResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "resume" => {
                    let filename = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let data: Bytes = field.bytes().await.map_err(multipart_error)?;
                    form.resume = Some(ResumeUpload {
                        filename,
                        content_type,
                        data,
                    });
                }
                "first_name" | "last_name" | "email" | "status" => {
                    let value = field.text().await.map_err(multipart_error)?;
                    let slot = match name.as_str() {
                        "first_name" => &mut form.first_name,
                        "last_name" => &mut form.last_name,
                        "email" => &mut form.email,
                        _ => &mut form.status,
                    };
                    *slot = Some(value);
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

fn required(name: &str, value: Option<String>) -> LeadResult<String> {
    value.ok_or_else(|| LeadError::Validation(format!("Validation error: {} field required", name)))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> LeadError {
    LeadError::Validation(format!("Invalid multipart body: {}", e.body_text()))
}
