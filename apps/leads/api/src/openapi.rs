use axum_helpers::ErrorResponse;
use axum_helpers::server::HealthReport;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Alma Leads API",
        version = "0.1.0",
        description = "Lead intake, attorney review and authentication"
    ),
    servers((url = "/api/v1", description = "API base path")),
    components(schemas(ErrorResponse, HealthReport))
)]
pub struct ApiDoc;

/// Service document with the leads and auth paths merged in
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.merge(domain_leads::handlers::ApiDoc::openapi());
    doc.merge(domain_users::handlers::ApiDoc::openapi());
    doc
}
