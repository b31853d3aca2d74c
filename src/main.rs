use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use pets_core::decision::Decision;
use pets_core::submission::SectionSubmission;
use pets_core::tasks::{TaskId, TaskStatus};
use pets_core::{ScreeningError, ScreeningRecord, apply_submission, decide, derive_statuses};
use pets_types::FieldError;

/// Application state shared across REST API handlers
///
/// Screening records are held in memory, keyed by application id. The lock
/// serializes concurrent submissions for the same application; last write
/// wins.
#[derive(Clone, Default)]
struct AppState {
    applications: Arc<RwLock<HashMap<Uuid, ScreeningRecord>>>,
}

#[derive(Serialize, ToSchema)]
struct HealthRes {
    status: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct CreateApplicationRes {
    application_id: Uuid,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ProgressRes {
    decision: Decision,
    /// Task statuses keyed by task id.
    #[schema(value_type = Object)]
    tasks: BTreeMap<TaskId, TaskStatus>,
}

#[derive(Serialize, ToSchema)]
struct ValidationErrorsRes {
    /// `{ field, message }` pairs keyed by UI component id.
    #[schema(value_type = Vec<Object>)]
    errors: Vec<FieldError>,
}

#[derive(Serialize, ToSchema)]
struct MessageRes {
    message: String,
}

/// REST error responses for the screening API.
enum ApiError {
    Validation(Vec<FieldError>),
    OutOfOrder(String),
    NotFound,
    Internal,
}

impl From<ScreeningError> for ApiError {
    fn from(error: ScreeningError) -> Self {
        match error {
            ScreeningError::Validation(errors) => ApiError::Validation(errors.into_errors()),
            ScreeningError::SubmissionOutOfOrder { .. } => ApiError::OutOfOrder(error.to_string()),
            ScreeningError::Certificate(_) => {
                tracing::error!("certificate issue failed: {error}");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(ValidationErrorsRes { errors })).into_response()
            }
            ApiError::OutOfOrder(message) => {
                (StatusCode::CONFLICT, Json(MessageRes { message })).into_response()
            }
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(MessageRes {
                    message: "Application not found".into(),
                }),
            )
                .into_response(),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageRes {
                    message: "Internal error".into(),
                }),
            )
                .into_response(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, create_application, submit_section, application_progress),
    components(schemas(
        HealthRes,
        CreateApplicationRes,
        ProgressRes,
        ValidationErrorsRes,
        MessageRes,
        Decision,
        pets_core::record::XrayNotTakenReason,
        pets_core::dates::DateParts,
        pets_core::submission::ApplicantDetailsForm,
        pets_core::submission::TravelInformationForm,
        pets_core::submission::MedicalHistoryForm,
        pets_core::submission::ChestXrayForm,
        pets_core::submission::RadiologicalOutcomeForm,
        pets_core::submission::XrayNotTakenForm,
        pets_core::submission::SputumDecisionForm,
        pets_core::submission::SputumSampleForm,
        pets_core::submission::SputumResultsForm,
        pets_core::submission::CertificateOutcomeForm
    ))
)]
struct ApiDoc;

/// Main entry point for the PETS screening service
///
/// Starts the REST server for the TB pre-entry screening workflow.
///
/// # Environment Variables
/// - `PETS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If server startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("pets=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("PETS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    tracing::info!("++ Starting PETS REST on {}", rest_addr);

    let app = router(AppState::default());
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/applications", post(create_application))
        .route("/applications/:id/submit", post(submit_section))
        .route("/applications/:id/progress", get(application_progress))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        status: "ok".into(),
    })
}

#[utoipa::path(
    post,
    path = "/applications",
    responses(
        (status = 201, description = "Application created", body = CreateApplicationRes)
    )
)]
/// Create a new screening application
///
/// Opens a fresh screening episode and returns its id. All workflow
/// sections are subsequently submitted against this id.
async fn create_application(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateApplicationRes>) {
    let application_id = Uuid::new_v4();
    state
        .applications
        .write()
        .await
        .insert(application_id, ScreeningRecord::new());
    tracing::info!(%application_id, "application created");
    (
        StatusCode::CREATED,
        Json(CreateApplicationRes { application_id }),
    )
}

#[utoipa::path(
    post,
    path = "/applications/{id}/submit",
    request_body(content = Object, description = "Section payload tagged by `section`"),
    params(("id" = Uuid, Path, description = "Application id")),
    responses(
        (status = 200, description = "Section accepted, refreshed progress", body = ProgressRes),
        (status = 400, description = "Validation failure", body = ValidationErrorsRes),
        (status = 404, description = "Unknown application", body = MessageRes),
        (status = 409, description = "Section submitted out of order", body = MessageRes),
        (status = 500, description = "Internal server error", body = MessageRes)
    )
)]
/// Submit one workflow section for an application
///
/// Validates every field of the section against the error-message catalogue
/// and, on success, merges it into the record and returns the refreshed
/// decision and task statuses.
async fn submit_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(submission): Json<SectionSubmission>,
) -> Result<Json<ProgressRes>, ApiError> {
    let today = Utc::now().date_naive();
    let mut applications = state.applications.write().await;
    let record = applications.get_mut(&id).ok_or(ApiError::NotFound)?;

    apply_submission(record, &submission, today)?;

    let decision = decide(record, today);
    let tasks = derive_statuses(record, &decision);
    Ok(Json(ProgressRes { decision, tasks }))
}

#[utoipa::path(
    get,
    path = "/applications/{id}/progress",
    params(("id" = Uuid, Path, description = "Application id")),
    responses(
        (status = 200, description = "Decision and task statuses", body = ProgressRes),
        (status = 404, description = "Unknown application", body = MessageRes)
    )
)]
/// Current decision outputs and task statuses for an application.
async fn application_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProgressRes>, ApiError> {
    let today = Utc::now().date_naive();
    let applications = state.applications.read().await;
    let record = applications.get(&id).ok_or(ApiError::NotFound)?;

    let decision = decide(record, today);
    let tasks = derive_statuses(record, &decision);
    Ok(Json(ProgressRes { decision, tasks }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("request should succeed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build")
    }

    async fn create(state: &AppState) -> Uuid {
        let (status, body) = send(
            router(state.clone()),
            post_json("/applications", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["applicationId"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("application id")
    }

    #[tokio::test]
    async fn health_responds_ok() {
        let (status, body) = send(
            router(AppState::default()),
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn a_fresh_application_reports_not_yet_started() {
        let state = AppState::default();
        let id = create(&state).await;

        let (status, body) = send(
            router(state),
            Request::builder()
                .uri(format!("/applications/{id}/progress"))
                .body(Body::empty())
                .expect("request should build"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tasks"]["visa-applicant-details"], "not-yet-started");
        assert_eq!(body["tasks"]["medical-history"], "cannot-start-yet");
    }

    #[tokio::test]
    async fn validation_failures_list_every_field() {
        let state = AppState::default();
        let id = create(&state).await;

        let (status, body) = send(
            router(state),
            post_json(
                &format!("/applications/{id}/submit"),
                json!({ "section": "applicantDetails" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let errors = body["errors"].as_array().expect("errors array");
        assert!(errors.iter().any(|e| {
            e["field"] == "name" && e["message"] == "Enter the applicant's full name."
        }));
        assert!(errors.iter().any(|e| e["field"] == "birth-date"));
    }

    #[tokio::test]
    async fn out_of_order_submissions_conflict() {
        let state = AppState::default();
        let id = create(&state).await;

        let (status, body) = send(
            router(state),
            post_json(
                &format!("/applications/{id}/submit"),
                json!({ "section": "sputumDecision", "sputumRequired": "Yes" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["message"],
            "the Sputum collection and results task cannot be started yet"
        );
    }

    #[tokio::test]
    async fn unknown_applications_are_not_found() {
        let (status, body) = send(
            router(AppState::default()),
            Request::builder()
                .uri(format!("/applications/{}/progress", Uuid::new_v4()))
                .body(Body::empty())
                .expect("request should build"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Application not found");
    }

    #[tokio::test]
    async fn a_child_episode_completes_over_http() {
        let state = AppState::default();
        let id = create(&state).await;
        let submit = format!("/applications/{id}/submit");

        let sections = [
            json!({
                "section": "applicantDetails",
                "fullName": "Amina Diallo",
                "sex": "Female",
                "dateOfBirth": { "day": "1", "month": "3", "year": "2019" },
                "countryOfNationality": "Senegal",
                "passportNumber": "AB1234567",
                "countryOfIssue": "Senegal",
                "passportIssueDate": { "day": "1", "month": "1", "year": "2020" },
                "passportExpiryDate": { "day": "1", "month": "jan", "year": "2030" },
                "homeAddress1": "12 Harbour Road",
                "townOrCity": "Dakar",
                "provinceOrState": "Dakar",
                "country": "Senegal"
            }),
            json!({ "section": "travelInformation", "visaCategory": "Work" }),
            json!({
                "section": "medicalHistory",
                "completionDate": { "day": "1", "month": "6", "year": "2025" },
                "age": "6",
                "tbSymptoms": "No",
                "previousTb": "No",
                "closeContactWithTb": "No"
            }),
            json!({ "section": "xrayNotTaken", "reason": "Child" }),
            json!({ "section": "sputumDecision", "sputumRequired": "No" }),
            json!({
                "section": "certificateOutcome",
                "isIssued": "Yes",
                "certificateDate": { "day": "10", "month": "6", "year": "2025" },
                "certificateNumber": "TB1234567",
                "physicianName": "Dr A Okafor"
            }),
        ];

        let mut last = Value::Null;
        for section in sections {
            let (status, body) =
                send(router(state.clone()), post_json(&submit, section.clone())).await;
            assert_eq!(status, StatusCode::OK, "section {section} rejected: {body}");
            last = body;
        }

        assert_eq!(last["decision"]["isChildUnder11"], true);
        assert_eq!(last["tasks"]["chest-xray"], "not-required");
        assert_eq!(last["tasks"]["sputum-collection"], "not-required");
        assert_eq!(last["tasks"]["tb-certificate"], "completed");
    }

    #[tokio::test]
    async fn a_valid_section_returns_refreshed_progress() {
        let state = AppState::default();
        let id = create(&state).await;

        let (status, body) = send(
            router(state),
            post_json(
                &format!("/applications/{id}/submit"),
                json!({
                    "section": "applicantDetails",
                    "fullName": "Amina Diallo",
                    "sex": "Female",
                    "dateOfBirth": { "day": "1", "month": "March", "year": "1995" },
                    "countryOfNationality": "Senegal",
                    "passportNumber": "AB1234567",
                    "countryOfIssue": "Senegal",
                    "passportIssueDate": { "day": "1", "month": "1", "year": "2020" },
                    "passportExpiryDate": { "day": "1", "month": "jan", "year": "2030" },
                    "homeAddress1": "12 Harbour Road",
                    "townOrCity": "Dakar",
                    "provinceOrState": "Dakar",
                    "country": "Senegal"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tasks"]["visa-applicant-details"], "completed");
        assert_eq!(body["tasks"]["travel-information"], "not-yet-started");
    }
}
