use crate::infra::{deserialize_optional_date, AppState, HostelDesk};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use hostel_ms::clock::Clock;
use hostel_ms::error::AppError;
use hostel_ms::http::{record_router, stateful_record_router};
use hostel_ms::reports::{CsvStudentReportRenderer, StudentReportWizard};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::Ordering;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StudentReportRequest {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) from_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) to_date: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) format: ReportFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ReportFormat {
    #[default]
    Csv,
    Json,
}

pub(crate) fn with_hostel_routes(desk: &HostelDesk) -> Router {
    Router::new()
        .merge(record_router("/api/v1/departments", desk.departments.clone()))
        .merge(stateful_record_router("/api/v1/students", desk.students.clone()))
        .merge(record_router("/api/v1/employees", desk.employees.clone()))
        .merge(stateful_record_router("/api/v1/hostels", desk.hostels.clone()))
        .merge(record_router("/api/v1/rooms", desk.rooms.clone()))
        .merge(record_router("/api/v1/amenities", desk.amenities.clone()))
        .merge(stateful_record_router(
            "/api/v1/housekeeping",
            desk.housekeeping.clone(),
        ))
        .merge(record_router(
            "/api/v1/deposit-policies",
            desk.deposit_policies.clone(),
        ))
        .merge(stateful_record_router(
            "/api/v1/admissions",
            desk.admissions.clone(),
        ))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/reports/students", post(student_report_endpoint))
        .layer(Extension(desk.clone()))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Acquire);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn student_report_endpoint(
    Extension(desk): Extension<HostelDesk>,
    Json(payload): Json<StudentReportRequest>,
) -> Result<Response, AppError> {
    let StudentReportRequest {
        from_date,
        to_date,
        format,
    } = payload;

    let today = desk.clock.today();
    let wizard = StudentReportWizard::with_bounds(from_date, to_date, today);
    let students = desk.students.repository().clone();
    let renderer = CsvStudentReportRenderer::new(students.clone(), desk.clock.clone());
    let report = wizard.print_report(students.as_ref(), &renderer)?;

    let response = match format {
        ReportFormat::Json => (StatusCode::OK, Json(report)).into_response(),
        ReportFormat::Csv => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, report.content_type)],
            report.body,
        )
            .into_response(),
    };
    Ok(response)
}
