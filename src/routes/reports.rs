//! Incident report routes: file a field observation, list them, fetch one.
//!
//! Every route here sits behind the token gate and attributes new reports to
//! the authenticated account.

use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::AuthMiddleware;
use crate::auth::models::AuthUser;
use crate::database::models::NewReport;
use crate::server::AppState;

/// Decimal places kept for coordinates, matching the NUMERIC column scale
const COORDINATE_SCALE: u32 = 8;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0}")]
    Validation(String),

    #[error("report not found")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for ReportError {
    fn from(rejection: JsonRejection) -> Self {
        ReportError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ReportError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ReportError::NotFound => (StatusCode::NOT_FOUND, "Report not found".to_string()),
            ReportError::Internal(e) => {
                tracing::error!("Report store failure: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// A coordinate as clients send it: a JSON number or a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CoordinateInput {
    Number(f64),
    Text(String),
}

impl CoordinateInput {
    /// `None` for blank text, which counts as a missing field
    fn value(&self) -> Result<Option<f64>, ReportError> {
        match self {
            CoordinateInput::Number(n) => Ok(Some(*n)),
            CoordinateInput::Text(raw) if raw.trim().is_empty() => Ok(None),
            CoordinateInput::Text(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ReportError::Validation("Coordinates must be numeric".to_string())),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateReportRequest {
    pub description: String,
    pub latitude: Option<CoordinateInput>,
    pub longitude: Option<CoordinateInput>,
}

impl CreateReportRequest {
    fn validate(self, reported_by: Uuid) -> Result<NewReport, ReportError> {
        let description = self.description.trim().to_string();
        let latitude = self.latitude.as_ref().map(CoordinateInput::value).transpose()?.flatten();
        let longitude = self.longitude.as_ref().map(CoordinateInput::value).transpose()?.flatten();

        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            return Err(ReportError::Validation("All fields are required".to_string()));
        };
        if description.is_empty() {
            return Err(ReportError::Validation("All fields are required".to_string()));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ReportError::Validation("Latitude must be between -90 and 90".to_string()));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ReportError::Validation(
                "Longitude must be between -180 and 180".to_string(),
            ));
        }

        Ok(NewReport {
            description,
            latitude: to_coordinate(latitude)?,
            longitude: to_coordinate(longitude)?,
            reported_by,
        })
    }
}

fn to_coordinate(value: f64) -> Result<Decimal, ReportError> {
    Decimal::try_from(value)
        .map(|d| d.round_dp(COORDINATE_SCALE))
        .map_err(|e| ReportError::Validation(format!("Invalid coordinate: {e}")))
}

/// `POST /api/reports`
pub async fn create_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateReportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ReportError> {
    let Json(payload) = payload?;
    let new_report = payload.validate(user.id)?;
    let report = state.reports.create(new_report).await?;

    tracing::info!("Report {} filed by {}", report.id, user.id);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Report added successfully", "report": report })),
    ))
}

/// `GET /api/reports`
pub async fn list_reports(State(state): State<AppState>) -> Result<Json<Value>, ReportError> {
    let reports = state.reports.list().await?;
    Ok(Json(json!({ "reports": reports })))
}

/// `GET /api/reports/{id}`
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ReportError> {
    let report = state.reports.find_by_id(id).await?.ok_or(ReportError::NotFound)?;
    Ok(Json(json!({ "report": report })))
}

/// Prefix the existing web client calls; filing goes to `{prefix}/add`
pub const LEGACY_REPORT_PREFIX: &str = "/api/ReportRoutes";

pub fn create_report_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/reports", get(list_reports).post(create_report))
        .route("/api/reports/{id}", get(get_report))
        .route(LEGACY_REPORT_PREFIX, get(list_reports))
        .route(&format!("{LEGACY_REPORT_PREFIX}/"), get(list_reports))
        .route(&format!("{LEGACY_REPORT_PREFIX}/add"), post(create_report))
        .route(&format!("{LEGACY_REPORT_PREFIX}/{{id}}"), get(get_report))
        .route_layer(middleware::from_fn_with_state(state, AuthMiddleware::require_auth))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(description: &str, latitude: Option<f64>, longitude: Option<f64>) -> CreateReportRequest {
        CreateReportRequest {
            description: description.to_string(),
            latitude: latitude.map(CoordinateInput::Number),
            longitude: longitude.map(CoordinateInput::Number),
        }
    }

    #[test]
    fn valid_report_is_rounded_to_column_scale() {
        let report = request("Bleaching on the north reef", Some(6.123456789123), Some(80.5))
            .validate(Uuid::new_v4())
            .unwrap();

        assert_eq!(report.latitude.scale(), 8);
        assert_eq!(report.latitude.to_string(), "6.12345679");
        assert_eq!(report.description, "Bleaching on the north reef");
    }

    #[test]
    fn missing_fields_are_rejected() {
        for req in [
            request("", Some(1.0), Some(1.0)),
            request("   ", Some(1.0), Some(1.0)),
            request("x", None, Some(1.0)),
            request("x", Some(1.0), None),
        ] {
            assert!(matches!(req.validate(Uuid::new_v4()), Err(ReportError::Validation(_))));
        }
    }

    #[test]
    fn numeric_strings_are_accepted_as_coordinates() {
        let payload: CreateReportRequest = serde_json::from_value(json!({
            "description": "Algae bloom",
            "latitude": "7.29",
            "longitude": 80.63
        }))
        .unwrap();

        let report = payload.validate(Uuid::new_v4()).unwrap();
        assert_eq!(report.latitude, Decimal::new(729, 2));
    }

    #[test]
    fn non_numeric_or_blank_strings_are_rejected() {
        let garbled: CreateReportRequest = serde_json::from_value(json!({
            "description": "x", "latitude": "north-ish", "longitude": 1.0
        }))
        .unwrap();
        let blank: CreateReportRequest = serde_json::from_value(json!({
            "description": "x", "latitude": " ", "longitude": 1.0
        }))
        .unwrap();

        assert!(matches!(garbled.validate(Uuid::new_v4()), Err(ReportError::Validation(m)) if m.contains("numeric")));
        assert!(matches!(blank.validate(Uuid::new_v4()), Err(ReportError::Validation(m)) if m == "All fields are required"));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(request("x", Some(90.5), Some(0.0)).validate(Uuid::new_v4()).is_err());
        assert!(request("x", Some(0.0), Some(-180.01)).validate(Uuid::new_v4()).is_err());
        assert!(request("x", Some(f64::NAN), Some(0.0)).validate(Uuid::new_v4()).is_err());
    }
}
