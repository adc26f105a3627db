use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::gate::CsvDocument;

/// File name suggested to browsers downloading the result.
pub const CSV_FILENAME: &str = "portfolio_companies.csv";

pub fn csv(document: CsvDocument) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", CSV_FILENAME),
            ),
        ],
        document.body,
    )
        .into_response()
}
