/// Pieces shared by the employee and mentor endpoints

use crate::{
    error::{ApiError, ApiResult},
    validation::not_blank,
};
use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use boxhire_shared::export::{attachment_header, to_csv, CsvRecord};
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

/// Body for creating or updating an employee or mentor
///
/// The date field is `hireDate` for employees and `joinDate` for mentors.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StaffRequest {
    #[validate(length(max = 255), custom(function = "not_blank", message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(alias = "hireDate", alias = "joinDate")]
    pub date: Option<String>,
}

impl StaffRequest {
    /// Validates the body and parses its date (`YYYY-MM-DD`, blank = none).
    pub fn validated(self, date_field: &str) -> ApiResult<(String, String, Option<NaiveDate>)> {
        self.validate()?;
        let date = parse_date(date_field, self.date.as_deref())?;
        Ok((self.name.trim().to_string(), self.email, date))
    }
}

pub fn parse_date(field: &str, raw: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::invalid_field(field, format!("{field} must be a date (YYYY-MM-DD)"))),
    }
}

/// CSV attachment named `<stem>.csv`
pub fn csv_download<T: CsvRecord>(stem: &str, records: &[T]) -> ApiResult<Response> {
    let body = to_csv(records)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, attachment_header(stem)),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("hireDate", None).unwrap(), None);
        assert_eq!(parse_date("hireDate", Some("  ")).unwrap(), None);
        assert_eq!(
            parse_date("hireDate", Some("2024-02-29")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert!(parse_date("hireDate", Some("29/02/2024")).is_err());
    }

    #[test]
    fn test_date_aliases() {
        let employee: StaffRequest = serde_json::from_value(serde_json::json!({
            "name": "Grace",
            "email": "grace@acme.io",
            "hireDate": "2023-05-01"
        }))
        .unwrap();
        assert_eq!(employee.date.as_deref(), Some("2023-05-01"));

        let mentor: StaffRequest = serde_json::from_value(serde_json::json!({
            "name": "Alan",
            "email": "alan@north.edu",
            "joinDate": "2020-09-01"
        }))
        .unwrap();
        let (_, _, date) = mentor.validated("joinDate").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 9, 1));
    }

    #[test]
    fn test_validated_rejects_bad_email() {
        let req = StaffRequest {
            name: "Grace".to_string(),
            email: "grace".to_string(),
            date: None,
        };
        assert!(matches!(req.validated("hireDate"), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_validated_rejects_blank_name() {
        let req = StaffRequest {
            name: "   ".to_string(),
            email: "grace@acme.io".to_string(),
            date: None,
        };
        assert!(matches!(req.validated("hireDate"), Err(ApiError::ValidationError(_))));

        let req = StaffRequest {
            name: "  Grace ".to_string(),
            email: "grace@acme.io".to_string(),
            date: None,
        };
        let (name, _, _) = req.validated("hireDate").unwrap();
        assert_eq!(name, "Grace");
    }

    struct Row;

    impl CsvRecord for Row {
        const HEADERS: &'static [&'static str] = &["id", "name"];

        fn fields(&self) -> Vec<String> {
            vec!["1".to_string(), "Grace".to_string()]
        }
    }

    #[test]
    fn test_csv_download_headers() {
        let response = csv_download("employees", &[Row]).unwrap();

        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"employees.csv\""
        );
    }
}
