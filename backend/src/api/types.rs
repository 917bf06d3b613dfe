//! REST API response types.
//!
//! Uploads answer with a two-field body, whatever the outcome:
//!
//! ```json
//! { "success": "OK", "message": "Uploaded data covers 3 years" }
//! { "success": "NOK", "message": "Record 0: unknown field 'Rainfall (mm)'" }
//! ```

use serde::{Deserialize, Serialize};

use crate::store::UploadSummary;

/// Outcome flag of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "NOK")]
    Nok,
}

/// Body returned by the upload endpoints, and by downloads on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: Outcome,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: Outcome::Ok,
            message: message.into(),
        }
    }

    pub fn nok(message: impl Into<String>) -> Self {
        Self {
            success: Outcome::Nok,
            message: message.into(),
        }
    }
}

impl From<UploadSummary> for ApiResponse {
    fn from(summary: UploadSummary) -> Self {
        ApiResponse::ok(format!("Uploaded data covers {} years", summary.years))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upload_summary_message() {
        let response = ApiResponse::from(UploadSummary { years: 2 });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "success": "OK", "message": "Uploaded data covers 2 years" })
        );
    }

    #[test]
    fn test_nok_shape() {
        let response = ApiResponse::nok("Dataset is empty");
        assert_eq!(response.success, Outcome::Nok);
        assert_eq!(serde_json::to_value(&response).unwrap()["success"], "NOK");
    }
}
