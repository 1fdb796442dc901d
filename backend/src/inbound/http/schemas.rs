//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic by not deriving `ToSchema`; these
//! wrappers mirror their wire shape for documentation only.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// No resource answers at the requested location.
    #[schema(rename = "not_found")]
    NotFound,
    /// A dependency such as the database is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected failure; the message is always generic.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "service_unavailable")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "database connection to 10.0.0.5:5432 timed out after 2000ms")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(rename = "traceId", example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    #[test]
    fn error_schema_uses_camel_case_trace_id() {
        let RefOr::T(Schema::Object(object)) = ErrorSchema::schema() else {
            panic!("ErrorSchema should be an inline object schema");
        };
        assert!(object.properties.contains_key("traceId"));
        assert!(object.properties.contains_key("code"));
        assert!(object.required.contains(&"message".to_owned()));
        assert!(!object.required.contains(&"traceId".to_owned()));
    }

    #[test]
    fn error_code_schema_lists_raised_codes() {
        let rendered =
            serde_json::to_string(&ErrorCodeSchema::schema()).expect("schema serialises");
        for code in ["not_found", "service_unavailable", "internal_error"] {
            assert!(rendered.contains(code), "{code} missing from {rendered}");
        }
        assert!(!rendered.contains("conflict"));
    }
}
