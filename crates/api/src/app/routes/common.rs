use core::str::FromStr;

use axum::http::StatusCode;

use rxstock_core::DomainError;

use crate::app::errors;
use crate::context::ActorContext;

/// Parse a path segment into a typed id, mapping failure to a 400 response.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse()
        .map_err(|e: DomainError| errors::json_error(StatusCode::BAD_REQUEST, e.to_string()))
}

/// User management is admin-only.
pub fn require_admin(ctx: &ActorContext) -> Result<(), axum::response::Response> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "admin access required",
        ))
    }
}
