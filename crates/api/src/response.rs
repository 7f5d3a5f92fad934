//! Shared response envelope for API handlers.
//!
//! Successful responses carry `"ok": true` next to the payload's own
//! fields; errors carry `"ok": false` (see [`crate::error::AppError`]).

use serde::Serialize;

/// `{ "ok": true, ...T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(OkResponse::new(view)))
/// ```
#[derive(Debug, Serialize)]
pub struct OkResponse<T: Serialize> {
    pub ok: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> OkResponse<T> {
    pub fn new(data: T) -> Self {
        Self { ok: true, data }
    }
}
