//! JSON handlers, grouped by resource.

pub mod announcements;
pub mod session;
pub mod sos;
pub mod status;

use axum::extract::rejection::JsonRejection;

use crate::error::Error;

/// Map a JSON body rejection onto the API's `{"error": …}` shape.
pub(super) fn bad_json(rejection: JsonRejection) -> Error {
  Error::BadRequest(rejection.body_text())
}
