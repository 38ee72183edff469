pub mod chat;
pub mod feedback_route;
pub mod health_route;
pub mod index_route;
pub mod reset_route;

use serde::Serialize;

/// `{ "message": ... }` body shared by the bookkeeping endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
