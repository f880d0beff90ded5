//! Caller identity
//!
//! Authentication happens at the gateway, which forwards the verified subject
//! in the `x-user-id` header. An upstream middleware may instead insert a
//! [`UserId`] into the request extensions; that takes precedence.

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};
use uuid::Uuid;

/// Header carrying the gateway-verified subject id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    fn from_http_request(req: &HttpRequest) -> Option<Self> {
        if let Some(user_id) = req.extensions().get::<UserId>() {
            return Some(*user_id);
        }

        req.headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(UserId)
    }
}

/// Extracting `UserId` directly rejects anonymous requests with 401;
/// use `Option<UserId>` where the handler decides.
impl FromRequest for UserId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match UserId::from_http_request(req) {
            Some(user_id) => ready(Ok(user_id)),
            None => ready(Err(actix_web::error::ErrorUnauthorized(
                "User not authenticated",
            ))),
        }
    }
}
