use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::models::DEMO_USER_ID;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The user a request acts for
///
/// Identity is established upstream and passed in `x-user-id`. Requests
/// without a valid id act as the demo user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0
    }

    fn from_parts(parts: &Parts) -> Self {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok());

        match user_id {
            Some(id) => Self(id),
            None => {
                tracing::trace!("No user id header, acting as demo user");
                Self(DEMO_USER_ID)
            }
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
