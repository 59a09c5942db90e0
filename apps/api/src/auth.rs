//! Identity extraction.
//!
//! The fronting auth proxy verifies the session and forwards the caller's
//! stable identity in `x-user-email`. This extractor is the only place that
//! header is read; a missing or empty value is "unauthenticated" and every
//! mutating handler rejects it before doing any work.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;

pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// The authenticated caller, available to any handler as an extractor.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(USER_EMAIL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser {
            email: email.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<AuthUser, AppError> {
        let (mut parts, _) = req.into_parts();
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_header_yields_identity() {
        let req = Request::builder()
            .header(USER_EMAIL_HEADER, "dev@example.com")
            .body(())
            .unwrap();
        let user = extract(req).await.unwrap();
        assert_eq!(user.email, "dev@example.com");
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let req = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(req).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_blank_header_is_unauthorized() {
        let req = Request::builder()
            .header(USER_EMAIL_HEADER, "   ")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(req).await,
            Err(AppError::Unauthorized)
        ));
    }
}
