use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Role-permission mappings. Roles come from the token; the service owns
/// what each role may do.
const ROLE_PERMISSIONS: &[(&str, &str)] = &[
    // Admin: everything, on every hackathon
    ("admin", "hackathon:create"),
    ("admin", "hackathon:manage"),
    ("admin", "hackathon:manage_any"),
    // Organizer: manages the hackathons they created
    ("organizer", "hackathon:create"),
    ("organizer", "hackathon:manage"),
    // Judge: scoped per hackathon by accepted invitations
    ("judge", "judge:score"),
    // Participant
    ("participant", "team:join"),
    ("participant", "submission:create"),
];

pub fn permissions_for_role(role: &str) -> Vec<String> {
    ROLE_PERMISSIONS
        .iter()
        .filter(|(r, _)| *r == role)
        .map(|(_, p)| p.to_string())
        .collect()
}

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
/// Permission checks happen via `require_permission()` in the handler body.
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Returns `Ok(())` if the user has the given permission, `Err(PermissionDenied)` otherwise.
    pub fn require_permission(&self, permission: &str) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(&state.config.auth.jwt_secret, token)
            .map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser {
            user_id: claims.uid,
            username: claims.sub,
            permissions: permissions_for_role(&claims.role),
            role: claims.role,
        })
    }
}
