use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::{Class, User};
use crate::db::types::UserRole;
use crate::repositories;
use crate::services::gradebook::OwnedResource;

pub(crate) struct CurrentUser(pub(crate) User);
pub(crate) struct CurrentAdmin(pub(crate) User);
pub(crate) struct CurrentTeacher(pub(crate) User);
pub(crate) struct CurrentStudent(pub(crate) User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user = repositories::users::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

        let Some(user) = user else {
            return Err(ApiError::Unauthorized("User not found"));
        };

        if !user.is_active {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        Ok(CurrentUser(user))
    }
}

async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    role: UserRole,
    message: &'static str,
) -> Result<User, ApiError> {
    let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
    if user.role == role {
        Ok(user)
    } else {
        Err(ApiError::Forbidden(message))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, UserRole::Admin, "Admin access required").await.map(CurrentAdmin)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentTeacher {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, UserRole::Teacher, "Teacher access required")
            .await
            .map(CurrentTeacher)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, UserRole::Student, "Student access required")
            .await
            .map(CurrentStudent)
    }
}

pub(crate) async fn load_class(state: &AppState, class_id: &str) -> Result<Class, ApiError> {
    repositories::classes::find_by_id(state.db(), class_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch class"))?
        .ok_or_else(|| ApiError::NotFound("Class not found".to_string()))
}

async fn owns_class(state: &AppState, user: &User, class_id: &str) -> Result<bool, ApiError> {
    if user.role != UserRole::Teacher {
        return Ok(false);
    }
    let ownership = state
        .ownership()
        .resolve_ownership(&user.id, OwnedResource::Class(class_id))
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve class ownership"))?;
    Ok(ownership.is_allowed())
}

/// The teacher who owns the class.
pub(crate) async fn require_class_owner(
    state: &AppState,
    user: &User,
    class_id: &str,
) -> Result<Class, ApiError> {
    let class = load_class(state, class_id).await?;
    if owns_class(state, user, class_id).await? {
        Ok(class)
    } else {
        Err(ApiError::Forbidden("Only the class teacher can do this"))
    }
}

/// The owning teacher or an admin.
pub(crate) async fn require_class_manager(
    state: &AppState,
    user: &User,
    class_id: &str,
) -> Result<Class, ApiError> {
    let class = load_class(state, class_id).await?;
    if user.role == UserRole::Admin || owns_class(state, user, class_id).await? {
        Ok(class)
    } else {
        Err(ApiError::Forbidden("Not allowed to manage this class"))
    }
}

/// Admins, the owning teacher, and enrolled students.
pub(crate) async fn require_class_viewer(
    state: &AppState,
    user: &User,
    class_id: &str,
) -> Result<Class, ApiError> {
    let class = load_class(state, class_id).await?;
    let allowed = match user.role {
        UserRole::Admin => true,
        UserRole::Teacher => owns_class(state, user, class_id).await?,
        UserRole::Student => {
            repositories::enrollments::is_enrolled(state.db(), class_id, &user.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to check enrollment"))?
        }
    };

    if allowed {
        Ok(class)
    } else {
        Err(ApiError::Forbidden("Not a member of this class"))
    }
}
