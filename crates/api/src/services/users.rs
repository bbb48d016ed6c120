use planner_core::{
    authz::ensure_owner,
    credentials::normalize_email,
    errors::{PlannerError, PlannerResult},
    files::FileIntake,
    models::user::{
        CheckPasswordRequest, CheckPasswordResponse, ProfilePictureResponse,
        UpdatePasswordRequest, UpdatePasswordResponse, UpdateUserRequest, UpdateUserResponse,
        User,
    },
};
use planner_db::models::{DbUser, ProfileChanges, ProfileUpdate};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    middleware::auth::{hash_password, verify_password, AuthUser},
    services::UploadedFile,
    ApiState,
};

async fn load_user(state: &ApiState, user_id: Uuid) -> PlannerResult<DbUser> {
    state
        .users
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| PlannerError::NotFound(format!("User with ID {} not found", user_id)))
}

pub async fn get_user(state: &ApiState, acting: &AuthUser, user_id: Uuid) -> PlannerResult<User> {
    ensure_owner(acting.user_id, user_id, "user")?;

    let user = load_user(state, user_id).await?;
    Ok(user.into_user(&state.pictures_base_url))
}

/// Validates the allow-listed fields of a profile update.
fn profile_changes(request: UpdateUserRequest) -> PlannerResult<ProfileChanges> {
    if request.is_empty() {
        return Err(PlannerError::BadRequest("No valid fields provided".to_string()));
    }

    let required = |field: &str, value: Option<String>| -> PlannerResult<Option<String>> {
        match value.map(|v| v.trim().to_string()) {
            Some(v) if v.is_empty() => Err(PlannerError::BadRequest(format!(
                "{field} cannot be empty"
            ))),
            other => Ok(other),
        }
    };

    let email = required("email", request.email)?.map(|e| normalize_email(&e));
    if email.as_deref().is_some_and(|e| !e.contains('@')) {
        return Err(PlannerError::BadRequest("Invalid email address".to_string()));
    }

    let profile_picture = required("profile_picture", request.profile_picture)?;
    if profile_picture
        .as_deref()
        .is_some_and(|p| p.contains(['/', '\\']) || p == "..")
    {
        return Err(PlannerError::BadRequest(
            "profile_picture must be a plain filename".to_string(),
        ));
    }

    Ok(ProfileChanges {
        name: required("name", request.name)?,
        surname: required("surname", request.surname)?,
        email,
        profile_picture,
    })
}

pub async fn update_user(
    state: &ApiState,
    acting: &AuthUser,
    user_id: Uuid,
    request: UpdateUserRequest,
) -> PlannerResult<UpdateUserResponse> {
    ensure_owner(acting.user_id, user_id, "user")?;
    let changes = profile_changes(request)?;

    // Email uniqueness is decided by the store in the same statement.
    let user = match state.users.update_profile(user_id, &changes).await? {
        ProfileUpdate::Updated(user) => user,
        ProfileUpdate::UserNotFound => {
            return Err(PlannerError::NotFound(format!("User with ID {} not found", user_id)));
        }
        ProfileUpdate::EmailTaken => {
            return Err(PlannerError::Conflict("Email already in use".to_string()));
        }
    };

    info!(user_id = %user_id, "Profile updated");

    Ok(UpdateUserResponse {
        message: "User updated successfully".to_string(),
        user: user.into_user(&state.pictures_base_url),
    })
}

pub async fn check_password(
    state: &ApiState,
    acting: &AuthUser,
    user_id: Uuid,
    request: CheckPasswordRequest,
) -> PlannerResult<CheckPasswordResponse> {
    ensure_owner(acting.user_id, user_id, "user")?;

    let user = load_user(state, user_id).await?;
    let valid = verify_password(&user.password_hash, &request.password)?;

    Ok(CheckPasswordResponse { valid })
}

pub async fn update_password(
    state: &ApiState,
    acting: &AuthUser,
    user_id: Uuid,
    request: UpdatePasswordRequest,
) -> PlannerResult<UpdatePasswordResponse> {
    ensure_owner(acting.user_id, user_id, "user")?;

    if request.new_password.is_empty() {
        return Err(PlannerError::BadRequest("Missing new password".to_string()));
    }

    let password_hash = hash_password(&request.new_password)?;
    if !state.users.set_password_hash(user_id, &password_hash).await? {
        return Err(PlannerError::NotFound(format!("User with ID {} not found", user_id)));
    }

    info!(user_id = %user_id, "Password changed");
    Ok(UpdatePasswordResponse { success: true })
}

/// Stores a new profile picture as `user_{id}.{ext}` and records its filename.
pub async fn upload_profile_picture(
    state: &ApiState,
    acting: &AuthUser,
    user_id: Uuid,
    upload: Option<UploadedFile>,
) -> PlannerResult<ProfilePictureResponse> {
    ensure_owner(acting.user_id, user_id, "user")?;

    let upload = upload.ok_or_else(|| {
        PlannerError::BadRequest("No profile_picture file provided".to_string())
    })?;
    let picture = FileIntake::profile_picture(user_id).accept(&upload.filename, upload.data)?;

    let user = load_user(state, user_id).await?;

    state.pictures.save(&picture.filename, &picture.data).await?;

    if !state
        .users
        .set_profile_picture(user_id, &picture.filename)
        .await?
    {
        return Err(PlannerError::NotFound(format!("User with ID {} not found", user_id)));
    }

    // The old file is removed only once the record no longer names it, and
    // only if this flow wrote it for the same user.
    let own_prefix = format!("user_{user_id}.");
    if let Some(previous) = user.profile_picture.as_deref() {
        if previous != picture.filename && previous.starts_with(&own_prefix) {
            if let Err(e) = state.pictures.remove(previous).await {
                warn!(user_id = %user_id, "Could not remove old profile picture: {:#}", e);
            }
        }
    }

    info!(user_id = %user_id, filename = %picture.filename, "Profile picture updated");

    Ok(ProfilePictureResponse {
        profile_picture: format!(
            "{}/{}",
            state.pictures_base_url.trim_end_matches('/'),
            picture.filename
        ),
    })
}
