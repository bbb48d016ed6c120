use planner_core::{
    credentials::normalize_email,
    errors::{PlannerError, PlannerResult},
    models::auth::{
        ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
        RegisterResponse,
    },
};
use planner_db::models::NewUser;
use tracing::info;

use crate::{
    middleware::auth::{hash_password, verify_password},
    services::dispatch,
    ApiState,
};

/// Message returned by `POST /forgot` whether or not the email is known.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists for that email, a new password has been sent to it.";

/// Checks a username-or-email credential and issues a login token.
pub async fn login(state: &ApiState, request: LoginRequest) -> PlannerResult<LoginResponse> {
    let credential = request.credential.trim();
    if credential.is_empty() || request.password.is_empty() {
        return Err(PlannerError::BadRequest(
            "Missing credential or password".to_string(),
        ));
    }

    let user = state
        .users
        .get_user_by_credential(credential)
        .await?
        .ok_or_else(|| PlannerError::NotFound("User not found".to_string()))?;

    if !verify_password(&user.password_hash, &request.password)? {
        return Err(PlannerError::Unauthorized("Incorrect password".to_string()));
    }

    let token = state.tokens.issue(user.id, &user.username)?;
    info!(user_id = %user.id, "User logged in");

    Ok(LoginResponse {
        success: true,
        user_id: user.id,
        username: user.username,
        email: user.email,
        token,
    })
}

/// Creates an account and sends the welcome mail.
pub async fn register(
    state: &ApiState,
    request: RegisterRequest,
) -> PlannerResult<RegisterResponse> {
    let name = request.name.trim();
    let surname = request.surname.trim();
    let username = request.username.trim();
    let email = normalize_email(&request.email);

    if [name, surname, username, email.as_str(), request.password.as_str()]
        .iter()
        .any(|field| field.is_empty())
    {
        return Err(PlannerError::BadRequest("All fields required".to_string()));
    }
    if !email.contains('@') {
        return Err(PlannerError::BadRequest("Invalid email address".to_string()));
    }

    let new_user = NewUser {
        name: name.to_string(),
        surname: surname.to_string(),
        username: username.to_string(),
        email,
        password_hash: hash_password(&request.password)?,
    };

    let user = state
        .users
        .create_user(&new_user)
        .await?
        .ok_or_else(|| PlannerError::Conflict("Username or email already in use".to_string()))?;

    info!(user_id = %user.id, username = %user.username, "User registered");

    dispatch("sign_up", &user.email, state.notifier.on_sign_up(&user.email)).await;

    Ok(RegisterResponse {
        message: "Registered".to_string(),
        user_id: user.id,
    })
}

/// Mails a freshly generated password to a known address.
///
/// The stored password only changes once the mail went out. The response is
/// identical for known and unknown addresses.
pub async fn forgot_password(
    state: &ApiState,
    request: ForgotPasswordRequest,
) -> PlannerResult<MessageResponse> {
    let email = normalize_email(&request.email);
    if email.is_empty() {
        return Err(PlannerError::BadRequest("email is required".to_string()));
    }

    if let Some(user) = state.users.get_user_by_email(&email).await? {
        let sent = dispatch(
            "forgot_password",
            &user.email,
            state.notifier.on_forgot_password(&user.email),
        )
        .await;

        if let Some(new_password) = sent {
            let password_hash = hash_password(&new_password)?;
            state.users.set_password_hash(user.id, &password_hash).await?;
            info!(user_id = %user.id, "Password reset by email");
        }
    }

    Ok(MessageResponse {
        message: FORGOT_PASSWORD_MESSAGE.to_string(),
    })
}
