/// Authentication Routes
///
/// Handles user registration, account activation, login, and refresh-token
/// rotation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, issue_token, validate_token, verify_password, TokenKind};
use crate::configuration::{ApplicationSettings, JwtSettings};
use crate::error::{AppError, AuthError};
use crate::store::{hash_token, RefreshTokenStore, UserStore};
use crate::validators::is_valid_login;

/// Registration and login request body
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub login: String,
    pub password: String,
}

/// Access/refresh token pair returned by login and refresh
#[derive(Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// POST /auth/register
///
/// Register a new user. The account starts inactive; the response body is
/// the plain-text activation URL the caller has to follow.
///
/// # Errors
/// - 400: invalid login or weak password
/// - 401: login already exists
pub async fn register(
    form: web::Json<CredentialsRequest>,
    users: web::Data<dyn UserStore>,
    app_config: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    let login = is_valid_login(&form.login)?;

    if users.find_by_login(&login).await?.is_some() {
        tracing::warn!(login = %login, "Registration attempt for existing login");
        return Err(AppError::Auth(AuthError::LoginTaken));
    }

    let password_hash = hash_password(&form.password)?;
    let user = users.create(&login, &password_hash).await?;

    let activation_url = format!(
        "http://{}:{}/auth/activate/{}",
        app_config.host, app_config.port, user.id
    );

    tracing::info!(user_id = user.id, "User registered, awaiting activation");

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(activation_url))
}

/// GET /auth/activate/{user_id}
///
/// Activate an account after registration (the link returned by /register).
/// Activating an already-active account succeeds and changes nothing.
///
/// # Errors
/// - 401: no user with this id
pub async fn activate_account(
    path: web::Path<i64>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    if users.find_by_id(user_id).await?.is_none() {
        return Err(AppError::Auth(AuthError::UnknownUser));
    }

    users.activate(user_id).await?;

    tracing::info!(user_id = user_id, "Account activated");

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("account successfully activated"))
}

/// POST /auth/login
///
/// Authenticate with login and password. Returns an access/refresh token
/// pair and persists the refresh token.
///
/// Unknown login and wrong password produce the same 401 body, so the
/// response does not reveal which credential was wrong.
///
/// # Errors
/// - 401: unknown login or wrong password
pub async fn login(
    form: web::Json<CredentialsRequest>,
    users: web::Data<dyn UserStore>,
    tokens: web::Data<dyn RefreshTokenStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let user = users
        .find_by_login(form.login.trim())
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    if !verify_password(&form.password, &user.password_hash)? {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    let access = issue_token(user.id, TokenKind::Access, jwt_config.get_ref())?;
    let refresh = issue_token(user.id, TokenKind::Refresh, jwt_config.get_ref())?;

    tokens
        .save(user.id, &hash_token(&refresh.token), refresh.expires_at)
        .await?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(HttpResponse::Ok().json(TokenPairResponse {
        access_token: access.token,
        refresh_token: refresh.token,
    }))
}

/// POST /auth/refresh_token
///
/// Rotate an access/refresh token pair. The refresh token is presented in
/// the Authorization header (with or without a `Bearer ` prefix).
///
/// The stored record is looked up by the user id resolved from the
/// validated token, so a token can only ever match its own user's record.
/// On success the record is overwritten in place; the old refresh token is
/// no longer accepted afterwards.
///
/// # Errors
/// - 401: missing header, invalid/expired token, or no matching stored record
pub async fn refresh_token(
    request: HttpRequest,
    tokens: web::Data<dyn RefreshTokenStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let presented = authorization_token(&request)?;

    let claims = validate_token(&presented, TokenKind::Refresh, jwt_config.get_ref())?;
    let user_id = claims.user_id()?;

    let stored = tokens
        .find(user_id, &hash_token(&presented))
        .await?
        .ok_or(AppError::Auth(AuthError::UnknownToken))?;

    let access = issue_token(user_id, TokenKind::Access, jwt_config.get_ref())?;
    let refresh = issue_token(user_id, TokenKind::Refresh, jwt_config.get_ref())?;

    tokens
        .replace(stored.id, &hash_token(&refresh.token), refresh.expires_at)
        .await?;

    tracing::info!(user_id = user_id, "Token pair rotated");

    Ok(HttpResponse::Ok().json(TokenPairResponse {
        access_token: access.token,
        refresh_token: refresh.token,
    }))
}

fn authorization_token(request: &HttpRequest) -> Result<String, AppError> {
    let header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Auth(AuthError::MissingToken))?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        return Err(AppError::Auth(AuthError::MissingToken));
    }

    Ok(token.to_string())
}
