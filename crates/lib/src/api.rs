//! HTTP transport for the account operations.
//!
//! Exposes [`Accounts`] over a small JSON API built on axum. Successful
//! responses carry a [`UserView`] body; failures carry a plain-text body and a
//! status derived from the error classification on [`Error`](crate::Error).
//!
//! | Method | Path                        | Operation                    |
//! |--------|-----------------------------|------------------------------|
//! | POST   | `/karen/v1/users/auth`      | authenticate                 |
//! | POST   | `/karen/v1/users/self`      | create (also `/karen/v1/users`) |
//! | GET    | `/karen/v1/users/self`      | read by `User-ID` header     |
//! | GET    | `/karen/v1/users/{user_id}` | read by path                 |
//! | PATCH  | `/karen/v1/users/self`      | partial update               |
//! | DELETE | `/karen/v1/users/self`      | delete (also `/karen/v1/users`) |
//! | GET    | `/health`                   | liveness and store kind      |

use std::future::Future;

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, error};

use crate::{
    Accounts, Error,
    constants::{INCLUDES_PARAM, INTERNAL_SERVER_ERROR, USER_ID_HEADER, USERS_PATH},
    user::{Field, PartialUser, UserView},
};

/// Body of an authentication request.
#[derive(Deserialize, Default)]
#[serde(default)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
}

/// A failed request, ready to be rendered.
#[derive(Debug)]
pub enum ApiError {
    /// The request could not be interpreted at all.
    BadRequest(String),
    /// An account operation failed.
    Service(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Service(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    /// Status code this error is rendered with.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(err) if err.is_validation_error() => StatusCode::BAD_REQUEST,
            ApiError::Service(err) if err.is_authentication_error() => StatusCode::UNAUTHORIZED,
            ApiError::Service(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Service(err) if err.is_conflict() => StatusCode::CONFLICT,
            ApiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(message) => message,
            ApiError::Service(_) if status == StatusCode::NOT_FOUND => {
                "User not found".to_string()
            }
            ApiError::Service(err) if status == StatusCode::INTERNAL_SERVER_ERROR => {
                error!(module = err.module(), error = ?err, "Request failed");
                INTERNAL_SERVER_ERROR.to_string()
            }
            ApiError::Service(err) => err.to_string(),
        };
        (status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Build the router serving the account API.
pub fn router(accounts: Accounts) -> Router {
    let users_self = format!("{USERS_PATH}/self");

    Router::new()
        .route("/health", get(handle_health))
        .route(&format!("{USERS_PATH}/auth"), post(handle_authenticate))
        .route(
            USERS_PATH,
            post(handle_create).delete(handle_delete_self),
        )
        .route(
            &users_self,
            post(handle_create)
                .get(handle_read_self)
                .patch(handle_patch_self)
                .delete(handle_delete_self),
        )
        .route(&format!("{USERS_PATH}/{{user_id}}"), get(handle_read_by_id))
        .with_state(accounts)
}

/// Serve the account API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, accounts: Accounts, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(accounts))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Handler for GET /health
async fn handle_health(State(accounts): State<Accounts>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        backend: accounts.store().kind(),
    })
}

/// Handler for POST /karen/v1/users/auth
async fn handle_authenticate(
    State(accounts): State<Accounts>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<UserView>> {
    let Json(login) = body?;
    let user = accounts
        .authenticate(
            login.email.as_deref().unwrap_or_default(),
            login.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(user.to_view()))
}

/// Handler for POST /karen/v1/users/self and POST /karen/v1/users
async fn handle_create(
    State(accounts): State<Accounts>,
    body: std::result::Result<Json<PartialUser>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = body?;
    let user = accounts.create(request).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("{USERS_PATH}/self"))],
        Json(user.to_view()),
    )
        .into_response())
}

/// Handler for GET /karen/v1/users/self
async fn handle_read_self(
    State(accounts): State<Accounts>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<UserView>> {
    let id = user_id_from_headers(&headers)?;
    let fields = parse_includes(query.as_deref())?;
    Ok(Json(accounts.read_projected(id, &fields).await?))
}

/// Handler for GET /karen/v1/users/{user_id}
async fn handle_read_by_id(
    State(accounts): State<Accounts>,
    Path(user_id): Path<String>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<UserView>> {
    let id = parse_user_id(&user_id)?;
    let fields = parse_includes(query.as_deref())?;
    Ok(Json(accounts.read_projected(id, &fields).await?))
}

/// Handler for PATCH /karen/v1/users/self
async fn handle_patch_self(
    State(accounts): State<Accounts>,
    headers: HeaderMap,
    body: std::result::Result<Json<PartialUser>, JsonRejection>,
) -> ApiResult<Json<UserView>> {
    let id = user_id_from_headers(&headers)?;
    let Json(patch) = body?;
    debug!(user_id = id, ?patch, "Patching user");
    let user = accounts.patch(id, patch).await?;
    Ok(Json(user.to_view()))
}

/// Handler for DELETE /karen/v1/users/self and DELETE /karen/v1/users
async fn handle_delete_self(
    State(accounts): State<Accounts>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let id = user_id_from_headers(&headers)?;
    accounts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn invalid_user_id() -> ApiError {
    ApiError::BadRequest("Invalid user ID".to_string())
}

fn parse_user_id(raw: &str) -> ApiResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(invalid_user_id()),
    }
}

fn user_id_from_headers(headers: &HeaderMap) -> ApiResult<i64> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(invalid_user_id)?;
    parse_user_id(raw)
}

/// Collect the `includes` query values, repeated or comma separated, in
/// first-seen order without duplicates.
fn parse_includes(query: Option<&str>) -> ApiResult<Vec<Field>> {
    let mut fields = Vec::new();
    let Some(query) = query else {
        return Ok(fields);
    };

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if key != INCLUDES_PARAM {
            continue;
        }
        for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let field = name.parse::<Field>().map_err(Error::from)?;
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
    }
    Ok(fields)
}
