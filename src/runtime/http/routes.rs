//! Route handlers.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use super::error::ApiError;
use super::middleware::Caller;
use super::state::AppState;
use crate::core::job::{EmailJob, Job, Notification, ReportJob};
use crate::core::model::{Todo, TodoId, User, UserId};
use crate::infra::Notice;

/// Body of `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Login name.
    pub user_name: String,
    /// Plain password.
    pub password: String,
    /// Optional contact address.
    #[serde(default)]
    pub email: String,
}

/// Body of `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plain password.
    pub password: String,
}

/// Body returned by `POST /login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e.body_text())))
}

fn id<T>(path: Result<Path<T>, PathRejection>, what: &str) -> Result<T, ApiError> {
    path.map(|Path(value)| value)
        .map_err(|_| ApiError::BadRequest(format!("invalid {what} id")))
}

/// Enqueue a side job; failure is logged, never surfaced to the caller.
async fn schedule(state: &AppState, job: Job) {
    let kind = job.kind();
    if let Err(e) = state.pool.enqueue_async(job).await {
        warn!(job = kind, error = %e, "could not schedule job");
    }
}

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let path = state.html_assets_path.join("index.html");
    tokio::fs::read_to_string(&path)
        .await
        .map(Html)
        .map_err(|_| ApiError::NotFound("file not found".into()))
}

/// `POST /users`
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let req = body(payload)?;
    if req.user_name.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("user_name and password are required".into()));
    }

    let user = state
        .users
        .create(User {
            user_id: 0,
            user_name: req.user_name,
            password: req.password,
            email: req.email,
        })
        .await?;
    info!(user_id = user.user_id, "user created");

    if !user.email.is_empty() {
        let welcome = EmailJob::new(
            state.email.clone(),
            vec![user.email.clone()],
            "Welcome",
            format!("Hello {}, your account is ready.", user.user_name),
        );
        match welcome {
            Ok(job) => schedule(&state, job.into()).await,
            Err(e) => warn!(user_id = user.user_id, error = %e, "welcome email not scheduled"),
        }
    }

    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/:id`
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let user_id = id(path, "user")?;
    Ok(Json(state.users.get_by_id(user_id).await?))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let req = body(payload)?;
    let user = state
        .users
        .authenticate(&req.username, &req.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".into()))?;

    let token = state
        .tokens
        .issue(user.user_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(LoginResponse { token }))
}

/// `GET /todos`
pub async fn list_todos(State(state): State<AppState>, caller: Caller) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(state.todos.list(caller.user_id()).await?))
}

/// `POST /todos`
pub async fn create_todo(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<Todo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let todo = body(payload)?;
    if todo.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".into()));
    }

    let stored = state.todos.add(caller.user_id(), todo).await?;
    schedule(&state, Notification::new(format!("New todo: {}", stored.title)).into()).await;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// `GET /todos/:id`
pub async fn get_todo(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<Path<TodoId>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let todo_id = id(path, "todo")?;
    Ok(Json(state.todos.get(caller.user_id(), todo_id).await?))
}

/// `DELETE /todos/:id`
pub async fn delete_todo(
    State(state): State<AppState>,
    caller: Caller,
    path: Result<Path<TodoId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let todo_id = id(path, "todo")?;
    state.todos.delete(caller.user_id(), todo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /todos`
pub async fn delete_all_todos(State(state): State<AppState>, caller: Caller) -> Result<StatusCode, ApiError> {
    state.todos.delete_all(caller.user_id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /todos/report`: snapshot the caller's todos and render them in the background.
pub async fn request_report(State(state): State<AppState>, caller: Caller) -> Result<Response, ApiError> {
    let user = state.users.get_by_id(caller.user_id()).await?;
    let todos = state.todos.list(caller.user_id()).await?;

    let job = ReportJob::new(
        user.user_id,
        user.user_name,
        user.email,
        todos,
        state.renderer.clone(),
        std::sync::Arc::new(state.hub.channel_for(caller.user_id())),
    );
    state.pool.enqueue_async(job.into()).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "PDF generation started. You'll be notified when it's ready for download."
        })),
    )
        .into_response())
}

/// Whether `file` is a plain report name owned by `user_id`.
fn owns_report(file: &str, user_id: UserId) -> bool {
    let plain = !file.contains(['/', '\\']) && !file.contains("..");
    plain && file.ends_with(".pdf") && file.starts_with(&format!("{user_id}_"))
}

/// `GET /download/:file`
pub async fn download(
    State(state): State<AppState>,
    caller: Caller,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    if !owns_report(&file, caller.user_id()) {
        return Err(ApiError::NotFound("report not found".into()));
    }
    let bytes = tokio::fs::read(state.reports_dir.join(&file))
        .await
        .map_err(|_| ApiError::NotFound("report not found".into()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file}\"")),
        ],
        bytes,
    )
        .into_response())
}

/// `GET /notifications`: WebSocket carrying the caller's completion notices.
pub async fn notifications(State(state): State<AppState>, caller: Caller, ws: WebSocketUpgrade) -> Response {
    let notices = state.hub.subscribe();
    ws.on_upgrade(move |socket| forward_notices(socket, caller.user_id(), notices))
}

async fn forward_notices(socket: WebSocket, user_id: UserId, mut notices: broadcast::Receiver<Notice>) {
    info!(user_id = user_id, "notification socket connected");
    let (mut sink, mut stream) = socket.split();

    // Drain client frames so close is noticed while idle.
    let mut incoming = tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut incoming => break,
            notice = notices.recv() => match notice {
                Ok(notice) if notice.user_id == user_id => {
                    let text = String::from_utf8_lossy(&notice.payload).into_owned();
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(user_id = user_id, skipped = skipped, "notification socket lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    incoming.abort();
    info!(user_id = user_id, "notification socket closed");
}
