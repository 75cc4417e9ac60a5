use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::users::dto::{
    AddUserMessage, DeleteUserMessage, Empty, SearchUserMessage, SearchUserResponse,
    UpdateUserMessage, UserMessage,
};
use crate::users::services::{AddUser, ServiceError, UpdateUser, User, UserService};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PAGE_SIZE: i64 = 5;

/// RPC status codes surfaced by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    NotFound,
    Internal,
}

impl Code {
    /// Canonical numeric value of the code.
    pub fn value(self) -> i32 {
        match self {
            Code::NotFound => 5,
            Code::Internal => 13,
        }
    }

    fn http_status(self) -> StatusCode {
        match self {
            Code::NotFound => StatusCode::NOT_FOUND,
            Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: Code,
    pub message: String,
}

impl Status {
    pub fn not_found() -> Self {
        Self {
            code: Code::NotFound,
            message: "not found".into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            code: Code::Internal,
            message: "internal error".into(),
        }
    }
}

#[derive(Serialize)]
struct StatusBody<'a> {
    code: i32,
    message: &'a str,
}

impl IntoResponse for Status {
    fn into_response(self) -> Response {
        let body = StatusBody {
            code: self.code.value(),
            message: &self.message,
        };
        (self.code.http_status(), Json(body)).into_response()
    }
}

/// Logs the full error and returns a status that leaks nothing.
fn to_status(op: &'static str, err: ServiceError) -> Status {
    match err {
        ServiceError::NotFound => Status::not_found(),
        err => {
            error!(error = %err, "{op} failed");
            Status::internal()
        }
    }
}

pub fn user_message(u: User) -> UserMessage {
    UserMessage {
        id: u.id.to_string(),
        first_name: u.first_name,
        last_name: u.last_name,
        email: u.email,
        country: u.country,
        created_at: u.created_at,
        updated_at: u.updated_at,
    }
}

/// The `Users` RPC method set. HTTP bindings in `handlers` call into it.
#[derive(Clone)]
pub struct UsersRpc {
    users: Arc<dyn UserService>,
}

impl UsersRpc {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }

    // No field validation happens here; empty values reach storage as-is.
    pub async fn add_user(&self, msg: AddUserMessage) -> Result<UserMessage, Status> {
        let user = self
            .users
            .add_user(AddUser {
                first_name: msg.first_name,
                last_name: msg.last_name,
                email: msg.email,
                country: msg.country,
                password: msg.password,
            })
            .await
            .map_err(|e| to_status("adding user", e))?;
        Ok(user_message(user))
    }

    pub async fn delete_user(&self, msg: DeleteUserMessage) -> Result<Empty, Status> {
        self.users
            .delete_user(&msg.id)
            .await
            .map_err(|e| to_status("deleting user", e))?;
        Ok(Empty {})
    }

    pub async fn update_user(&self, msg: UpdateUserMessage) -> Result<UserMessage, Status> {
        let user = self
            .users
            .update_user(UpdateUser {
                id: msg.id,
                first_name: msg.first_name,
                last_name: msg.last_name,
                email: msg.email,
                country: msg.country,
                password: msg.password,
            })
            .await
            .map_err(|e| to_status("updating user", e))?;
        Ok(user_message(user))
    }

    pub async fn search_user(&self, msg: SearchUserMessage) -> Result<SearchUserResponse, Status> {
        let page = if msg.page == 0 { DEFAULT_PAGE } else { msg.page };
        let page_size = if msg.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            msg.page_size
        };
        let country = msg.filters.map(|f| f.country).unwrap_or_default();

        let users = self
            .users
            .search_user(page, page_size, country)
            .await
            .map_err(|e| to_status("searching users", e))?;
        Ok(SearchUserResponse {
            users: users.into_iter().map(user_message).collect(),
        })
    }
}
