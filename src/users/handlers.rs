use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    state::AppState,
    users::{
        dto::{
            AddUserMessage, DeleteUserMessage, Empty, SearchUserMessage, SearchUserQuery,
            SearchUserResponse, UpdateUserMessage, UserMessage,
        },
        rpc::Status,
    },
};

/// RPC-path bindings: one POST route per method, JSON request message in the body.
pub fn rpc_routes() -> Router<AppState> {
    Router::new()
        .route("/users.Users/AddUser", post(add_user))
        .route("/users.Users/DeleteUser", post(delete_user))
        .route("/users.Users/UpdateUser", post(update_user))
        .route("/users.Users/SearchUser", post(search_user))
}

/// REST gateway bindings onto the same methods.
pub fn gateway_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/users", post(add_user).get(search_user_query))
        .route(
            "/v1/users/:id",
            put(update_user_by_path).delete(delete_user_by_path),
        )
}

#[instrument(skip(state, msg))]
pub async fn add_user(
    State(state): State<AppState>,
    Json(msg): Json<AddUserMessage>,
) -> Result<Json<UserMessage>, Status> {
    state.users.add_user(msg).await.map(Json)
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Json(msg): Json<DeleteUserMessage>,
) -> Result<Json<Empty>, Status> {
    state.users.delete_user(msg).await.map(Json)
}

#[instrument(skip(state))]
pub async fn delete_user_by_path(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Empty>, Status> {
    state
        .users
        .delete_user(DeleteUserMessage { id })
        .await
        .map(Json)
}

#[instrument(skip(state, msg), fields(user_id = %msg.id))]
pub async fn update_user(
    State(state): State<AppState>,
    Json(msg): Json<UpdateUserMessage>,
) -> Result<Json<UserMessage>, Status> {
    state.users.update_user(msg).await.map(Json)
}

#[instrument(skip(state, msg))]
pub async fn update_user_by_path(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut msg): Json<UpdateUserMessage>,
) -> Result<Json<UserMessage>, Status> {
    msg.id = id;
    state.users.update_user(msg).await.map(Json)
}

#[instrument(skip(state))]
pub async fn search_user(
    State(state): State<AppState>,
    Json(msg): Json<SearchUserMessage>,
) -> Result<Json<SearchUserResponse>, Status> {
    state.users.search_user(msg).await.map(Json)
}

#[instrument(skip(state))]
pub async fn search_user_query(
    State(state): State<AppState>,
    Query(query): Query<SearchUserQuery>,
) -> Result<Json<SearchUserResponse>, Status> {
    state.users.search_user(query.into()).await.map(Json)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{
        app::build_app,
        password::PasswordHasher,
        state::AppState,
        users::{
            repo::mock::MemoryUserRepo, rpc::UsersRpc, services::UserServiceImpl,
        },
    };

    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, plain: &str) -> anyhow::Result<String> {
            Ok(format!("hashed:{plain}"))
        }
    }

    fn app() -> axum::Router {
        let service = UserServiceImpl::new(Arc::new(MemoryUserRepo::default()), Arc::new(PlainHasher));
        build_app(AppState::from_parts(UsersRpc::new(Arc::new(service))))
    }

    async fn call(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn jane() -> Value {
        json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "email": "jane@x.com",
            "country": "US",
            "password": "pw"
        })
    }

    #[tokio::test]
    async fn add_update_search_over_rpc_routes() {
        let app = app();

        let (status, created) = call(&app, "POST", "/users.Users/AddUser", Some(jane())).await;
        assert_eq!(status, StatusCode::OK);
        let id = created["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());
        assert_eq!(created["firstName"], "Jane");
        assert_eq!(created["lastName"], "Doe");
        assert_eq!(created["email"], "jane@x.com");
        assert_eq!(created["country"], "US");
        assert!(created.get("password").is_none());

        let mut update = jane();
        update["id"] = json!(id);
        update["country"] = json!("CA");
        let (status, updated) = call(&app, "POST", "/users.Users/UpdateUser", Some(update)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["country"], "CA");
        assert_eq!(updated["createdAt"], created["createdAt"]);

        let (status, found) = call(
            &app,
            "POST",
            "/users.Users/SearchUser",
            Some(json!({"page": 1, "pageSize": 5, "filters": {"country": "ca"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let users = found["users"].as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["id"], json!(id));
        assert_eq!(users[0]["country"], "CA");

        let (_, none) = call(
            &app,
            "POST",
            "/users.Users/SearchUser",
            Some(json!({"filters": {"country": "US"}})),
        )
        .await;
        assert!(none["users"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_missing_user_is_404() {
        let app = app();
        let mut update = jane();
        update["id"] = json!(uuid::Uuid::new_v4().to_string());
        let (status, body) = call(&app, "POST", "/users.Users/UpdateUser", Some(update)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"code": 5, "message": "not found"}));
    }

    #[tokio::test]
    async fn delete_missing_user_succeeds() {
        let app = app();
        let (status, body) = call(
            &app,
            "POST",
            "/users.Users/DeleteUser",
            Some(json!({"id": uuid::Uuid::new_v4().to_string()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        let (status, _) = call(&app, "DELETE", "/v1/users/does-not-exist", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn gateway_routes_cover_crud_and_pagination() {
        let app = app();

        let mut ids = Vec::new();
        for i in 0..7 {
            let mut body = jane();
            body["email"] = json!(format!("user{i}@x.com"));
            let (status, created) = call(&app, "POST", "/v1/users", Some(body)).await;
            assert_eq!(status, StatusCode::OK);
            ids.push(created["id"].as_str().unwrap().to_string());
        }

        let (_, first) = call(&app, "GET", "/v1/users", None).await;
        assert_eq!(first["users"].as_array().unwrap().len(), 5);

        let (_, second) = call(&app, "GET", "/v1/users?page=2&pageSize=5", None).await;
        let second = second["users"].as_array().unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0]["id"], json!(ids[5]));

        let (_, filtered) = call(&app, "GET", "/v1/users?filters.country=us&pageSize=10", None).await;
        assert_eq!(filtered["users"].as_array().unwrap().len(), 7);

        let mut update = jane();
        update["country"] = json!("CA");
        update["id"] = json!("ignored-in-favour-of-path");
        let uri = format!("/v1/users/{}", ids[0]);
        let (status, updated) = call(&app, "PUT", &uri, Some(update)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], json!(ids[0]));
        assert_eq!(updated["country"], "CA");

        let (status, _) = call(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, rest) = call(&app, "GET", "/v1/users?pageSize=10", None).await;
        assert_eq!(rest["users"].as_array().unwrap().len(), 6);
    }
}
