//! Wire messages. Field names follow the lowerCamelCase JSON mapping used by
//! RPC gateways; absent fields take their zero value.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// User as returned to clients. Never carries the password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMessage {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddUserMessage {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteUserMessage {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateUserMessage {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub country: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchUserMessage {
    pub page: i64,
    pub page_size: i64,
    pub filters: Option<SearchFilters>,
}

/// Query-string form of `SearchUserMessage` for the REST gateway
/// (`?page=2&pageSize=5&filters.country=US`).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchUserQuery {
    pub page: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
    #[serde(rename = "filters.country")]
    pub country: Option<String>,
}

impl From<SearchUserQuery> for SearchUserMessage {
    fn from(q: SearchUserQuery) -> Self {
        Self {
            page: q.page,
            page_size: q.page_size,
            filters: q.country.map(|country| SearchFilters { country }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchUserResponse {
    pub users: Vec<UserMessage>,
}

/// Empty response body, serialized as `{}`.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Empty {}
