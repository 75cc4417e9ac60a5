use std::sync::Arc;

use sqlx::PgPool;

use crate::password::Argon2Hasher;
use crate::users::{repo::PgUserRepo, rpc::UsersRpc, services::UserServiceImpl};

#[derive(Clone)]
pub struct AppState {
    pub users: UsersRpc,
}

impl AppState {
    pub fn init(db: PgPool) -> Self {
        let service = UserServiceImpl::new(Arc::new(PgUserRepo::new(db)), Arc::new(Argon2Hasher));
        Self::from_parts(UsersRpc::new(Arc::new(service)))
    }

    pub fn from_parts(users: UsersRpc) -> Self {
        Self { users }
    }
}
