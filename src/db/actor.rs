use crate::db::models::DbAccount;
use crate::db::patch::{AccountCreate, AccountPatch, DbPatchable};
use crate::db::pool::{apply_schema, connect_sqlite};
use crate::db::schema::USERS_INIT;
use crate::error::StrokedeskError;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use tracing::info;

#[derive(Debug)]
pub enum DbActorMessage {
    /// Insert a new account and return its id.
    Create(AccountCreate, RpcReplyPort<Result<i64, StrokedeskError>>),

    /// Patch an account by id.
    Patch(AccountPatch, RpcReplyPort<Result<bool, StrokedeskError>>),

    FindByUsername(String, RpcReplyPort<Result<Option<DbAccount>, StrokedeskError>>),

    /// Lookup by email; the argument is lowercased before matching.
    FindByEmail(String, RpcReplyPort<Result<Option<DbAccount>, StrokedeskError>>),

    GetById(i64, RpcReplyPort<Result<Option<DbAccount>, StrokedeskError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn create(&self, create: AccountCreate) -> Result<i64, StrokedeskError> {
        ractor::call!(self.actor, DbActorMessage::Create, create)
            .map_err(|e| StrokedeskError::RactorError(format!("DbActor Create RPC failed: {e}")))?
    }

    pub async fn patch(&self, patch: AccountPatch) -> Result<bool, StrokedeskError> {
        ractor::call!(self.actor, DbActorMessage::Patch, patch)
            .map_err(|e| StrokedeskError::RactorError(format!("DbActor Patch RPC failed: {e}")))?
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DbAccount>, StrokedeskError> {
        ractor::call!(
            self.actor,
            DbActorMessage::FindByUsername,
            username.to_string()
        )
        .map_err(|e| {
            StrokedeskError::RactorError(format!("DbActor FindByUsername RPC failed: {e}"))
        })?
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<DbAccount>, StrokedeskError> {
        ractor::call!(self.actor, DbActorMessage::FindByEmail, email.to_string()).map_err(|e| {
            StrokedeskError::RactorError(format!("DbActor FindByEmail RPC failed: {e}"))
        })?
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<DbAccount>, StrokedeskError> {
        ractor::call!(self.actor, DbActorMessage::GetById, id)
            .map_err(|e| StrokedeskError::RactorError(format!("DbActor GetById RPC failed: {e}")))?
    }

    /// Stamp `last_login` with the current time.
    pub async fn touch_last_login(&self, id: i64) -> Result<bool, StrokedeskError> {
        self.patch(AccountPatch {
            id,
            last_login: Some(Utc::now()),
            ..Default::default()
        })
        .await
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let pool = connect_sqlite(&database_url)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool, USERS_INIT)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::Create(create, reply) => {
                let res = self.create_account(&state.pool, create).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Patch(patch, reply) => {
                let res = patch.apply_patch(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::FindByUsername(username, reply) => {
                let res = self.find_one(&state.pool, "username", username).await;
                let _ = reply.send(res);
            }
            DbActorMessage::FindByEmail(email, reply) => {
                let res = self
                    .find_one(&state.pool, "email", email.trim().to_lowercase())
                    .await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetById(id, reply) => {
                let res = self.get_by_id(&state.pool, id).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, created_at, last_login, is_active";

impl DbActor {
    async fn create_account(
        &self,
        pool: &SqlitePool,
        create: AccountCreate,
    ) -> Result<i64, StrokedeskError> {
        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, password_hash, created_at, is_active)
            VALUES (?, ?, ?, ?, 1)
            RETURNING id
            "#,
        )
        .bind(create.username)
        .bind(create.email.to_lowercase())
        .bind(create.password_hash)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(id)
    }

    /// `column` is one of the fixed names above, never caller input.
    async fn find_one(
        &self,
        pool: &SqlitePool,
        column: &'static str,
        value: String,
    ) -> Result<Option<DbAccount>, StrokedeskError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE {column} = ?");
        let row = sqlx::query_as::<_, DbAccount>(&sql)
            .bind(value)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    async fn get_by_id(
        &self,
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<DbAccount>, StrokedeskError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = ?");
        let row = sqlx::query_as::<_, DbAccount>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }
}

/// Spawn the account database actor and return a cloneable handle.
///
/// The actor is unnamed so several stores may coexist in one process.
pub async fn spawn(database_url: &str) -> Result<DbActorHandle, StrokedeskError> {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .map_err(|e| StrokedeskError::RactorError(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}
