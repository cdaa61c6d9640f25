// [libs/infra/persistence/src/user_repository.rs]
/*!
 * APARATO: USER REPOSITORY (ESTRATO L3)
 * RESPONSABILIDAD: SNAPSHOT DE USUARIO (BALANCE Y ESTADO)
 */

use async_trait::async_trait;
use libsql::params;

use tracer_domain_models::{User, UserStatus};

use crate::client::DbClient;
use crate::errors::PersistenceError;
use crate::queries;
use crate::traits::UserRepository;

pub struct SqliteUserRepository {
    database_client: DbClient,
}

impl SqliteUserRepository {
    pub fn new(client: DbClient) -> Self {
        Self { database_client: client }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get(&self, user_id: &str) -> Result<Option<User>, PersistenceError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection.query(queries::GET_USER, params![user_id.to_string()]).await?;

        match rows.next().await? {
            Some(row) => {
                let id: String = row.get(0)?;
                let credit_balance: i64 = row.get(1)?;
                let status_text: String = row.get(2)?;
                let status = if status_text == "suspended" { UserStatus::Suspended } else { UserStatus::Active };
                Ok(Some(User { id, credit_balance, status }))
            }
            None => Ok(None),
        }
    }

    async fn ensure_exists(&self, user_id: &str, initial_balance: i64) -> Result<(), PersistenceError> {
        let connection = self.database_client.get_connection()?;
        connection
            .execute(queries::INSERT_USER_IF_ABSENT, params![user_id.to_string(), initial_balance])
            .await?;
        Ok(())
    }
}
