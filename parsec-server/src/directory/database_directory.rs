use super::GroupDirectory;
use crate::errors::directory_error::DirectoryError;
use crate::models::raid_group::RaidGroup;
use crate::schema::raid_groups;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use diesel::{
    ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper,
    SqliteConnection,
    connection::SimpleConnection,
    dsl::insert_into,
    r2d2::{self, ConnectionManager, CustomizeConnection, Pool},
    result::{DatabaseErrorKind, Error as QueryError},
    sql_query,
};
use log::info;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS raid_groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    name TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    admin_password TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL
)";

// Writers wait for each other instead of failing with "database is locked"
const CONNECTION_PRAGMAS: &str = "PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL;";

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, connection: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        connection
            .batch_execute(CONNECTION_PRAGMAS)
            .map_err(r2d2::Error::QueryError)
    }
}

/// Group directory backed by a SQLite database.
pub struct DatabaseDirectory {
    pool: Pool<ConnectionManager<SqliteConnection>>,
}

impl DatabaseDirectory {
    /// Opens the database at `database_url`, creating the table if needed.
    pub fn open(database_url: &str) -> Result<Self, DirectoryError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .test_on_check_out(true)
            .connection_customizer(Box::new(SqlitePragmas))
            .build(manager)?;

        let connection = &mut pool.get()?;
        sql_query(CREATE_TABLE).execute(connection)?;

        Ok(DatabaseDirectory { pool })
    }

    fn find(&self, name: &str) -> Result<Option<RaidGroup>, DirectoryError> {
        let connection = &mut self.pool.get()?;
        Ok(raid_groups::table
            .filter(raid_groups::name.eq(name))
            .select(RaidGroup::as_select())
            .first(connection)
            .optional()?)
    }
}

fn hash(password: &str) -> Result<String, DirectoryError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(DirectoryError::Hash)
}

fn verify(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed_hash| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    })
}

impl GroupDirectory for DatabaseDirectory {
    fn create(
        &self,
        name: &str,
        password: &str,
        admin_password: &str,
    ) -> Result<i32, DirectoryError> {
        if name.is_empty() || password.is_empty() || admin_password.is_empty() {
            return Err(DirectoryError::MissingFields);
        }

        let password_hash = hash(password)?;
        let admin_password_hash = hash(admin_password)?;
        let connection = &mut self.pool.get()?;

        // Insert and id lookup happen under one write lock
        let inserted = connection.immediate_transaction(|connection| {
            insert_into(raid_groups::table)
                .values((
                    raid_groups::name.eq(name),
                    raid_groups::password.eq(&password_hash),
                    raid_groups::admin_password.eq(&admin_password_hash),
                    raid_groups::created_at.eq(Utc::now().naive_utc()),
                ))
                .execute(connection)?;

            raid_groups::table
                .filter(raid_groups::name.eq(name))
                .select(raid_groups::id)
                .first::<i32>(connection)
        });

        let id = inserted.map_err(|error| match error {
            QueryError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DirectoryError::NameTaken
            }
            error => DirectoryError::Query(error),
        })?;

        info!("Created raid group: '{name}'");
        Ok(id)
    }

    fn delete(&self, name: &str, admin_password: &str) -> Result<(), DirectoryError> {
        let Some(group) = self
            .find(name)?
            .filter(|group| verify(admin_password, &group.admin_password))
        else {
            return Err(DirectoryError::InvalidCredentials);
        };

        let connection = &mut self.pool.get()?;
        diesel::delete(raid_groups::table.find(group.id)).execute(connection)?;

        info!("Deleted raid group: '{name}'");
        Ok(())
    }

    fn authenticate(&self, name: &str, password: &str) -> Result<Option<i32>, DirectoryError> {
        Ok(self
            .find(name)?
            .filter(|group| verify(password, &group.password))
            .map(|group| group.id))
    }
}
