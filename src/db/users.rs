// src/db/users.rs
use crate::errors::ServerError;
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: i64,
    pub email: String,
    /// PHC string.
    pub password_hash: String,
}

/// Insert a user and return its id. Email should already be normalized.
pub fn create_user(
    conn: &Connection,
    email: &str,
    password_hash: &str,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        "insert into users (email, password_hash, created_at) values (?, ?, ?)",
        params![email, password_hash, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert user failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

pub fn find_user_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<UserCredentials>, ServerError> {
    conn.query_row(
        "select id, email, password_hash from users where email = ?",
        params![email],
        |row| {
            Ok(UserCredentials {
                id: row.get(0)?,
                email: row.get(1)?,
                password_hash: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("user lookup failed: {e}")))
}

pub fn touch_last_login(conn: &Connection, user_id: i64, now: i64) -> Result<(), ServerError> {
    conn.execute(
        "update users set last_login_at = ? where id = ?",
        params![now, user_id],
    )
    .map_err(|e| ServerError::DbError(format!("update last_login_at failed: {e}")))?;
    Ok(())
}

pub fn set_role(conn: &Connection, user_id: i64, role: &str) -> Result<(), ServerError> {
    conn.execute(
        "insert into user_roles (user_id, role) values (?, ?)
         on conflict(user_id) do update set role = excluded.role",
        params![user_id, role],
    )
    .map_err(|e| ServerError::DbError(format!("set role failed: {e}")))?;
    Ok(())
}

pub fn get_role(conn: &Connection, user_id: i64) -> Result<Option<String>, ServerError> {
    conn.query_row(
        "select role from user_roles where user_id = ?",
        params![user_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("role lookup failed: {e}")))
}
