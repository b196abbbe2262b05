//! User Storage
//! Mission: Manage user accounts on the shared SQLite database

use crate::auth::models::{User, UserRole};
use crate::db::Database;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::params;
use tracing::info;

/// Fields needed to insert a new account (password already hashed)
#[derive(Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telephone_number: String,
    pub address: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// User storage over the shared SQLite handle
pub struct UserStore {
    db: Database,
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let role_str: String = row.get(7)?;
    Ok(User {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        telephone_number: row.get(4)?,
        address: row.get(5)?,
        password_hash: row.get(6)?,
        role: UserRole::from_str(&role_str).unwrap_or(UserRole::User),
        created_at: row.get(8)?,
    })
}

/// True when an insert failed on the email UNIQUE constraint
pub fn is_duplicate_email(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl UserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new account. The UNIQUE index on email arbitrates
    /// concurrent registrations; check failures with [`is_duplicate_email`].
    pub fn create_user(&self, new_user: NewUser) -> Result<User> {
        let created_at = Utc::now().to_rfc3339();

        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO users (first_name, last_name, email, telephone_number, address, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new_user.first_name,
                new_user.last_name,
                new_user.email,
                new_user.telephone_number,
                new_user.address,
                new_user.password_hash,
                new_user.role.as_str(),
                created_at,
            ],
        )
        .context("Failed to insert user")?;
        let id = conn.last_insert_rowid();
        drop(conn);

        info!(
            "✅ Created user: {} ({})",
            new_user.email,
            new_user.role.as_str()
        );

        Ok(User {
            id,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            telephone_number: new_user.telephone_number,
            address: new_user.address,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at,
        })
    }

    /// Get user by email
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, email, telephone_number, address, password_hash, role, created_at
             FROM users WHERE email = ?1",
        )?;

        let user_result = stmt.query_row(params![email], row_to_user);

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get user by id
    pub fn find_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, email, telephone_number, address, password_hash, role, created_at
             FROM users WHERE id = ?1",
        )?;

        let user_result = stmt.query_row(params![user_id], row_to_user);

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether any admin account exists yet
    pub fn admin_exists(&self) -> Result<bool> {
        let conn = self.db.lock();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE role = 'admin'",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin users")?;

        Ok(count > 0)
    }

    /// Replace a user's password hash, returning false when the id is gone
    pub fn update_password_hash(&self, user_id: i64, password_hash: &str) -> Result<bool> {
        let conn = self.db.lock();

        let rows_affected = conn
            .execute(
                "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                params![password_hash, user_id],
            )
            .context("Failed to update password")?;
        drop(conn);

        if rows_affected > 0 {
            info!("🔑 Password updated for user {}", user_id);
        }

        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (UserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db = Database::open(temp_file.path().to_str().unwrap()).unwrap();
        (UserStore::new(db), temp_file)
    }

    fn new_user(email: &str, role: UserRole) -> NewUser {
        NewUser {
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            email: email.to_string(),
            telephone_number: "0771234567".to_string(),
            address: "1 Main St".to_string(),
            password_hash: "fake-hash".to_string(),
            role,
        }
    }

    #[test]
    fn test_create_and_find_by_email() {
        let (store, _temp) = create_test_store();

        let created = store
            .create_user(new_user("alice@example.com", UserRole::User))
            .unwrap();
        assert!(created.id > 0);

        let found = store.find_by_email("alice@example.com").unwrap();
        assert!(found.is_some());

        let found = found.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.email, "alice@example.com");
        assert_eq!(found.role, UserRole::User);
    }

    #[test]
    fn test_find_missing_returns_none() {
        let (store, _temp) = create_test_store();

        assert!(store.find_by_email("ghost@example.com").unwrap().is_none());
        assert!(store.find_by_id(9999).unwrap().is_none());
    }

    #[test]
    fn test_find_by_id() {
        let (store, _temp) = create_test_store();

        let created = store
            .create_user(new_user("bob@example.com", UserRole::Admin))
            .unwrap();

        let found = store.find_by_id(created.id).unwrap().unwrap();
        assert_eq!(found.email, "bob@example.com");
        assert_eq!(found.role, UserRole::Admin);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (store, _temp) = create_test_store();

        store
            .create_user(new_user("alice@example.com", UserRole::User))
            .unwrap();

        let err = store
            .create_user(new_user("alice@example.com", UserRole::User))
            .unwrap_err();
        assert!(is_duplicate_email(&err));
    }

    #[test]
    fn test_admin_exists_flips() {
        let (store, _temp) = create_test_store();

        assert!(!store.admin_exists().unwrap());

        store
            .create_user(new_user("user@example.com", UserRole::User))
            .unwrap();
        assert!(!store.admin_exists().unwrap());

        store
            .create_user(new_user("admin@example.com", UserRole::Admin))
            .unwrap();
        assert!(store.admin_exists().unwrap());
    }

    #[test]
    fn test_update_password_hash() {
        let (store, _temp) = create_test_store();

        let created = store
            .create_user(new_user("alice@example.com", UserRole::User))
            .unwrap();

        assert!(store.update_password_hash(created.id, "new-hash").unwrap());
        let reloaded = store.find_by_id(created.id).unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "new-hash");

        assert!(!store.update_password_hash(9999, "new-hash").unwrap());
    }
}
