// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! SQLite store.
//!
//! One connection behind a `parking_lot::Mutex`; every call runs on the
//! blocking pool. Grant and revoke open a transaction spanning
//! `role_permissions` and `role_claims`, so a failure on either table rolls
//! back both. The `(role, permission)` primary key serializes concurrent
//! grants of the same pair.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, Transaction};
use tracing::debug;

use hrms_core::{
    AccessError, AccessResult, NewPrincipal, PermissionId, PermissionSet, Principal,
    PrincipalUpdate, ResourceKind, PERMISSION_CLAIM,
};

use crate::error::{StoreError, StoreResultExt};
use crate::password::PasswordHashing;
use crate::traits::{IdentityStore, RoleClaim, RolePermissionStore};

const SCHEMA_SQL: &str = include_str!("schema.sql");

const PRINCIPAL_COLUMNS: &str = "id, username, email, full_name, created_at";

/// A SQLite implementation of both store traits.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
    hashing: PasswordHashing,
}

impl SqliteStore {
    /// Opens or creates a database file.
    pub fn open(path: impl AsRef<Path>, hashing: PasswordHashing) -> AccessResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).store_err()?;
            }
        }

        let conn = Connection::open(path).store_err()?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
            .store_err()?;
        Self::initialize(&conn).store_err()?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
            hashing,
        })
    }

    /// Creates an in-memory database.
    pub fn in_memory(hashing: PasswordHashing) -> AccessResult<Self> {
        let conn = Connection::open_in_memory().store_err()?;
        Self::initialize(&conn).store_err()?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
            hashing,
        })
    }

    fn initialize(conn: &Connection) -> Result<(), StoreError> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Returns the database path, if file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Runs `f` on the blocking pool with the connection locked.
    async fn call<F, T>(&self, f: F) -> AccessResult<T>
    where
        F: FnOnce(&mut Connection, PasswordHashing) -> AccessResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let hashing = self.hashing;
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();
            f(&mut *conn, hashing)
        })
        .await
        .store_err()?
    }
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

fn role_exists(conn: &Connection, role: &str) -> AccessResult<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM roles WHERE name = ?1)",
        params![role],
        |row| row.get(0),
    )
    .store_err()
}

fn require_role(conn: &Connection, role: &str) -> AccessResult<()> {
    if role_exists(conn, role)? {
        Ok(())
    } else {
        Err(AccessError::not_found(ResourceKind::Role, role))
    }
}

fn require_principal(conn: &Connection, id: &str) -> AccessResult<()> {
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM principals WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )
        .store_err()?;
    if exists {
        Ok(())
    } else {
        Err(AccessError::not_found(ResourceKind::Principal, id))
    }
}

fn principal_from_row(row: &Row<'_>) -> rusqlite::Result<Principal> {
    Ok(Principal {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        full_name: row.get(3)?,
        created_at: row.get::<_, DateTime<Utc>>(4)?,
    })
}

/// Loads a principal and its password hash by email or username.
fn load_login(conn: &Connection, login: &str) -> AccessResult<Option<(Principal, String)>> {
    conn.query_row(
        &format!(
            "SELECT {}, password_hash FROM principals WHERE email = ?1 OR username = ?1",
            PRINCIPAL_COLUMNS
        ),
        params![login],
        |row| Ok((principal_from_row(row)?, row.get::<_, String>(5)?)),
    )
    .optional()
    .store_err()
}

fn load_by_id(conn: &Connection, id: &str) -> AccessResult<Option<(Principal, String)>> {
    conn.query_row(
        &format!(
            "SELECT {}, password_hash FROM principals WHERE id = ?1",
            PRINCIPAL_COLUMNS
        ),
        params![id],
        |row| Ok((principal_from_row(row)?, row.get::<_, String>(5)?)),
    )
    .optional()
    .store_err()
}

/// Fails with `Conflict` if another principal uses the username or email.
fn check_unique(
    conn: &Connection,
    username: &str,
    email: &str,
    except_id: Option<&str>,
) -> AccessResult<()> {
    let except = except_id.unwrap_or("");
    // Usernames and emails share one login namespace.
    for login in [username, email] {
        let taken: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM principals \
                 WHERE (username = ?1 OR email = ?1) AND id <> ?2)",
                params![login, except],
                |row| row.get(0),
            )
            .store_err()?;
        if taken {
            return Err(AccessError::conflict(ResourceKind::Principal, login));
        }
    }
    Ok(())
}

fn insert_grant(tx: &Transaction<'_>, role: &str, permission: &str) -> AccessResult<()> {
    tx.execute(
        "INSERT INTO role_permissions (role, permission) VALUES (?1, ?2)",
        params![role, permission],
    )
    .map_err(|e| {
        if is_constraint_violation(&e) {
            AccessError::grant_conflict(role, permission)
        } else {
            StoreError::from(e).into()
        }
    })?;

    tx.execute(
        "INSERT INTO role_claims (role, claim_type, claim_value) VALUES (?1, ?2, ?3)",
        params![role, PERMISSION_CLAIM, permission],
    )
    .store_err()?;
    Ok(())
}

// =============================================================================
// Role-Permission Store
// =============================================================================

#[async_trait]
impl RolePermissionStore for SqliteStore {
    async fn create_role(&self, role: &str) -> AccessResult<()> {
        let role = role.to_string();
        self.call(move |conn, _| {
            conn.execute(
                "INSERT INTO roles (name, created_at) VALUES (?1, ?2)",
                params![role, Utc::now()],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    AccessError::conflict(ResourceKind::Role, &role)
                } else {
                    StoreError::from(e).into()
                }
            })?;
            debug!(role = %role, "Role created");
            Ok(())
        })
        .await
    }

    async fn delete_role(&self, role: &str) -> AccessResult<()> {
        let role = role.to_string();
        self.call(move |conn, _| {
            let deleted = conn
                .execute("DELETE FROM roles WHERE name = ?1", params![role])
                .store_err()?;
            if deleted == 0 {
                return Err(AccessError::not_found(ResourceKind::Role, &role));
            }
            debug!(role = %role, "Role deleted");
            Ok(())
        })
        .await
    }

    async fn role_exists(&self, role: &str) -> AccessResult<bool> {
        let role = role.to_string();
        self.call(move |conn, _| role_exists(conn, &role)).await
    }

    async fn list_roles(&self) -> AccessResult<Vec<String>> {
        self.call(|conn, _| {
            let mut stmt = conn
                .prepare("SELECT name FROM roles ORDER BY name")
                .store_err()?;
            let roles = stmt
                .query_map([], |row| row.get(0))
                .store_err()?
                .collect::<Result<Vec<String>, _>>()
                .store_err()?;
            Ok(roles)
        })
        .await
    }

    async fn grant(&self, role: &str, permission: &PermissionId) -> AccessResult<()> {
        let role = role.to_string();
        let permission = permission.as_str().to_string();
        self.call(move |conn, _| {
            let tx = conn.transaction().store_err()?;
            require_role(&tx, &role)?;

            let exists: bool = tx
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM role_permissions WHERE role = ?1 AND permission = ?2)",
                    params![role, permission],
                    |row| row.get(0),
                )
                .store_err()?;
            if exists {
                return Err(AccessError::grant_conflict(&role, &permission));
            }

            // Dropping `tx` on error rolls back the grant row.
            insert_grant(&tx, &role, &permission)?;
            tx.commit().store_err()
        })
        .await
    }

    async fn revoke(&self, role: &str, permission: &str) -> AccessResult<()> {
        let role = role.to_string();
        let permission = permission.to_string();
        self.call(move |conn, _| {
            let tx = conn.transaction().store_err()?;
            require_role(&tx, &role)?;

            let deleted = tx
                .execute(
                    "DELETE FROM role_permissions WHERE role = ?1 AND permission = ?2",
                    params![role, permission],
                )
                .store_err()?;
            if deleted == 0 {
                return Err(AccessError::grant_not_found(&role, &permission));
            }

            tx.execute(
                "DELETE FROM role_claims WHERE role = ?1 AND claim_type = ?2 AND claim_value = ?3",
                params![role, PERMISSION_CLAIM, permission],
            )
            .store_err()?;
            tx.commit().store_err()
        })
        .await
    }

    async fn list_for_role(&self, role: &str) -> AccessResult<PermissionSet> {
        let role = role.to_string();
        self.call(move |conn, _| {
            require_role(conn, &role)?;
            let mut stmt = conn
                .prepare("SELECT permission FROM role_permissions WHERE role = ?1")
                .store_err()?;
            let set = stmt
                .query_map(params![role], |row| row.get::<_, String>(0))
                .store_err()?
                .collect::<Result<PermissionSet, _>>()
                .store_err()?;
            Ok(set)
        })
        .await
    }

    async fn list_all(&self) -> AccessResult<PermissionSet> {
        self.call(|conn, _| {
            let mut stmt = conn
                .prepare("SELECT DISTINCT permission FROM role_permissions")
                .store_err()?;
            let set = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .store_err()?
                .collect::<Result<PermissionSet, _>>()
                .store_err()?;
            Ok(set)
        })
        .await
    }

    async fn permissions_for_roles(&self, roles: &[String]) -> AccessResult<PermissionSet> {
        let roles = roles.to_vec();
        self.call(move |conn, _| {
            let mut stmt = conn
                .prepare("SELECT permission FROM role_permissions WHERE role = ?1")
                .store_err()?;
            let mut set = PermissionSet::new();
            for role in &roles {
                let granted = stmt
                    .query_map(params![role], |row| row.get::<_, String>(0))
                    .store_err()?
                    .collect::<Result<Vec<_>, _>>()
                    .store_err()?;
                set.extend(granted);
            }
            Ok(set)
        })
        .await
    }

    async fn grant_count(&self) -> AccessResult<usize> {
        self.call(|conn, _| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM role_permissions", [], |row| row.get(0))
                .store_err()?;
            Ok(usize::try_from(count).unwrap_or_default())
        })
        .await
    }
}

// =============================================================================
// Identity Store
// =============================================================================

#[async_trait]
impl IdentityStore for SqliteStore {
    async fn create_principal(&self, new: NewPrincipal) -> AccessResult<Principal> {
        new.validate()?;
        self.call(move |conn, hashing| {
            check_unique(conn, &new.username, &new.email, None)?;

            let password_hash = hashing.hash(&new.password).store_err()?;
            let principal = Principal {
                id: uuid::Uuid::now_v7().to_string(),
                username: new.username,
                email: new.email,
                full_name: new.full_name,
                created_at: Utc::now(),
            };

            conn.execute(
                "INSERT INTO principals (id, username, email, full_name, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    principal.id,
                    principal.username,
                    principal.email,
                    principal.full_name,
                    password_hash,
                    principal.created_at,
                ],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    AccessError::conflict(ResourceKind::Principal, &principal.username)
                } else {
                    StoreError::from(e).into()
                }
            })?;
            Ok(principal)
        })
        .await
    }

    async fn find_by_id(&self, id: &str) -> AccessResult<Option<Principal>> {
        let id = id.to_string();
        self.call(move |conn, _| Ok(load_by_id(conn, &id)?.map(|(p, _)| p)))
            .await
    }

    async fn find_by_login(&self, login: &str) -> AccessResult<Option<Principal>> {
        let login = login.to_string();
        self.call(move |conn, _| Ok(load_login(conn, &login)?.map(|(p, _)| p)))
            .await
    }

    async fn list_principals(&self) -> AccessResult<Vec<Principal>> {
        self.call(|conn, _| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM principals ORDER BY username",
                    PRINCIPAL_COLUMNS
                ))
                .store_err()?;
            let principals = stmt
                .query_map([], principal_from_row)
                .store_err()?
                .collect::<Result<Vec<_>, _>>()
                .store_err()?;
            Ok(principals)
        })
        .await
    }

    async fn update_principal(
        &self,
        id: &str,
        update: PrincipalUpdate,
    ) -> AccessResult<Principal> {
        update.validate()?;
        let id = id.to_string();
        self.call(move |conn, hashing| {
            let (mut principal, mut password_hash) = load_by_id(conn, &id)?
                .ok_or_else(|| AccessError::not_found(ResourceKind::Principal, &id))?;

            if let (Some(current), Some(new)) = (&update.current_password, &update.new_password) {
                if !hashing.verify(&password_hash, current) {
                    return Err(AccessError::invalid("current_password", "does not match"));
                }
                password_hash = hashing.hash(new).store_err()?;
            }

            if let Some(username) = update.username {
                principal.username = username;
            }
            if let Some(email) = update.email {
                principal.email = email;
            }
            if let Some(full_name) = update.full_name {
                principal.full_name = full_name;
            }
            check_unique(conn, &principal.username, &principal.email, Some(&id))?;

            conn.execute(
                "UPDATE principals SET username = ?2, email = ?3, full_name = ?4, password_hash = ?5
                 WHERE id = ?1",
                params![
                    id,
                    principal.username,
                    principal.email,
                    principal.full_name,
                    password_hash
                ],
            )
            .store_err()?;
            Ok(principal)
        })
        .await
    }

    async fn delete_principal(&self, id: &str) -> AccessResult<()> {
        let id = id.to_string();
        self.call(move |conn, _| {
            let deleted = conn
                .execute("DELETE FROM principals WHERE id = ?1", params![id])
                .store_err()?;
            if deleted == 0 {
                return Err(AccessError::not_found(ResourceKind::Principal, &id));
            }
            Ok(())
        })
        .await
    }

    async fn verify_password(&self, login: &str, password: &str) -> AccessResult<Principal> {
        let login = login.to_string();
        let record = self.call(move |conn, _| load_login(conn, &login)).await?;
        let Some((principal, phc)) = record else {
            return Err(AccessError::AuthenticationFailed);
        };

        let hashing = self.hashing;
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || hashing.verify(&phc, &password))
            .await
            .store_err()?;
        if matches {
            Ok(principal)
        } else {
            Err(AccessError::AuthenticationFailed)
        }
    }

    async fn roles_of(&self, id: &str) -> AccessResult<Vec<String>> {
        let id = id.to_string();
        self.call(move |conn, _| {
            require_principal(conn, &id)?;
            let mut stmt = conn
                .prepare("SELECT role FROM memberships WHERE principal_id = ?1 ORDER BY role")
                .store_err()?;
            let roles = stmt
                .query_map(params![id], |row| row.get(0))
                .store_err()?
                .collect::<Result<Vec<String>, _>>()
                .store_err()?;
            Ok(roles)
        })
        .await
    }

    async fn add_to_role(&self, id: &str, role: &str) -> AccessResult<()> {
        let id = id.to_string();
        let role = role.to_string();
        self.call(move |conn, _| {
            require_role(conn, &role)?;
            require_principal(conn, &id)?;
            conn.execute(
                "INSERT INTO memberships (principal_id, role) VALUES (?1, ?2)",
                params![id, role],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    AccessError::conflict(ResourceKind::Membership, format!("{}/{}", id, role))
                } else {
                    StoreError::from(e).into()
                }
            })?;
            Ok(())
        })
        .await
    }

    async fn remove_from_role(&self, id: &str, role: &str) -> AccessResult<()> {
        let id = id.to_string();
        let role = role.to_string();
        self.call(move |conn, _| {
            require_role(conn, &role)?;
            require_principal(conn, &id)?;
            let deleted = conn
                .execute(
                    "DELETE FROM memberships WHERE principal_id = ?1 AND role = ?2",
                    params![id, role],
                )
                .store_err()?;
            if deleted == 0 {
                return Err(AccessError::not_found(
                    ResourceKind::Membership,
                    format!("{}/{}", id, role),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn users_in_role(&self, role: &str) -> AccessResult<Vec<Principal>> {
        let role = role.to_string();
        self.call(move |conn, _| {
            require_role(conn, &role)?;
            let mut stmt = conn
                .prepare(
                    "SELECT p.id, p.username, p.email, p.full_name, p.created_at
                     FROM principals p JOIN memberships m ON m.principal_id = p.id
                     WHERE m.role = ?1 ORDER BY p.username",
                )
                .store_err()?;
            let members = stmt
                .query_map(params![role], principal_from_row)
                .store_err()?
                .collect::<Result<Vec<_>, _>>()
                .store_err()?;
            Ok(members)
        })
        .await
    }

    async fn role_claims(&self, role: &str) -> AccessResult<Vec<RoleClaim>> {
        let role = role.to_string();
        self.call(move |conn, _| {
            require_role(conn, &role)?;
            let mut stmt = conn
                .prepare(
                    "SELECT claim_type, claim_value FROM role_claims
                     WHERE role = ?1 ORDER BY claim_type, claim_value",
                )
                .store_err()?;
            let claims = stmt
                .query_map(params![role], |row| {
                    Ok(RoleClaim {
                        claim_type: row.get(0)?,
                        value: row.get(1)?,
                    })
                })
                .store_err()?
                .collect::<Result<Vec<_>, _>>()
                .store_err()?;
            Ok(claims)
        })
        .await
    }
}

// =============================================================================
// Tests
// =============================================================================
