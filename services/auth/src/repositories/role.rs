//! Role and permission resolver
//!
//! Resolves a user's role id into a role name and the flattened set of
//! permission names granted through the `role_permissions` join table.
//!
//! Resolution failure never fails a login. The `resolve_*` methods apply a
//! named fallback policy: a failed or empty role lookup yields the default
//! role name, a failed permission lookup yields the empty set, and either
//! degradation is logged so it stays observable.

use anyhow::Result;
use sqlx::{PgPool, Row};
use tracing::warn;
use uuid::Uuid;

use crate::models::Role;

/// Role name granted when resolution degrades.
pub const DEFAULT_ROLE_NAME: &str = "user";

/// Role repository
#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a role by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, created_at, updated_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Role {
            id: row.get("id"),
            name: row.get("name"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }))
    }

    /// Flattened permission names granted to a role
    pub async fn permission_names(&self, role_id: Uuid) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT p.name
            FROM role_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            WHERE rp.role_id = $1
            ORDER BY p.name
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("name")).collect())
    }

    /// Resolve a role id to its name, degrading to [`DEFAULT_ROLE_NAME`]
    pub async fn resolve_role_name(&self, role_id: Uuid) -> String {
        match self.find_by_id(role_id).await {
            Ok(Some(role)) => role.name,
            Ok(None) => {
                warn!(%role_id, "role lookup found nothing, degrading to default role");
                DEFAULT_ROLE_NAME.to_string()
            }
            Err(e) => {
                warn!(%role_id, error = %e, "role lookup degraded to default role");
                DEFAULT_ROLE_NAME.to_string()
            }
        }
    }

    /// Resolve a role id to its permission names, degrading to the empty set
    pub async fn resolve_permissions(&self, role_id: Uuid) -> Vec<String> {
        match self.permission_names(role_id).await {
            Ok(names) => names,
            Err(e) => {
                warn!(%role_id, error = %e, "permission lookup degraded to empty set");
                Vec::new()
            }
        }
    }
}
