use tokio::sync::OnceCell;

use crate::domain::repository::RoleRepository;
use crate::domain::types::{DEFAULT_ROLE, Role};
use crate::error::AuthServiceError;

/// Process-wide cache of the default role row.
///
/// Populated at most once and never invalidated: role rows are seeded by the
/// migration and immutable for the process lifetime. If roles ever become
/// mutable this cache must go.
#[derive(Default)]
pub struct DefaultRoleCache {
    cell: OnceCell<Role>,
}

impl DefaultRoleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_load<R: RoleRepository>(
        &self,
        roles: &R,
    ) -> Result<Role, AuthServiceError> {
        self.cell
            .get_or_try_init(|| async {
                roles
                    .find_by_name(DEFAULT_ROLE)
                    .await?
                    .ok_or_else(|| {
                        AuthServiceError::Internal(anyhow::anyhow!(
                            "default role {DEFAULT_ROLE:?} not seeded"
                        ))
                    })
            })
            .await
            .cloned()
    }
}
