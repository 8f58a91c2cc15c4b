use std::collections::HashSet;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::authz::errors::AuthzError;
use crate::authz::types::{Action, Module, OrgModule};
use crate::entities;
use crate::storage;

/// A permission group as the expansion algorithm sees it: just the
/// permission ids it grants.
#[derive(Debug, Clone)]
pub struct GroupRecord {
    pub id: String,
    pub permission_ids: Vec<String>,
}

/// A catalog entry: one (action, module) pair that can be granted.
#[derive(Debug, Clone, Copy)]
pub struct PermissionRecord<M> {
    pub action: Action,
    pub module: M,
}

/// Read access to one kind-specific permission catalog. The resolver takes
/// catalogs as parameters so tests can substitute counting fakes.
#[allow(async_fn_in_trait)]
pub trait Catalog {
    type Module: Copy + PartialEq;

    /// Batch-fetch groups by id. Ids with no matching group are skipped.
    async fn groups_by_ids(&self, ids: &[String]) -> Result<Vec<GroupRecord>, AuthzError>;

    /// Batch-fetch permissions by id. Rows with an unrecognized action or
    /// module are skipped.
    async fn permissions_by_ids(
        &self,
        ids: &HashSet<String>,
    ) -> Result<Vec<PermissionRecord<Self::Module>>, AuthzError>;
}

/// Group-permission expansion: does any group in `group_ids` grant
/// (`action`, `module`)?
///
/// Exactly two batched lookups regardless of group count: one for the
/// groups, one for the de-duplicated union of their permission ids. An empty
/// group set (or a union that comes back empty) returns false without
/// touching the store.
pub async fn expand<C: Catalog>(
    catalog: &C,
    group_ids: &[String],
    action: Action,
    module: C::Module,
) -> Result<bool, AuthzError> {
    if group_ids.is_empty() {
        return Ok(false);
    }

    let groups = catalog.groups_by_ids(group_ids).await?;

    let mut permission_ids: HashSet<String> = HashSet::new();
    for group in groups {
        permission_ids.extend(group.permission_ids);
    }
    if permission_ids.is_empty() {
        return Ok(false);
    }

    let permissions = catalog.permissions_by_ids(&permission_ids).await?;
    Ok(permissions
        .iter()
        .any(|p| p.action == action && p.module == module))
}

/// Platform-level catalog backed by the admin permission tables.
pub struct AdminCatalog<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AdminCatalog<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

impl Catalog for AdminCatalog<'_> {
    type Module = Module;

    async fn groups_by_ids(&self, ids: &[String]) -> Result<Vec<GroupRecord>, AuthzError> {
        use entities::admin_permission_group::{Column, Entity};

        let models = Entity::find()
            .filter(Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db)
            .await?;

        Ok(models
            .into_iter()
            .map(|m| GroupRecord {
                id: m.id,
                permission_ids: storage::decode_id_list(&m.permissions),
            })
            .collect())
    }

    async fn permissions_by_ids(
        &self,
        ids: &HashSet<String>,
    ) -> Result<Vec<PermissionRecord<Module>>, AuthzError> {
        use entities::admin_permission::{Column, Entity};

        let models = Entity::find()
            .filter(Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db)
            .await?;

        Ok(models
            .into_iter()
            .filter_map(|m| match (Action::parse(&m.action), Module::parse(&m.module)) {
                (Some(action), Some(module)) => Some(PermissionRecord { action, module }),
                _ => {
                    tracing::warn!(
                        permission = %m.id,
                        action = %m.action,
                        module = %m.module,
                        "skipping admin permission with unrecognized action/module"
                    );
                    None
                }
            })
            .collect())
    }
}

/// Organization-scoped catalog backed by the org permission tables.
pub struct OrgCatalog<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OrgCatalog<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

impl Catalog for OrgCatalog<'_> {
    type Module = OrgModule;

    async fn groups_by_ids(&self, ids: &[String]) -> Result<Vec<GroupRecord>, AuthzError> {
        use entities::org_permission_group::{Column, Entity};

        let models = Entity::find()
            .filter(Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db)
            .await?;

        Ok(models
            .into_iter()
            .map(|m| GroupRecord {
                id: m.id,
                permission_ids: storage::decode_id_list(&m.permissions),
            })
            .collect())
    }

    async fn permissions_by_ids(
        &self,
        ids: &HashSet<String>,
    ) -> Result<Vec<PermissionRecord<OrgModule>>, AuthzError> {
        use entities::org_permission::{Column, Entity};

        let models = Entity::find()
            .filter(Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db)
            .await?;

        Ok(models
            .into_iter()
            .filter_map(|m| match (Action::parse(&m.action), OrgModule::parse(&m.module)) {
                (Some(action), Some(module)) => Some(PermissionRecord { action, module }),
                _ => {
                    tracing::warn!(
                        permission = %m.id,
                        action = %m.action,
                        module = %m.module,
                        "skipping org permission with unrecognized action/module"
                    );
                    None
                }
            })
            .collect())
    }
}
