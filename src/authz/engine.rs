use sea_orm::DatabaseConnection;

use crate::authz::catalog::{self, AdminCatalog, Catalog, OrgCatalog};
use crate::authz::errors::AuthzError;
use crate::authz::types::{
    Action, AdminRole, Module, OrgModule, Principal, Resource, UserRole,
};
use crate::entities;
use crate::storage;

/// Outcome of a single authorization check. On allow the caller forwards the
/// resolved principal downstream; on deny it produces a 403-equivalent
/// refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// The authorization resolver: kind-specific policy over the two
/// kind-specific catalogs. Catalogs are injected so tests can substitute
/// in-memory fakes and count store round trips.
pub struct Resolver<A, O> {
    admin_catalog: A,
    org_catalog: O,
}

impl<'a> Resolver<AdminCatalog<'a>, OrgCatalog<'a>> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            admin_catalog: AdminCatalog::new(db),
            org_catalog: OrgCatalog::new(db),
        }
    }
}

impl<A, O> Resolver<A, O>
where
    A: Catalog<Module = Module>,
    O: Catalog<Module = OrgModule>,
{
    pub fn with_catalogs(admin_catalog: A, org_catalog: O) -> Self {
        Self {
            admin_catalog,
            org_catalog,
        }
    }

    /// Dispatch on the principal's kind and apply that kind's policy.
    pub async fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        resource: Resource,
    ) -> Result<Decision, AuthzError> {
        let allowed = match principal {
            Principal::Admin(admin) => self.admin_allows(admin, action, resource).await?,
            Principal::Organization(_) => org_allows(resource),
            Principal::User(user) => self.user_allows(user, action, resource).await?,
        };
        Ok(if allowed { Decision::Allow } else { Decision::Deny })
    }

    /// Admin policy: the `admin` role is a universal bypass, checked before
    /// any catalog access. Moderators expand their groups against the
    /// platform catalog.
    async fn admin_allows(
        &self,
        account: &entities::admin::Model,
        action: Action,
        resource: Resource,
    ) -> Result<bool, AuthzError> {
        match AdminRole::parse(&account.role) {
            Some(AdminRole::PlatformAdmin) => return Ok(true),
            Some(AdminRole::Moderator) => {}
            None => {
                tracing::warn!(account = %account.id, role = %account.role, "admin with unrecognized role; denying");
                return Ok(false);
            }
        }

        // Admin grants live in the platform enumeration; an org-scoped
        // resource can never match.
        let Resource::Platform(module) = resource else {
            return Ok(false);
        };

        let group_ids = storage::decode_id_list(&account.permission_groups);
        catalog::expand(&self.admin_catalog, &group_ids, action, module).await
    }

    /// User policy: base users are hard-denied here (ownership of the
    /// concrete resource is arbitrated by the resource layer, after this
    /// engine says no). Moderators expand against the organization catalog.
    async fn user_allows(
        &self,
        account: &entities::user::Model,
        action: Action,
        resource: Resource,
    ) -> Result<bool, AuthzError> {
        match UserRole::parse(&account.role) {
            Some(UserRole::BaseUser) => return Ok(false),
            Some(UserRole::Moderator) => {}
            None => {
                tracing::warn!(account = %account.id, role = %account.role, "user with unrecognized role; denying");
                return Ok(false);
            }
        }

        let Resource::Org(module) = resource else {
            return Ok(false);
        };

        let group_ids = storage::decode_id_list(&account.permission_groups);
        catalog::expand(&self.org_catalog, &group_ids, action, module).await
    }
}

/// Organization policy: an organization owns its user roster and its notes
/// outright, every action, no group grants consulted. Anything else is
/// denied.
fn org_allows(resource: Resource) -> bool {
    matches!(
        resource,
        Resource::Org(OrgModule::User) | Resource::Org(OrgModule::Note)
    )
}
