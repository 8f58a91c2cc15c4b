use sea_orm::{DatabaseConnection, EntityTrait};

use crate::authz::errors::AuthzError;
use crate::authz::types::{AccountKind, Principal};
use crate::entities;

/// Account identifiers are 24 lowercase hex characters (creation-time
/// sortable; see `storage::record_id`).
pub fn is_well_formed_id(id: &str) -> bool {
    id.len() == 24 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Resolve (kind, id) to the full account record.
///
/// A malformed identifier is reported distinctly from a missing account;
/// both end in denial at the boundary, but operators can tell them apart.
pub async fn resolve(
    db: &DatabaseConnection,
    kind: AccountKind,
    id: &str,
) -> Result<Principal, AuthzError> {
    if !is_well_formed_id(id) {
        return Err(AuthzError::MalformedAccountId(id.to_string()));
    }

    let unresolved = || AuthzError::UnresolvedAccount {
        kind,
        id: id.to_string(),
    };

    match kind {
        AccountKind::Admin => entities::Admin::find_by_id(id)
            .one(db)
            .await?
            .map(Principal::Admin)
            .ok_or_else(unresolved),
        AccountKind::Organization => entities::Organization::find_by_id(id)
            .one(db)
            .await?
            .map(Principal::Organization)
            .ok_or_else(unresolved),
        AccountKind::User => entities::User::find_by_id(id)
            .one(db)
            .await?
            .map(Principal::User)
            .ok_or_else(unresolved),
    }
}
