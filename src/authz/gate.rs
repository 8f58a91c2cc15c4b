use axum::http::HeaderMap;
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::authz::directory;
use crate::authz::engine::{Decision, Resolver};
use crate::authz::errors::AuthzError;
use crate::authz::types::{AccountKind, Action, Principal, Resource};
use crate::entities;
use crate::session::SessionToken;

/// Request-time guard: resolve the caller's session to a principal and check
/// it against the (action, resource) the route requires.
///
/// Returns the effective principal on allow so handlers can use it without a
/// second lookup; any failure maps to the structured refusal in
/// [`AuthzError`].
pub async fn require(
    db: &DatabaseConnection,
    headers: &HeaderMap,
    action: Action,
    resource: Resource,
) -> Result<Principal, AuthzError> {
    let (kind, account_id) = session_context(db, headers).await?;
    let principal = directory::resolve(db, kind, &account_id).await?;

    match Resolver::new(db)
        .authorize(&principal, action, resource)
        .await?
    {
        Decision::Allow => Ok(principal),
        Decision::Deny => {
            tracing::warn!(
                account = %principal.id(),
                kind = %kind,
                %action,
                %resource,
                "authorization denied"
            );
            Err(AuthzError::PermissionDenied { action, resource })
        }
    }
}

/// Resolve the verified session context to (account kind, account id).
///
/// An expired or unknown session is an authentication failure; a session row
/// carrying an unrecognized kind string is a boundary defect, not a denial.
pub async fn session_context(
    db: &DatabaseConnection,
    headers: &HeaderMap,
) -> Result<(AccountKind, String), AuthzError> {
    let token = SessionToken::from_headers(headers).ok_or(AuthzError::AuthenticationRequired)?;

    let session = entities::Session::find_by_id(token.session_id)
        .one(db)
        .await?
        .ok_or(AuthzError::InvalidSession)?;

    if Utc::now().timestamp() > session.expires_at {
        return Err(AuthzError::InvalidSession);
    }

    let kind = AccountKind::parse(&session.account_kind)
        .ok_or_else(|| AuthzError::UnknownAccountKind(session.account_kind.clone()))?;

    Ok((kind, session.account_id))
}
