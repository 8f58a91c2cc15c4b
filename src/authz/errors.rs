use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

use crate::authz::types::{AccountKind, Action, Resource};

#[derive(Debug, Error, Diagnostic)]
pub enum AuthzError {
    #[error("authentication required")]
    #[diagnostic(code(noteplane::authz::unauthenticated))]
    AuthenticationRequired,

    #[error("session expired or unknown")]
    #[diagnostic(code(noteplane::authz::invalid_session))]
    InvalidSession,

    /// A valid session referenced an account that no longer exists. From the
    /// caller's point of view this is an authentication failure, not a
    /// missing resource.
    #[error("unable to resolve {kind} account `{id}`")]
    #[diagnostic(code(noteplane::authz::unresolved_account))]
    UnresolvedAccount { kind: AccountKind, id: String },

    /// Kept distinct from [`AuthzError::UnresolvedAccount`] so operators can
    /// tell a garbage identifier from a deleted account, even though both
    /// surface as a 401.
    #[error("malformed account identifier `{0}`")]
    #[diagnostic(
        code(noteplane::authz::malformed_id),
        help("account identifiers are 24 lowercase hex characters")
    )]
    MalformedAccountId(String),

    /// A configuration/programming error at the boundary, never a normal
    /// denial.
    #[error("unknown account kind `{0}`")]
    #[diagnostic(
        code(noteplane::authz::unknown_kind),
        help("account kind must be one of `admin`, `organization`, `user`")
    )]
    UnknownAccountKind(String),

    #[error("insufficient permission for {action} on {resource}")]
    #[diagnostic(code(noteplane::authz::denied))]
    PermissionDenied { action: Action, resource: Resource },

    /// Backing store unreachable during resolution. Fail-closed: surfaced as
    /// a 5xx so "rejected" and "authorization degraded" stay distinguishable.
    #[error("authorization lookup failed: {0}")]
    #[diagnostic(code(noteplane::authz::store))]
    Store(#[from] sea_orm::DbErr),
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthzError::AuthenticationRequired
            | AuthzError::InvalidSession
            | AuthzError::UnresolvedAccount { .. }
            | AuthzError::MalformedAccountId(_) => StatusCode::UNAUTHORIZED,
            AuthzError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            AuthzError::UnknownAccountKind(_) => {
                tracing::error!(error = %self, "account kind not recognized; boundary misconfiguration");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthzError::Store(_) => {
                tracing::error!(error = %self, "authorization store lookup failed");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        let body = json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::types::{Module, OrgModule};

    #[test]
    fn status_mapping() {
        assert_eq!(
            AuthzError::AuthenticationRequired.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthzError::UnresolvedAccount {
                kind: AccountKind::User,
                id: "0".repeat(24),
            }
            .into_response()
            .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthzError::MalformedAccountId("nope".into())
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthzError::PermissionDenied {
                action: Action::Update,
                resource: Resource::Org(OrgModule::Note),
            }
            .into_response()
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthzError::UnknownAccountKind("robot".into())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthzError::Store(sea_orm::DbErr::Custom("store unreachable".into()))
                .into_response()
                .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn denial_message_names_action_and_resource() {
        let err = AuthzError::PermissionDenied {
            action: Action::Delete,
            resource: Resource::Platform(Module::Organization),
        };
        let msg = err.to_string();
        assert!(msg.contains("delete"));
        assert!(msg.contains("platform/organization"));
    }
}
