//! End-to-end authorization checks: session extraction, account resolution,
//! and policy evaluation against a real (temporary) database.

mod helpers;

use axum::http::HeaderMap;
use chrono::Utc;
use helpers::{
    bearer_headers, grant_admin, grant_user, login, AdminBuilder, OrganizationBuilder, TestDb,
    UserBuilder,
};
use noteplane::authz::types::{AccountKind, Action, Module, OrgModule, Resource};
use noteplane::authz::{gate, AuthzError};
use noteplane::{entities, storage};
use sea_orm::{ActiveModelTrait, Set};

const ALL_ACTIONS: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

fn all_resources() -> Vec<Resource> {
    vec![
        Resource::Platform(Module::Note),
        Resource::Platform(Module::Organization),
        Resource::Platform(Module::User),
        Resource::Platform(Module::Permission),
        Resource::Org(OrgModule::Note),
        Resource::Org(OrgModule::User),
        Resource::Org(OrgModule::OrgPermission),
    ]
}

#[tokio::test]
async fn platform_admin_is_allowed_everywhere() {
    let db = TestDb::new().await;
    let admin = AdminBuilder::new("root@example.com")
        .platform_admin()
        .create(db.connection())
        .await;
    let headers = login(db.connection(), &admin.id, AccountKind::Admin).await;

    for resource in all_resources() {
        for action in ALL_ACTIONS {
            let principal = gate::require(db.connection(), &headers, action, resource)
                .await
                .unwrap_or_else(|e| panic!("{} on {} refused: {}", action, resource, e));
            assert_eq!(principal.id(), admin.id);
        }
    }
}

#[tokio::test]
async fn moderator_admin_grant_matches_action_and_module_exactly() {
    let db = TestDb::new().await;
    let admin = AdminBuilder::new("mod@example.com").create(db.connection()).await;
    grant_admin(
        db.connection(),
        &admin.id,
        Action::Read,
        Module::Organization,
    )
    .await;
    let headers = login(db.connection(), &admin.id, AccountKind::Admin).await;

    gate::require(
        db.connection(),
        &headers,
        Action::Read,
        Resource::Platform(Module::Organization),
    )
    .await
    .expect("granted permission refused");

    // Same module, different action
    let err = gate::require(
        db.connection(),
        &headers,
        Action::Create,
        Resource::Platform(Module::Organization),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuthzError::PermissionDenied { .. }));

    // Same action, different module
    let err = gate::require(
        db.connection(),
        &headers,
        Action::Read,
        Resource::Platform(Module::User),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuthzError::PermissionDenied { .. }));
}

#[tokio::test]
async fn revocation_is_visible_on_the_next_call() {
    let db = TestDb::new().await;
    let admin = AdminBuilder::new("mod@example.com").create(db.connection()).await;
    grant_admin(db.connection(), &admin.id, Action::Delete, Module::Note).await;
    let headers = login(db.connection(), &admin.id, AccountKind::Admin).await;

    gate::require(
        db.connection(),
        &headers,
        Action::Delete,
        Resource::Platform(Module::Note),
    )
    .await
    .expect("granted permission refused");

    // Pull the group off the account; nothing is cached, so the very next
    // evaluation must deny.
    storage::set_admin_groups(db.connection(), &admin.id, &[])
        .await
        .unwrap();

    let err = gate::require(
        db.connection(),
        &headers,
        Action::Delete,
        Resource::Platform(Module::Note),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuthzError::PermissionDenied { .. }));
}

#[tokio::test]
async fn deleted_group_stops_granting_without_erroring() {
    let db = TestDb::new().await;
    let admin = AdminBuilder::new("mod@example.com").create(db.connection()).await;
    let group_id =
        grant_admin(db.connection(), &admin.id, Action::Update, Module::User).await;
    let headers = login(db.connection(), &admin.id, AccountKind::Admin).await;

    storage::delete_admin_group(db.connection(), &group_id)
        .await
        .unwrap();

    // Membership still names the group; resolution skips it silently.
    let err = gate::require(
        db.connection(),
        &headers,
        Action::Update,
        Resource::Platform(Module::User),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuthzError::PermissionDenied { .. }));
}

#[tokio::test]
async fn organization_owns_its_roster_and_notes_only() {
    let db = TestDb::new().await;
    let org = OrganizationBuilder::new("org@example.com")
        .create(db.connection())
        .await;
    let headers = login(db.connection(), &org.id, AccountKind::Organization).await;

    for module in [OrgModule::User, OrgModule::Note] {
        for action in ALL_ACTIONS {
            gate::require(db.connection(), &headers, action, Resource::Org(module))
                .await
                .unwrap_or_else(|e| panic!("{} on org {} refused: {}", action, module.as_str(), e));
        }
    }

    for resource in [
        Resource::Org(OrgModule::OrgPermission),
        Resource::Platform(Module::Note),
        Resource::Platform(Module::Organization),
        Resource::Platform(Module::User),
        Resource::Platform(Module::Permission),
    ] {
        let err = gate::require(db.connection(), &headers, Action::Read, resource)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::PermissionDenied { .. }));
    }
}

#[tokio::test]
async fn user_moderator_grant_stays_inside_the_org_catalog() {
    let db = TestDb::new().await;
    let org = OrganizationBuilder::new("org@example.com")
        .create(db.connection())
        .await;
    let user = UserBuilder::new("mod@example.com", &org.id)
        .moderator()
        .create(db.connection())
        .await;
    grant_user(
        db.connection(),
        &org.id,
        &user.id,
        Action::Read,
        OrgModule::User,
    )
    .await;
    let headers = login(db.connection(), &user.id, AccountKind::User).await;

    gate::require(
        db.connection(),
        &headers,
        Action::Read,
        Resource::Org(OrgModule::User),
    )
    .await
    .expect("granted permission refused");

    // An org-catalog `user` grant must never leak into the platform module of
    // the same name.
    let err = gate::require(
        db.connection(),
        &headers,
        Action::Read,
        Resource::Platform(Module::User),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuthzError::PermissionDenied { .. }));
}

#[tokio::test]
async fn base_user_is_denied_everywhere() {
    let db = TestDb::new().await;
    let org = OrganizationBuilder::new("org@example.com")
        .create(db.connection())
        .await;
    let user = UserBuilder::new("base@example.com", &org.id)
        .create(db.connection())
        .await;
    // Even with a grant on file, the role gates it off.
    grant_user(
        db.connection(),
        &org.id,
        &user.id,
        Action::Read,
        OrgModule::Note,
    )
    .await;
    let headers = login(db.connection(), &user.id, AccountKind::User).await;

    for resource in all_resources() {
        let err = gate::require(db.connection(), &headers, Action::Read, resource)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::PermissionDenied { .. }));
    }
}

#[tokio::test]
async fn missing_invalid_and_expired_sessions_are_authentication_failures() {
    let db = TestDb::new().await;

    let err = gate::require(
        db.connection(),
        &HeaderMap::new(),
        Action::Read,
        Resource::Org(OrgModule::Note),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuthzError::AuthenticationRequired));

    let err = gate::require(
        db.connection(),
        &bearer_headers("no-such-session"),
        Action::Read,
        Resource::Org(OrgModule::Note),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuthzError::InvalidSession));

    let org = OrganizationBuilder::new("org@example.com")
        .create(db.connection())
        .await;
    let session = storage::create_session(db.connection(), &org.id, AccountKind::Organization, -10)
        .await
        .unwrap();
    let err = gate::require(
        db.connection(),
        &bearer_headers(&session.session_id),
        Action::Read,
        Resource::Org(OrgModule::Note),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuthzError::InvalidSession));
}

#[tokio::test]
async fn account_deleted_behind_a_live_session_is_unresolved() {
    let db = TestDb::new().await;
    let org = OrganizationBuilder::new("org@example.com")
        .create(db.connection())
        .await;
    let user = UserBuilder::new("gone@example.com", &org.id)
        .moderator()
        .create(db.connection())
        .await;
    let headers = login(db.connection(), &user.id, AccountKind::User).await;

    storage::delete_user(db.connection(), &user.id).await.unwrap();

    let err = gate::require(
        db.connection(),
        &headers,
        Action::Read,
        Resource::Org(OrgModule::Note),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuthzError::UnresolvedAccount { .. }));
}

#[tokio::test]
async fn malformed_account_id_is_not_a_lookup() {
    let db = TestDb::new().await;
    let session = storage::create_session(db.connection(), "NOT-A-HEX-ID", AccountKind::User, 3600)
        .await
        .unwrap();

    let err = gate::require(
        db.connection(),
        &bearer_headers(&session.session_id),
        Action::Read,
        Resource::Org(OrgModule::Note),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuthzError::MalformedAccountId(_)));
}

#[tokio::test]
async fn unrecognized_account_kind_is_a_boundary_defect() {
    let db = TestDb::new().await;
    let now = Utc::now().timestamp();
    let session = entities::session::ActiveModel {
        session_id: Set(storage::record_id()),
        account_id: Set("0".repeat(24)),
        account_kind: Set("superuser".to_string()),
        created_at: Set(now),
        expires_at: Set(now + 3600),
    }
    .insert(db.connection())
    .await
    .unwrap();

    let err = gate::require(
        db.connection(),
        &bearer_headers(&session.session_id),
        Action::Read,
        Resource::Org(OrgModule::Note),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuthzError::UnknownAccountKind(_)));
}

#[tokio::test]
async fn login_verifies_credentials_per_kind() {
    let db = TestDb::new().await;
    let org = OrganizationBuilder::new("org@example.com")
        .create(db.connection())
        .await;

    let resolved = storage::verify_login(
        db.connection(),
        AccountKind::Organization,
        "org@example.com",
        "password123",
    )
    .await
    .unwrap();
    assert_eq!(resolved.as_deref(), Some(org.id.as_str()));

    let wrong_password = storage::verify_login(
        db.connection(),
        AccountKind::Organization,
        "org@example.com",
        "nope",
    )
    .await
    .unwrap();
    assert!(wrong_password.is_none());

    // Same email, wrong kind: directories are separate.
    let wrong_kind = storage::verify_login(
        db.connection(),
        AccountKind::Admin,
        "org@example.com",
        "password123",
    )
    .await
    .unwrap();
    assert!(wrong_kind.is_none());
}
