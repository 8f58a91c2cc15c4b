use axum::http::{header, HeaderMap, HeaderValue};
use noteplane::authz::types::{AccountKind, Action, AdminRole, Module, OrgModule, UserRole};
use noteplane::{entities, storage};
use sea_orm::DatabaseConnection;

/// Builder for creating admin accounts
pub struct AdminBuilder {
    email: String,
    password: String,
    role: AdminRole,
}

impl AdminBuilder {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            password: "password123".to_string(),
            role: AdminRole::Moderator,
        }
    }

    pub fn platform_admin(mut self) -> Self {
        self.role = AdminRole::PlatformAdmin;
        self
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> entities::admin::Model {
        storage::create_admin(
            db,
            storage::NewAdmin {
                first_name: "Test".to_string(),
                last_name: "Admin".to_string(),
                email: self.email,
                phone: String::new(),
                password: self.password,
                role: self.role,
            },
        )
        .await
        .expect("Failed to create test admin")
    }
}

/// Builder for creating organization accounts
pub struct OrganizationBuilder {
    name: String,
    email: String,
    password: String,
}

impl OrganizationBuilder {
    pub fn new(email: &str) -> Self {
        Self {
            name: "Test Org".to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> entities::organization::Model {
        storage::create_organization(
            db,
            storage::NewOrganization {
                name: self.name,
                email: self.email,
                phone: String::new(),
                password: self.password,
            },
        )
        .await
        .expect("Failed to create test organization")
    }
}

/// Builder for creating organization-scoped user accounts
pub struct UserBuilder {
    email: String,
    password: String,
    role: UserRole,
    organization_id: String,
}

impl UserBuilder {
    pub fn new(email: &str, organization_id: &str) -> Self {
        Self {
            email: email.to_string(),
            password: "password123".to_string(),
            role: UserRole::BaseUser,
            organization_id: organization_id.to_string(),
        }
    }

    pub fn moderator(mut self) -> Self {
        self.role = UserRole::Moderator;
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> entities::user::Model {
        storage::create_user(
            db,
            storage::NewUser {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: self.email,
                phone: String::new(),
                password: self.password,
                role: self.role,
                organization_id: self.organization_id,
            },
        )
        .await
        .expect("Failed to create test user")
    }
}

/// Create a platform permission, wrap it in a fresh group, and assign the
/// group to the given admin. Returns the group id so tests can revoke it.
pub async fn grant_admin(
    db: &DatabaseConnection,
    admin_id: &str,
    action: Action,
    module: Module,
) -> String {
    let perm = storage::create_admin_permission(db, action, module)
        .await
        .expect("Failed to create admin permission");
    let group = storage::create_admin_group(db, "test group", &[perm.id])
        .await
        .expect("Failed to create admin group");
    storage::set_admin_groups(db, admin_id, &[group.id.clone()])
        .await
        .expect("Failed to assign admin groups");
    group.id
}

/// Organization-catalog counterpart of [`grant_admin`].
pub async fn grant_user(
    db: &DatabaseConnection,
    organization_id: &str,
    user_id: &str,
    action: Action,
    module: OrgModule,
) -> String {
    let perm = storage::create_org_permission(db, organization_id, action, module)
        .await
        .expect("Failed to create org permission");
    let group = storage::create_org_group(db, organization_id, "test group", &[perm.id])
        .await
        .expect("Failed to create org group");
    storage::set_user_groups(db, user_id, &[group.id.clone()])
        .await
        .expect("Failed to assign user groups");
    group.id
}

/// Open a session for the account and return headers carrying its token.
pub async fn login(db: &DatabaseConnection, account_id: &str, kind: AccountKind) -> HeaderMap {
    let session = storage::create_session(db, account_id, kind, 3600)
        .await
        .expect("Failed to create session");
    bearer_headers(&session.session_id)
}

pub fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("invalid header value"),
    );
    headers
}
