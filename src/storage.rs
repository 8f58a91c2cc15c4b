use std::fmt::Write as _;

use chrono::Utc;
use rand::RngCore;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::authz::types::{AccountKind, Action, AdminRole, Module, OrgModule, UserRole};
use crate::entities;
use crate::errors::AppError;
use crate::settings::Database as DbCfg;

pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, AppError> {
    let db = Database::connect(&cfg.url).await?;
    Ok(db)
}

/// 24 lowercase hex characters: 4-byte unix timestamp prefix + 8 random
/// bytes, so ids sort by creation time.
pub fn record_id() -> String {
    let ts = (Utc::now().timestamp() as u32).to_be_bytes();
    let mut tail = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut tail);

    let mut id = String::with_capacity(24);
    for b in ts.iter().chain(tail.iter()) {
        let _ = write!(id, "{b:02x}");
    }
    id
}

/// Id sets (permission groups on accounts, permission ids on groups) are
/// stored as JSON string arrays.
pub fn encode_id_list(ids: &[String]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string())
}

/// Malformed stored JSON decodes to the empty set; downstream that is a
/// plain denial.
pub fn decode_id_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn hash_password(password: &str) -> Result<String, AppError> {
    use argon2::password_hash::{rand_core::OsRng, SaltString};
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Other(format!("Password hashing failed: {}", e)))
}

fn password_matches(password: &str, hash: &str) -> Result<bool, AppError> {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Other(format!("Invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

// Account management

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: AdminRole,
}

pub async fn create_admin(
    db: &DatabaseConnection,
    input: NewAdmin,
) -> Result<entities::admin::Model, AppError> {
    let admin = entities::admin::ActiveModel {
        id: Set(record_id()),
        first_name: Set(input.first_name),
        last_name: Set(input.last_name),
        email: Set(input.email),
        phone: Set(input.phone),
        password_hash: Set(hash_password(&input.password)?),
        role: Set(input.role.as_str().to_string()),
        permission_groups: Set("[]".to_string()),
        created_at: Set(Utc::now().timestamp()),
        updated_at: Set(None),
    };
    Ok(admin.insert(db).await?)
}

pub async fn get_admin_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<entities::admin::Model>, AppError> {
    use entities::admin::{Column, Entity};
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

pub async fn set_admin_groups(
    db: &DatabaseConnection,
    id: &str,
    group_ids: &[String],
) -> Result<(), AppError> {
    let admin = entities::Admin::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("admin {}", id)))?;

    let mut active: entities::admin::ActiveModel = admin.into();
    active.permission_groups = Set(encode_id_list(group_ids));
    active.updated_at = Set(Some(Utc::now().timestamp()));
    active.update(db).await?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

pub async fn create_organization(
    db: &DatabaseConnection,
    input: NewOrganization,
) -> Result<entities::organization::Model, AppError> {
    let org = entities::organization::ActiveModel {
        id: Set(record_id()),
        name: Set(input.name),
        email: Set(input.email),
        phone: Set(input.phone),
        password_hash: Set(hash_password(&input.password)?),
        permission_groups: Set("[]".to_string()),
        created_at: Set(Utc::now().timestamp()),
        updated_at: Set(None),
    };
    Ok(org.insert(db).await?)
}

pub async fn get_organization(
    db: &DatabaseConnection,
    id: &str,
) -> Result<Option<entities::organization::Model>, AppError> {
    Ok(entities::Organization::find_by_id(id).one(db).await?)
}

pub async fn get_organization_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<entities::organization::Model>, AppError> {
    use entities::organization::{Column, Entity};
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

pub async fn list_organizations(
    db: &DatabaseConnection,
) -> Result<Vec<entities::organization::Model>, AppError> {
    use entities::organization::{Column, Entity};
    Ok(Entity::find().order_by_asc(Column::Id).all(db).await?)
}

pub async fn delete_organization(db: &DatabaseConnection, id: &str) -> Result<bool, AppError> {
    let res = entities::Organization::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: UserRole,
    pub organization_id: String,
}

pub async fn create_user(
    db: &DatabaseConnection,
    input: NewUser,
) -> Result<entities::user::Model, AppError> {
    let user = entities::user::ActiveModel {
        id: Set(record_id()),
        first_name: Set(input.first_name),
        last_name: Set(input.last_name),
        email: Set(input.email),
        phone: Set(input.phone),
        password_hash: Set(hash_password(&input.password)?),
        role: Set(input.role.as_str().to_string()),
        organization_id: Set(input.organization_id),
        permission_groups: Set("[]".to_string()),
        created_at: Set(Utc::now().timestamp()),
        updated_at: Set(None),
    };
    Ok(user.insert(db).await?)
}

pub async fn get_user(
    db: &DatabaseConnection,
    id: &str,
) -> Result<Option<entities::user::Model>, AppError> {
    Ok(entities::User::find_by_id(id).one(db).await?)
}

pub async fn get_user_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<entities::user::Model>, AppError> {
    use entities::user::{Column, Entity};
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

pub async fn list_users_for_org(
    db: &DatabaseConnection,
    organization_id: &str,
) -> Result<Vec<entities::user::Model>, AppError> {
    use entities::user::{Column, Entity};
    Ok(Entity::find()
        .filter(Column::OrganizationId.eq(organization_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<entities::user::Model>, AppError> {
    use entities::user::{Column, Entity};
    Ok(Entity::find().order_by_asc(Column::Id).all(db).await?)
}

pub async fn set_user_groups(
    db: &DatabaseConnection,
    id: &str,
    group_ids: &[String],
) -> Result<(), AppError> {
    let user = entities::User::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;

    let mut active: entities::user::ActiveModel = user.into();
    active.permission_groups = Set(encode_id_list(group_ids));
    active.updated_at = Set(Some(Utc::now().timestamp()));
    active.update(db).await?;
    Ok(())
}

pub async fn delete_user(db: &DatabaseConnection, id: &str) -> Result<bool, AppError> {
    let res = entities::User::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

/// Verify credentials for any account kind; returns the account id on
/// success. Credential verification lives here so the authorization engine
/// only ever sees resolved identities.
pub async fn verify_login(
    db: &DatabaseConnection,
    kind: AccountKind,
    email: &str,
    password: &str,
) -> Result<Option<String>, AppError> {
    let (id, hash) = match kind {
        AccountKind::Admin => match get_admin_by_email(db, email).await? {
            Some(a) => (a.id, a.password_hash),
            None => return Ok(None),
        },
        AccountKind::Organization => match get_organization_by_email(db, email).await? {
            Some(o) => (o.id, o.password_hash),
            None => return Ok(None),
        },
        AccountKind::User => match get_user_by_email(db, email).await? {
            Some(u) => (u.id, u.password_hash),
            None => return Ok(None),
        },
    };

    if password_matches(password, &hash)? {
        Ok(Some(id))
    } else {
        Ok(None)
    }
}

// Session management

pub async fn create_session(
    db: &DatabaseConnection,
    account_id: &str,
    kind: AccountKind,
    ttl_secs: i64,
) -> Result<entities::session::Model, AppError> {
    let now = Utc::now().timestamp();
    let session = entities::session::ActiveModel {
        session_id: Set(record_id()),
        account_id: Set(account_id.to_string()),
        account_kind: Set(kind.as_str().to_string()),
        created_at: Set(now),
        expires_at: Set(now + ttl_secs),
    };
    Ok(session.insert(db).await?)
}

pub async fn delete_session(db: &DatabaseConnection, session_id: &str) -> Result<(), AppError> {
    entities::Session::delete_by_id(session_id).exec(db).await?;
    Ok(())
}

// Notes

#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub organization_id: String,
}

pub async fn create_note(
    db: &DatabaseConnection,
    input: NewNote,
) -> Result<entities::note::Model, AppError> {
    let note = entities::note::ActiveModel {
        id: Set(record_id()),
        title: Set(input.title),
        content: Set(input.content),
        author_id: Set(input.author_id),
        organization_id: Set(input.organization_id),
        created_at: Set(Utc::now().timestamp()),
        updated_at: Set(None),
    };
    Ok(note.insert(db).await?)
}

pub async fn get_note(
    db: &DatabaseConnection,
    id: &str,
) -> Result<Option<entities::note::Model>, AppError> {
    Ok(entities::Note::find_by_id(id).one(db).await?)
}

pub async fn list_notes_for_org(
    db: &DatabaseConnection,
    organization_id: &str,
) -> Result<Vec<entities::note::Model>, AppError> {
    use entities::note::{Column, Entity};
    Ok(Entity::find()
        .filter(Column::OrganizationId.eq(organization_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

pub async fn list_notes(
    db: &DatabaseConnection,
) -> Result<Vec<entities::note::Model>, AppError> {
    use entities::note::{Column, Entity};
    Ok(Entity::find().order_by_asc(Column::Id).all(db).await?)
}

pub async fn list_notes_for_author(
    db: &DatabaseConnection,
    author_id: &str,
) -> Result<Vec<entities::note::Model>, AppError> {
    use entities::note::{Column, Entity};
    Ok(Entity::find()
        .filter(Column::AuthorId.eq(author_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

pub async fn update_note(
    db: &DatabaseConnection,
    id: &str,
    title: Option<String>,
    content: Option<String>,
) -> Result<entities::note::Model, AppError> {
    let note = entities::Note::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("note {}", id)))?;

    let mut active: entities::note::ActiveModel = note.into();
    if let Some(title) = title {
        active.title = Set(title);
    }
    if let Some(content) = content {
        active.content = Set(content);
    }
    active.updated_at = Set(Some(Utc::now().timestamp()));
    Ok(active.update(db).await?)
}

pub async fn delete_note(db: &DatabaseConnection, id: &str) -> Result<bool, AppError> {
    let res = entities::Note::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

// Platform permission catalog

pub async fn create_admin_permission(
    db: &DatabaseConnection,
    action: Action,
    module: Module,
) -> Result<entities::admin_permission::Model, AppError> {
    let perm = entities::admin_permission::ActiveModel {
        id: Set(record_id()),
        action: Set(action.as_str().to_string()),
        module: Set(module.as_str().to_string()),
        created_at: Set(Utc::now().timestamp()),
        updated_at: Set(None),
    };
    Ok(perm.insert(db).await?)
}

pub async fn list_admin_permissions(
    db: &DatabaseConnection,
) -> Result<Vec<entities::admin_permission::Model>, AppError> {
    use entities::admin_permission::{Column, Entity};
    Ok(Entity::find().order_by_asc(Column::Id).all(db).await?)
}

pub async fn delete_admin_permission(db: &DatabaseConnection, id: &str) -> Result<bool, AppError> {
    let res = entities::AdminPermission::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

pub async fn create_admin_group(
    db: &DatabaseConnection,
    name: &str,
    permission_ids: &[String],
) -> Result<entities::admin_permission_group::Model, AppError> {
    let group = entities::admin_permission_group::ActiveModel {
        id: Set(record_id()),
        name: Set(name.to_string()),
        permissions: Set(encode_id_list(permission_ids)),
        created_at: Set(Utc::now().timestamp()),
        updated_at: Set(None),
    };
    Ok(group.insert(db).await?)
}

pub async fn list_admin_groups(
    db: &DatabaseConnection,
) -> Result<Vec<entities::admin_permission_group::Model>, AppError> {
    use entities::admin_permission_group::{Column, Entity};
    Ok(Entity::find().order_by_asc(Column::Id).all(db).await?)
}

pub async fn update_admin_group_permissions(
    db: &DatabaseConnection,
    id: &str,
    permission_ids: &[String],
) -> Result<(), AppError> {
    let group = entities::AdminPermissionGroup::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("admin permission group {}", id)))?;

    let mut active: entities::admin_permission_group::ActiveModel = group.into();
    active.permissions = Set(encode_id_list(permission_ids));
    active.updated_at = Set(Some(Utc::now().timestamp()));
    active.update(db).await?;
    Ok(())
}

pub async fn delete_admin_group(db: &DatabaseConnection, id: &str) -> Result<bool, AppError> {
    let res = entities::AdminPermissionGroup::delete_by_id(id)
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}

// Organization permission catalog

pub async fn create_org_permission(
    db: &DatabaseConnection,
    organization_id: &str,
    action: Action,
    module: OrgModule,
) -> Result<entities::org_permission::Model, AppError> {
    let perm = entities::org_permission::ActiveModel {
        id: Set(record_id()),
        action: Set(action.as_str().to_string()),
        module: Set(module.as_str().to_string()),
        organization_id: Set(organization_id.to_string()),
        created_at: Set(Utc::now().timestamp()),
        updated_at: Set(None),
    };
    Ok(perm.insert(db).await?)
}

pub async fn list_org_permissions(
    db: &DatabaseConnection,
    organization_id: &str,
) -> Result<Vec<entities::org_permission::Model>, AppError> {
    use entities::org_permission::{Column, Entity};
    Ok(Entity::find()
        .filter(Column::OrganizationId.eq(organization_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

pub async fn delete_org_permission(db: &DatabaseConnection, id: &str) -> Result<bool, AppError> {
    let res = entities::OrgPermission::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

pub async fn create_org_group(
    db: &DatabaseConnection,
    organization_id: &str,
    name: &str,
    permission_ids: &[String],
) -> Result<entities::org_permission_group::Model, AppError> {
    let group = entities::org_permission_group::ActiveModel {
        id: Set(record_id()),
        name: Set(name.to_string()),
        permissions: Set(encode_id_list(permission_ids)),
        organization_id: Set(organization_id.to_string()),
        created_at: Set(Utc::now().timestamp()),
        updated_at: Set(None),
    };
    Ok(group.insert(db).await?)
}

pub async fn list_org_groups(
    db: &DatabaseConnection,
    organization_id: &str,
) -> Result<Vec<entities::org_permission_group::Model>, AppError> {
    use entities::org_permission_group::{Column, Entity};
    Ok(Entity::find()
        .filter(Column::OrganizationId.eq(organization_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

pub async fn update_org_group_permissions(
    db: &DatabaseConnection,
    id: &str,
    permission_ids: &[String],
) -> Result<(), AppError> {
    let group = entities::OrgPermissionGroup::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("org permission group {}", id)))?;

    let mut active: entities::org_permission_group::ActiveModel = group.into();
    active.permissions = Set(encode_id_list(permission_ids));
    active.updated_at = Set(Some(Utc::now().timestamp()));
    active.update(db).await?;
    Ok(())
}

pub async fn delete_org_group(db: &DatabaseConnection, id: &str) -> Result<bool, AppError> {
    let res = entities::OrgPermissionGroup::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}
