use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities;

/// The fixed set of actions a permission can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Action::Read),
            "create" => Some(Action::Create),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform-level protected modules. Granted through the admin catalog only.
///
/// Deliberately a distinct type from [`OrgModule`]: a platform `user` grant
/// and an organization-scoped `user` grant are different things and must
/// never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Note,
    Organization,
    User,
    Permission,
}

impl Module {
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Note => "note",
            Module::Organization => "organization",
            Module::User => "user",
            Module::Permission => "permission",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "note" => Some(Module::Note),
            "organization" => Some(Module::Organization),
            "user" => Some(Module::User),
            "permission" => Some(Module::Permission),
            _ => None,
        }
    }
}

/// Organization-scoped protected modules. Granted through the organization
/// catalog only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgModule {
    Note,
    User,
    OrgPermission,
}

impl OrgModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgModule::Note => "note",
            OrgModule::User => "user",
            OrgModule::OrgPermission => "org_permission",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "note" => Some(OrgModule::Note),
            "user" => Some(OrgModule::User),
            "org_permission" => Some(OrgModule::OrgPermission),
            _ => None,
        }
    }
}

/// A protected resource, tagged with which enumeration it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Platform(Module),
    Org(OrgModule),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Platform(m) => write!(f, "platform/{}", m.as_str()),
            Resource::Org(m) => write!(f, "organization/{}", m.as_str()),
        }
    }
}

/// The closed tag identifying which policy branch applies to a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Admin,
    Organization,
    User,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Admin => "admin",
            AccountKind::Organization => "organization",
            AccountKind::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(AccountKind::Admin),
            "organization" => Some(AccountKind::Organization),
            "user" => Some(AccountKind::User),
            _ => None,
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles an admin account can hold. The `admin` role is a universal bypass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    #[serde(rename = "admin")]
    PlatformAdmin,
    Moderator,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::PlatformAdmin => "admin",
            AdminRole::Moderator => "moderator",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(AdminRole::PlatformAdmin),
            "moderator" => Some(AdminRole::Moderator),
            _ => None,
        }
    }
}

/// Roles an organization-scoped user can hold. Base users never receive
/// group-derived grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Moderator,
    BaseUser,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Moderator => "moderator",
            UserRole::BaseUser => "base_user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "moderator" => Some(UserRole::Moderator),
            "base_user" => Some(UserRole::BaseUser),
            _ => None,
        }
    }
}

/// A resolved account, returned as the effective principal on allow so
/// downstream handlers can read its id without a second lookup.
#[derive(Debug, Clone)]
pub enum Principal {
    Admin(entities::admin::Model),
    Organization(entities::organization::Model),
    User(entities::user::Model),
}

impl Principal {
    pub fn id(&self) -> &str {
        match self {
            Principal::Admin(a) => &a.id,
            Principal::Organization(o) => &o.id,
            Principal::User(u) => &u.id,
        }
    }

    pub fn kind(&self) -> AccountKind {
        match self {
            Principal::Admin(_) => AccountKind::Admin,
            Principal::Organization(_) => AccountKind::Organization,
            Principal::User(_) => AccountKind::User,
        }
    }
}
