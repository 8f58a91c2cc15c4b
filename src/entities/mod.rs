pub mod admin;
pub mod admin_permission;
pub mod admin_permission_group;
pub mod note;
pub mod org_permission;
pub mod org_permission_group;
pub mod organization;
pub mod session;
pub mod user;

pub use admin::Entity as Admin;
pub use admin_permission::Entity as AdminPermission;
pub use admin_permission_group::Entity as AdminPermissionGroup;
pub use note::Entity as Note;
pub use org_permission::Entity as OrgPermission;
pub use org_permission_group::Entity as OrgPermissionGroup;
pub use organization::Entity as Organization;
pub use session::Entity as Session;
pub use user::Entity as User;
