pub mod builders;
pub mod db;

pub use builders::{
    bearer_headers, grant_admin, grant_user, login, AdminBuilder, OrganizationBuilder, UserBuilder,
};
pub use db::TestDb;
