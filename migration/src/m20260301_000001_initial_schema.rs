use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Enable foreign keys for SQLite
        if manager.get_database_backend() == sea_orm::DatabaseBackend::Sqlite {
            manager
                .get_connection()
                .execute_unprepared("PRAGMA foreign_keys = ON")
                .await?;
        }

        // Platform admin accounts
        manager
            .create_table(
                Table::create()
                    .table(Admins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Admins::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(Admins::FirstName))
                    .col(string(Admins::LastName))
                    .col(
                        ColumnDef::new(Admins::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(string(Admins::Phone))
                    .col(string(Admins::PasswordHash))
                    .col(string(Admins::Role))
                    .col(string(Admins::PermissionGroups))
                    .col(big_integer(Admins::CreatedAt))
                    .col(big_integer_null(Admins::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Organization (tenant) accounts
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organizations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(Organizations::Name))
                    .col(
                        ColumnDef::new(Organizations::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(string(Organizations::Phone))
                    .col(string(Organizations::PasswordHash))
                    .col(string(Organizations::PermissionGroups))
                    .col(big_integer(Organizations::CreatedAt))
                    .col(big_integer_null(Organizations::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Organization-scoped user accounts
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(Users::FirstName))
                    .col(string(Users::LastName))
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(string(Users::Phone))
                    .col(string(Users::PasswordHash))
                    .col(string(Users::Role))
                    .col(string(Users::OrganizationId))
                    .col(string(Users::PermissionGroups))
                    .col(big_integer(Users::CreatedAt))
                    .col(big_integer_null(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_organization_id")
                    .table(Users::Table)
                    .col(Users::OrganizationId)
                    .to_owned(),
            )
            .await?;

        // Notes
        manager
            .create_table(
                Table::create()
                    .table(Notes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(Notes::Title))
                    .col(text(Notes::Content))
                    .col(string(Notes::AuthorId))
                    .col(string(Notes::OrganizationId))
                    .col(big_integer(Notes::CreatedAt))
                    .col(big_integer_null(Notes::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notes_organization_id")
                    .table(Notes::Table)
                    .col(Notes::OrganizationId)
                    .to_owned(),
            )
            .await?;

        // Sessions (account_kind is the tag the decision gate dispatches on)
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sessions::SessionId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(Sessions::AccountId))
                    .col(string(Sessions::AccountKind))
                    .col(big_integer(Sessions::CreatedAt))
                    .col(big_integer(Sessions::ExpiresAt))
                    .to_owned(),
            )
            .await?;

        // Platform-level permission catalog
        manager
            .create_table(
                Table::create()
                    .table(AdminPermissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminPermissions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(AdminPermissions::Action))
                    .col(string(AdminPermissions::Module))
                    .col(big_integer(AdminPermissions::CreatedAt))
                    .col(big_integer_null(AdminPermissions::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdminPermissionGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminPermissionGroups::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AdminPermissionGroups::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(string(AdminPermissionGroups::Permissions))
                    .col(big_integer(AdminPermissionGroups::CreatedAt))
                    .col(big_integer_null(AdminPermissionGroups::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Organization-scoped permission catalog (kept separate from the
        // platform catalog; the two module enumerations never mix)
        manager
            .create_table(
                Table::create()
                    .table(OrgPermissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrgPermissions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(OrgPermissions::Action))
                    .col(string(OrgPermissions::Module))
                    .col(string(OrgPermissions::OrganizationId))
                    .col(big_integer(OrgPermissions::CreatedAt))
                    .col(big_integer_null(OrgPermissions::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrgPermissionGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrgPermissionGroups::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(OrgPermissionGroups::Name))
                    .col(string(OrgPermissionGroups::Permissions))
                    .col(string(OrgPermissionGroups::OrganizationId))
                    .col(big_integer(OrgPermissionGroups::CreatedAt))
                    .col(big_integer_null(OrgPermissionGroups::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Group names are unique within their organization (the platform
        // catalog enforces this via the column constraint above)
        manager
            .create_index(
                Index::create()
                    .name("idx_org_permission_groups_org_name")
                    .table(OrgPermissionGroups::Table)
                    .col(OrgPermissionGroups::OrganizationId)
                    .col(OrgPermissionGroups::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrgPermissionGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrgPermissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdminPermissionGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdminPermissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Admins::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Admins {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    PasswordHash,
    Role,
    PermissionGroups,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
    Name,
    Email,
    Phone,
    PasswordHash,
    PermissionGroups,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    PasswordHash,
    Role,
    OrganizationId,
    PermissionGroups,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Notes {
    Table,
    Id,
    Title,
    Content,
    AuthorId,
    OrganizationId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Sessions {
    Table,
    SessionId,
    AccountId,
    AccountKind,
    CreatedAt,
    ExpiresAt,
}

#[derive(DeriveIden)]
enum AdminPermissions {
    Table,
    Id,
    Action,
    Module,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AdminPermissionGroups {
    Table,
    Id,
    Name,
    Permissions,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrgPermissions {
    Table,
    Id,
    Action,
    Module,
    OrganizationId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrgPermissionGroups {
    Table,
    Id,
    Name,
    Permissions,
    OrganizationId,
    CreatedAt,
    UpdatedAt,
}
