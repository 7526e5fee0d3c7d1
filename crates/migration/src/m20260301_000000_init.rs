//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: authentication
//! - `source_files`: uploaded CSV statements, raw text included
//! - `categories`: global category registry with a unique normalized name
//! - `cashflow_records`: normalized (category, year, amount) facts
//! - `parse_errors`: per-cell ingest error log

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum SourceFiles {
    Table,
    Id,
    Username,
    Filename,
    Content,
    UploadedAt,
    ProcessedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    NameNorm,
    Kind,
    IsSystem,
}

#[derive(Iden)]
enum CashflowRecords {
    Table,
    Id,
    Username,
    EntityRef,
    CategoryId,
    Year,
    Amount,
    SourceFileId,
    Recurring,
    Notes,
}

#[derive(Iden)]
enum ParseErrors {
    Table,
    Id,
    SourceFileId,
    Username,
    Row,
    Column,
    Kind,
    Message,
    RawValue,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Source files
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SourceFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SourceFiles::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SourceFiles::Username).string().not_null())
                    .col(ColumnDef::new(SourceFiles::Filename).string().not_null())
                    .col(ColumnDef::new(SourceFiles::Content).text().not_null())
                    .col(
                        ColumnDef::new(SourceFiles::UploadedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SourceFiles::ProcessedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-source_files-username")
                            .from(SourceFiles::Table, SourceFiles::Username)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .col(ColumnDef::new(Categories::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Categories::IsSystem)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // The get-or-create race between concurrent ingests resolves on
        // this constraint.
        manager
            .create_index(
                Index::create()
                    .name("idx-categories-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Cashflow records
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CashflowRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashflowRecords::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CashflowRecords::Username)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashflowRecords::EntityRef).string())
                    .col(
                        ColumnDef::new(CashflowRecords::CategoryId)
                            .blob()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashflowRecords::Year).integer().not_null())
                    .col(ColumnDef::new(CashflowRecords::Amount).double().not_null())
                    .col(
                        ColumnDef::new(CashflowRecords::SourceFileId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashflowRecords::Recurring)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(CashflowRecords::Notes).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cashflow_records-category_id")
                            .from(CashflowRecords::Table, CashflowRecords::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cashflow_records-source_file_id")
                            .from(CashflowRecords::Table, CashflowRecords::SourceFileId)
                            .to(SourceFiles::Table, SourceFiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cashflow_records-source_file_id")
                    .table(CashflowRecords::Table)
                    .col(CashflowRecords::SourceFileId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Parse errors
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ParseErrors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParseErrors::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ParseErrors::SourceFileId)
                            .blob()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ParseErrors::Username).string().not_null())
                    .col(ColumnDef::new(ParseErrors::Row).integer().not_null())
                    .col(ColumnDef::new(ParseErrors::Column).string().not_null())
                    .col(ColumnDef::new(ParseErrors::Kind).string().not_null())
                    .col(ColumnDef::new(ParseErrors::Message).string().not_null())
                    .col(ColumnDef::new(ParseErrors::RawValue).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-parse_errors-source_file_id")
                            .from(ParseErrors::Table, ParseErrors::SourceFileId)
                            .to(SourceFiles::Table, SourceFiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-parse_errors-source_file_id")
                    .table(ParseErrors::Table)
                    .col(ParseErrors::SourceFileId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParseErrors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CashflowRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SourceFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
