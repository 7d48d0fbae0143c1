use sea_orm_migration::prelude::*;
use uuid::Uuid;

use crate::m20260601_000001_create_roles::Roles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert()
            .into_table(Roles::Table)
            .columns([Roles::Id, Roles::Name, Roles::Description])
            .to_owned();
        for (name, description) in [
            ("Admin", "Full administrative access"),
            ("Client", "Default role for registered accounts"),
            ("Seller", "Merchant account"),
        ] {
            insert.values_panic([Uuid::new_v4().into(), name.into(), description.into()]);
        }
        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(Query::delete().from_table(Roles::Table).to_owned())
            .await
    }
}
