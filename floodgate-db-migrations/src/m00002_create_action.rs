use sea_orm::Schema;
use sea_orm_migration::prelude::*;

pub mod action {
    use sea_orm::entity::prelude::*;
    use sea_orm::sea_query::ForeignKeyAction;
    use uuid::Uuid;

    use crate::m00001_create_limiter::limiter;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "actions")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub timestamp: DateTimeUtc,
        pub limiter_id: Uuid,
    }

    #[derive(Copy, Clone, Debug, EnumIter)]
    pub enum Relation {
        Limiter,
    }

    impl RelationTrait for Relation {
        fn def(&self) -> RelationDef {
            match self {
                Self::Limiter => Entity::belongs_to(limiter::Entity)
                    .from(Column::LimiterId)
                    .to(limiter::Column::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .into(),
            }
        }
    }

    impl Related<limiter::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Limiter.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m00002_create_action"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let builder = manager.get_database_backend();
        let schema = Schema::new(builder);

        manager
            .create_table(schema.create_table_from_entity(action::Entity))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_actions_timestamp")
                    .table(action::Entity)
                    .col(action::Column::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_actions_limiter_id")
                    .table(action::Entity)
                    .col(action::Column::LimiterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(action::Entity).to_owned())
            .await
    }
}
