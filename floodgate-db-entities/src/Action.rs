use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "actions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub limiter_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::Limiter::Entity",
        from = "Column::LimiterId",
        to = "super::Limiter::Column::Id",
        on_delete = "Restrict"
    )]
    Limiter,
}

impl Related<super::Limiter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Limiter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
