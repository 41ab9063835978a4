use sea_orm::entity::prelude::*;
use time::OffsetDateTime;
use uuid::Uuid;

/// Tasks are embedded in their plan; `position` keeps the submitted order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "care_plan_tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub care_plan_id: Uuid,
    pub position: i32,
    pub task_name: String,
    pub assigned_to: Uuid,
    pub status: String,
    pub due_date: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::care_plan::Entity",
        from = "Column::CarePlanId",
        to = "super::care_plan::Column::Id"
    )]
    CarePlan,
}

impl Related<super::care_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CarePlan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
