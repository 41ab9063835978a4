//! SeaORM-backed care plan repository.
//!
//! A plan is stored as one `care_plans` row plus its ordered `care_plan_tasks` rows.
//! Every write that touches both tables runs in a single transaction so readers
//! never observe a plan with half of its task list.

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use time::OffsetDateTime;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::model::{CarePlan, Task, TaskStatus};
use crate::domain::repo::CarePlansRepository;
use crate::infra::storage::entity::{care_plan, care_plan_task};
use crate::infra::storage::mapper::{care_plan_active, care_plan_from_parts, task_active};

pub struct SeaOrmCarePlansRepository {
    conn: DatabaseConnection,
}

impl SeaOrmCarePlansRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

async fn insert_tasks<C: ConnectionTrait>(conn: &C, tasks: &[Task]) -> anyhow::Result<()> {
    if tasks.is_empty() {
        return Ok(());
    }
    let rows = tasks
        .iter()
        .zip(0_i32..)
        .map(|(task, position)| task_active(task, position));
    care_plan_task::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await
        .context("insert care plan tasks failed")?;
    Ok(())
}

/// Load the tasks of every plan in one query and join them back in.
async fn attach_tasks<C: ConnectionTrait>(
    conn: &C,
    plans: Vec<care_plan::Model>,
) -> anyhow::Result<Vec<CarePlan>> {
    if plans.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = plans.iter().map(|p| p.id).collect();
    let rows = care_plan_task::Entity::find()
        .filter(care_plan_task::Column::CarePlanId.is_in(ids))
        .order_by_asc(care_plan_task::Column::Position)
        .all(conn)
        .await
        .context("load care plan tasks failed")?;

    let mut by_plan: HashMap<Uuid, Vec<care_plan_task::Model>> = HashMap::new();
    for row in rows {
        by_plan.entry(row.care_plan_id).or_default().push(row);
    }

    plans
        .into_iter()
        .map(|plan| {
            let tasks = by_plan.remove(&plan.id).unwrap_or_default();
            care_plan_from_parts(plan, tasks)
        })
        .collect()
}

#[async_trait]
impl CarePlansRepository for SeaOrmCarePlansRepository {
    #[instrument(
        name = "care.repo.care_plans.insert",
        skip(self, plan),
        fields(db.operation = "INSERT", plan.id = %plan.id, tasks = plan.tasks.len())
    )]
    async fn insert(&self, plan: &CarePlan) -> anyhow::Result<()> {
        let txn = self.conn.begin().await.context("begin transaction")?;
        let _ = care_plan_active(plan)
            .insert(&txn)
            .await
            .context("insert care plan failed")?;
        insert_tasks(&txn, &plan.tasks).await?;
        txn.commit().await.context("commit care plan insert")?;
        debug!("care plan stored");
        Ok(())
    }

    #[instrument(
        name = "care.repo.care_plans.find_owned",
        skip(self),
        fields(db.operation = "SELECT", plan.id = %id)
    )]
    async fn find_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<Option<CarePlan>> {
        let found = care_plan::Entity::find()
            .filter(care_plan::Column::Id.eq(id))
            .filter(care_plan::Column::UserId.eq(owner))
            .one(&self.conn)
            .await
            .context("find care plan failed")?;
        match found {
            Some(plan) => Ok(attach_tasks(&self.conn, vec![plan]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<CarePlan>> {
        let found = care_plan::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find care plan failed")?;
        match found {
            Some(plan) => Ok(attach_tasks(&self.conn, vec![plan]).await?.pop()),
            None => Ok(None),
        }
    }

    #[instrument(name = "care.repo.care_plans.list_owned", skip(self))]
    async fn list_owned(&self, owner: Uuid) -> anyhow::Result<Vec<CarePlan>> {
        let plans = care_plan::Entity::find()
            .filter(care_plan::Column::UserId.eq(owner))
            .order_by_desc(care_plan::Column::CreatedAt)
            .order_by_desc(care_plan::Column::Id)
            .all(&self.conn)
            .await
            .context("list care plans failed")?;
        attach_tasks(&self.conn, plans).await
    }

    #[instrument(name = "care.repo.care_plans.list_assigned_to", skip(self))]
    async fn list_assigned_to(&self, assignee: Uuid) -> anyhow::Result<Vec<CarePlan>> {
        let plan_ids: Vec<Uuid> = care_plan_task::Entity::find()
            .select_only()
            .column(care_plan_task::Column::CarePlanId)
            .filter(care_plan_task::Column::AssignedTo.eq(assignee))
            .distinct()
            .into_tuple()
            .all(&self.conn)
            .await
            .context("list assigned plan ids failed")?;
        if plan_ids.is_empty() {
            return Ok(Vec::new());
        }

        let plans = care_plan::Entity::find()
            .filter(care_plan::Column::Id.is_in(plan_ids))
            .order_by_desc(care_plan::Column::CreatedAt)
            .order_by_desc(care_plan::Column::Id)
            .all(&self.conn)
            .await
            .context("list assigned care plans failed")?;
        attach_tasks(&self.conn, plans).await
    }

    #[instrument(
        name = "care.repo.care_plans.replace",
        skip(self, plan),
        fields(db.operation = "UPDATE", plan.id = %plan.id, tasks = plan.tasks.len())
    )]
    async fn replace(&self, plan: &CarePlan) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await.context("begin transaction")?;

        let res = care_plan::Entity::update_many()
            .col_expr(care_plan::Column::Title, Expr::value(plan.title.clone()))
            .col_expr(care_plan::Column::UpdatedAt, Expr::value(plan.updated_at))
            .filter(care_plan::Column::Id.eq(plan.id))
            .filter(care_plan::Column::UserId.eq(plan.user_id))
            .exec(&txn)
            .await
            .context("update care plan failed")?;
        if res.rows_affected == 0 {
            txn.rollback().await.context("rollback care plan update")?;
            return Ok(false);
        }

        care_plan_task::Entity::delete_many()
            .filter(care_plan_task::Column::CarePlanId.eq(plan.id))
            .exec(&txn)
            .await
            .context("clear care plan tasks failed")?;
        insert_tasks(&txn, &plan.tasks).await?;

        txn.commit().await.context("commit care plan update")?;
        Ok(true)
    }

    #[instrument(
        name = "care.repo.care_plans.update_task_status",
        skip(self),
        fields(db.operation = "UPDATE", plan.id = %plan_id, task.id = %task_id)
    )]
    async fn update_task_status(
        &self,
        plan_id: Uuid,
        task_id: Uuid,
        status: TaskStatus,
        updated_at: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await.context("begin transaction")?;

        let res = care_plan_task::Entity::update_many()
            .col_expr(
                care_plan_task::Column::Status,
                Expr::value(status.as_str().to_owned()),
            )
            .filter(care_plan_task::Column::Id.eq(task_id))
            .filter(care_plan_task::Column::CarePlanId.eq(plan_id))
            .exec(&txn)
            .await
            .context("update task status failed")?;
        if res.rows_affected == 0 {
            txn.rollback().await.context("rollback task status update")?;
            return Ok(false);
        }

        care_plan::Entity::update_many()
            .col_expr(care_plan::Column::UpdatedAt, Expr::value(updated_at))
            .filter(care_plan::Column::Id.eq(plan_id))
            .exec(&txn)
            .await
            .context("touch care plan failed")?;

        txn.commit().await.context("commit task status update")?;
        Ok(true)
    }

    #[instrument(
        name = "care.repo.care_plans.delete_owned",
        skip(self),
        fields(db.operation = "DELETE", plan.id = %id)
    )]
    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await.context("begin transaction")?;

        let owned = care_plan::Entity::find()
            .filter(care_plan::Column::Id.eq(id))
            .filter(care_plan::Column::UserId.eq(owner))
            .one(&txn)
            .await
            .context("find care plan failed")?
            .is_some();
        if !owned {
            txn.rollback().await.context("rollback care plan delete")?;
            return Ok(false);
        }

        care_plan_task::Entity::delete_many()
            .filter(care_plan_task::Column::CarePlanId.eq(id))
            .exec(&txn)
            .await
            .context("delete care plan tasks failed")?;
        care_plan::Entity::delete_many()
            .filter(care_plan::Column::Id.eq(id))
            .filter(care_plan::Column::UserId.eq(owner))
            .exec(&txn)
            .await
            .context("delete care plan failed")?;

        txn.commit().await.context("commit care plan delete")?;
        Ok(true)
    }

    #[instrument(name = "care.repo.care_plans.tasks_due_between", skip(self))]
    async fn tasks_due_between(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> anyhow::Result<Vec<Task>> {
        care_plan_task::Entity::find()
            .filter(care_plan_task::Column::DueDate.gte(from))
            .filter(care_plan_task::Column::DueDate.lt(to))
            .order_by_asc(care_plan_task::Column::DueDate)
            .all(&self.conn)
            .await
            .context("scan due tasks failed")?
            .into_iter()
            .map(Task::try_from)
            .collect()
    }
}
