use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::error::{DomainError, db_err};
use crate::domain::model::{
    CarePlan, CarePlanDraft, NewNotification, NotificationKind, Task, TaskStatus,
};
use crate::domain::ports::Clock;
use crate::domain::repo::CarePlansRepository;
use crate::domain::service::{NotificationService, ServiceConfig};

#[derive(Clone)]
pub struct CarePlanService {
    repo: Arc<dyn CarePlansRepository>,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl CarePlanService {
    pub fn new(
        repo: Arc<dyn CarePlansRepository>,
        notifications: NotificationService,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            notifications,
            clock,
            config,
        }
    }

    fn check_task_count(&self, draft: &CarePlanDraft) -> Result<(), DomainError> {
        let max = self.config.max_tasks_per_plan;
        if draft.tasks.is_empty() || draft.tasks.len() > max {
            return Err(DomainError::validation(format!(
                "A care plan must have between 1 and {max} tasks"
            )));
        }
        Ok(())
    }

    /// Tell each assignee about their new task. The owner is not notified about
    /// tasks they assigned to themselves.
    async fn notify_assignees<'a>(&self, plan: &CarePlan, tasks: impl Iterator<Item = &'a Task>) {
        for task in tasks.filter(|t| t.assigned_to != plan.user_id) {
            self.notifications
                .create_best_effort(NewNotification {
                    user_id: task.assigned_to,
                    message: format!(
                        "You have been assigned \"{}\" in care plan \"{}\"",
                        task.task_name, plan.title
                    ),
                    kind: NotificationKind::TaskAssigned,
                    care_plan_id: Some(plan.id),
                    task_id: Some(task.id),
                })
                .await;
        }
    }

    async fn notify_owner(&self, plan: &CarePlan, kind: NotificationKind) {
        let verb = match kind {
            NotificationKind::CarePlanAdded => "created",
            _ => "updated",
        };
        self.notifications
            .create_best_effort(NewNotification {
                user_id: plan.user_id,
                message: format!("Care plan \"{}\" was {verb}", plan.title),
                kind,
                care_plan_id: Some(plan.id),
                task_id: None,
            })
            .await;
    }

    #[instrument(skip(self, draft), fields(owner = %owner, tasks = draft.tasks.len()))]
    pub async fn create(&self, owner: Uuid, draft: CarePlanDraft) -> Result<CarePlan, DomainError> {
        self.check_task_count(&draft)?;

        let now = self.clock.now();
        let id = Uuid::now_v7();
        let plan = CarePlan {
            id,
            user_id: owner,
            title: draft.title,
            tasks: draft
                .tasks
                .into_iter()
                .map(|t| Task {
                    id: Uuid::now_v7(),
                    care_plan_id: id,
                    task_name: t.task_name,
                    assigned_to: t.assigned_to,
                    status: t.status,
                    due_date: t.due_date,
                })
                .collect(),
            created_at: now,
            updated_at: now,
        };

        self.repo.insert(&plan).await.map_err(db_err)?;
        info!(plan_id = %plan.id, "care plan created");

        self.notify_owner(&plan, NotificationKind::CarePlanAdded).await;
        self.notify_assignees(&plan, plan.tasks.iter()).await;
        Ok(plan)
    }

    #[instrument(skip(self), fields(owner = %owner, plan_id = %id))]
    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<CarePlan, DomainError> {
        self.repo
            .find_owned(owner, id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Care plan", id))
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<CarePlan>, DomainError> {
        self.repo.list_owned(owner).await.map_err(db_err)
    }

    pub async fn list_assigned(&self, assignee: Uuid) -> Result<Vec<CarePlan>, DomainError> {
        self.repo.list_assigned_to(assignee).await.map_err(db_err)
    }

    /// Replace title and task list. Tasks that carry the id of an existing task keep
    /// it; everything else is a new task and its assignee is notified.
    #[instrument(skip(self, draft), fields(owner = %owner, plan_id = %id))]
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        draft: CarePlanDraft,
    ) -> Result<CarePlan, DomainError> {
        self.check_task_count(&draft)?;
        let current = self.get(owner, id).await?;
        let existing: HashSet<Uuid> = current.tasks.iter().map(|t| t.id).collect();

        let mut kept = HashSet::new();
        let mut new_task_ids = HashSet::new();
        let tasks: Vec<Task> = draft
            .tasks
            .into_iter()
            .map(|t| {
                let task_id = match t.id {
                    Some(tid) if existing.contains(&tid) && kept.insert(tid) => tid,
                    _ => {
                        let tid = Uuid::now_v7();
                        new_task_ids.insert(tid);
                        tid
                    }
                };
                Task {
                    id: task_id,
                    care_plan_id: id,
                    task_name: t.task_name,
                    assigned_to: t.assigned_to,
                    status: t.status,
                    due_date: t.due_date,
                }
            })
            .collect();

        let plan = CarePlan {
            id,
            user_id: owner,
            title: draft.title,
            tasks,
            created_at: current.created_at,
            updated_at: self.clock.now(),
        };

        if !self.repo.replace(&plan).await.map_err(db_err)? {
            return Err(DomainError::not_found("Care plan", id));
        }
        debug!(new_tasks = new_task_ids.len(), "care plan replaced");

        self.notify_owner(&plan, NotificationKind::CarePlanUpdated).await;
        self.notify_assignees(
            &plan,
            plan.tasks.iter().filter(|t| new_task_ids.contains(&t.id)),
        )
        .await;
        Ok(plan)
    }

    /// Status change for a single task. The plan owner and the task's assignee may
    /// do this; anyone else gets the same answer as for a missing plan.
    #[instrument(skip(self), fields(caller = %caller, plan_id = %plan_id, task_id = %task_id))]
    pub async fn update_task_status(
        &self,
        caller: Uuid,
        plan_id: Uuid,
        task_id: Uuid,
        status: TaskStatus,
    ) -> Result<CarePlan, DomainError> {
        let mut plan = self
            .repo
            .find_by_id(plan_id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Care plan", plan_id))?;

        let is_owner = plan.user_id == caller;
        let Some(task) = plan.tasks.iter_mut().find(|t| t.id == task_id) else {
            return Err(if is_owner {
                DomainError::not_found("Task", task_id)
            } else {
                DomainError::not_found("Care plan", plan_id)
            });
        };
        if !is_owner && task.assigned_to != caller {
            return Err(DomainError::not_found("Care plan", plan_id));
        }

        let now = self.clock.now();
        if !self
            .repo
            .update_task_status(plan_id, task_id, status, now)
            .await
            .map_err(db_err)?
        {
            return Err(DomainError::not_found("Task", task_id));
        }
        task.status = status;
        plan.updated_at = now;
        Ok(plan)
    }

    /// Tasks go with the plan; notifications that reference it are left in place.
    #[instrument(skip(self), fields(owner = %owner, plan_id = %id))]
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete_owned(owner, id).await.map_err(db_err)? {
            return Err(DomainError::not_found("Care plan", id));
        }
        info!("care plan deleted");
        Ok(())
    }
}
