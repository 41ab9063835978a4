//! SeaORM-backed users repository.

use anyhow::Context;
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::model::User;
use crate::domain::repo::UsersRepository;
use crate::infra::storage::entity::user::{Column, Entity as UserEntity};
use crate::infra::storage::mapper::user_active;

pub struct SeaOrmUsersRepository {
    conn: DatabaseConnection,
}

impl SeaOrmUsersRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl UsersRepository for SeaOrmUsersRepository {
    #[instrument(
        name = "care.repo.users.find_by_id",
        skip(self),
        fields(db.operation = "SELECT", user.id = %id)
    )]
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id query failed")?;
        found.map(User::try_from).transpose()
    }

    #[instrument(
        name = "care.repo.users.find_by_email",
        skip(self),
        fields(db.operation = "SELECT")
    )]
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_by_email query failed")?;
        found.map(User::try_from).transpose()
    }

    #[instrument(
        name = "care.repo.users.email_exists",
        skip(self),
        fields(db.operation = "SELECT COUNT")
    )]
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = UserEntity::find()
            .filter(Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists query failed")?;
        Ok(count > 0)
    }

    #[instrument(
        name = "care.repo.users.insert",
        skip(self, user),
        fields(db.operation = "INSERT", user.id = %user.id)
    )]
    async fn insert(&self, user: User) -> anyhow::Result<()> {
        debug!("inserting user");
        let _ = user_active(&user)
            .insert(&self.conn)
            .await
            .context("insert user failed")?;
        Ok(())
    }

    #[instrument(
        name = "care.repo.users.update_profile",
        skip(self, user),
        fields(db.operation = "UPDATE", user.id = %user.id)
    )]
    async fn update_profile(&self, user: &User) -> anyhow::Result<bool> {
        let res = UserEntity::update_many()
            .col_expr(Column::Name, Expr::value(user.name.clone()))
            .col_expr(Column::Contact, Expr::value(user.contact.clone()))
            .col_expr(
                Column::LanguagePreference,
                Expr::value(user.language_preference.clone()),
            )
            .col_expr(Column::UpdatedAt, Expr::value(user.updated_at))
            .filter(Column::Id.eq(user.id))
            .exec(&self.conn)
            .await
            .context("update user profile failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        UserEntity::find()
            .order_by_asc(Column::Name)
            .all(&self.conn)
            .await
            .context("list users failed")?
            .into_iter()
            .map(User::try_from)
            .collect()
    }
}
