use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::{prelude::User, user};
use super::{StoreResult, classify};

pub async fn find_by_id(db: &DatabaseConnection, id: &Uuid) -> StoreResult<Option<user::Model>> {
    User::find_by_id(*id).one(db).await.map_err(classify)
}

pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> StoreResult<Option<user::Model>> {
    User::find()
        .filter(user::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(classify)
}

pub async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> StoreResult<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
        .map_err(classify)
}

pub async fn create_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password_hash: &str,
    role: &str,
) -> StoreResult<user::Model> {
    let model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        role: Set(role.to_string()),
        ..Default::default()
    };
    model.insert(db).await.map_err(classify)
}
