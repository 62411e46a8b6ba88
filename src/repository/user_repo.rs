use crate::model::user::User;
use crate::repository::mongo::USERS;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::doc;
use tracing::{error, info, instrument};
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> RepositoryResult<User>;
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;
    async fn delete(&self, id: &Uuid) -> RepositoryResult<()>;
}

pub struct MongoUserRepository {
    collection: mongodb::Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        MongoUserRepository { collection: db.collection::<User>(USERS) }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert(&self, user: User) -> RepositoryResult<User> {
        match self.collection.insert_one(user.clone(), None).await {
            Ok(_) => {
                info!("User inserted");
                Ok(user)
            }
            Err(e) => {
                error!("Failed to insert user: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let filter = doc! { "username": username };
        self.collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by username: {}", e)))
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: &Uuid) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id.to_string() }, None).await;
        match result {
            Ok(delete_result) if delete_result.deleted_count > 0 => Ok(()),
            Ok(_) => Err(RepositoryError::not_found(format!("No user found to delete for ID: {}", id))),
            Err(e) => Err(RepositoryError::database(format!("Failed to delete user: {}", e))),
        }
    }
}
