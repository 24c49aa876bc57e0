use crate::{
    db::dao::{CreateTodo, DaoLayerError, FilterOptions, TodoDao, UpdateTodo},
    db::entities::todo,
    error::AppError,
};

pub const TODO_NOT_FOUND: &str = "Todo not found";

#[derive(Clone)]
pub struct TodoService {
    todo_dao: TodoDao,
}

impl TodoService {
    pub fn new(todo_dao: TodoDao) -> Self {
        Self { todo_dao }
    }

    pub async fn create(&self, input: CreateTodo) -> Result<todo::Model, AppError> {
        Ok(self.todo_dao.create(input).await?)
    }

    pub async fn get_all(&self) -> Result<Vec<todo::Model>, AppError> {
        Ok(self.todo_dao.get_all().await?)
    }

    pub async fn search(&self, opts: &FilterOptions) -> Result<Vec<todo::Model>, AppError> {
        Ok(self.todo_dao.search(opts).await?)
    }

    pub async fn require(&self, id: i64) -> Result<todo::Model, AppError> {
        self.todo_dao
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(TODO_NOT_FOUND))
    }

    pub async fn update(&self, id: i64, changes: UpdateTodo) -> Result<todo::Model, AppError> {
        self.todo_dao
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::not_found(TODO_NOT_FOUND))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.todo_dao.delete(id).await.map_err(|err| match err {
            DaoLayerError::NotFound { .. } => AppError::not_found(TODO_NOT_FOUND),
            other => other.into(),
        })
    }
}
