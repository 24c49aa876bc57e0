use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db::dao::{CreateTodo, FilterOptions, Patch, SortField, SortOrder, UpdateTodo},
    db::entities::todo,
    error::AppError,
    response::ApiResult,
    services::{ServiceContext, todo_service::TodoService},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub completed: Patch<bool>,
}

/// Raw list parameters. Every one of them is optional; absent and empty are
/// the same thing.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListTodosQuery {
    pub search: String,
    pub completed: String,
    pub sort_by: String,
    pub sort_order: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).patch(update_todo).delete(delete_todo),
        )
        .with_state(state)
}

async fn list_todos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTodosQuery>,
) -> ApiResult<Json<Vec<TodoResponse>>> {
    let service = todo_service_from_state(state.as_ref());
    let todos = if query.is_empty() {
        service.get_all().await?
    } else {
        service.search(&query.into_filter()).await?
    };
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TodoResponse>> {
    let id = parse_id(&id)?;
    let service = todo_service_from_state(state.as_ref());
    let todo = service.require(id).await?;
    Ok(Json(todo.into()))
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTodoRequest>,
) -> ApiResult<(StatusCode, Json<TodoResponse>)> {
    require_title(&body.title)?;
    let input = CreateTodo {
        title: body.title,
        description: body.description.unwrap_or_default(),
    };
    let service = todo_service_from_state(state.as_ref());
    let todo = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(todo.into())))
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateTodoRequest>,
) -> ApiResult<Json<TodoResponse>> {
    let id = parse_id(&id)?;
    let UpdateTodoRequest {
        title,
        description,
        completed,
    } = body;
    if let Patch::Set(value) = &title {
        require_title(value)?;
    }
    let changes = UpdateTodo {
        title,
        description,
        completed,
    };
    let service = todo_service_from_state(state.as_ref());
    let todo = service.update(id, changes).await?;
    Ok(Json(todo.into()))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    let service = todo_service_from_state(state.as_ref());
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

impl ListTodosQuery {
    fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.completed.is_empty()
            && self.sort_by.is_empty()
            && self.sort_order.is_empty()
    }

    fn into_filter(self) -> FilterOptions {
        FilterOptions {
            completed: parse_completed(&self.completed),
            sort_by: SortField::parse(&self.sort_by),
            sort_order: SortOrder::parse(&self.sort_order),
            search: self.search,
        }
    }
}

fn parse_completed(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::bad_request("Invalid ID"))
}

/// Titles are stored exactly as sent; only the empty string is refused.
fn require_title(title: &str) -> Result<(), AppError> {
    if title.is_empty() {
        return Err(AppError::bad_request("Title is required"));
    }
    Ok(())
}

impl From<todo::Model> for TodoResponse {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            completed: model.completed,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn todo_service_from_state(state: &AppState) -> TodoService {
    ServiceContext::from_state(state).todo()
}

#[cfg(test)]
mod tests {
    use super::{ListTodosQuery, parse_completed, parse_id, require_title};
    use crate::db::dao::{SortField, SortOrder};

    #[test]
    fn completed_accepts_only_boolean_literals() {
        assert_eq!(parse_completed("true"), Some(true));
        assert_eq!(parse_completed("false"), Some(false));
        assert_eq!(parse_completed("TRUE"), None);
        assert_eq!(parse_completed("1"), None);
        assert_eq!(parse_completed(""), None);
    }

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42").expect("numeric id"), 42);
        assert!(parse_id("abc").is_err());
        assert!(parse_id("4.2").is_err());
        assert!(parse_id("").is_err());
    }

    #[test]
    fn only_empty_titles_are_refused() {
        assert!(require_title("").is_err());
        assert!(require_title("   ").is_ok());
        assert!(require_title("Buy milk").is_ok());
    }

    #[test]
    fn query_maps_onto_filter_options() {
        let query = ListTodosQuery {
            search: "report".to_string(),
            completed: "maybe".to_string(),
            sort_by: "title".to_string(),
            sort_order: "asc".to_string(),
        };
        assert!(!query.is_empty());

        let filter = query.into_filter();
        assert_eq!(filter.search, "report");
        assert_eq!(filter.completed, None);
        assert_eq!(filter.sort_by, SortField::Title);
        assert_eq!(filter.sort_order, SortOrder::Asc);
    }

    #[test]
    fn default_query_is_empty() {
        assert!(ListTodosQuery::default().is_empty());
    }
}
