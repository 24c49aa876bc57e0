use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, Set, UpdateMany,
};
use tracing::debug;

use super::{DaoLayerError, DaoResult, FilterOptions, Patch};
use crate::db::entities::prelude::Todo;
use crate::db::entities::todo;
use crate::db::schema::STORE_NOW;

#[derive(Debug, Clone)]
pub struct CreateTodo {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTodo {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub completed: Patch<bool>,
}

#[derive(Clone)]
pub struct TodoDao {
    db: DatabaseConnection,
}

impl TodoDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    /// Unfiltered listing, newest first.
    pub fn all_query() -> Select<Todo> {
        Todo::find()
            .order_by_desc(todo::Column::CreatedAt)
            .order_by_desc(todo::Column::Id)
    }

    pub fn search_query(opts: &FilterOptions) -> Select<Todo> {
        let order = opts.sort_order.order();
        Todo::find()
            .filter(opts.condition())
            .order_by(opts.sort_by.column(), order.clone())
            .order_by(todo::Column::Id, order)
    }

    /// `updated_at` is always stamped; every other column only when set.
    pub fn update_query(id: i64, changes: UpdateTodo) -> UpdateMany<Todo> {
        let mut query =
            Todo::update_many().col_expr(todo::Column::UpdatedAt, Expr::cust(STORE_NOW));
        if let Patch::Set(title) = changes.title {
            query = query.col_expr(todo::Column::Title, Expr::value(title));
        }
        if let Patch::Set(description) = changes.description {
            query = query.col_expr(todo::Column::Description, Expr::value(description));
        }
        if let Patch::Set(completed) = changes.completed {
            query = query.col_expr(todo::Column::Completed, Expr::value(completed));
        }
        query.filter(todo::Column::Id.eq(id))
    }

    /// Inserts a new, not yet completed todo. Both timestamps come from the
    /// column defaults; the returned row is the one read back from the store.
    pub async fn create(&self, input: CreateTodo) -> DaoResult<todo::Model> {
        let model = todo::ActiveModel {
            title: Set(input.title),
            description: Set(input.description),
            completed: Set(false),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn get_all(&self) -> DaoResult<Vec<todo::Model>> {
        Ok(Self::all_query().all(&self.db).await?)
    }

    pub async fn search(&self, opts: &FilterOptions) -> DaoResult<Vec<todo::Model>> {
        Ok(Self::search_query(opts).all(&self.db).await?)
    }

    pub async fn find_by_id(&self, id: i64) -> DaoResult<Option<todo::Model>> {
        Ok(Todo::find_by_id(id).one(&self.db).await?)
    }

    /// Applies the provided fields and returns the stored row afterwards.
    ///
    /// The existence check and the write are separate statements. A delete
    /// that lands between them makes the write touch zero rows; the re-read
    /// then finds nothing and the call reports `None`.
    pub async fn update(&self, id: i64, changes: UpdateTodo) -> DaoResult<Option<todo::Model>> {
        if self.find_by_id(id).await?.is_none() {
            return Ok(None);
        }

        let result = Self::update_query(id, changes).exec(&self.db).await?;
        if result.rows_affected == 0 {
            debug!(id, "todo removed between lookup and update");
        }

        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> DaoResult<()> {
        let result = Todo::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(DaoLayerError::NotFound { entity: "todo", id });
        }
        Ok(())
    }

    pub async fn count(&self) -> DaoResult<u64> {
        Ok(Todo::find().count(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use sea_orm::{
        DatabaseBackend, DbBackend, DbErr, MockDatabase, MockExecResult, QueryTrait, Transaction,
    };

    use super::{TodoDao, UpdateTodo};
    use crate::db::dao::{DaoLayerError, FilterOptions, Patch, SortField, SortOrder};
    use crate::db::entities::todo;

    fn todo_model(id: i64, title: &str, completed: bool) -> todo::Model {
        let now = Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid");
        todo::Model {
            id,
            title: title.to_string(),
            description: String::new(),
            completed,
            created_at: now,
            updated_at: now,
        }
    }

    fn sql<Q: QueryTrait>(query: Q) -> String {
        query.build(DbBackend::Sqlite).to_string()
    }

    #[test]
    fn all_query_has_no_predicate_and_orders_newest_first() {
        let sql = sql(TodoDao::all_query());
        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with(r#"ORDER BY "todos"."created_at" DESC, "todos"."id" DESC"#));
    }

    #[test]
    fn search_query_combines_search_and_completed() {
        let opts = FilterOptions {
            search: "buy".to_string(),
            completed: Some(true),
            ..FilterOptions::default()
        };
        let sql = sql(TodoDao::search_query(&opts));

        assert!(sql.contains(r#""title" LIKE '%buy%'"#));
        assert!(sql.contains(r#""description" LIKE '%buy%'"#));
        assert!(sql.contains("ESCAPE"));
        assert!(sql.contains(" OR "));
        assert!(sql.contains(r#""todos"."completed" = "#));
        assert!(sql.ends_with(r#"ORDER BY "todos"."created_at" DESC, "todos"."id" DESC"#));
    }

    #[test]
    fn search_query_without_filters_has_no_predicate() {
        let opts = FilterOptions {
            sort_by: SortField::Title,
            sort_order: SortOrder::Asc,
            ..FilterOptions::default()
        };
        let sql = sql(TodoDao::search_query(&opts));

        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with(r#"ORDER BY "todos"."title" ASC, "todos"."id" ASC"#));
    }

    #[test]
    fn unknown_sort_field_orders_like_created_at() {
        let fallback = FilterOptions {
            sort_by: SortField::parse("malicious_value"),
            ..FilterOptions::default()
        };
        let explicit = FilterOptions {
            sort_by: SortField::parse("createdAt"),
            ..FilterOptions::default()
        };

        assert_eq!(
            sql(TodoDao::search_query(&fallback)),
            sql(TodoDao::search_query(&explicit))
        );
    }

    #[test]
    fn update_query_sets_only_provided_fields() {
        let changes = UpdateTodo {
            completed: Patch::Set(true),
            ..UpdateTodo::default()
        };
        let sql = sql(TodoDao::update_query(7, changes));

        assert!(sql.contains(r#""updated_at" = strftime("#));
        assert!(sql.contains(r#""completed" = "#));
        assert!(!sql.contains(r#""title" ="#));
        assert!(!sql.contains(r#""description" ="#));
        assert!(sql.ends_with(r#"WHERE "todos"."id" = 7"#));
    }

    #[test]
    fn update_query_without_changes_still_bumps_updated_at() {
        let sql = sql(TodoDao::update_query(1, UpdateTodo::default()));
        assert!(sql.starts_with(r#"UPDATE "todos" SET "updated_at" = strftime("#));
    }

    #[tokio::test]
    async fn get_all_issues_the_unfiltered_query() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![todo_model(2, "b", false), todo_model(1, "a", true)]])
            .into_connection();
        let dao = TodoDao::new(&db);

        let todos = dao.get_all().await.expect("query should succeed");
        assert_eq!(todos.len(), 2);

        let expected = TodoDao::all_query().build(DbBackend::Sqlite);
        assert_eq!(db.into_transaction_log(), vec![Transaction::one(expected)]);
    }

    #[tokio::test]
    async fn update_returns_none_without_writing_when_missing() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<todo::Model>::new()])
            .into_connection();
        let dao = TodoDao::new(&db);

        let changes = UpdateTodo {
            title: Patch::Set("new".to_string()),
            ..UpdateTodo::default()
        };
        let result = dao.update(42, changes).await.expect("query should succeed");

        assert!(result.is_none());
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn update_rereads_the_row_after_writing() {
        let before = todo_model(3, "old", false);
        let mut after = before.clone();
        after.completed = true;

        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![before]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![after.clone()]])
            .into_connection();
        let dao = TodoDao::new(&db);

        let changes = UpdateTodo {
            completed: Patch::Set(true),
            ..UpdateTodo::default()
        };
        let result = dao.update(3, changes).await.expect("update should succeed");

        assert_eq!(result, Some(after));
        assert_eq!(db.into_transaction_log().len(), 3);
    }

    #[tokio::test]
    async fn update_reports_none_when_row_vanishes_mid_update() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![todo_model(5, "racy", false)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([Vec::<todo::Model>::new()])
            .into_connection();
        let dao = TodoDao::new(&db);

        let result = dao
            .update(5, UpdateTodo::default())
            .await
            .expect("update should not fail");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_without_affected_rows_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let dao = TodoDao::new(&db);

        let err = dao.delete(9).await.expect_err("delete should report not found");
        assert!(matches!(err, DaoLayerError::NotFound { id: 9, .. }));
    }

    #[tokio::test]
    async fn search_maps_database_errors() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_errors([DbErr::Custom("query failed".to_string())])
            .into_connection();
        let dao = TodoDao::new(&db);

        let err = dao
            .search(&FilterOptions::default())
            .await
            .expect_err("search should fail");
        assert!(matches!(err, DaoLayerError::Db(_)));
    }
}
