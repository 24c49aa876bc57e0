use sea_orm::sea_query::{Expr, ExprTrait, LikeExpr};
use sea_orm::{ColumnTrait, Condition, Order};

use crate::db::entities::todo;

const LIKE_ESCAPE: char = '!';

/// Columns a todo listing may be ordered by. User input is mapped onto this
/// set; it never reaches the SQL text as an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
}

impl SortField {
    /// Unknown values fall back to `CreatedAt` without an error.
    pub fn parse(value: &str) -> Self {
        match value {
            "createdAt" | "created_at" => SortField::CreatedAt,
            "updatedAt" | "updated_at" => SortField::UpdatedAt,
            "title" => SortField::Title,
            _ => SortField::CreatedAt,
        }
    }

    pub fn column(self) -> todo::Column {
        match self {
            SortField::CreatedAt => todo::Column::CreatedAt,
            SortField::UpdatedAt => todo::Column::UpdatedAt,
            SortField::Title => todo::Column::Title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Only the exact literal `asc` sorts ascending.
    pub fn parse(value: &str) -> Self {
        if value == "asc" {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    pub fn order(self) -> Order {
        match self {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Substring matched against title or description. Empty means no filter.
    pub search: String,
    pub completed: Option<bool>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl FilterOptions {
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if !self.search.is_empty() {
            let pattern = format!("%{}%", escape_like(&self.search));
            condition = condition.add(
                Condition::any()
                    .add(
                        Expr::col(todo::Column::Title)
                            .like(LikeExpr::new(pattern.clone()).escape(LIKE_ESCAPE)),
                    )
                    .add(
                        Expr::col(todo::Column::Description)
                            .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
                    ),
            );
        }

        if let Some(completed) = self.completed {
            condition = condition.add(todo::Column::Completed.eq(completed));
        }

        condition
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if ch == LIKE_ESCAPE || ch == '%' || ch == '_' {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}
