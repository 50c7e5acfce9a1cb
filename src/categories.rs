use crate::db::models::Category;
use crate::error::{Result, SprintError};
use sqlx::SqlitePool;

/// Display colors offered for new categories; the first is the default
pub const CATEGORY_COLORS: &[(&str, &str)] = &[
    ("blue", "#3b82f6"),
    ("green", "#22c55e"),
    ("amber", "#f59e0b"),
    ("red", "#ef4444"),
    ("purple", "#a855f7"),
    ("pink", "#ec4899"),
    ("teal", "#14b8a6"),
    ("slate", "#64748b"),
];

/// Resolve a palette name or a `#rrggbb` literal to a color value
pub fn resolve_color(input: Option<&str>) -> Result<String> {
    let Some(raw) = input else {
        return Ok(CATEGORY_COLORS[0].1.to_string());
    };
    let raw = raw.trim();

    if let Some((_, value)) = CATEGORY_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(raw))
    {
        return Ok(value.to_string());
    }

    let is_hex = raw.len() == 7
        && raw.starts_with('#')
        && raw[1..].chars().all(|c| c.is_ascii_hexdigit());
    if is_hex {
        return Ok(raw.to_lowercase());
    }

    Err(SprintError::Validation(format!(
        "Invalid color '{}'. Use a palette name or #rrggbb",
        raw
    )))
}

pub struct CategoryManager<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CategoryManager<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, color, user_id, created_at FROM categories ORDER BY name COLLATE NOCASE ASC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn insert_category(&self, category: &Category) -> Result<Category> {
        sqlx::query(
            "INSERT INTO categories (id, name, color, user_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.color)
        .bind(&category.user_id)
        .bind(category.created_at)
        .execute(self.pool)
        .await?;

        sqlx::query_as::<_, Category>(
            "SELECT id, name, color, user_id, created_at FROM categories WHERE id = ?",
        )
        .bind(&category.id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| SprintError::not_found("Category", category.id.as_str()))
    }

    /// Delete a category and detach it from every task that referenced it
    pub async fn delete_category(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let detached = sqlx::query("UPDATE tasks SET category_id = NULL WHERE category_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(SprintError::not_found("Category", id));
        }

        tx.commit().await?;

        tracing::debug!(category_id = %id, detached, "Category deleted");
        Ok(())
    }
}
