//! Career goals, review cadence and review sessions.
//!
//! Sessions are recorded by hand; nothing here schedules them from the
//! cadence.

use crate::db::models::{
    CareerGoal, OneOnOneCadence, PerformanceCadence, ReviewCadence, ReviewKind, ReviewSession,
};
use crate::error::{Result, SprintError};
use crate::session::Session;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

pub struct ReviewManager<'a> {
    pool: &'a SqlitePool,
    session: &'a Session,
}

impl<'a> ReviewManager<'a> {
    pub fn new(pool: &'a SqlitePool, session: &'a Session) -> Self {
        Self { pool, session }
    }

    // ── Goals ───────────────────────────────────────────────────────

    pub async fn list_goals(&self) -> Result<Vec<CareerGoal>> {
        let goals = sqlx::query_as::<_, CareerGoal>(
            r#"
            SELECT id, title, description, target_date, user_id, created_at
            FROM career_goals
            ORDER BY target_date ASC, created_at ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;
        Ok(goals)
    }

    pub async fn create_goal(
        &self,
        title: &str,
        description: Option<&str>,
        target_date: Option<NaiveDate>,
    ) -> Result<CareerGoal> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SprintError::Validation("Goal title is required".to_string()));
        }
        let target_date = target_date
            .ok_or_else(|| SprintError::Validation("Goal target date is required".to_string()))?;

        let goal = CareerGoal {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            target_date,
            user_id: self.session.user_id().to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO career_goals (id, title, description, target_date, user_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&goal.id)
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.target_date)
        .bind(&goal.user_id)
        .bind(goal.created_at)
        .execute(self.pool)
        .await
        .map_err(|e| SprintError::DatabaseError(e).into_persistence("create goal", "Goal", &goal.id))?;

        Ok(goal)
    }

    pub async fn delete_goal(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM career_goals WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(SprintError::not_found("Goal", id));
        }
        Ok(())
    }

    // ── Cadence ─────────────────────────────────────────────────────

    /// The session user's cadence, if one was ever set
    pub async fn cadence(&self) -> Result<Option<ReviewCadence>> {
        let cadence = sqlx::query_as::<_, ReviewCadence>(
            "SELECT user_id, one_on_one, performance, updated_at FROM review_cadence WHERE user_id = ?",
        )
        .bind(self.session.user_id())
        .fetch_optional(self.pool)
        .await?;
        Ok(cadence)
    }

    pub async fn set_cadence(
        &self,
        one_on_one: OneOnOneCadence,
        performance: PerformanceCadence,
    ) -> Result<ReviewCadence> {
        let cadence = ReviewCadence {
            user_id: self.session.user_id().to_string(),
            one_on_one,
            performance,
            updated_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO review_cadence (user_id, one_on_one, performance, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                one_on_one = excluded.one_on_one,
                performance = excluded.performance,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&cadence.user_id)
        .bind(cadence.one_on_one)
        .bind(cadence.performance)
        .bind(cadence.updated_at)
        .execute(self.pool)
        .await?;

        tracing::info!(
            one_on_one = ?cadence.one_on_one,
            performance = ?cadence.performance,
            "Review cadence updated"
        );
        Ok(cadence)
    }

    // ── Sessions ────────────────────────────────────────────────────

    pub async fn list_sessions(&self, kind: Option<ReviewKind>) -> Result<Vec<ReviewSession>> {
        let mut builder: sqlx::QueryBuilder<sqlx::Sqlite> = sqlx::QueryBuilder::new(
            "SELECT id, kind, scheduled_date, notes, user_id, created_at FROM review_sessions",
        );
        if let Some(kind) = kind {
            builder.push(" WHERE kind = ").push_bind(kind);
        }
        builder.push(" ORDER BY scheduled_date ASC, created_at ASC");

        let sessions = builder
            .build_query_as::<ReviewSession>()
            .fetch_all(self.pool)
            .await?;
        Ok(sessions)
    }

    pub async fn create_session(
        &self,
        kind: ReviewKind,
        scheduled_date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<ReviewSession> {
        let session = ReviewSession {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            scheduled_date,
            notes: notes
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            user_id: self.session.user_id().to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO review_sessions (id, kind, scheduled_date, notes, user_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(session.kind)
        .bind(session.scheduled_date)
        .bind(&session.notes)
        .bind(&session.user_id)
        .bind(session.created_at)
        .execute(self.pool)
        .await?;

        Ok(session)
    }

    pub async fn delete_session(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM review_sessions WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(SprintError::not_found("Review session", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::{date, TestContext};

    #[tokio::test]
    async fn test_goal_requires_title_and_date() {
        let ctx = TestContext::new().await;
        let session = ctx.session();
        let reviews = ReviewManager::new(ctx.pool(), &session);

        assert!(matches!(
            reviews.create_goal(" ", None, Some(date(2026, 1, 1))).await,
            Err(SprintError::Validation(_))
        ));
        assert!(matches!(
            reviews.create_goal("Lead a team", None, None).await,
            Err(SprintError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_goals_listed_by_target_date() {
        let ctx = TestContext::new().await;
        let session = ctx.session();
        let reviews = ReviewManager::new(ctx.pool(), &session);
        reviews
            .create_goal("Later", None, Some(date(2027, 1, 1)))
            .await
            .unwrap();
        let sooner = reviews
            .create_goal("Sooner", Some("  "), Some(date(2026, 1, 1)))
            .await
            .unwrap();
        assert!(sooner.description.is_none());

        let titles: Vec<_> = reviews
            .list_goals()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.title)
            .collect();
        assert_eq!(titles, vec!["Sooner", "Later"]);

        reviews.delete_goal(&sooner.id).await.unwrap();
        assert_eq!(reviews.list_goals().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cadence_upsert() {
        let ctx = TestContext::new().await;
        let session = ctx.session();
        let reviews = ReviewManager::new(ctx.pool(), &session);

        assert!(reviews.cadence().await.unwrap().is_none());

        reviews
            .set_cadence(OneOnOneCadence::Weekly, PerformanceCadence::Annual)
            .await
            .unwrap();
        reviews
            .set_cadence(OneOnOneCadence::Biweekly, PerformanceCadence::Quarterly)
            .await
            .unwrap();

        let cadence = reviews.cadence().await.unwrap().unwrap();
        assert_eq!(cadence.one_on_one, OneOnOneCadence::Biweekly);
        assert_eq!(cadence.performance, PerformanceCadence::Quarterly);
    }

    #[tokio::test]
    async fn test_sessions_filtered_and_sorted() {
        let ctx = TestContext::new().await;
        let session = ctx.session();
        let reviews = ReviewManager::new(ctx.pool(), &session);
        reviews
            .create_session(ReviewKind::Performance, date(2026, 3, 1), None)
            .await
            .unwrap();
        reviews
            .create_session(ReviewKind::OneOnOne, date(2026, 2, 1), Some("career chat"))
            .await
            .unwrap();
        let early = reviews
            .create_session(ReviewKind::OneOnOne, date(2026, 1, 1), None)
            .await
            .unwrap();

        let all = reviews.list_sessions(None).await.unwrap();
        let dates: Vec<_> = all.iter().map(|s| s.scheduled_date).collect();
        assert_eq!(
            dates,
            vec![date(2026, 1, 1), date(2026, 2, 1), date(2026, 3, 1)]
        );

        let one_on_ones = reviews
            .list_sessions(Some(ReviewKind::OneOnOne))
            .await
            .unwrap();
        assert_eq!(one_on_ones.len(), 2);

        reviews.delete_session(&early.id).await.unwrap();
        assert!(matches!(
            reviews.delete_session(&early.id).await,
            Err(SprintError::NotFound { .. })
        ));
    }
}
