use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow},
    Row,
};
use std::path::PathBuf;

use crate::habits::{Habit, HabitCategory, HabitLog};

// ─── Database ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect() -> Result<Self> {
        let dir = data_dir();
        std::fs::create_dir_all(&dir)?;
        let url = format!("sqlite://{}?mode=rwc", dir.join("habits.db").display());
        Self::connect_url(&url).await
    }

    pub async fn connect_url(url: &str) -> Result<Self> {
        Ok(Self { pool: SqlitePool::connect(url).await? })
    }

    /// A private database that lives as long as this handle. One connection,
    /// never recycled, since every SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:").await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS habits (
                id TEXT PRIMARY KEY, title TEXT NOT NULL, description TEXT NOT NULL,
                category TEXT NOT NULL, start_date TEXT NOT NULL,
                target_frequency TEXT NOT NULL, streak INTEGER NOT NULL DEFAULT 0,
                color TEXT NOT NULL, ai_motivation TEXT
            )"
        ).execute(&self.pool).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS habit_logs (
                habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
                date TEXT NOT NULL, completed INTEGER NOT NULL DEFAULT 1, notes TEXT,
                PRIMARY KEY (habit_id, date)
            )"
        ).execute(&self.pool).await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_habit_logs_date ON habit_logs(date)")
            .execute(&self.pool).await?;

        tracing::info!("DB migrations complete");
        Ok(())
    }

    // ── Habits ────────────────────────────────────────────────────────────────

    /// Writes the habit row and every log entry it carries.
    pub async fn upsert_habit(&self, h: &Habit) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO habits
                (id,title,description,category,start_date,target_frequency,streak,color,ai_motivation)
             VALUES (?,?,?,?,?,?,?,?,?)
             ON CONFLICT(id) DO UPDATE SET
                title=excluded.title, description=excluded.description,
                category=excluded.category, target_frequency=excluded.target_frequency,
                streak=excluded.streak, color=excluded.color,
                ai_motivation=excluded.ai_motivation"
        )
        .bind(&h.id).bind(&h.title).bind(&h.description)
        .bind(h.category.as_str()).bind(h.start_date.to_rfc3339())
        .bind(&h.target_frequency).bind(h.streak as i64)
        .bind(&h.color).bind(&h.ai_motivation)
        .execute(&mut *tx).await?;

        for log in &h.logs {
            upsert_log(&mut tx, &h.id, log).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Persists the log entry for `date` and the habit's current streak, after
    /// a toggle.
    pub async fn save_progress(&self, h: &Habit, date: &str) -> Result<()> {
        let log = h.logs.iter().find(|l| l.date == date)
            .ok_or_else(|| anyhow!("habit {} has no log for {date}", h.id))?;

        let mut tx = self.pool.begin().await?;
        upsert_log(&mut tx, &h.id, log).await?;
        sqlx::query("UPDATE habits SET streak=? WHERE id=?")
            .bind(h.streak as i64).bind(&h.id)
            .execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn set_motivation(&self, id: &str, text: &str) -> Result<()> {
        let done = sqlx::query("UPDATE habits SET ai_motivation=? WHERE id=?")
            .bind(text).bind(id)
            .execute(&self.pool).await?;
        if done.rows_affected() == 0 {
            return Err(anyhow!("no habit with id {id}"));
        }
        Ok(())
    }

    pub async fn delete_habit(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM habit_logs WHERE habit_id=?").bind(id).execute(&mut *tx).await?;
        sqlx::query("DELETE FROM habits WHERE id=?").bind(id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Newest habit first, each with its logs in the order they were recorded.
    pub async fn all_habits(&self) -> Result<Vec<Habit>> {
        let rows = sqlx::query("SELECT * FROM habits ORDER BY start_date DESC, title")
            .fetch_all(&self.pool).await?;
        let mut habits = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut h = row_to_habit(row)?;
            h.logs = self.logs_for(&h.id).await?;
            habits.push(h);
        }
        Ok(habits)
    }

    pub async fn habit(&self, id: &str) -> Result<Option<Habit>> {
        let Some(row) = sqlx::query("SELECT * FROM habits WHERE id=?")
            .bind(id).fetch_optional(&self.pool).await?
        else {
            return Ok(None);
        };
        let mut h = row_to_habit(&row)?;
        h.logs = self.logs_for(id).await?;
        Ok(Some(h))
    }

    async fn logs_for(&self, habit_id: &str) -> Result<Vec<HabitLog>> {
        let rows = sqlx::query(
            "SELECT date, completed, notes FROM habit_logs WHERE habit_id=? ORDER BY rowid"
        )
        .bind(habit_id).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_log).collect())
    }
}

async fn upsert_log(
    tx:       &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    habit_id: &str,
    log:      &HabitLog,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO habit_logs (habit_id,date,completed,notes) VALUES (?,?,?,?)
         ON CONFLICT(habit_id,date) DO UPDATE SET
            completed=excluded.completed, notes=excluded.notes"
    )
    .bind(habit_id).bind(&log.date).bind(log.completed as i32).bind(&log.notes)
    .execute(&mut **tx).await?;
    Ok(())
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn row_to_habit(row: &SqliteRow) -> Result<Habit> {
    let category: String = row.get("category");
    Ok(Habit {
        id:               row.get("id"),
        title:            row.get("title"),
        description:      row.get("description"),
        category:         HabitCategory::parse(&category),
        start_date:       parse_dt(row.get("start_date"))?,
        target_frequency: row.get("target_frequency"),
        streak:           row.get::<i64, _>("streak") as u32,
        logs:             Vec::new(),
        color:            row.get("color"),
        ai_motivation:    row.get("ai_motivation"),
    })
}

fn row_to_log(row: &SqliteRow) -> HabitLog {
    HabitLog {
        date:      row.get("date"),
        completed: row.get::<i32, _>("completed") != 0,
        notes:     row.get("notes"),
    }
}

fn parse_dt(s: String) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(&s)?.with_timezone(&Utc))
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("habit-inception")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habits::{toggle_log, AiHabitPlan};
    use chrono::NaiveDate;

    async fn db() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

    #[tokio::test]
    async fn habit_round_trips_with_logs() {
        let db = db().await;
        let mut h = Habit::from_plan(&AiHabitPlan::manual("Journal"));
        toggle_log(&mut h, "2024-03-19", ymd(2024, 3, 20));
        toggle_log(&mut h, "2024-03-20", ymd(2024, 3, 20));
        db.upsert_habit(&h).await.unwrap();

        let got = db.habit(&h.id).await.unwrap().unwrap();
        assert_eq!(got.title, "Journal");
        assert_eq!(got.streak, 2);
        assert_eq!(got.logs, h.logs);
        assert_eq!(got.category, HabitCategory::Other);
    }

    #[tokio::test]
    async fn progress_updates_one_day() {
        let db = db().await;
        let mut h = Habit::from_plan(&AiHabitPlan::manual("Run"));
        db.upsert_habit(&h).await.unwrap();

        toggle_log(&mut h, "2024-03-20", ymd(2024, 3, 20));
        db.save_progress(&h, "2024-03-20").await.unwrap();
        toggle_log(&mut h, "2024-03-20", ymd(2024, 3, 20));
        db.save_progress(&h, "2024-03-20").await.unwrap();

        let got = db.habit(&h.id).await.unwrap().unwrap();
        assert_eq!(got.logs.len(), 1);
        assert!(!got.logs[0].completed);
        assert_eq!(got.streak, 0);

        assert!(db.save_progress(&h, "1999-01-01").await.is_err());
    }

    #[tokio::test]
    async fn motivation_and_delete() {
        let db = db().await;
        let h = Habit::from_plan(&AiHabitPlan::manual("Floss"));
        db.upsert_habit(&h).await.unwrap();

        db.set_motivation(&h.id, "Nice. Tip: keep floss by the sink.").await.unwrap();
        assert!(db.set_motivation("missing", "x").await.is_err());
        let all = db.all_habits().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].ai_motivation.as_deref(), Some("Nice. Tip: keep floss by the sink."));

        db.delete_habit(&h.id).await.unwrap();
        assert!(db.all_habits().await.unwrap().is_empty());
        assert!(db.habit(&h.id).await.unwrap().is_none());
    }
}
