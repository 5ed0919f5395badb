//! SQLite persistence layer for users, analyses, and skin profiles.
//!
//! Concerns, recommendations, and metrics are stored as JSON text columns;
//! the analysis insert and the profile upsert share one transaction.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;
use uuid::Uuid;

use dermalens_core::SkinAnalysis;

use crate::dto::AnalysisRecord;

/// Initializes the database, creating tables if needed.
pub fn init_db(path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create db directory")?;
        }
    }
    let conn = Connection::open(path).context("failed to open database")?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS analyses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            image_url TEXT NOT NULL,
            overall_health TEXT NOT NULL,
            skin_type TEXT NOT NULL,
            concerns TEXT NOT NULL,
            recommendations TEXT NOT NULL,
            analysis_metrics TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_analyses_user_created
            ON analyses (user_id, created_at DESC);
        CREATE TABLE IF NOT EXISTS skin_profiles (
            user_id TEXT PRIMARY KEY,
            skin_type TEXT NOT NULL,
            concerns TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    )
    .context("failed to create tables")?;
    info!("Database initialized at {}", path);
    Ok(conn)
}

// === Users ===

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password_hash: String,
}

/// Inserts a new user. Fails with a constraint violation when the username
/// is taken; callers map that to a conflict response.
pub fn create_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
) -> rusqlite::Result<UserRow> {
    let id = Uuid::new_v4().to_string();
    let created_at = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO users (id, username, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, username, password_hash, created_at],
    )?;
    Ok(UserRow {
        id,
        username: username.to_string(),
        password_hash: password_hash.to_string(),
    })
}

pub fn find_user(conn: &Connection, username: &str) -> rusqlite::Result<Option<UserRow>> {
    conn.query_row(
        "SELECT id, username, password_hash FROM users WHERE username = ?1",
        params![username],
        |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
            })
        },
    )
    .optional()
}

// === Analyses ===

struct RawAnalysisRow {
    id: i64,
    user_id: String,
    image_url: String,
    overall_health: String,
    skin_type: String,
    concerns: String,
    recommendations: String,
    analysis_metrics: String,
    created_at: String,
}

fn row_to_raw(row: &Row) -> rusqlite::Result<RawAnalysisRow> {
    Ok(RawAnalysisRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        image_url: row.get(2)?,
        overall_health: row.get(3)?,
        skin_type: row.get(4)?,
        concerns: row.get(5)?,
        recommendations: row.get(6)?,
        analysis_metrics: row.get(7)?,
        created_at: row.get(8)?,
    })
}

impl RawAnalysisRow {
    fn into_record(self) -> Option<AnalysisRecord> {
        Some(AnalysisRecord {
            id: self.id,
            user_id: self.user_id,
            image_url: self.image_url,
            overall_health: self.overall_health,
            skin_type: self.skin_type,
            concerns: serde_json::from_str(&self.concerns).ok()?,
            recommendations: serde_json::from_str(&self.recommendations).ok()?,
            analysis_metrics: serde_json::from_str(&self.analysis_metrics).ok()?,
            created_at: self.created_at,
        })
    }
}

const ANALYSIS_COLUMNS: &str = "id, user_id, image_url, overall_health, skin_type, \
     concerns, recommendations, analysis_metrics, created_at";

/// Inserts an analysis record and upserts the user's skin profile in a
/// single transaction.
pub fn insert_analysis_with_profile(
    conn: &mut Connection,
    user_id: &str,
    image_url: &str,
    analysis: &SkinAnalysis,
) -> Result<AnalysisRecord> {
    let concerns_json =
        serde_json::to_string(&analysis.concerns).context("failed to serialize concerns")?;
    let recommendations_json = serde_json::to_string(&analysis.recommendations)
        .context("failed to serialize recommendations")?;
    let metrics_json = serde_json::to_string(&analysis.analysis_metrics)
        .context("failed to serialize metrics")?;
    let created_at = Utc::now().to_rfc3339();
    let concern_names = analysis.concern_names().join(", ");

    let tx = conn.transaction().context("failed to begin transaction")?;
    tx.execute(
        "INSERT INTO analyses (user_id, image_url, overall_health, skin_type, \
         concerns, recommendations, analysis_metrics, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user_id,
            image_url,
            analysis.overall_health,
            analysis.skin_type,
            concerns_json,
            recommendations_json,
            metrics_json,
            created_at
        ],
    )
    .context("failed to insert analysis")?;
    let id = tx.last_insert_rowid();

    tx.execute(
        "INSERT INTO skin_profiles (user_id, skin_type, concerns, updated_at) \
         VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(user_id) DO UPDATE SET \
             skin_type = excluded.skin_type, \
             concerns = excluded.concerns, \
             updated_at = excluded.updated_at",
        params![user_id, analysis.skin_type, concern_names, created_at],
    )
    .context("failed to upsert skin profile")?;
    tx.commit().context("failed to commit analysis")?;

    info!("Stored analysis {} for user {}", id, user_id);

    Ok(AnalysisRecord {
        id,
        user_id: user_id.to_string(),
        image_url: image_url.to_string(),
        overall_health: analysis.overall_health.clone(),
        skin_type: analysis.skin_type.clone(),
        concerns: analysis.concerns.clone(),
        recommendations: analysis.recommendations.clone(),
        analysis_metrics: analysis.analysis_metrics.clone(),
        created_at,
    })
}

pub fn count_analyses(conn: &Connection, user_id: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM analyses WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
    .context("failed to count analyses")
}

/// Lists the user's analyses, newest first.
pub fn list_analyses(
    conn: &Connection,
    user_id: &str,
    skip: i64,
    limit: i64,
) -> Result<Vec<AnalysisRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ANALYSIS_COLUMNS} FROM analyses WHERE user_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
        ))
        .context("failed to prepare list query")?;

    let rows = stmt
        .query_map(params![user_id, limit, skip], row_to_raw)
        .context("failed to query analyses")?;

    Ok(rows
        .filter_map(|row| row.ok().and_then(RawAnalysisRow::into_record))
        .collect())
}

/// Fetches a single analysis scoped to its owner.
pub fn get_analysis(
    conn: &Connection,
    user_id: &str,
    id: i64,
) -> Result<Option<AnalysisRecord>> {
    let raw = conn
        .query_row(
            &format!("SELECT {ANALYSIS_COLUMNS} FROM analyses WHERE id = ?1 AND user_id = ?2"),
            params![id, user_id],
            row_to_raw,
        )
        .optional()
        .context("failed to fetch analysis")?;

    Ok(raw.and_then(RawAnalysisRow::into_record))
}

/// Deletes a single analysis scoped to its owner. Returns whether a row was
/// removed.
pub fn delete_analysis(conn: &Connection, user_id: &str, id: i64) -> Result<bool> {
    let affected = conn
        .execute(
            "DELETE FROM analyses WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )
        .context("failed to delete analysis")?;
    Ok(affected > 0)
}

// === Skin Profiles ===

#[derive(Debug, Clone)]
pub struct SkinProfileRow {
    pub user_id: String,
    pub skin_type: String,
    pub concerns: String,
    pub updated_at: String,
}

pub fn get_skin_profile(
    conn: &Connection,
    user_id: &str,
) -> rusqlite::Result<Option<SkinProfileRow>> {
    conn.query_row(
        "SELECT user_id, skin_type, concerns, updated_at FROM skin_profiles WHERE user_id = ?1",
        params![user_id],
        |row| {
            Ok(SkinProfileRow {
                user_id: row.get(0)?,
                skin_type: row.get(1)?,
                concerns: row.get(2)?,
                updated_at: row.get(3)?,
            })
        },
    )
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dermalens_core::{AnalysisMetrics, Recommendation, SkinConcern};

    fn test_conn() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let conn = init_db(path.to_str().unwrap()).unwrap();
        (dir, conn)
    }

    fn sample_analysis(skin_type: &str, concern: &str) -> SkinAnalysis {
        SkinAnalysis {
            overall_health: "Good".into(),
            skin_type: skin_type.into(),
            concerns: vec![
                SkinConcern {
                    name: concern.into(),
                    severity: "Moderate".into(),
                    concern_type: Some("Inflammatory".into()),
                    confidence: 0.9,
                },
                SkinConcern {
                    name: "Dryness".into(),
                    severity: "Mild".into(),
                    concern_type: None,
                    confidence: 0.7,
                },
            ],
            recommendations: vec![Recommendation {
                title: "Use a Gentle Cleanser".into(),
                description: "Use a pH-balanced cleanser twice daily.".into(),
                priority: "High".into(),
            }],
            analysis_metrics: AnalysisMetrics {
                skin_hydration: 65,
                texture_uniformity: 78,
                pore_visibility: 45,
                overall_score: 72,
            },
        }
    }

    #[test]
    fn create_and_find_user() {
        let (_dir, conn) = test_conn();
        let user = create_user(&conn, "ada", "hash").unwrap();

        let found = find_user(&conn, "ada").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.password_hash, "hash");

        assert!(find_user(&conn, "nobody").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_a_constraint_violation() {
        let (_dir, conn) = test_conn();
        create_user(&conn, "ada", "hash").unwrap();

        let err = create_user(&conn, "ada", "other").unwrap_err();
        assert_eq!(
            err.sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        );
    }

    #[test]
    fn insert_creates_record_and_profile() {
        let (_dir, mut conn) = test_conn();

        let record = insert_analysis_with_profile(
            &mut conn,
            "user-1",
            "http://localhost:8000/uploads/skin-images/a.jpg",
            &sample_analysis("Oily", "Acne"),
        )
        .unwrap();

        assert_eq!(record.user_id, "user-1");
        assert_eq!(record.concerns.len(), 2);
        assert_eq!(count_analyses(&conn, "user-1").unwrap(), 1);

        let profile = get_skin_profile(&conn, "user-1").unwrap().unwrap();
        assert_eq!(profile.skin_type, "Oily");
        assert_eq!(profile.concerns, "Acne, Dryness");
    }

    #[test]
    fn profile_is_upserted_not_duplicated() {
        let (_dir, mut conn) = test_conn();

        insert_analysis_with_profile(&mut conn, "user-1", "url-a", &sample_analysis("Oily", "Acne"))
            .unwrap();
        insert_analysis_with_profile(
            &mut conn,
            "user-1",
            "url-b",
            &sample_analysis("Dry", "Rosacea"),
        )
        .unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM skin_profiles", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let profile = get_skin_profile(&conn, "user-1").unwrap().unwrap();
        assert_eq!(profile.skin_type, "Dry");
        assert_eq!(profile.concerns, "Rosacea, Dryness");

        assert_eq!(count_analyses(&conn, "user-1").unwrap(), 2);
    }

    #[test]
    fn list_paginates_newest_first() {
        let (_dir, mut conn) = test_conn();

        for i in 0..15 {
            insert_analysis_with_profile(
                &mut conn,
                "user-1",
                &format!("url-{i}"),
                &sample_analysis("Normal", "Acne"),
            )
            .unwrap();
        }

        let total = count_analyses(&conn, "user-1").unwrap();
        assert_eq!(total, 15);

        let first_page = list_analyses(&conn, "user-1", 0, 10).unwrap();
        assert_eq!(first_page.len(), 10);
        assert_eq!(first_page[0].id, 15);
        assert!(first_page.windows(2).all(|w| w[0].id > w[1].id));

        let second_page = list_analyses(&conn, "user-1", 10, 10).unwrap();
        assert_eq!(second_page.len(), 5);
        assert_eq!(second_page[4].id, 1);
    }

    #[test]
    fn records_are_scoped_to_their_owner() {
        let (_dir, mut conn) = test_conn();

        let record = insert_analysis_with_profile(
            &mut conn,
            "user-1",
            "url",
            &sample_analysis("Oily", "Acne"),
        )
        .unwrap();

        assert!(get_analysis(&conn, "user-2", record.id).unwrap().is_none());
        assert!(!delete_analysis(&conn, "user-2", record.id).unwrap());

        assert!(get_analysis(&conn, "user-1", record.id).unwrap().is_some());
    }

    #[test]
    fn delete_removes_the_record() {
        let (_dir, mut conn) = test_conn();

        let record = insert_analysis_with_profile(
            &mut conn,
            "user-1",
            "url",
            &sample_analysis("Oily", "Acne"),
        )
        .unwrap();

        assert!(delete_analysis(&conn, "user-1", record.id).unwrap());
        assert!(get_analysis(&conn, "user-1", record.id).unwrap().is_none());
        assert!(!delete_analysis(&conn, "user-1", record.id).unwrap());
    }
}
