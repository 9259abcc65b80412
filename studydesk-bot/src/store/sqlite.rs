//! SQLite-based storage implementation

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use studydesk_core::{Link, SubjectCode, Unit, UnitLinks};

use super::{
    MostAccessed, PaymentRequest, PaymentStatus, ResourceRow, Store, StoreResult, UsageStats,
    UserId, UserRecord,
};
use crate::error::BotError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// SQLite-backed store for all four record collections
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, BotError> {
        let conn = Connection::open(path).map_err(|e| BotError::Storage(e.to_string()))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| BotError::Storage(e.to_string()))?;

        Self::migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), BotError> {
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .map_err(|e| BotError::Storage(e.to_string()))?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    fn get_schema_version(conn: &Connection) -> Result<i32, BotError> {
        let table_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| BotError::Storage(e.to_string()))?;

        if !table_exists {
            return Ok(0);
        }

        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })
        .map_err(|e| BotError::Storage(e.to_string()))
    }

    /// Migration to version 1: initial schema
    fn migrate_v1(conn: &Connection) -> Result<(), BotError> {
        conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Users keyed by their messaging-channel id
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                search_count INTEGER NOT NULL DEFAULT 0,
                subscribed INTEGER NOT NULL DEFAULT 0,
                subscription_expires_at TEXT,
                created_at TEXT NOT NULL
            );

            -- One row per (subject, unit); empty rows are deleted by callers
            CREATE TABLE IF NOT EXISTS resources (
                subject_code TEXT NOT NULL,
                subject_name TEXT NOT NULL,
                unit INTEGER NOT NULL,
                notes_link TEXT,
                slides_link TEXT,
                past_papers_link TEXT,
                PRIMARY KEY (subject_code, unit)
            );

            -- Payment requests kept forever as an audit trail
            CREATE TABLE IF NOT EXISTS payment_requests (
                reference_id TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                submitted_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_payment_requests_user ON payment_requests(user_id);

            -- Per-subject delivery counters
            CREATE TABLE IF NOT EXISTS subject_access (
                subject_code TEXT PRIMARY KEY,
                access_count INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .map_err(|e| BotError::Storage(e.to_string()))?;

        Ok(())
    }
}

// Internal: stored links were validated on the way in; a bad value here means
// the database was edited by hand
fn links_from_columns(
    notes: Option<String>,
    slides: Option<String>,
    past_papers: Option<String>,
) -> StoreResult<UnitLinks> {
    let parse = |value: Option<String>| -> StoreResult<Option<Link>> {
        value
            .map(|s| Link::parse(&s).map_err(|e| BotError::Storage(format!("stored link: {e}"))))
            .transpose()
    };
    Ok(UnitLinks {
        notes: parse(notes)?,
        slides: parse(slides)?,
        past_papers: parse(past_papers)?,
    })
}

// Internal: raw resource columns in select order
type ResourceColumns = (String, i64, Option<String>, Option<String>, Option<String>);

fn resource_from_columns(code: &SubjectCode, raw: ResourceColumns) -> StoreResult<ResourceRow> {
    let (name, unit, notes, slides, past_papers) = raw;
    Ok(ResourceRow {
        code: code.clone(),
        name,
        unit: Unit::new(unit).map_err(|e| BotError::Storage(format!("stored unit: {e}")))?,
        links: links_from_columns(notes, slides, past_papers)?,
    })
}

impl Store for SqliteStore {
    fn ensure_user(&self, user: UserId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT OR IGNORE INTO users (id, search_count, subscribed, subscription_expires_at, created_at)
             VALUES (?1, 0, 0, NULL, ?2)",
            params![user.0 as i64, now],
        )
        .map_err(|e| BotError::Storage(e.to_string()))?;

        Ok(())
    }

    fn get_user(&self, user: UserId) -> StoreResult<Option<UserRecord>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, search_count, subscribed, subscription_expires_at, created_at
             FROM users WHERE id = ?1",
            params![user.0 as i64],
            |row| {
                let id: i64 = row.get(0)?;
                let search_count: i64 = row.get(1)?;
                let subscribed: i32 = row.get(2)?;
                let expires_at: Option<String> = row.get(3)?;
                let created_at: String = row.get(4)?;
                Ok(UserRecord {
                    id: UserId(id as u64),
                    search_count: search_count as u32,
                    subscribed: subscribed != 0,
                    subscription_expires_at: expires_at.and_then(|s| {
                        DateTime::parse_from_rfc3339(&s)
                            .map(|dt| dt.with_timezone(&Utc))
                            .ok()
                    }),
                    created_at: DateTime::parse_from_rfc3339(&created_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                })
            },
        )
        .optional()
        .map_err(|e| BotError::Storage(e.to_string()))
    }

    fn increment_search_count(&self, user: UserId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn
            .execute(
                "UPDATE users SET search_count = search_count + 1 WHERE id = ?1",
                params![user.0 as i64],
            )
            .map_err(|e| BotError::Storage(e.to_string()))?;

        if rows_affected == 0 {
            return Err(BotError::UserNotFound);
        }

        Ok(())
    }

    fn set_subscription(&self, user: UserId, expires_at: DateTime<Utc>) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn
            .execute(
                "UPDATE users SET subscribed = 1, subscription_expires_at = ?1 WHERE id = ?2",
                params![expires_at.to_rfc3339(), user.0 as i64],
            )
            .map_err(|e| BotError::Storage(e.to_string()))?;

        if rows_affected == 0 {
            return Err(BotError::UserNotFound);
        }

        Ok(())
    }

    fn clear_subscription(&self, user: UserId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn
            .execute(
                "UPDATE users SET subscribed = 0, subscription_expires_at = NULL WHERE id = ?1",
                params![user.0 as i64],
            )
            .map_err(|e| BotError::Storage(e.to_string()))?;

        if rows_affected == 0 {
            return Err(BotError::UserNotFound);
        }

        Ok(())
    }

    fn get_resource(&self, code: &SubjectCode, unit: Unit) -> StoreResult<Option<ResourceRow>> {
        let conn = self.conn.lock().unwrap();

        let raw = conn
            .query_row(
                "SELECT subject_name, unit, notes_link, slides_link, past_papers_link
                 FROM resources WHERE subject_code = ?1 AND unit = ?2",
                params![code.as_str(), unit.get()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| BotError::Storage(e.to_string()))?;

        raw.map(|columns| resource_from_columns(code, columns)).transpose()
    }

    fn list_resources(&self, code: &SubjectCode) -> StoreResult<Vec<ResourceRow>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT subject_name, unit, notes_link, slides_link, past_papers_link
                 FROM resources WHERE subject_code = ?1 ORDER BY unit ASC",
            )
            .map_err(|e| BotError::Storage(e.to_string()))?;

        let raw_rows = stmt
            .query_map(params![code.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })
            .map_err(|e| BotError::Storage(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BotError::Storage(e.to_string()))?;

        raw_rows
            .into_iter()
            .map(|columns| resource_from_columns(code, columns))
            .collect()
    }

    fn put_resource(&self, row: &ResourceRow) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT OR REPLACE INTO resources
             (subject_code, subject_name, unit, notes_link, slides_link, past_papers_link)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                row.code.as_str(),
                row.name,
                row.unit.get(),
                row.links.notes.as_ref().map(Link::as_str),
                row.links.slides.as_ref().map(Link::as_str),
                row.links.past_papers.as_ref().map(Link::as_str),
            ],
        )
        .map_err(|e| BotError::Storage(e.to_string()))?;

        Ok(())
    }

    fn delete_resource(&self, code: &SubjectCode, unit: Unit) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "DELETE FROM resources WHERE subject_code = ?1 AND unit = ?2",
            params![code.as_str(), unit.get()],
        )
        .map_err(|e| BotError::Storage(e.to_string()))?;

        Ok(())
    }

    fn delete_subject(&self, code: &SubjectCode) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();

        let rows_deleted = conn
            .execute(
                "DELETE FROM resources WHERE subject_code = ?1",
                params![code.as_str()],
            )
            .map_err(|e| BotError::Storage(e.to_string()))?;

        Ok(rows_deleted as u64)
    }

    fn create_payment_request(&self, request: PaymentRequest) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO payment_requests (reference_id, user_id, status, submitted_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                request.reference,
                request.user.0 as i64,
                request.status.as_str(),
                request.submitted_at.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if let rusqlite::Error::SqliteFailure(ref err, _) = e {
                if err.code == rusqlite::ErrorCode::ConstraintViolation {
                    return BotError::DuplicateReference(request.reference.clone());
                }
            }
            BotError::Storage(e.to_string())
        })?;

        Ok(())
    }

    fn find_pending_payment(
        &self,
        reference: &str,
        requester: Option<UserId>,
    ) -> StoreResult<Option<PaymentRequest>> {
        let conn = self.conn.lock().unwrap();

        let map_row = |row: &rusqlite::Row<'_>| {
            let reference: String = row.get(0)?;
            let user_id: i64 = row.get(1)?;
            let status: String = row.get(2)?;
            let submitted_at: String = row.get(3)?;
            Ok(PaymentRequest {
                reference,
                user: UserId(user_id as u64),
                status: PaymentStatus::from_str(&status).unwrap_or(PaymentStatus::Pending),
                submitted_at: DateTime::parse_from_rfc3339(&submitted_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        };

        let result = match requester {
            Some(user) => conn
                .query_row(
                    "SELECT reference_id, user_id, status, submitted_at FROM payment_requests
                     WHERE reference_id = ?1 AND status = 'pending' AND user_id = ?2",
                    params![reference, user.0 as i64],
                    map_row,
                )
                .optional(),
            None => conn
                .query_row(
                    "SELECT reference_id, user_id, status, submitted_at FROM payment_requests
                     WHERE reference_id = ?1 AND status = 'pending'",
                    params![reference],
                    map_row,
                )
                .optional(),
        };

        result.map_err(|e| BotError::Storage(e.to_string()))
    }

    fn mark_payment_verified(&self, reference: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn
            .execute(
                "UPDATE payment_requests SET status = 'verified' WHERE reference_id = ?1",
                params![reference],
            )
            .map_err(|e| BotError::Storage(e.to_string()))?;

        if rows_affected == 0 {
            return Err(BotError::ReferenceNotFound);
        }

        Ok(())
    }

    fn pending_payments(&self) -> StoreResult<Vec<PaymentRequest>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT reference_id, user_id, status, submitted_at FROM payment_requests
                 WHERE status = 'pending' ORDER BY submitted_at DESC",
            )
            .map_err(|e| BotError::Storage(e.to_string()))?;

        let pending = stmt
            .query_map([], |row| {
                let reference: String = row.get(0)?;
                let user_id: i64 = row.get(1)?;
                let status: String = row.get(2)?;
                let submitted_at: String = row.get(3)?;
                Ok(PaymentRequest {
                    reference,
                    user: UserId(user_id as u64),
                    status: PaymentStatus::from_str(&status).unwrap_or(PaymentStatus::Pending),
                    submitted_at: DateTime::parse_from_rfc3339(&submitted_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                })
            })
            .map_err(|e| BotError::Storage(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BotError::Storage(e.to_string()))?;

        Ok(pending)
    }

    fn has_verified_payment(&self, user: UserId) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM payment_requests WHERE user_id = ?1 AND status = 'verified'",
                params![user.0 as i64],
                |row| row.get(0),
            )
            .map_err(|e| BotError::Storage(e.to_string()))?;

        Ok(count > 0)
    }

    fn increment_subject_access(&self, code: &SubjectCode) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO subject_access (subject_code, access_count) VALUES (?1, 1)
             ON CONFLICT(subject_code) DO UPDATE SET access_count = access_count + 1",
            params![code.as_str()],
        )
        .map_err(|e| BotError::Storage(e.to_string()))?;

        Ok(())
    }

    fn most_accessed_subject(&self) -> StoreResult<Option<(SubjectCode, u64)>> {
        let conn = self.conn.lock().unwrap();

        let raw = conn
            .query_row(
                "SELECT subject_code, access_count FROM subject_access
                 ORDER BY access_count DESC, subject_code ASC LIMIT 1",
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()
            .map_err(|e| BotError::Storage(e.to_string()))?;

        raw.map(|(code, count)| {
            let code = SubjectCode::parse(&code)
                .map_err(|e| BotError::Storage(format!("stored subject code: {e}")))?;
            Ok((code, count as u64))
        })
        .transpose()
    }

    fn usage_stats(&self) -> StoreResult<UsageStats> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        let count = |sql: &str, params: &[&dyn rusqlite::ToSql]| -> StoreResult<u64> {
            conn.query_row(sql, params, |row| row.get::<_, i64>(0))
                .map(|n| n as u64)
                .map_err(|e| BotError::Storage(e.to_string()))
        };

        let total_users = count("SELECT COUNT(*) FROM users", &[])?;
        let active_subscribers = count(
            "SELECT COUNT(*) FROM users WHERE subscribed = 1 AND subscription_expires_at > ?1",
            &[&now],
        )?;
        let verified_payments = count(
            "SELECT COUNT(*) FROM payment_requests WHERE status = 'verified'",
            &[],
        )?;
        let pending_payments = count(
            "SELECT COUNT(*) FROM payment_requests WHERE status = 'pending'",
            &[],
        )?;
        let resource_rows = count("SELECT COUNT(*) FROM resources", &[])?;
        let subject_count = count("SELECT COUNT(DISTINCT subject_code) FROM resources", &[])?;

        let most_accessed = conn
            .query_row(
                "SELECT subject_code, access_count FROM subject_access
                 ORDER BY access_count DESC, subject_code ASC LIMIT 1",
                [],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()
            .map_err(|e| BotError::Storage(e.to_string()))?
            .map(|(code, count)| MostAccessed {
                code,
                count: count as u64,
            });

        Ok(UsageStats {
            total_users,
            active_subscribers,
            verified_payments,
            pending_payments,
            resource_rows,
            subject_count,
            most_accessed,
        })
    }
}
