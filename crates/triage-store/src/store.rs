use crate::migrations::run_migrations;
use crate::models::{ChatMessage, Incident, NewIncident};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};
use tokio::task;
use triage_schema::{ClosedEnum, Sentiment, Urgency};

/// Sqlite-backed store for incidents and their chat transcripts. Cheap to
/// clone; all clones share one connection behind a mutex, and each operation
/// holds the lock only for its own statement.
#[derive(Clone)]
pub struct IncidentStore {
    db: Arc<Mutex<Connection>>,
}

impl IncidentStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        run_migrations(&conn)?;
        tracing::debug!("opened incident store at {path}");
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn create_incident(&self, new: NewIncident) -> Result<Incident> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let created_at = Utc::now();
            let conn = db
                .lock()
                .map_err(|_| anyhow!("failed to lock sqlite connection"))?;
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                r#"
                INSERT INTO incidents (request_text, created_at, suggested_response, sentiment, urgency)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    new.request_text,
                    created_at.to_rfc3339(),
                    new.suggested_response,
                    new.sentiment.label(),
                    new.urgency.label(),
                ],
            )?;
            let id = tx.last_insert_rowid();
            for (position, tag) in new.tags.iter().enumerate() {
                tx.execute(
                    "INSERT INTO incident_tags (incident_id, position, tag) VALUES (?1, ?2, ?3)",
                    params![id, position as i64, tag],
                )?;
            }
            tx.commit()?;

            Ok::<Incident, anyhow::Error>(Incident {
                id,
                request_text: new.request_text,
                created_at,
                suggested_response: new.suggested_response,
                sentiment: new.sentiment,
                urgency: new.urgency,
                tags: new.tags,
            })
        })
        .await?
    }

    pub async fn get_incident(&self, id: i64) -> Result<Option<Incident>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| anyhow!("failed to lock sqlite connection"))?;
            let incident = conn
                .query_row(
                    r#"
                    SELECT id, request_text, created_at, suggested_response, sentiment, urgency
                    FROM incidents
                    WHERE id = ?1
                    "#,
                    params![id],
                    row_to_incident,
                )
                .optional()?;

            match incident {
                Some(mut incident) => {
                    incident.tags = load_tags(&conn, incident.id)?;
                    Ok(Some(incident))
                }
                None => Ok(None),
            }
        })
        .await?
    }

    pub async fn list_incidents(&self) -> Result<Vec<Incident>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| anyhow!("failed to lock sqlite connection"))?;
            let mut stmt = conn.prepare(
                r#"
                SELECT id, request_text, created_at, suggested_response, sentiment, urgency
                FROM incidents
                ORDER BY id
                "#,
            )?;
            let rows = stmt.query_map([], row_to_incident)?;
            let mut incidents = Vec::new();
            for row in rows {
                incidents.push(row?);
            }
            for incident in &mut incidents {
                incident.tags = load_tags(&conn, incident.id)?;
            }
            Ok::<Vec<Incident>, anyhow::Error>(incidents)
        })
        .await?
    }

    pub async fn append_chat_message(
        &self,
        incident_id: i64,
        role: &str,
        content: &str,
    ) -> Result<ChatMessage> {
        let db = Arc::clone(&self.db);
        let role = role.to_owned();
        let content = content.to_owned();
        task::spawn_blocking(move || {
            let timestamp = Utc::now();
            let conn = db
                .lock()
                .map_err(|_| anyhow!("failed to lock sqlite connection"))?;
            conn.execute(
                r#"
                INSERT INTO chat_messages (incident_id, role, content, timestamp)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![incident_id, role, content, timestamp.to_rfc3339()],
            )?;
            let id = conn.last_insert_rowid();

            Ok::<ChatMessage, anyhow::Error>(ChatMessage {
                id,
                incident_id,
                role,
                content,
                timestamp,
            })
        })
        .await?
    }

    /// All persisted turns for an incident, oldest first. The id tiebreak
    /// keeps same-second turns in insertion order.
    pub async fn list_chat_messages(&self, incident_id: i64) -> Result<Vec<ChatMessage>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| anyhow!("failed to lock sqlite connection"))?;
            let mut stmt = conn.prepare(
                r#"
                SELECT id, incident_id, role, content, timestamp
                FROM chat_messages
                WHERE incident_id = ?1
                ORDER BY timestamp, id
                "#,
            )?;
            let rows = stmt.query_map(params![incident_id], row_to_chat_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok::<Vec<ChatMessage>, anyhow::Error>(messages)
        })
        .await?
    }
}

fn load_tags(conn: &Connection, incident_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT tag FROM incident_tags WHERE incident_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![incident_id], |row| row.get::<_, String>(0))?;
    let mut tags = Vec::new();
    for row in rows {
        tags.push(row?);
    }
    Ok(tags)
}

fn parse_datetime_sql(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_label_sql<T: ClosedEnum>(raw: &str) -> rusqlite::Result<T> {
    T::parse_label(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unrecognized label: {raw}").into(),
        )
    })
}

fn row_to_incident(row: &Row<'_>) -> rusqlite::Result<Incident> {
    let created_at_raw: String = row.get(2)?;
    let sentiment_raw: String = row.get(4)?;
    let urgency_raw: String = row.get(5)?;

    Ok(Incident {
        id: row.get(0)?,
        request_text: row.get(1)?,
        created_at: parse_datetime_sql(&created_at_raw)?,
        suggested_response: row.get(3)?,
        sentiment: parse_label_sql::<Sentiment>(&sentiment_raw)?,
        urgency: parse_label_sql::<Urgency>(&urgency_raw)?,
        tags: Vec::new(),
    })
}

fn row_to_chat_message(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    let timestamp_raw: String = row.get(4)?;

    Ok(ChatMessage {
        id: row.get(0)?,
        incident_id: row.get(1)?,
        role: row.get(2)?,
        content: row.get(3)?,
        timestamp: parse_datetime_sql(&timestamp_raw)?,
    })
}
