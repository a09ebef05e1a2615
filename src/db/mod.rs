use sqlx::{migrate::MigrateDatabase, sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow}, Sqlite, Row};
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;
use crate::error::{Error, Result};
use crate::models::{
    AttendanceRecord, AttendanceStatus, Attendee, Candidate, Meeting, MeetingKind, MemberRef, Motion,
    Debate, Outcome, Policy, PolicyType, VoteItem, VoteRecord, VoteResult,
};
use crate::progress::member::MemberVote;
use crate::snapshot::Snapshot;

pub struct Database {
    pool: SqlitePool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImportSummary {
    pub meetings: usize,
    pub vote_items: usize,
    pub policies: usize,
    pub candidates: usize,
    pub debates: usize,
}

impl Database {
    pub async fn new(db_url: &str, max_connections: u32) -> Result<Self> {
        // Create database if it doesn't exist
        if !db_url.contains(":memory:") && !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating database {}", db_url);
            Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS meetings (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                date TEXT,
                kind TEXT NOT NULL,
                campus TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS attendees (
                meeting_id TEXT NOT NULL,
                member_id TEXT,
                member_name TEXT,
                status TEXT,
                position INTEGER NOT NULL,
                FOREIGN KEY (meeting_id) REFERENCES meetings(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vote_items (
                id TEXT PRIMARY KEY,
                meeting_id TEXT NOT NULL,
                title TEXT NOT NULL,
                position INTEGER NOT NULL,
                FOREIGN KEY (meeting_id) REFERENCES meetings(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vote_results (
                vote_item_id TEXT NOT NULL,
                member_id TEXT,
                member_name TEXT,
                outcome TEXT NOT NULL,
                position INTEGER NOT NULL,
                FOREIGN KEY (vote_item_id) REFERENCES vote_items(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS motions (
                id TEXT PRIMARY KEY,
                meeting_id TEXT NOT NULL,
                title TEXT NOT NULL,
                proposer_id TEXT,
                proposer_name TEXT,
                position INTEGER NOT NULL,
                FOREIGN KEY (meeting_id) REFERENCES meetings(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS policies (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                slug TEXT NOT NULL,
                category TEXT NOT NULL,
                summary TEXT NOT NULL,
                progress INTEGER NOT NULL,
                policy_type TEXT NOT NULL,
                campus TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS candidates (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                number INTEGER,
                position TEXT,
                campus TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS debates (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                slug TEXT NOT NULL,
                summary TEXT NOT NULL,
                date TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Replaces everything stored with the contents of `snapshot`.
    pub async fn import_snapshot(&self, snapshot: &Snapshot) -> Result<ImportSummary> {
        let mut tx = self.pool.begin().await?;
        let mut summary = ImportSummary::default();

        for table in ["vote_results", "vote_items", "attendees", "motions", "meetings", "policies", "candidates", "debates"] {
            sqlx::query(&format!("DELETE FROM {}", table)).execute(&mut *tx).await?;
        }

        for meeting in &snapshot.meetings {
            sqlx::query(
                r#"
                INSERT INTO meetings (id, title, date, kind, campus)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&meeting.id)
            .bind(&meeting.title)
            .bind(meeting.date.map(|dt| dt.to_rfc3339()))
            .bind(meeting.kind.as_str())
            .bind(&meeting.campus)
            .execute(&mut *tx)
            .await?;

            for (i, attendee) in meeting.attendees.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO attendees (meeting_id, member_id, member_name, status, position)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&meeting.id)
                .bind(attendee.member.as_ref().map(|m| m.id.as_str()))
                .bind(attendee.member.as_ref().map(|m| m.name.as_str()))
                .bind(attendee.status.map(|status| status.as_str()))
                .bind(i as i64)
                .execute(&mut *tx)
                .await?;
            }

            for (i, item) in meeting.votes.iter().enumerate() {
                let item_id = Uuid::new_v4().to_string();
                sqlx::query(
                    r#"
                    INSERT INTO vote_items (id, meeting_id, title, position)
                    VALUES (?, ?, ?, ?)
                    "#,
                )
                .bind(&item_id)
                .bind(&meeting.id)
                .bind(&item.title)
                .bind(i as i64)
                .execute(&mut *tx)
                .await?;

                for (j, result) in item.results.iter().enumerate() {
                    sqlx::query(
                        r#"
                        INSERT INTO vote_results (vote_item_id, member_id, member_name, outcome, position)
                        VALUES (?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(&item_id)
                    .bind(result.member.as_ref().map(|m| m.id.as_str()))
                    .bind(result.member.as_ref().map(|m| m.name.as_str()))
                    .bind(result.vote.as_str())
                    .bind(j as i64)
                    .execute(&mut *tx)
                    .await?;
                }
                summary.vote_items += 1;
            }

            for (i, motion) in meeting.motions.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO motions (id, meeting_id, title, proposer_id, proposer_name, position)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&meeting.id)
                .bind(&motion.title)
                .bind(motion.proposer.as_ref().map(|m| m.id.as_str()))
                .bind(motion.proposer.as_ref().map(|m| m.name.as_str()))
                .bind(i as i64)
                .execute(&mut *tx)
                .await?;
            }
            summary.meetings += 1;
        }

        for policy in &snapshot.policies {
            sqlx::query(
                r#"
                INSERT INTO policies (id, title, slug, category, summary, progress, policy_type, campus)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&policy.id)
            .bind(&policy.title)
            .bind(&policy.slug)
            .bind(&policy.category)
            .bind(&policy.summary)
            .bind(i64::from(policy.progress))
            .bind(policy.policy_type.as_str())
            .bind(&policy.campus)
            .execute(&mut *tx)
            .await?;
            summary.policies += 1;
        }

        for candidate in &snapshot.candidates {
            sqlx::query(
                r#"
                INSERT INTO candidates (id, name, number, position, campus)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&candidate.id)
            .bind(&candidate.name)
            .bind(candidate.number.map(i64::from))
            .bind(&candidate.position)
            .bind(&candidate.campus)
            .execute(&mut *tx)
            .await?;
            summary.candidates += 1;
        }

        for debate in &snapshot.debates {
            sqlx::query(
                r#"
                INSERT INTO debates (id, title, slug, summary, date)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&debate.id)
            .bind(&debate.title)
            .bind(&debate.slug)
            .bind(&debate.summary)
            .bind(debate.date.map(|dt| dt.to_rfc3339()))
            .execute(&mut *tx)
            .await?;
            summary.debates += 1;
        }

        tx.commit().await?;
        Ok(summary)
    }

    // Meetings newest first, undated ones last
    pub async fn list_meetings(&self) -> Result<Vec<Meeting>> {
        let ids: Vec<String> = sqlx::query(
            r#"
            SELECT id FROM meetings
            ORDER BY date IS NULL, date DESC, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| row.get::<String, _>("id"))
        .collect();

        let mut meetings = Vec::with_capacity(ids.len());
        for id in ids {
            meetings.push(self.get_meeting(&id).await?);
        }
        Ok(meetings)
    }

    pub async fn get_meeting(&self, meeting_id: &str) -> Result<Meeting> {
        let row = sqlx::query(
            r#"
            SELECT id, title, date, kind, campus
            FROM meetings
            WHERE id = ?
            "#,
        )
        .bind(meeting_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("meeting {}", meeting_id)))?;

        let date = row
            .get::<Option<String>, _>("date")
            .map(|s| parse_date(&s))
            .transpose()?;

        let attendees = sqlx::query(
            r#"
            SELECT member_id, member_name, status
            FROM attendees
            WHERE meeting_id = ?
            ORDER BY position
            "#,
        )
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| -> Result<Attendee> {
            Ok(Attendee {
                status: parse_status(&row)?,
                member: member_ref(&row, "member_id", "member_name"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

        let item_rows = sqlx::query(
            r#"
            SELECT id, title
            FROM vote_items
            WHERE meeting_id = ?
            ORDER BY position
            "#,
        )
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await?;

        let mut votes = Vec::with_capacity(item_rows.len());
        for item in item_rows {
            let results = self
                .vote_results(&item.get::<String, _>("id"))
                .await?
                .into_iter()
                .map(|(member, outcome)| VoteResult { vote: outcome, member })
                .collect();
            votes.push(VoteItem {
                title: item.get("title"),
                results,
            });
        }

        let motions = sqlx::query(
            r#"
            SELECT title, proposer_id, proposer_name
            FROM motions
            WHERE meeting_id = ?
            ORDER BY position
            "#,
        )
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| Motion {
            title: row.get("title"),
            proposer: member_ref(&row, "proposer_id", "proposer_name"),
        })
        .collect();

        Ok(Meeting {
            id: row.get("id"),
            title: row.get("title"),
            date,
            kind: MeetingKind::from_db(&row.get::<String, _>("kind")),
            campus: row.get("campus"),
            attendees,
            votes,
            motions,
        })
    }

    /// Topic and votes of the `index`-th vote item of a meeting, in the
    /// order the CMS lists them.
    pub async fn get_vote_records(&self, meeting_id: &str, index: usize) -> Result<(String, Vec<VoteRecord>)> {
        let item = sqlx::query(
            r#"
            SELECT id, title
            FROM vote_items
            WHERE meeting_id = ? AND position = ?
            "#,
        )
        .bind(meeting_id)
        .bind(index as i64)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("vote item {} of meeting {}", index, meeting_id)))?;

        let records = self
            .vote_results(&item.get::<String, _>("id"))
            .await?
            .into_iter()
            .map(|(member, outcome)| VoteResult { vote: outcome, member }.to_record())
            .collect();

        Ok((item.get("title"), records))
    }

    async fn vote_results(&self, vote_item_id: &str) -> Result<Vec<(Option<MemberRef>, Outcome)>> {
        let results = sqlx::query(
            r#"
            SELECT member_id, member_name, outcome
            FROM vote_results
            WHERE vote_item_id = ?
            ORDER BY position
            "#,
        )
        .bind(vote_item_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| {
            (
                member_ref(&row, "member_id", "member_name"),
                Outcome::from_cms(&row.get::<String, _>("outcome")),
            )
        })
        .collect();
        Ok(results)
    }

    // Every attendee entry of every meeting, for the dashboard pie chart
    pub async fn get_all_attendance(&self) -> Result<Vec<AttendanceStatus>> {
        sqlx::query("SELECT status FROM attendees WHERE status IS NOT NULL")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|row| row.get::<String, _>("status").parse::<AttendanceStatus>())
            .collect()
    }

    /// The member's status in every meeting that references them, as an
    /// attendee, a voter or a proposer. Meetings without an attendee entry
    /// for the member get no status. A member listed twice in one meeting
    /// counts once, first entry wins.
    pub async fn get_member_attendance(&self, member_id: &str) -> Result<Vec<AttendanceRecord>> {
        sqlx::query(
            r#"
            SELECT m.id AS meeting_id,
                (SELECT a.status FROM attendees a
                 WHERE a.meeting_id = m.id AND a.member_id = ?
                 ORDER BY a.position LIMIT 1) AS status
            FROM meetings m
            WHERE EXISTS (SELECT 1 FROM attendees a WHERE a.meeting_id = m.id AND a.member_id = ?)
               OR EXISTS (SELECT 1 FROM vote_items v JOIN vote_results r ON r.vote_item_id = v.id
                          WHERE v.meeting_id = m.id AND r.member_id = ?)
               OR EXISTS (SELECT 1 FROM motions mo WHERE mo.meeting_id = m.id AND mo.proposer_id = ?)
            ORDER BY m.date IS NULL, m.date DESC, m.id
            "#,
        )
        .bind(member_id)
        .bind(member_id)
        .bind(member_id)
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| -> Result<AttendanceRecord> {
            Ok(AttendanceRecord {
                meeting_id: row.get("meeting_id"),
                status: parse_status(&row)?,
            })
        })
        .collect()
    }

    pub async fn get_member_votes(&self, member_id: &str) -> Result<Vec<MemberVote>> {
        let rows = sqlx::query(
            r#"
            SELECT v.id AS item_id, v.title AS topic, m.id AS meeting_id, m.title AS meeting_title, r.outcome
            FROM vote_results r
            JOIN vote_items v ON v.id = r.vote_item_id
            JOIN meetings m ON m.id = v.meeting_id
            WHERE r.member_id = ?
            ORDER BY m.date IS NULL, m.date DESC, m.id, v.position, r.position
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        let mut seen = HashSet::new();
        let mut votes = Vec::new();
        for row in rows {
            if seen.insert(row.get::<String, _>("item_id")) {
                votes.push(MemberVote {
                    meeting_id: row.get("meeting_id"),
                    meeting_title: row.get("meeting_title"),
                    topic: row.get("topic"),
                    outcome: Outcome::from_cms(&row.get::<String, _>("outcome")),
                });
            }
        }
        Ok(votes)
    }

    pub async fn count_member_motions(&self, member_id: &str) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS motions FROM motions WHERE proposer_id = ?")
            .bind(member_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("motions") as usize)
    }

    // Display name for a member, from the candidate list or any attendee entry
    pub async fn member_name(&self, member_id: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT name FROM candidates WHERE id = ?
            UNION ALL
            SELECT member_name AS name FROM attendees WHERE member_id = ? AND member_name IS NOT NULL
            LIMIT 1
            "#,
        )
        .bind(member_id)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|row| row.get::<String, _>("name")))
    }

    pub async fn get_policies(&self) -> Result<Vec<Policy>> {
        let policies = sqlx::query(
            r#"
            SELECT id, title, slug, category, summary, progress, policy_type, campus
            FROM policies
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| Policy {
            id: row.get("id"),
            title: row.get("title"),
            slug: row.get("slug"),
            category: row.get("category"),
            summary: row.get("summary"),
            progress: row.get::<i64, _>("progress").clamp(0, u32::MAX as i64) as u32,
            policy_type: PolicyType::from_db(&row.get::<String, _>("policy_type")),
            campus: row.get("campus"),
        })
        .collect();
        Ok(policies)
    }

    pub async fn get_candidates(&self) -> Result<Vec<Candidate>> {
        let candidates = sqlx::query(
            r#"
            SELECT id, name, number, position, campus
            FROM candidates
            ORDER BY number IS NULL, number, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| Candidate {
            id: row.get("id"),
            name: row.get("name"),
            number: row.get::<Option<i64>, _>("number").map(|n| n as u32),
            position: row.get("position"),
            campus: row.get("campus"),
        })
        .collect();
        Ok(candidates)
    }

    // Newest first, undated ones last
    pub async fn get_latest_debates(&self, limit: u32) -> Result<Vec<Debate>> {
        sqlx::query(
            r#"
            SELECT id, title, slug, summary, date
            FROM debates
            ORDER BY date IS NULL, date DESC, id
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| -> Result<Debate> {
            Ok(Debate {
                id: row.get("id"),
                title: row.get("title"),
                slug: row.get("slug"),
                summary: row.get("summary"),
                date: row.get::<Option<String>, _>("date").map(|s| parse_date(&s)).transpose()?,
            })
        })
        .collect()
    }
}

fn parse_status(row: &SqliteRow) -> Result<Option<AttendanceStatus>> {
    row.get::<Option<String>, _>("status")
        .map(|status| status.parse())
        .transpose()
}

fn member_ref(row: &SqliteRow, id_column: &str, name_column: &str) -> Option<MemberRef> {
    row.get::<Option<String>, _>(id_column).map(|id| MemberRef {
        id,
        name: row.get::<Option<String>, _>(name_column).unwrap_or_default(),
    })
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidInput(format!("Failed to parse date {}: {}", value, e)))
}
