use crate::db::{Database, ImportSummary};
use crate::error::Result;
use crate::snapshot::Snapshot;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Loads the snapshot at `path` and replaces the stored documents with it.
pub async fn refresh_once(database: &Database, path: &Path) -> Result<ImportSummary> {
    let snapshot = Snapshot::load(path)?;
    database.import_snapshot(&snapshot).await
}

/// Re-imports the snapshot every `every`, starting immediately. Failures
/// are logged and the previous import stays in place until the next tick.
pub async fn refresh_snapshot_task(database: Arc<Database>, path: PathBuf, every: Duration) {
    info!(
        "Starting background task to refresh {} every {}s",
        path.display(),
        every.as_secs()
    );
    let mut interval = interval(every);

    loop {
        interval.tick().await;

        match refresh_once(&database, &path).await {
            Ok(summary) => info!(
                "Refreshed snapshot: {} meetings, {} policies, {} candidates",
                summary.meetings, summary.policies, summary.candidates
            ),
            Err(e) => error!("Failed to refresh snapshot {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn refresh_once_imports_file() {
        let db = Database::new("sqlite::memory:", 1).await.unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"meetings": [{"_id": "m1", "title": "Session"}]}"#).unwrap();

        let summary = refresh_once(&db, file.path()).await.unwrap();
        assert_eq!(summary.meetings, 1);
        assert_eq!(db.get_meeting("m1").await.unwrap().title, "Session");
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_import() {
        let db = Database::new("sqlite::memory:", 1).await.unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"meetings": [{"_id": "m1"}]}"#).unwrap();
        refresh_once(&db, file.path()).await.unwrap();

        let missing = file.path().with_extension("missing");
        assert!(refresh_once(&db, &missing).await.is_err());
        assert_eq!(db.list_meetings().await.unwrap().len(), 1);
    }
}
