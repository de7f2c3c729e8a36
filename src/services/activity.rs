//! Activity log service

use crate::{
    error::AppResult,
    models::activity::{ActivityEntry, NewActivity},
    repository::Repository,
};

#[derive(Clone)]
pub struct ActivityService {
    repository: Repository,
}

impl ActivityService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Append a log line outside any transaction.
    ///
    /// Failures are logged and swallowed: the audited operation has already
    /// succeeded by the time this runs.
    pub async fn record(&self, entry: NewActivity) {
        if let Err(e) = self.repository.activities_insert(&self.repository.pool, &entry).await {
            tracing::warn!(
                "Failed to record activity {} {} {:?}: {}",
                entry.entity.as_str(),
                entry.action,
                entry.entity_id,
                e
            );
        }
    }

    pub async fn recent(&self, limit: i64) -> AppResult<Vec<ActivityEntry>> {
        self.repository.activities_recent(limit).await
    }
}
