use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::models::event::CalendarEvent;

/// Yields upcoming events for one stored credential.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn upcoming_events(
        &self,
        credential: &Path,
        now: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>>;
}

/// Queries every credential in turn and concatenates the results. A failing
/// credential is logged and skipped; the batch only fails when all of them do.
pub async fn gather_events<S: CalendarSource + ?Sized>(
    source: &S,
    credentials: &[PathBuf],
    now: DateTime<Utc>,
) -> Result<Vec<CalendarEvent>> {
    let mut events = Vec::new();
    let mut failures = 0;
    let mut last_error = None;
    for credential in credentials {
        match source.upcoming_events(credential, now).await {
            Ok(batch) => {
                debug!(
                    credential = %credential.display(),
                    count = batch.len(),
                    "fetched events"
                );
                events.extend(batch);
            }
            Err(err) => {
                failures += 1;
                warn!(credential = %credential.display(), error = %err, "skipping credential");
                last_error = Some(err);
            }
        }
    }
    if failures > 0 && failures == credentials.len() {
        return Err(match last_error {
            Some(err) if failures == 1 => err,
            _ => AppError::AllCredentialsFailed(failures),
        });
    }
    Ok(events)
}
