// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use chrono::{DateTime, Utc};

/// Coarse age bucket: minutes under an hour, hours under a day, whole days otherwise.
///
/// Timestamps in the future render as `0m`.
pub fn calculate_age(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created) = created else {
        return "Unknown".to_string();
    };

    let elapsed = (now - created).max(chrono::Duration::zero());
    if elapsed.num_days() >= 1 {
        format!("{}d", elapsed.num_days())
    } else if elapsed.num_hours() >= 1 {
        format!("{}h", elapsed.num_hours())
    } else {
        format!("{}m", elapsed.num_minutes())
    }
}

/// Run time of a job, measured up to `now` while it has not completed.
pub fn calculate_duration(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<String> {
    let start = start?;
    let elapsed = (end.unwrap_or(now) - start).max(chrono::Duration::zero());

    let seconds = elapsed.num_seconds();
    let minutes = seconds / 60;
    let hours = minutes / 60;

    Some(if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    })
}
