use serde::{Deserialize, Deserializer, Serialize};

/// Creation timestamp in epoch milliseconds. Never changes once assigned.
pub type ProjectId = i64;

pub const MILLIS_PER_HOUR: u64 = 3_600_000;

/// A tracked project as it is persisted.
///
/// `elapsed_time` only holds completed running intervals. While the project
/// runs, the live value is `elapsed_time + (now - last_start)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub notes: String,
    /// Goal in milliseconds, 0 when no goal is set.
    #[serde(default, deserialize_with = "whole_number")]
    pub goal_time: u64,
    #[serde(default, deserialize_with = "whole_number")]
    pub elapsed_time: u64,
    #[serde(default, deserialize_with = "whole_number")]
    pub count: u64,
    #[serde(default)]
    pub is_running: bool,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub last_start: Option<i64>,
}

impl Project {
    pub fn new(id: ProjectId, name: String, notes: String, goal_time: u64) -> Self {
        Self {
            id,
            name,
            notes,
            goal_time,
            elapsed_time: 0,
            count: 0,
            is_running: false,
            last_start: None,
        }
    }

    /// Elapsed time including the interval that is still running.
    pub fn live_elapsed(&self, now: i64) -> u64 {
        match self.last_start {
            Some(start) if self.is_running => {
                self.elapsed_time.saturating_add(now.saturating_sub(start).max(0) as u64)
            }
            _ => self.elapsed_time,
        }
    }

    pub fn has_goal(&self) -> bool {
        self.goal_time > 0
    }
}

// Other producers of this format may write fractional numbers, so those
// have to load too.
fn whole_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(clamp_whole(value))
}

fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite()).map(|v| v.round() as i64))
}

pub(crate) fn clamp_whole(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}
