use std::fmt;

/// Time reserved for lunch, subtracted from uptime.
const BREAK_MINUTES: u64 = 45;
const ROUND_TO_MINUTES: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkTime {
    pub hours: u64,
    pub minutes: u64,
}

impl WorkTime {
    pub const DEFAULT: WorkTime = WorkTime { hours: 7, minutes: 15 };

    /// Machine uptime minus the lunch break, rounded down to a quarter hour.
    pub fn from_uptime_secs(secs: u64) -> Self {
        let minutes = (secs / 60).saturating_sub(BREAK_MINUTES);
        let minutes = minutes / ROUND_TO_MINUTES * ROUND_TO_MINUTES;
        Self {
            hours: minutes / 60,
            minutes: minutes % 60,
        }
    }
}

impl fmt::Display for WorkTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}

fn parse_uptime(text: &str) -> Option<u64> {
    let first = text.split_whitespace().next()?;
    let secs: f64 = first.parse().ok()?;
    Some(secs as u64)
}

/// Suggested duration for `today`: uptime based for the current day,
/// a fixed default for any other day.
pub fn suggest(is_today: bool) -> WorkTime {
    if !is_today {
        return WorkTime::DEFAULT;
    }
    match std::fs::read_to_string("/proc/uptime")
        .ok()
        .as_deref()
        .and_then(parse_uptime)
    {
        Some(secs) => WorkTime::from_uptime_secs(secs),
        None => {
            log::debug!("Uptime unavailable, using default work time");
            WorkTime::DEFAULT
        }
    }
}
