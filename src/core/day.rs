use chrono::{Days, Local, NaiveDate};

const FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a user-supplied day relative to `today`.
pub fn parse_day(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "today" => return Some(today),
        "yesterday" => return today.checked_sub_days(Days::new(1)),
        _ => {}
    }
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}

/// clap value parser for the positional date argument.
pub fn parse_cli_day(input: &str) -> Result<NaiveDate, String> {
    parse_day(input, today()).ok_or_else(|| format!("unrecognised date '{}'", input))
}

/// Date as both remote services expect it.
pub fn wire_format(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
