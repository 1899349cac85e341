use chrono::Utc;

/// Slash-delimited first-of-month sequence for one year of monthly fields,
/// e.g. `19790101/19790201/.../19791201`.
pub fn monthly_date_sequence(year: i32) -> String {
    (1..=12)
        .map(|month| format!("{year:04}{month:02}01"))
        .collect::<Vec<_>>()
        .join("/")
}

/// Today as `YYYY-MM-DD`, used to stamp one-shot retrieval targets.
pub fn today_stamp() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
