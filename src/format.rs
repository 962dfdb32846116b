//! Display helpers for raw device values.

/// Lowercase `value`, then uppercase the first character of every
/// space-separated word.
pub fn capitalize(value: &str) -> String {
    value
        .to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Format a second count as `"{days}d {hh}:{mm}:{ss}"`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sec_to_human(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    let days = seconds / 86_400;
    let hours = seconds % 86_400 / 3600;
    let minutes = seconds % 3600 / 60;
    let seconds = seconds % 60;

    format!("{days}d {hours:02}:{minutes:02}:{seconds:02}")
}

/// Turn a camel case identifier such as an effect name into a title.
pub fn camel_to_title(text: &str) -> String {
    let mut title = String::with_capacity(text.len() + 4);

    for c in text.chars() {
        if c.is_ascii_uppercase() {
            title.push(' ');
        }
        title.push(c);
    }

    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => title,
    }
}
