use std::ops::Index;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use unidecode::unidecode;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Parses a `2024-05-01`-style calendar date. The regex keeps the parsing
/// tolerant of single-digit day/month and of trailing text such as a time.
pub fn parse_date(buf: &str) -> Result<NaiveDate, String> {
    lazy_static! {
        static ref DATE_REGEX: Regex = Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").unwrap();
    }

    let Some(caps) = DATE_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date {}", buf));
    };

    let y: i32 = to_int(caps.index(1), buf)?;
    let m: u32 = to_int(caps.index(2), buf)?;
    let d: u32 = to_int(caps.index(3), buf)?;

    match NaiveDate::from_ymd_opt(y, m, d) {
        Some(date) => Ok(date),
        None => Err(format!("{} is not a calendar date", buf)),
    }
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `2024-05-01-rome-day-1.md` -> `2024 05 01 Rome Day 1`
pub fn title_from_file_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    let words: Vec<String> = stem.split('-')
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect();
    words.join(" ")
}

/// Date prefix of a `YYYY-MM-DD-...` file name, when there is one.
pub fn date_from_file_name(file_name: &str) -> Option<NaiveDate> {
    lazy_static! {
        static ref PREFIX_REGEX: Regex = Regex::new(r"^(\d{4}-\d{2}-\d{2})-").unwrap();
    }

    let caps = PREFIX_REGEX.captures(file_name)?;
    parse_date(caps.index(1)).ok()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// File-name-safe slug: ascii, lowercase, dashes between words.
pub fn slugify(title: &str) -> String {
    let ascii = unidecode(title).to_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("untitled");
    }
    slug
}
