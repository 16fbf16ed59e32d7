use std::fmt::Write;

use chrono::Utc;
use clap::Parser;
use unidecode::unidecode;
use uuid::Uuid;

/// Prints a ready-to-edit post file for the files backend. Pipe it into
/// the posts directory:
///
///   post-create -t "Rome Day 1" -l "Rome, Italy" > posts/2024-05-01-rome-day-1.md
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    title: Option<String>,

    #[arg(short, long)]
    location: Option<String>,

    /// Create the entry as a draft
    #[arg(short, long)]
    draft: bool,
}

fn render_header(id: &str, date: &str, location: Option<&str>, published: bool) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "<!--");
    let _ = writeln!(&mut buf, "[ID]: # ({})", id);
    let _ = writeln!(&mut buf, "[DATE]: # ({})", date);
    if let Some(location) = location {
        let _ = writeln!(&mut buf, "[LOCATION]: # ({})", location);
    }
    let _ = writeln!(&mut buf, "[PUBLISHED]: # ({})", published);
    let _ = writeln!(&mut buf, "-->");
    buf
}

fn render_body(title: Option<&str>) -> String {
    let mut buf = String::new();

    if let Some(title) = title {
        let _ = writeln!(&mut buf, "# {}", title);
    } else {
        let _ = writeln!(&mut buf, "# Replace with title");
    }
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "This is a body example");
    let _ = writeln!(&mut buf, "Please remove it and replace with your day");

    buf
}

fn suggest_file_name(date: &str, title: Option<&str>) -> String {
    let slug = match title {
        Some(title) => {
            let ascii = unidecode(title).to_lowercase();
            let words: Vec<&str> = ascii.split(|c: char| !c.is_ascii_alphanumeric())
                .filter(|w| !w.is_empty())
                .collect();
            words.join("-")
        }
        None => String::new(),
    };

    if slug.is_empty() {
        format!("{}-untitled.md", date)
    } else {
        format!("{}-{}.md", date, slug)
    }
}

fn main() {
    let args = Args::parse();

    let id = Uuid::new_v4().to_string();
    let date = Utc::now().format("%Y-%m-%d").to_string();

    let header = render_header(&id, &date, args.location.as_deref(), !args.draft);
    print!("{}", header);
    println!();
    print!("{}", render_body(args.title.as_deref()));

    eprintln!("Suggested file name: {}", suggest_file_name(&date, args.title.as_deref()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_header() {
        let id = "bcfc427f-f9f3-4442-bfc2-deca95db96d5";
        let date = "2024-05-01";
        let header = render_header(id, date, Some("Rome, Italy"), true);

        assert_eq!(header, "<!--
[ID]: # (bcfc427f-f9f3-4442-bfc2-deca95db96d5)
[DATE]: # (2024-05-01)
[LOCATION]: # (Rome, Italy)
[PUBLISHED]: # (true)
-->
");
    }

    #[test]
    fn test_render_header_draft() {
        let header = render_header("id", "2024-05-01", None, false);
        assert!(header.contains("[PUBLISHED]: # (false)"));
        assert!(!header.contains("[LOCATION]"));
    }

    #[test]
    fn test_suggest_file_name() {
        assert_eq!(suggest_file_name("2024-05-01", Some("Rome Day 1")), "2024-05-01-rome-day-1.md");
        assert_eq!(suggest_file_name("2024-05-01", None), "2024-05-01-untitled.md");
        assert_eq!(suggest_file_name("2024-05-01", Some("  ")), "2024-05-01-untitled.md");
    }
}
