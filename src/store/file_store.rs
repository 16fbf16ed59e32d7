use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fs, io};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use spdlog::info;

use crate::post::{parse_comma_list, join_comma_list, Post, PostId};
use crate::store::PostStore;
use crate::text_utils::{date_from_file_name, format_date, slugify, title_from_file_name};

/// Post backend over a flat directory of `*.md` files.
///
/// Files written by the write path carry a comment-wrapped header block:
///
/// ```text
/// <!--
/// [ID]: # (a63bd715-a3fe-4788-b0e1-2a3153778544)
/// [DATE]: # (2024-05-01)
/// [LOCATION]: # (Rome, Italy)
/// [TAGS]: # (food, walking)
/// [PUBLISHED]: # (true)
/// -->
///
/// # Rome Day 1
/// ```
///
/// Files dropped into the directory by hand need no header: the file name
/// supplies the title (and the date, when it starts with `YYYY-MM-DD-`),
/// and the post counts as published.
pub struct FileStore {
    posts_dir: PathBuf,
}

impl FileStore {
    pub fn new(posts_dir: PathBuf) -> Self {
        FileStore { posts_dir }
    }

    fn list_post_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = vec![];
        let entries = fs::read_dir(self.posts_dir.as_path())?;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(file_name) = entry.file_name().to_str() {
                if file_name.ends_with(".md") {
                    files.push(entry.path());
                }
            }
        }
        Ok(files)
    }

    fn read_all(&self, include_drafts: bool) -> io::Result<Vec<Post>> {
        let mut files = self.list_post_files()?;
        // Reverse lexical order: date-prefixed names land newest first
        files.sort();
        files.reverse();

        let mut posts = vec![];
        for path in files {
            let raw = fs::read_to_string(&path)?;
            let post = parse_post_file(&path, &raw)?;
            if post.is_published || include_drafts {
                posts.push(post);
            }
        }
        Ok(posts)
    }

    fn write_post(&self, post: &Post) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.posts_dir)?;
        let path = self.insert_path(post);
        fs::write(&path, format_post_file(post))?;
        Ok(path)
    }

    /// `2024-05-01-rome-day-1.md`; a second post with the same date and
    /// title gets an id-suffixed name instead of replacing the first.
    fn insert_path(&self, post: &Post) -> PathBuf {
        let base = format!("{}-{}", format_date(&post.date), slugify(&post.title));
        let path = self.posts_dir.join(format!("{}.md", base));
        if !path.exists() {
            return path;
        }

        let suffix: String = post.id.0.chars().take(8).collect();
        self.posts_dir.join(format!("{}-{}.md", base, suffix))
    }
}

#[async_trait]
impl PostStore for FileStore {
    async fn fetch(&self, include_drafts: bool) -> Result<Vec<Post>> {
        Ok(self.read_all(include_drafts)?)
    }

    async fn insert(&self, post: &Post) -> Result<()> {
        let path = self.write_post(post)?;
        info!("Stored post {} in {}", post.id.0, path.to_str().unwrap_or("?"));
        Ok(())
    }
}

fn extract_header(line: &str) -> Option<(&str, &str)> {
    lazy_static! {
        static ref HEADER_REGEX: Regex = Regex::new(
            r"\[(?P<key>\w+)\]: # \((?P<value>.+)\)"
        ).unwrap();
    }

    HEADER_REGEX.captures(line).and_then(|cap| {
        let key = cap.name("key").map(|key| key.as_str());
        let val = cap.name("value").map(|val| val.as_str());
        match (key, val) {
            (Some(key), Some(val)) => Some((key, val)),
            _ => None,
        }
    })
}

fn file_name_of(path: &Path) -> &str {
    path.file_name().and_then(|name| name.to_str()).unwrap_or("")
}

pub fn parse_post_file(path: &Path, raw: &str) -> io::Result<Post> {
    let file_name = file_name_of(path);

    let mut id = String::new();
    let mut date = String::new();
    let mut location = String::new();
    let mut tags = String::new();
    let mut cover = String::new();
    let mut gallery = String::new();
    let mut published = String::new();

    let mut lines = raw.lines();
    let mut maybe_line = lines.next();

    // The header lives in an HTML comment so bare markdown viewers skip it
    let mut in_comment = false;
    loop {
        if let Some(line) = maybe_line {
            let line = line.trim();
            if line.is_empty() {
                maybe_line = lines.next();
                continue;
            }
            if line == "<!--" {
                maybe_line = lines.next();
                in_comment = true;
            }
            break;
        } else {
            break;
        }
    }

    let mut found_header = false;
    loop {
        if let Some(line) = maybe_line {
            if line.trim().is_empty() {
                maybe_line = lines.next();
                continue;
            }

            let (key, val) = match extract_header(line) {
                None => break,
                Some((k, v)) => (k, v),
            };
            found_header = true;

            match key {
                "ID" => id = val.to_string(),
                "DATE" => date = val.to_string(),
                "LOCATION" => location = val.to_string(),
                "TAGS" => tags = val.to_string(),
                "COVER" => cover = val.to_string(),
                "GALLERY" => gallery = val.to_string(),
                "PUBLISHED" => published = val.to_string(),
                _ => {}
            }
        } else {
            break;
        }
        maybe_line = lines.next();
    }

    if !found_header {
        // Bare file: the name carries the metadata
        let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
        return Ok(Post {
            id: PostId(stem.to_string()),
            title: title_from_file_name(file_name),
            date: date_from_file_name(file_name)
                .unwrap_or_else(|| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
            location: String::new(),
            tags: vec![],
            content: raw.trim_end().to_string(),
            cover_image_url: String::new(),
            gallery_image_urls: vec![],
            is_published: true,
        });
    }

    if in_comment {
        loop {
            if let Some(line) = maybe_line {
                if line.trim() == "-->" {
                    maybe_line = lines.next();
                    break;
                }
            } else {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    format!("End of comment in the header is missing - file={}", file_name)));
            }
            maybe_line = lines.next();
        }
    }

    // After the header comes the title
    let mut title = String::new();
    loop {
        if let Some(line) = maybe_line {
            if let Some(rest) = line.strip_prefix("# ") {
                title = rest.to_string();
                break;
            }
        } else {
            break;
        }
        maybe_line = lines.next();
    }

    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    let content = content.trim_start_matches('\n').trim_end().to_string();

    let date = match crate::text_utils::parse_date(&date) {
        Ok(d) => d,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("{} - file={}", e, file_name))),
    };

    Ok(Post {
        id: PostId(id),
        title,
        date,
        location,
        tags: parse_comma_list(&tags),
        content,
        cover_image_url: cover,
        gallery_image_urls: parse_comma_list(&gallery),
        is_published: published != "false",
    })
}

pub fn format_post_file(post: &Post) -> String {
    use std::fmt::Write;

    let mut buf = String::new();
    let _ = writeln!(&mut buf, "<!--");
    let _ = writeln!(&mut buf, "[ID]: # ({})", post.id.0);
    let _ = writeln!(&mut buf, "[DATE]: # ({})", format_date(&post.date));
    if !post.location.is_empty() {
        let _ = writeln!(&mut buf, "[LOCATION]: # ({})", post.location);
    }
    if !post.tags.is_empty() {
        let _ = writeln!(&mut buf, "[TAGS]: # ({})", join_comma_list(&post.tags));
    }
    if !post.cover_image_url.is_empty() {
        let _ = writeln!(&mut buf, "[COVER]: # ({})", post.cover_image_url);
    }
    if !post.gallery_image_urls.is_empty() {
        let _ = writeln!(&mut buf, "[GALLERY]: # ({})", join_comma_list(&post.gallery_image_urls));
    }
    let _ = writeln!(&mut buf, "[PUBLISHED]: # ({})", post.is_published);
    let _ = writeln!(&mut buf, "-->");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "# {}", post.title);
    let _ = writeln!(&mut buf);
    buf.push_str(&post.content);
    buf
}
