use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;
use std::{fmt, io};
use std::io::ErrorKind;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::text_utils::{format_date, parse_date};

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct PostId(pub String);

/// One journal entry. Tags and gallery URLs are stored as comma-separated
/// strings in the content source and parsed into ordered lists here.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub date: NaiveDate,
    pub location: String,
    pub tags: Vec<String>,
    pub content: String,
    pub cover_image_url: String,
    pub gallery_image_urls: Vec<String>,
    pub is_published: bool,
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "id={}, date={}, location={}, published={}\ntitle={}\ncontent:\n{}",
               self.id.0,
               format_date(&self.date),
               self.location,
               self.is_published,
               self.title,
               self.content
        )
    }
}

impl Post {
    pub fn display_title(&self) -> &str {
        let trimmed = self.title.trim();
        if trimmed.is_empty() {
            "(untitled)"
        } else {
            trimmed
        }
    }

    /// The cover to show: the explicit cover URL, or the first gallery
    /// image when no cover was set.
    pub fn effective_cover(&self) -> Option<&str> {
        let cover = self.cover_image_url.trim();
        if !cover.is_empty() {
            return Some(cover);
        }
        self.gallery_image_urls.first().map(|url| url.as_str())
    }

    /// Everything the free-text filter searches over, lowercased.
    pub fn search_blob(&self) -> String {
        let blob = format!("{} {} {} {} {}",
                           self.title,
                           self.location,
                           join_comma_list(&self.tags),
                           self.content,
                           format_date(&self.date));
        blob.to_lowercase()
    }
}

/// `"a, b ,c"` -> `["a", "b", "c"]`. Order and duplicates are preserved,
/// empty tokens are dropped.
pub fn parse_comma_list(buf: &str) -> Vec<String> {
    buf.split(',')
        .map(|token| token.trim())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect()
}

pub fn join_comma_list(items: &[String]) -> String {
    items.join(", ")
}

/// Which submit button fired on the new-post form.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SubmitAction {
    Publish,
    SaveDraft,
}

impl FromStr for SubmitAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publish" => Ok(SubmitAction::Publish),
            "draft" => Ok(SubmitAction::SaveDraft),
            other => Err(format!("Unknown submit action: {}", other)),
        }
    }
}

/// Raw field values of the new-post form, before assembly.
#[derive(Debug, Default)]
pub struct NewPostFields {
    pub title: String,
    pub date: String,
    pub location: String,
    pub tags: String,
    pub content: String,
    pub cover_image_url: String,
    pub gallery_image_urls: String,
}

/// Builds the record the write path inserts: a fresh id per submission,
/// the date coerced to a calendar date, list fields parsed, and the
/// published flag taken from the submit action. Field contents are not
/// validated beyond that; an empty title is allowed.
pub fn assemble_post(fields: NewPostFields, action: SubmitAction) -> io::Result<Post> {
    let date = match parse_date(fields.date.trim()) {
        Ok(date) => date,
        Err(e) => return Err(io::Error::new(ErrorKind::InvalidInput, e)),
    };

    Ok(Post {
        id: PostId(Uuid::new_v4().to_string()),
        title: fields.title.trim().to_string(),
        date,
        location: fields.location.trim().to_string(),
        tags: parse_comma_list(&fields.tags),
        content: fields.content,
        cover_image_url: fields.cover_image_url.trim().to_string(),
        gallery_image_urls: parse_comma_list(&fields.gallery_image_urls),
        is_published: action == SubmitAction::Publish,
    })
}
