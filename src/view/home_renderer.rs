use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::post::Post;
use crate::post_render::summarize;
use crate::query::PostFilter;
use crate::text_utils::format_date;

const SUMMARY_MAX_CHARS: usize = 220;

#[derive(ramhorns::Content)]
struct HomePage<'a> {
    journal_title: &'a str,
    tagline: &'a str,
    is_admin: bool,
    show_drafts: bool,
    login_failed: bool,
    search: &'a str,
    title_options: Vec<TitleOption>,
    featured: Vec<Card>,
    cards: Vec<Card>,
    has_posts: bool,
}

#[derive(ramhorns::Content)]
struct TitleOption {
    value: String,
    selected: bool,
}

#[derive(ramhorns::Content)]
struct Card {
    link: String,
    title: String,
    date: String,
    location: String,
    has_location: bool,
    cover: String,
    has_cover: bool,
    summary: String,
    tags: Vec<ViewTag>,
    draft: bool,
}

#[derive(ramhorns::Content)]
struct ViewTag {
    tag: String,
}

/// Everything the home screen shows for one session.
pub struct HomeView<'a> {
    pub journal_title: &'a str,
    pub tagline: &'a str,
    pub is_admin: bool,
    pub show_drafts: bool,
    pub login_failed: bool,
    pub filter: &'a PostFilter,
    pub titles: Vec<String>,
    pub posts: &'a [Post],
}

pub struct HomeRenderer<'a> {
    template: Template<'a>,
}

impl HomeRenderer<'_> {
    pub fn new(tpl_src: &str) -> io::Result<HomeRenderer> {
        let template = match Template::new(tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing home template: {}", e)));
            }
        };

        Ok(HomeRenderer {
            template,
        })
    }

    pub fn render(&self, view: &HomeView) -> String {
        // Newest post is the featured one, the rest become the grid
        let mut featured = vec![];
        let mut cards = vec![];
        for (pos, post) in view.posts.iter().enumerate() {
            if pos == 0 {
                featured.push(card_of(post));
            } else {
                cards.push(card_of(post));
            }
        }

        let title_options = view.titles.iter()
            .map(|title| TitleOption {
                selected: view.filter.title.as_deref() == Some(title.as_str()),
                value: title.clone(),
            })
            .collect();

        self.template.render(&HomePage {
            journal_title: view.journal_title,
            tagline: view.tagline,
            is_admin: view.is_admin,
            show_drafts: view.show_drafts,
            login_failed: view.login_failed,
            search: view.filter.search.as_str(),
            title_options,
            has_posts: !view.posts.is_empty(),
            featured,
            cards,
        })
    }
}

fn card_of(post: &Post) -> Card {
    let tags = post.tags.iter()
        .map(|tag| ViewTag { tag: tag.clone() })
        .collect();
    let cover = post.effective_cover().unwrap_or("").to_string();

    Card {
        link: format!("/view/{}/", post.id.0),
        title: post.display_title().to_string(),
        date: format_date(&post.date),
        location: post.location.clone(),
        has_location: !post.location.is_empty(),
        has_cover: !cover.is_empty(),
        cover,
        summary: summarize(&post.content, SUMMARY_MAX_CHARS),
        tags,
        draft: !post.is_published,
    }
}

#[cfg(test)]
mod tests {
    use crate::test_data::sample_post;

    use super::*;

    const TEMPLATE_SRC: &str = r##"
TITLE=[{{journal_title}}]
ADMIN=[{{#is_admin}}yes{{/is_admin}}{{^is_admin}}no{{/is_admin}}]
FAILED=[{{#login_failed}}bad-password{{/login_failed}}]
OPTIONS=[{{#title_options}}({{value}}{{#selected}}*{{/selected}}){{/title_options}}]
FEATURED=[{{#featured}}{{title}} @ {{date}}{{/featured}}]
CARDS=[{{#cards}}({{title}}{{#draft}} DRAFT{{/draft}}){{/cards}}]
EMPTY=[{{^has_posts}}Nothing here yet{{/has_posts}}]
"##;

    fn render(posts: &[Post], filter: &PostFilter, is_admin: bool) -> String {
        let renderer = HomeRenderer::new(TEMPLATE_SRC).unwrap();
        let view = HomeView {
            journal_title: "Emily Abroad",
            tagline: "Follow along",
            is_admin,
            show_drafts: false,
            login_failed: false,
            filter,
            titles: vec!["Rome Day 1".to_string(), "Rome Day 2".to_string()],
            posts,
        };
        renderer.render(&view)
    }

    #[test]
    fn test_render_home() {
        let posts = vec![
            sample_post("1", "Rome Day 2", "2024-05-02", true),
            sample_post("2", "Rome Day 1", "2024-05-01", true),
        ];
        let filter = PostFilter::new(Some("Rome Day 2"), "");
        let res = render(&posts, &filter, false);

        assert!(res.contains("TITLE=[Emily Abroad]"));
        assert!(res.contains("ADMIN=[no]"));
        assert!(res.contains("OPTIONS=[(Rome Day 1)(Rome Day 2*)]"));
        assert!(res.contains("FEATURED=[Rome Day 2 @ 2024-05-02]"));
        assert!(res.contains("CARDS=[(Rome Day 1)]"));
        assert!(res.contains("EMPTY=[]"));
    }

    #[test]
    fn test_render_empty_state() {
        let filter = PostFilter::default();
        let res = render(&[], &filter, false);
        assert!(res.contains("FEATURED=[]"));
        assert!(res.contains("EMPTY=[Nothing here yet]"));
    }

    #[test]
    fn test_render_draft_badge() {
        let posts = vec![
            sample_post("1", "Rome Day 2", "2024-05-02", true),
            sample_post("2", "Florence Notes", "2024-05-01", false),
        ];
        let filter = PostFilter::default();
        let res = render(&posts, &filter, true);
        assert!(res.contains("ADMIN=[yes]"));
        assert!(res.contains("CARDS=[(Florence Notes DRAFT)]"));
    }
}
