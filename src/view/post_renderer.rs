use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::post::Post;
use crate::post_render::render_markdown;
use crate::text_utils::format_date;

#[derive(ramhorns::Content)]
struct ViewTag<'a> {
    tag: &'a str,
}

#[derive(ramhorns::Content)]
struct GalleryImage<'a> {
    url: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewPage<'a> {
    post_title: &'a str,
    date: String,
    location: &'a str,
    has_location: bool,
    cover: String,
    has_cover: bool,
    tags: Vec<ViewTag<'a>>,
    body: String,
    gallery: Vec<GalleryImage<'a>>,
    has_gallery: bool,
    draft: bool,
}

pub struct PostRenderer<'a> {
    template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> io::Result<PostRenderer> {
        let template = match Template::new(view_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing post view template: {}", e)));
            }
        };

        Ok(PostRenderer {
            template,
        })
    }

    pub fn render(&self, post: &Post) -> io::Result<String> {
        let body = render_markdown(&post.content)?;
        let tags: Vec<ViewTag> = post.tags.iter().map(|t| ViewTag { tag: t.as_str() }).collect();
        let gallery: Vec<GalleryImage> = post.gallery_image_urls.iter()
            .map(|url| GalleryImage { url: url.as_str() })
            .collect();
        let cover = post.effective_cover().unwrap_or("").to_string();

        let rendered_page = self.template.render(&ViewPage {
            post_title: post.display_title(),
            date: format_date(&post.date),
            location: post.location.as_str(),
            has_location: !post.location.is_empty(),
            has_cover: !cover.is_empty(),
            cover,
            tags,
            body,
            has_gallery: !gallery.is_empty(),
            gallery,
            draft: !post.is_published,
        });

        Ok(rendered_page)
    }
}

/// The fallback screen for a selected post that is not in the fetched set
/// anymore (unpublished since, or a draft after losing admin).
pub struct MissingRenderer<'a> {
    template: Template<'a>,
}

#[derive(ramhorns::Content)]
struct MissingPage {}

impl MissingRenderer<'_> {
    pub fn new(tpl_src: &str) -> io::Result<MissingRenderer> {
        let template = match Template::new(tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing missing-post template: {}", e)));
            }
        };

        Ok(MissingRenderer {
            template,
        })
    }

    pub fn render(&self) -> String {
        self.template.render(&MissingPage {})
    }
}

#[cfg(test)]
mod tests {
    use crate::post::parse_comma_list;
    use crate::test_data::sample_post;

    use super::*;

    #[test]
    fn render_view() {
        let template_src = r##"
TITLE=[{{post_title}}]
DATE=[{{date}}]
LOCATION=[{{#has_location}}{{location}}{{/has_location}}]
COVER=[{{#has_cover}}{{cover}}{{/has_cover}}]
TAGS=[{{#tags}}({{tag}}){{/tags}}]
BODY=[{{{body}}}]
GALLERY=[{{#gallery}}({{url}}){{/gallery}}]
DRAFT=[{{#draft}}draft{{/draft}}]
"##;
        let post_renderer = PostRenderer::new(template_src).unwrap();
        let mut post = sample_post("1", "Rome Day 1", "2024-05-01", true);
        post.content = "We had **gelato** twice.".to_string();
        post.gallery_image_urls = parse_comma_list("u1, u2");

        let res = post_renderer.render(&post).unwrap();
        assert!(res.contains("TITLE=[Rome Day 1]"));
        assert!(res.contains("DATE=[2024-05-01]"));
        assert!(res.contains("LOCATION=[Rome, Italy]"));
        assert!(res.contains("COVER=[https://img.example.com/rome/cover.jpg]"));
        assert!(res.contains("TAGS=[(food)(walking)]"));
        assert!(res.contains("BODY=[<p>We had <strong>gelato</strong> twice.</p>]"));
        assert!(res.contains("GALLERY=[(u1)(u2)]"));
        assert!(res.contains("DRAFT=[]"));
    }

    #[test]
    fn render_untitled_draft() {
        let template_src = "TITLE=[{{post_title}}] DRAFT=[{{#draft}}draft{{/draft}}]";
        let post_renderer = PostRenderer::new(template_src).unwrap();
        let mut post = sample_post("1", "", "2024-05-01", false);
        post.content = "tbd".to_string();

        let res = post_renderer.render(&post).unwrap();
        assert!(res.contains("TITLE=[(untitled)]"));
        assert!(res.contains("DRAFT=[draft]"));
    }

    #[test]
    fn render_missing() {
        let missing = MissingRenderer::new("That post is not available.").unwrap();
        assert_eq!(missing.render(), "That post is not available.");
    }
}
