#[cfg(test)]
pub const POST_FILE_DATA: &str = "<!--
[ID]: # (a63bd715-a3fe-4788-b0e1-2a3153778544)
[DATE]: # (2024-05-01)
[LOCATION]: # (Rome, Italy)
[TAGS]: # (food, walking)
[COVER]: # (https://img.example.com/rome/cover.jpg)
[GALLERY]: # (https://img.example.com/rome/1.jpg, https://img.example.com/rome/2.jpg)
[PUBLISHED]: # (true)
-->

# Rome Day 1

We landed before sunrise and dropped the bags at the hostel.

The first gelato happened before lunch. The second one was research.
";

#[cfg(test)]
pub const DRAFT_FILE_DATA: &str = "<!--
[ID]: # (0d4b2f9e-4a5f-4a5b-9c0f-6a1f1c2d3e4f)
[DATE]: # (2024-05-03)
[LOCATION]: # (Florence, Italy)
[TAGS]: # (museums)
[PUBLISHED]: # (false)
-->

# Florence Notes

Still sorting photos, not ready to publish this one.
";

#[cfg(test)]
pub const BARE_FILE_DATA: &str = "Walked the old town wall today.

No plan, just followed the river until the rain started.
";

#[cfg(test)]
pub fn sample_post(id: &str, title: &str, date: &str, is_published: bool) -> crate::post::Post {
    use crate::post::{Post, PostId};
    use crate::text_utils::parse_date;

    Post {
        id: PostId(id.to_string()),
        title: title.to_string(),
        date: parse_date(date).unwrap(),
        location: "Rome, Italy".to_string(),
        tags: vec!["food".to_string(), "walking".to_string()],
        content: "We had gelato twice.".to_string(),
        cover_image_url: "https://img.example.com/rome/cover.jpg".to_string(),
        gallery_image_urls: vec![],
        is_published,
    }
}
