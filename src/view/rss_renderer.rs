use std::io::Cursor;

use chrono::{TimeZone, Utc};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::post::Post;
use crate::post_render::summarize;

const FEED_SUMMARY_CHARS: usize = 300;

/// RSS 2.0 feed of the published posts. Callers must never hand this a
/// draft; the feed has no admin side.
pub struct RssChannel<'a> {
    pub ch_title: &'a str,
    pub ch_link: &'a str,
    pub ch_desc: &'a str,
}

impl<'a> RssChannel<'a> {
    pub fn render(&self, posts: &[Post]) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        let decl = Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None));
        writer.write_event(decl)?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        writer.write_event(Event::Start(rss))?;

        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        push_text(&mut writer, "title", self.ch_title)?;
        push_text(&mut writer, "link", self.ch_link)?;
        push_text(&mut writer, "description", self.ch_desc)?;

        for post in posts {
            writer.write_event(Event::Start(BytesStart::new("item")))?;

            push_text(&mut writer, "title", post.display_title())?;

            let link = full_link(self.ch_link, &post.id.0);
            push_text(&mut writer, "link", link.as_str())?;

            // <guid isPermaLink="false">a63bd715-...</guid>
            let mut guid_elem = BytesStart::new("guid");
            guid_elem.push_attribute(("isPermaLink", "false"));
            writer.write_event(Event::Start(guid_elem))?;
            writer.write_event(Event::Text(BytesText::new(post.id.0.as_str())))?;
            writer.write_event(Event::End(BytesEnd::new("guid")))?;

            let description = summarize(&post.content, FEED_SUMMARY_CHARS);
            push_cdata(&mut writer, "description", description.as_str())?;

            let midnight = post.date.and_hms_opt(0, 0, 0).unwrap();
            let pub_date = TimeZone::from_utc_datetime(Utc::now().offset(), &midnight);
            push_text(&mut writer, "pubDate", &pub_date.to_rfc2822())?;

            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        Ok(writer.into_inner().into_inner())
    }
}

fn full_link(base_url: &str, post_id: &str) -> String {
    let base_url = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };

    format!("{}view/{}/", base_url, post_id)
}

fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn push_cdata(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    if text.contains("]]>") {
        let new_text = text.replace("]]>", "]] >");
        writer.write_event(Event::CData(BytesCData::new(&new_text)))?;
    } else {
        writer.write_event(Event::CData(BytesCData::new(text)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str;

    use crate::test_data::sample_post;

    use super::*;

    #[test]
    fn render_xml() {
        let mut first = sample_post("post-1", "Rome Day 1", "2024-05-01", true);
        first.content = "We landed before sunrise.".to_string();
        let mut second = sample_post("post-2", "Rome Day 2", "2024-05-02", true);
        second.content = "The second gelato was research.".to_string();

        let rss = RssChannel {
            ch_title: "Emily Abroad",
            ch_link: "https://journal.example.com",
            ch_desc: "Journal entries from abroad",
        };
        let xml = rss.render(&[second, first]).unwrap();
        let xml = str::from_utf8(&xml).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel>"#));
        assert!(xml.contains("<title>Emily Abroad</title>"));
        assert!(xml.contains("<link>https://journal.example.com/view/post-1/</link>"));
        assert!(xml.contains(r#"<guid isPermaLink="false">post-2</guid>"#));
        assert!(xml.contains("<description><![CDATA[We landed before sunrise.]]></description>"));
        assert!(xml.contains("<pubDate>Thu, 2 May 2024 00:00:00 +0000</pubDate>"));
        assert!(xml.ends_with("</channel></rss>"));
    }

    #[test]
    fn render_empty_feed() {
        let rss = RssChannel {
            ch_title: "Emily Abroad",
            ch_link: "https://journal.example.com/",
            ch_desc: "Journal entries from abroad",
        };
        let xml = rss.render(&[]).unwrap();
        let xml = str::from_utf8(&xml).unwrap();
        assert!(!xml.contains("<item>"));
    }
}
