//! RSS 2.0 feed of the most recent posts.
//!
//! Written to `rss.xml` at the output root. Item links are absolute when
//! `site_url` is configured and output-relative otherwise. Dates are
//! RFC 2822 in UTC. `lastBuildDate` is the newest post's date, so an
//! unchanged site produces an unchanged feed.

use crate::content::Post;
use chrono::Utc;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;
use thiserror::Error;

pub const FEED_FILE: &str = "rss.xml";

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Feed is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Channel-level metadata.
#[derive(Debug, Clone, Copy)]
pub struct Channel<'a> {
    pub title: &'a str,
    pub link: &'a str,
    pub description: &'a str,
    pub language: &'a str,
}

impl Channel<'_> {
    /// Render the feed for the first `limit` of `posts` (newest first).
    pub fn render(&self, posts: &[Post], limit: usize) -> Result<String, FeedError> {
        let bytes = self.render_xml(posts, limit)?;
        Ok(String::from_utf8(bytes)?)
    }

    fn render_xml(&self, posts: &[Post], limit: usize) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        writer.write_event(Event::Start(rss))?;
        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        push_text(&mut writer, "title", self.title)?;
        push_text(&mut writer, "link", self.link)?;
        push_text(&mut writer, "description", self.description)?;
        push_text(&mut writer, "language", self.language)?;
        if let Some(newest) = posts.first() {
            let date = newest.modified.with_timezone(&Utc).to_rfc2822();
            push_text(&mut writer, "lastBuildDate", &date)?;
        }

        for post in posts.iter().take(limit) {
            writer.write_event(Event::Start(BytesStart::new("item")))?;

            let link = full_link(self.link, &post.output_path);
            push_text(&mut writer, "title", &post.title)?;
            push_text(&mut writer, "link", &link)?;
            push_text(&mut writer, "description", &post.summary)?;
            push_text(
                &mut writer,
                "pubDate",
                &post.modified.with_timezone(&Utc).to_rfc2822(),
            )?;
            push_text(&mut writer, "guid", &link)?;

            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        let mut bytes = writer.into_inner().into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Join the site URL and an output-relative path with exactly one slash.
fn full_link(site_url: &str, path: &str) -> String {
    if site_url.is_empty() {
        return path.to_string();
    }
    format!("{}/{}", site_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn push_text(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
