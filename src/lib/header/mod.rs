use color_eyre::Section;
use gray_matter::{Matter, engine::YAML};
use serde::Deserialize;

use crate::{
    types::{IsoDate, Tag},
    utils::{escape_attr, escape_text},
};

/// Front matter of a source document.
#[derive(Deserialize, Default, Debug)]
pub struct Header {
    title: Option<String>,
    description: Option<String>,
    created: Option<String>,
    modified: Option<String>,
    tags: Option<Vec<String>>,
    status: Option<String>,
    confidence: Option<String>,
}

impl TryFrom<&str> for Header {
    type Error = color_eyre::Report;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let matter = Matter::<YAML>::new();
        matter
            .parse::<Header>(value)
            .with_note(|| "While parsing front matter.")
            .map(|res| res.data.unwrap_or_default())
    }
}

impl Header {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created(&self) -> Option<IsoDate> {
        self.created.as_deref().and_then(IsoDate::parse)
    }

    pub fn modified(&self) -> Option<IsoDate> {
        self.modified.as_deref().and_then(IsoDate::parse)
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.tags
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter_map(|t| Tag::parse(t))
            .collect()
    }

    /// The `<head>` fragment for a rendered page.
    pub fn head_html(&self, page_title_fallback: &str) -> String {
        let mut out = String::new();
        let title = self.title.as_deref().unwrap_or(page_title_fallback);
        out.push_str(&format!("\n<title>{}</title>", escape_text(title)));
        if let Some(desc) = &self.description {
            out.push_str(&format!(
                "\n<meta name=\"description\" content=\"{}\">",
                escape_attr(desc)
            ));
        }
        out
    }

    /// The visible page header: title, dates, status line, tags.
    pub fn body_head_html(&self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(&format!("<h1>{}</h1>\n", escape_text(title)));
        }
        if let Some(desc) = &self.description {
            out.push_str(&format!(
                "<p class=\"page-description\">{}</p>\n",
                escape_text(desc)
            ));
        }

        let mut parts: Vec<String> = Vec::new();
        if let Some(created) = self.created() {
            parts.push(format!(
                "<span class=\"page-date\"><time datetime=\"{0}\">{0}</time></span>",
                created
            ));
        }
        if let Some(modified) = self.modified() {
            parts.push(format!(
                "<span class=\"page-modified\"><time datetime=\"{0}\">{0}</time></span>",
                modified
            ));
        }
        if let Some(status) = &self.status {
            parts.push(format!(
                "<span class=\"page-status\">{}</span>",
                escape_text(status)
            ));
        }
        if let Some(confidence) = &self.confidence {
            parts.push(format!(
                "<span class=\"page-confidence\">{}</span>",
                escape_text(confidence)
            ));
        }
        let tags = self.tags();
        if !tags.is_empty() {
            let rendered = tags
                .iter()
                .map(|t| {
                    format!(
                        "<a class=\"tag\" href=\"/tag/{}\">{}</a>",
                        escape_attr(t.as_str()),
                        escape_text(t.as_str())
                    )
                })
                .collect::<Vec<_>>()
                .join(" ");
            parts.push(format!("<span class=\"page-tags\">{rendered}</span>"));
        }

        if !parts.is_empty() {
            out.push_str(&format!(
                "<p class=\"page-metadata\">{}</p>\n",
                parts.join("<span class=\"sep\"> \u{00B7} </span>")
            ));
        }
        out
    }
}
