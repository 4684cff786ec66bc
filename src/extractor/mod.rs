//! Field extraction from a captured document.
//!
//! Extraction is a pure function of the HTML: no network access, no timing.
//! A missing field means the page has a structure we do not understand, so
//! it is reported as [`HarvestError::MissingField`] and never retried.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::app::{HarvestError, Result};
use crate::config::ExtractorConfig;
use crate::domain::Record;

/// Pulls `url`, `title` and `last_modified` out of a page.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    canonical: Selector,
    title: Selector,
    last_modified: Selector,
}

impl FieldExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        Ok(Self {
            canonical: parse_selector(&config.canonical_selector)?,
            title: parse_selector(&config.title_selector)?,
            last_modified: parse_selector(&config.last_modified_selector)?,
        })
    }

    pub fn extract(&self, document: &str) -> Result<Record> {
        let html = Html::parse_document(document);

        let url = html
            .select(&self.canonical)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .ok_or(HarvestError::MissingField("url"))?;

        Url::parse(url)
            .map_err(|e| HarvestError::InvalidRecord(format!("canonical URL {:?}: {}", url, e)))?;

        let title = select_text(&html, &self.title).ok_or(HarvestError::MissingField("title"))?;

        let last_modified = select_text(&html, &self.last_modified)
            .ok_or(HarvestError::MissingField("last_modified"))?;

        Record::new(url, title, last_modified)
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| HarvestError::Selector(format!("{}: {:?}", selector, e)))
}

/// Whitespace-normalized text of the first match, if it has any
fn select_text(html: &Html, selector: &Selector) -> Option<String> {
    html.select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
