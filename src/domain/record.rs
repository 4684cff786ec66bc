use crate::app::{HarvestError, Result};

/// One harvested page.
///
/// Construction goes through [`Record::new`], so a value of this type always
/// has all three fields populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    url: String,
    title: String,
    last_modified: String,
}

impl Record {
    /// Column order of the output file
    pub const COLUMNS: [&'static str; 3] = ["url", "title", "last_modified"];

    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        last_modified: impl Into<String>,
    ) -> Result<Self> {
        let url = non_empty("url", url.into())?;
        let title = non_empty("title", title.into())?;
        let last_modified = non_empty("last_modified", last_modified.into())?;

        Ok(Self {
            url,
            title,
            last_modified,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn last_modified(&self) -> &str {
        &self.last_modified
    }

    /// Fields in [`Record::COLUMNS`] order
    pub fn as_row(&self) -> [&str; 3] {
        [&self.url, &self.title, &self.last_modified]
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HarvestError::MissingField(field));
    }
    if trimmed.len() == value.len() {
        Ok(value)
    } else {
        Ok(trimmed.to_string())
    }
}
