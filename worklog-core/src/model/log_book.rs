//! The log tree: a book of days, each day holds projects, and each project
//! holds items, sub-items and sub-sub-items.
//!
//! Field names serialize in camelCase (`imgUrl`, `driveId`, `subsubs`) so the
//! stored blob and the payload exchanged with the sync endpoint keep one shape.

use serde::{Deserialize, Deserializer, Serialize};

/// The whole log: an ordered list of days, serialized as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogBook {
    pub days: Vec<Day>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    /// `ROC_YEAR.MM.DD`, e.g. `115.02.13`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(flatten)]
    pub image: ImageRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subs: Vec<Sub>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sub {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(flatten)]
    pub image: ImageRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subsubs: Vec<SubSub>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubSub {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(flatten)]
    pub image: ImageRef,
}

/// Image attached to a node. The empty string stands for "absent" in both fields.
///
/// A non-empty `drive_id` means the image lives in remote storage and `img_url`
/// points at it. An empty `drive_id` with a non-empty `img_url` is a local
/// preview (a data URI) that was never uploaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub img_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub drive_id: String,
}

impl ImageRef {
    pub fn new(img_url: impl Into<String>, drive_id: impl Into<String>) -> Self {
        Self {
            img_url: img_url.into(),
            drive_id: drive_id.into(),
        }
    }

    /// A preview that exists only in the local log.
    pub fn local(img_url: impl Into<String>) -> Self {
        Self::new(img_url, "")
    }

    pub fn is_empty(&self) -> bool {
        self.img_url.is_empty() && self.drive_id.is_empty()
    }

    pub fn is_remote(&self) -> bool {
        !self.drive_id.is_empty()
    }

    pub fn is_local_preview(&self) -> bool {
        self.drive_id.is_empty() && !self.img_url.is_empty()
    }

    /// Clears both fields and returns the remote id that was attached, if any.
    pub fn take_drive_id(&mut self) -> Option<String> {
        self.img_url.clear();
        let id = std::mem::take(&mut self.drive_id);
        (!id.is_empty()).then_some(id)
    }
}

impl LogBook {
    pub fn new(days: Vec<Day>) -> Self {
        Self { days }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// First day carrying exactly this date string.
    pub fn find_day(&self, date: &str) -> Option<&Day> {
        self.days.iter().find(|day| day.date == date)
    }

    /// Newest first. Dates are fixed-width `YYY.MM.DD` strings, so a plain
    /// string comparison orders them chronologically. The sort is stable.
    pub fn sort_by_date_desc(&mut self) {
        self.days.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

impl Day {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            projects: Vec::new(),
        }
    }

    pub fn with_projects(mut self, projects: Vec<Project>) -> Self {
        self.projects = projects;
        self
    }
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// A nameless project holding one blank item, ready to be filled in.
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            items: vec![Item::default()],
        }
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }
}

impl Item {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = image;
        self
    }

    pub fn with_subs(mut self, subs: Vec<Sub>) -> Self {
        self.subs = subs;
        self
    }
}

impl Sub {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = image;
        self
    }

    pub fn with_subsubs(mut self, subsubs: Vec<SubSub>) -> Self {
        self.subsubs = subsubs;
        self
    }
}

impl SubSub {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = image;
        self
    }
}

/// Older stored logs carry `null` where a value was never filled in.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
