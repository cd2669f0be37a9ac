//! The outcome of a selection.

use data_loader::AdvertisementContent;
use serde::{Deserialize, Serialize};

/// Either one piece of content to render, or an explicit "no ad".
///
/// `Empty` is a normal outcome (nothing eligible, or no marketplace given)
/// and is distinct from a selection error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratedAdvertisement {
    Ad(AdvertisementContent),
    Empty,
}

impl GeneratedAdvertisement {
    pub fn is_empty(&self) -> bool {
        matches!(self, GeneratedAdvertisement::Empty)
    }

    pub fn content(&self) -> Option<&AdvertisementContent> {
        match self {
            GeneratedAdvertisement::Ad(content) => Some(content),
            GeneratedAdvertisement::Empty => None,
        }
    }

    pub fn content_id(&self) -> Option<&str> {
        self.content().and_then(|c| c.content_id.as_deref())
    }
}

impl From<Option<AdvertisementContent>> for GeneratedAdvertisement {
    fn from(content: Option<AdvertisementContent>) -> Self {
        content.map_or(GeneratedAdvertisement::Empty, GeneratedAdvertisement::Ad)
    }
}
