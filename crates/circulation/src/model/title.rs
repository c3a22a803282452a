use serde::Serialize;

use super::id::TitleId;

/// Catalog title as the circulation engine sees it: reservation targets
/// must exist, nothing more.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub id: TitleId,
    pub title: String,
    pub author: String,
}

impl Title {
    pub fn new(title: String, author: String) -> Self {
        Self {
            id: TitleId::new(),
            title,
            author,
        }
    }
}
