use serde::Deserialize;
use uuid::Uuid;

/// Request model for registering a title.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTitleBody {
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
}

/// Request model for accessioning a physical copy.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCopyBody {
    /// Owning title
    pub title_id: Uuid,
    /// Barcode, unique across the collection
    pub code: String,
    /// Shelf or hall location
    pub location: Option<String>,
}

/// Request model for registering a reader.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReaderBody {
    /// Reader's display name
    pub name: String,
}

/// Request model for flipping a reader's active flag.
#[derive(Debug, Clone, Deserialize)]
pub struct ReaderActiveBody {
    pub active: bool,
}
