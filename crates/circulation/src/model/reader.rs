use serde::Serialize;

use super::id::ReaderId;

/// Reader profile as the circulation engine sees it. The engine reads the
/// active flag but does not own reader data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reader {
    pub id: ReaderId,
    pub name: String,
    pub active: bool,
}

impl Reader {
    pub fn new(name: String) -> Self {
        Self {
            id: ReaderId::new(),
            name,
            active: true,
        }
    }
}
