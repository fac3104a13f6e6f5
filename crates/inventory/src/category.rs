use serde::{Deserialize, Serialize};

use rxstock_core::CategoryId;

/// Description given to categories created lazily from an inventory write.
pub const DEFAULT_CATEGORY_DESCRIPTION: &str = "Auto-created category";

/// A medicine category. `name` is unique; `color` is a display hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub color: Option<String>,
}

impl Category {
    /// Category created on first reference by name (upsert-by-name path).
    pub fn auto(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            description: DEFAULT_CATEGORY_DESCRIPTION.to_string(),
            color: None,
        }
    }
}
