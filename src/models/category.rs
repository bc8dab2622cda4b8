//! Fixed category table shared by the handlers and the bucket model.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Category label attached to a bucket.
///
/// Clients pick a category by numeric id (`"1"`..`"7"`); the repository only
/// ever sees and stores the resolved label.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Category {
    Travel,
    Health,
    Wealth,
    Career,
    Relationship,
    #[serde(rename = "Self Growth")]
    SelfGrowth,
    #[default]
    General,
}

impl Category {
    /// Every category in id order.
    pub const ALL: [Category; 7] = [
        Category::Travel,
        Category::Health,
        Category::Wealth,
        Category::Career,
        Category::Relationship,
        Category::SelfGrowth,
        Category::General,
    ];

    /// Numeric id as exposed to clients.
    pub fn id(self) -> &'static str {
        match self {
            Category::Travel => "1",
            Category::Health => "2",
            Category::Wealth => "3",
            Category::Career => "4",
            Category::Relationship => "5",
            Category::SelfGrowth => "6",
            Category::General => "7",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Travel => "Travel",
            Category::Health => "Health",
            Category::Wealth => "Wealth",
            Category::Career => "Career",
            Category::Relationship => "Relationship",
            Category::SelfGrowth => "Self Growth",
            Category::General => "General",
        }
    }

    /// Resolve a client-supplied id. Unknown ids resolve to nothing.
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Self::ALL.into_iter().find(|c| c.id() == id)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown category label `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
