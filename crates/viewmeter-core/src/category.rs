//! Fixed content categories.

use std::fmt;

use rand::Rng;
use serde::Serialize;

/// A content topic being measured. The set is closed; counters are indexed by
/// [`Category::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sports,
    Entertainment,
    Business,
    Education,
}

impl Category {
    /// Every category, in counter order.
    pub const ALL: [Category; 4] = [
        Category::Sports,
        Category::Entertainment,
        Category::Business,
        Category::Education,
    ];

    /// Number of categories.
    pub const COUNT: usize = Self::ALL.len();

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Sports => "sports",
            Category::Entertainment => "entertainment",
            Category::Business => "business",
            Category::Education => "education",
        }
    }

    /// Position of this category in [`Category::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Uniform pick over the fixed set.
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::COUNT)]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
