use serde::{Deserialize, Serialize};

/// Title written when a card or link yields a URL but no readable name.
pub const UNTITLED: &str = "タイトルなし";

/// Spreadsheet headers, in the order `Listing::to_row` emits fields.
pub const COLUMNS: [&str; 7] = [
    "スペース名",
    "価格",
    "レビュー点数",
    "所在地",
    "カテゴリ",
    "URL",
    "画像URL",
];

/// One favorited space as scraped from the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    /// Price exactly as displayed, e.g. "¥1,100/時間"
    pub price: String,
    pub rating: String,
    /// Not populated by any extraction pass yet
    pub location: String,
    /// Not populated by any extraction pass yet
    pub category: String,
    pub url: String,
    pub image_url: String,
}

impl Listing {
    /// Build a record from scraped fields.
    ///
    /// Returns `None` when both title and URL are empty; such a fragment is
    /// not worth a spreadsheet row. An empty title with a URL falls back to
    /// [`UNTITLED`].
    pub fn from_parts(
        title: String,
        price: String,
        rating: String,
        url: String,
        image_url: String,
    ) -> Option<Self> {
        if title.is_empty() && url.is_empty() {
            return None;
        }

        let title = if title.is_empty() {
            UNTITLED.to_string()
        } else {
            title
        };

        Some(Self {
            title,
            price,
            rating,
            location: String::new(),
            category: String::new(),
            url,
            image_url,
        })
    }

    /// Fields in `COLUMNS` order
    pub fn to_row(&self) -> [&str; 7] {
        [
            self.title.as_str(),
            self.price.as_str(),
            self.rating.as_str(),
            self.location.as_str(),
            self.category.as_str(),
            self.url.as_str(),
            self.image_url.as_str(),
        ]
    }
}
