use serde::{Deserialize, Serialize};

/// Markup the scraper relies on: paths, form selectors and class-name
/// markers of the site's front end. The class names carry build hashes
/// (`MainContents_abc12`), so matching is by prefix or substring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkupRules {
    pub login_path: String,
    pub favorites_path: String,
    pub email_input: String,
    pub password_input: String,
    pub submit_button: String,
    /// Substring of the URL while the login form is still shown
    pub login_url_marker: String,

    /// Class prefix of the dashboard container holding the list links
    pub container_class_prefix: String,
    /// Substring of `href` for links to a single favorite list
    pub sublist_href: String,
    /// Substring of the class attribute of a listing card
    pub card_class_marker: String,
    pub title_class_prefix: String,
    pub rating_class_prefix: String,
    pub price_class_prefix: String,

    /// Substring of `href` for links to a space detail page
    pub listing_href: String,
    /// Heading tags searched for a title, in priority order
    pub heading_tags: Vec<String>,
    /// Headings must be longer than this many characters
    pub min_title_chars: usize,
    /// How far up from a bare link the enclosing card is assumed to be
    pub ancestor_depth: usize,
    pub price_pattern: String,
}

impl Default for MarkupRules {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            favorites_path: "/dashboard/favorite_lists/".to_string(),
            email_input: r#"input[name="email"]"#.to_string(),
            password_input: r#"input[name="password"]"#.to_string(),
            submit_button: r#"input[type="submit"]"#.to_string(),
            login_url_marker: "login".to_string(),

            container_class_prefix: "MainContents_".to_string(),
            sublist_href: "/favorite_lists/".to_string(),
            card_class_marker: "FavoriteCardListItem".to_string(),
            title_class_prefix: "FavoriteCardListItem__Title".to_string(),
            rating_class_prefix: "FavoriteCardListItem__ReputationScoreWrap".to_string(),
            price_class_prefix: "FavoriteCardListItem__Time".to_string(),

            listing_href: "/spaces/".to_string(),
            heading_tags: vec!["h2".to_string(), "h3".to_string(), "h4".to_string()],
            min_title_chars: 3,
            ancestor_depth: 5,
            price_pattern: r"¥[\d,]+".to_string(),
        }
    }
}

impl MarkupRules {
    /// CSS selector for elements whose class attribute starts with the
    /// container prefix
    pub fn container_selector(&self) -> String {
        format!(r#"[class^="{}"]"#, self.container_class_prefix)
    }

    pub fn sublist_link_selector(&self) -> String {
        format!(r#"a[href*="{}"]"#, self.sublist_href)
    }

    pub fn card_selector(&self) -> String {
        format!(r#"[class*="{}"]"#, self.card_class_marker)
    }

    pub fn listing_link_selector(&self) -> String {
        format!(r#"a[href*="{}"]"#, self.listing_href)
    }
}
