use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// New category named `name` (trimmed). The slug is derived from the
    /// name, falling back to the id when the name has no ASCII alphanumerics.
    pub fn new(name: &str) -> Self {
        let id = Uuid::now_v7();
        let name = name.trim().to_string();
        let slug = match slugify(&name) {
            slug if slug.is_empty() => id.simple().to_string(),
            slug => slug,
        };

        Self {
            id,
            name,
            slug,
            created_at: Utc::now(),
        }
    }

    /// Key used for case-insensitive name uniqueness.
    pub fn normalized_name(&self) -> String {
        category_key(&self.name)
    }

    /// Disambiguates the slug with part of the id after a collision.
    pub fn disambiguate_slug(&mut self) {
        let suffix = self.id.simple().to_string();
        self.slug = format!("{}-{}", self.slug, &suffix[suffix.len() - 8..]);
    }
}

pub fn category_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Lowercase ASCII alphanumerics separated by single `-`.
///
/// ```
/// use domain_shop::models::slugify;
///
/// assert_eq!(slugify("  Home & Garden "), "home-garden");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
