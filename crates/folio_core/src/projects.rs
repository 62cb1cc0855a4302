//! Project catalog
//!
//! The static list of showcased projects and the queries the projects page
//! runs over it: free-text search, tag selection, featured and category views.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize};

const BUNDLED_CATALOG: &str = include_str!("../data/projects.json");

/// Technology tags offered as filter chips, in display order.
pub const FILTER_TAGS: [&str; 23] = [
    "Next.js", "React", "TypeScript", "Tailwind CSS", "Three.js", "Framer Motion",
    "Node.js", "Python", "PostgreSQL", "MongoDB", "AWS", "Docker",
    "React Native", "FastAPI", "TensorFlow", "D3.js", "GraphQL", "Prisma",
    "Stripe", "WebSocket", "JWT", "Express", "Kubernetes",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Frontend,
    Fullstack,
    Backend,
    Design,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Completed,
    InProgress,
    Planned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub live_url: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub year: Option<String>,
}

impl Project {
    /// Case-insensitive substring match on title or description.
    /// `needle` must already be lowercase.
    fn mentions(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }

    fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.is_empty() || tags.iter().any(|t| self.tags.contains(t))
    }
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Ordered list of projects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    projects: Vec<Project>,
}

static BUNDLED: Lazy<Catalog> = Lazy::new(|| {
    Catalog::from_json(BUNDLED_CATALOG).unwrap_or_else(|err| {
        tracing::error!(%err, "bundled project catalog is malformed");
        Catalog::default()
    })
});

impl Catalog {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self::new)
    }

    /// The catalog shipped with the site.
    pub fn bundled() -> &'static Catalog {
        &BUNDLED
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Projects matching `search` (title/description, case-insensitive) and,
    /// when `tags` is non-empty, carrying at least one of them. Whitespace in
    /// `search` is part of the needle.
    pub fn filter(&self, search: &str, tags: &[String]) -> Vec<&Project> {
        let needle = search.to_lowercase();
        self.projects
            .iter()
            .filter(|p| p.mentions(&needle) && p.has_any_tag(tags))
            .collect()
    }

    pub fn featured(&self) -> Vec<&Project> {
        self.projects.iter().filter(|p| p.featured).collect()
    }

    pub fn by_category(&self, category: Category) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| p.category == Some(category))
            .collect()
    }

    pub fn by_id(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Every tag in the catalog, sorted and de-duplicated.
    pub fn all_tags(&self) -> Vec<&str> {
        self.projects
            .iter()
            .flat_map(|p| p.tags.iter().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Projects with a tag containing `fragment`, case-insensitive.
    pub fn by_tag(&self, fragment: &str) -> Vec<&Project> {
        let fragment = fragment.to_lowercase();
        self.projects
            .iter()
            .filter(|p| p.tags.iter().any(|t| t.to_lowercase().contains(&fragment)))
            .collect()
    }
}

/// Search box and tag chip state of the projects page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    search: String,
    tags: Vec<String>,
}

impl ProjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn selected_tags(&self) -> &[String] {
        &self.tags
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Select `tag` if unselected, otherwise deselect it. Selection order is kept.
    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
        } else {
            self.tags.push(tag.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.search.clear();
        self.tags.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || !self.tags.is_empty()
    }

    pub fn apply<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Project> {
        catalog.filter(&self.search, &self.tags)
    }
}
