use serde::{Deserialize, Deserializer, Serialize};

use crate::category::{canonical_category, slugify};
use crate::location::{decode_component, encode_component};

/// Article record as served by the articles endpoint. Only the fields the
/// router and the listings read are modeled; everything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(deserialize_with = "deserialize_identifier")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

impl Article {
    /// The SEO slug, ignoring blank values.
    pub fn seo_slug(&self) -> Option<&str> {
        self.slug
            .as_deref()
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
    }

    pub fn reference(&self) -> ArticleRef {
        ArticleRef {
            id: self.id.clone(),
            slug: self.seo_slug().map(ToString::to_string),
        }
    }

    fn sort_key(&self) -> &str {
        self.created_at
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(&self.date)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIdentifier {
    Text(String),
    Number(serde_json::Number),
}

fn deserialize_identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawIdentifier::deserialize(deserializer)? {
        RawIdentifier::Text(text) => text,
        RawIdentifier::Number(number) => number.to_string(),
    })
}

/// Stable handle to an article that survives index refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl ArticleRef {
    /// Slug when the article has one, otherwise the id.
    pub fn canonical_identifier(&self) -> &str {
        self.slug.as_deref().unwrap_or(&self.id)
    }

    pub fn path(&self) -> String {
        format!(
            "/article/{}",
            encode_component(self.canonical_identifier())
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum IndexStatus {
    #[default]
    Pending,
    Loaded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleIndex {
    articles: Vec<Article>,
    status: IndexStatus,
}

impl ArticleIndex {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn loaded(articles: Vec<Article>) -> Self {
        Self {
            articles,
            status: IndexStatus::Loaded,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status == IndexStatus::Loaded
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Wholesale refresh. The previous contents are dropped.
    pub fn replace(&mut self, articles: Vec<Article>) {
        self.articles = articles;
        self.status = IndexStatus::Loaded;
    }

    /// Resolves a slug or an id, slug first. Returns `None` while the index is
    /// still pending so callers can tell "not yet" from "not found" via
    /// [`ArticleIndex::is_loaded`].
    pub fn resolve(&self, identifier: &str) -> Option<ArticleRef> {
        if !self.is_loaded() {
            return None;
        }
        let decoded = decode_component(identifier.trim());
        let identifier = decoded.trim();
        if identifier.is_empty() {
            return None;
        }
        self.articles
            .iter()
            .find(|article| article.seo_slug() == Some(identifier))
            .or_else(|| {
                self.articles
                    .iter()
                    .find(|article| article.id.trim() == identifier)
            })
            .map(Article::reference)
    }

    pub fn get(&self, reference: &ArticleRef) -> Option<&Article> {
        self.articles
            .iter()
            .find(|article| article.id == reference.id)
    }

    /// Articles matching `filter`, newest first. Articles sharing a date keep
    /// their index order.
    pub fn listing(&self, filter: &ListingFilter) -> Vec<&Article> {
        let category = filter
            .category
            .as_deref()
            .map(|raw| canonical_category(raw).map_or_else(|| raw.trim().to_string(), String::from));
        let tag = filter.tag.as_deref().map(slugify).filter(|tag| !tag.is_empty());
        let query = filter
            .query
            .as_deref()
            .map(|query| query.trim().to_lowercase())
            .filter(|query| !query.is_empty());

        let mut listing: Vec<&Article> = self
            .articles
            .iter()
            .filter(|article| {
                category.as_deref().is_none_or(|wanted| {
                    canonical_category(&article.category).unwrap_or(article.category.trim())
                        == wanted
                })
            })
            .filter(|article| {
                tag.as_deref()
                    .is_none_or(|wanted| article.tags.iter().any(|tag| slugify(tag) == wanted))
            })
            .filter(|article| {
                query
                    .as_deref()
                    .is_none_or(|needle| article_matches_query(article, needle))
            })
            .collect();
        listing.sort_by(|left, right| right.sort_key().cmp(left.sort_key()));
        listing
    }
}

fn article_matches_query(article: &Article, needle: &str) -> bool {
    article.title.to_lowercase().contains(needle)
        || article.category.to_lowercase().contains(needle)
        || article
            .excerpt
            .as_deref()
            .is_some_and(|excerpt| excerpt.to_lowercase().contains(needle))
}

/// Listing criteria. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub query: Option<String>,
}
