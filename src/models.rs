//! Data models for articles, stories and the backend response envelopes.
//!
//! Records are received verbatim from the news backend and never mutated.
//! Field names follow the backend's JSON (`_id`, camelCase, `content_1`), so
//! every struct renames explicitly instead of relying on a blanket rule.
//!
//! - [`Article`]: a blog article from `/blog/all`
//! - [`Story`]: a full news story from `/news/categoryTagNewsWiseNews`
//! - [`CategoryBucket`]: one category of `/news/CategoryWisenews`

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single block of display text inside an article or story body.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ContentBlock {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

/// A blog article as listed by `/blog/all`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Article {
    #[serde(rename = "_id")]
    pub id: String,
    /// The article title. The backend calls this field `blog`.
    #[serde(rename = "blog", default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    /// Hero image path, possibly using backslash separators.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "blogContent", default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentBlock>,
}

/// Category reference embedded in a story.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CategoryDetails {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
}

/// Tag reference embedded in a story.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct TagDetails {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag: String,
}

/// An identifier field that the backend sends either populated or bare.
///
/// `categoryId` and `tagId` arrive as `{ "_id": "..." }` when the backend
/// populates the reference and as a plain string otherwise.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IdRef {
    Nested {
        #[serde(rename = "_id")]
        id: String,
    },
    Flat(String),
}

impl IdRef {
    pub fn nested_id(&self) -> Option<&str> {
        match self {
            IdRef::Nested { id } => Some(id),
            IdRef::Flat(_) => None,
        }
    }

    pub fn flat_id(&self) -> Option<&str> {
        match self {
            IdRef::Flat(id) => Some(id),
            IdRef::Nested { .. } => None,
        }
    }
}

/// A news story.
///
/// Stories listed inside category buckets are usually partial; the full
/// record comes from the composite-key lookup.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Story {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(rename = "categoryId", default)]
    pub category_id: Option<IdRef>,
    #[serde(rename = "tagId", default)]
    pub tag_id: Option<IdRef>,
    #[serde(rename = "categoryDetails", default)]
    pub category_details: Option<CategoryDetails>,
    #[serde(rename = "tagDetails", default)]
    pub tag_details: Option<TagDetails>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "heroimage", default)]
    pub hero_image: Option<String>,
    #[serde(default)]
    pub image_2: Option<String>,
    #[serde(default)]
    pub image_3: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: Vec<ContentBlock>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_1: Vec<ContentBlock>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_2: Vec<ContentBlock>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_3: Vec<ContentBlock>,
}

impl Story {
    /// Display name of the story's category, if the backend populated it.
    pub fn category_name(&self) -> Option<&str> {
        self.category_details.as_ref().map(|c| c.category.as_str())
    }
}

/// One category of the category-bucketed story listing.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CategoryBucket {
    #[serde(rename = "categoryName", default, deserialize_with = "null_as_default")]
    pub category_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub news: Vec<Story>,
}

/// Body of `GET /blog/all`.
#[derive(Debug, Deserialize)]
pub struct BlogListResponse {
    #[serde(rename = "Blogs", default, deserialize_with = "null_as_default")]
    pub blogs: Vec<Article>,
}

/// Body of `GET /news/CategoryWisenews`.
///
/// The backend reports an expired session in-band with `status: 401`.
#[derive(Debug, Deserialize)]
pub struct CategoryNewsResponse {
    #[serde(rename = "categoryWiseNews", default)]
    pub category_wise_news: Option<Vec<CategoryBucket>>,
    #[serde(default)]
    pub status: Option<u16>,
}

/// Body of `POST /news/categoryTagNewsWiseNews`.
#[derive(Debug, Deserialize)]
pub struct StoryLookupResponse {
    #[serde(rename = "categoryTagAndNewsWiseNews", default)]
    pub stories: Option<Vec<Story>>,
    #[serde(default)]
    pub status: Option<u16>,
}

/// Composite key sent to `POST /news/categoryTagNewsWiseNews`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StoryLookupRequest {
    #[serde(rename = "categoryId")]
    pub category_id: Option<String>,
    #[serde(rename = "tagId")]
    pub tag_id: Option<String>,
    #[serde(rename = "newsId")]
    pub news_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_deserialization() {
        let json = r#"{
            "_id": "a1",
            "blog": "Rust at scale",
            "createdAt": "2025-05-06T14:30:00.000Z",
            "image": "uploads\\blog\\a1.png",
            "blogContent": [{"text": "First"}, {"text": "Second"}]
        }"#;

        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.id, "a1");
        assert_eq!(article.title, "Rust at scale");
        assert_eq!(article.image.as_deref(), Some("uploads\\blog\\a1.png"));
        assert_eq!(article.content.len(), 2);
        assert_eq!(article.content[1].text, "Second");
    }

    #[test]
    fn test_article_missing_optional_fields() {
        let article: Article = serde_json::from_str(r#"{"_id": "a2"}"#).unwrap();
        assert_eq!(article.title, "");
        assert!(article.created_at.is_none());
        assert!(article.content.is_empty());
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let story: Story = serde_json::from_str(
            r#"{"_id": "s1", "title": null, "summary": null, "categoryDetails": {"_id": "c1", "category": null}}"#,
        )
        .unwrap();
        assert_eq!(story.title, "");
        assert!(story.summary.is_empty());
        assert_eq!(story.category_name(), Some(""));

        let ok: CategoryNewsResponse = serde_json::from_str(
            r#"{"categoryWiseNews": [{"categoryName": "Tech", "news": [{"_id": "s1", "title": null}, {"_id": "s2", "title": "Kept"}]}]}"#,
        )
        .unwrap();
        let buckets = ok.category_wise_news.unwrap();
        assert_eq!(buckets[0].news.len(), 2);
        assert_eq!(buckets[0].news[1].title, "Kept");

        let article: Article =
            serde_json::from_str(r#"{"_id": "a1", "blog": null, "blogContent": [{"text": null}]}"#).unwrap();
        assert_eq!(article.title, "");
        assert_eq!(article.content[0].text, "");
    }

    #[test]
    fn test_story_with_nested_and_flat_refs() {
        let json = r#"{
            "_id": "s1",
            "title": "Chips",
            "categoryId": {"_id": "c1", "name": "ignored"},
            "tagId": "t1",
            "categoryDetails": {"_id": "c1", "category": "Tech"},
            "tagDetails": {"_id": "t1", "tag": "Hardware"},
            "heroimage": "uploads\\s1.jpg",
            "summary": [{"text": "Short"}],
            "content_1": [{"text": "Body"}]
        }"#;

        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(
            story.category_id.as_ref().and_then(IdRef::nested_id),
            Some("c1")
        );
        assert_eq!(story.tag_id.as_ref().and_then(IdRef::flat_id), Some("t1"));
        assert_eq!(story.category_name(), Some("Tech"));
        assert!(story.image_2.is_none());
        assert!(story.content_3.is_empty());
    }

    #[test]
    fn test_category_response_with_in_band_status() {
        let expired: CategoryNewsResponse =
            serde_json::from_str(r#"{"status": 401, "message": "jwt expired"}"#).unwrap();
        assert_eq!(expired.status, Some(401));
        assert!(expired.category_wise_news.is_none());

        let ok: CategoryNewsResponse = serde_json::from_str(
            r#"{"categoryWiseNews": [{"categoryName": "Tech", "news": [{"_id": "s1"}]}]}"#,
        )
        .unwrap();
        let buckets = ok.category_wise_news.unwrap();
        assert_eq!(buckets[0].category_name, "Tech");
        assert_eq!(buckets[0].news[0].id, "s1");
    }

    #[test]
    fn test_lookup_request_field_names() {
        let req = StoryLookupRequest {
            category_id: Some("c1".to_string()),
            tag_id: None,
            news_id: Some("s1".to_string()),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["categoryId"], "c1");
        assert!(json["tagId"].is_null());
        assert_eq!(json["newsId"], "s1");
    }
}
