use sea_orm::entity::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};

use super::review::Review;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub isbn: Option<String>,
    pub title: String,
    pub description: String,
    pub author: String,
    /// RFC 3339, normalized to UTC
    pub publication_date: String,
    pub archived: bool,
    /// Image URL or `data:` URI
    pub cover: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub isbn: Option<String>,
    pub title: String,
    pub description: String,
    pub author: String,
    pub publication_date: String,
    pub archived: bool,
    pub cover: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            isbn: model.isbn,
            title: model.title,
            description: model.description,
            author: model.author,
            publication_date: model.publication_date,
            archived: model.archived,
            cover: model.cover,
            reviews: Vec::new(), // filled by the repository
        }
    }
}

/// Unvalidated create payload. Every field is optional so that missing
/// properties surface as validation violations instead of a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub publication_date: Option<String>,
    pub archived: Option<bool>,
    pub cover: Option<String>,
}

/// Merge-patch payload: absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub isbn: Option<Option<String>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub publication_date: Option<String>,
    pub archived: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover: Option<Option<String>>,
}

impl BookPatch {
    /// Overlay this patch on an existing book, producing a draft to validate
    pub fn apply_to(self, existing: &Book) -> BookDraft {
        BookDraft {
            isbn: self.isbn.unwrap_or_else(|| existing.isbn.clone()),
            title: Some(self.title.unwrap_or_else(|| existing.title.clone())),
            description: Some(
                self.description
                    .unwrap_or_else(|| existing.description.clone()),
            ),
            author: Some(self.author.unwrap_or_else(|| existing.author.clone())),
            publication_date: Some(
                self.publication_date
                    .unwrap_or_else(|| existing.publication_date.clone()),
            ),
            archived: Some(self.archived.unwrap_or(existing.archived)),
            cover: self.cover.unwrap_or_else(|| existing.cover.clone()),
        }
    }
}

// Distinguishes `"field": null` (Some(None)) from an absent field (None)
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
