//! SeaORM implementation of ReviewRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::domain::{DomainError, NewReview, ReviewRepository};
use crate::models::Review;
use crate::models::review::{ActiveModel, Column, Entity as ReviewEntity};

pub struct SeaOrmReviewRepository {
    db: DatabaseConnection,
}

impl SeaOrmReviewRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReviewRepository for SeaOrmReviewRepository {
    async fn find_by_book(&self, book_id: &str) -> Result<Vec<Review>, DomainError> {
        let reviews = ReviewEntity::find()
            .filter(Column::BookId.eq(book_id))
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(reviews.into_iter().map(Review::from).collect())
    }

    async fn create(&self, review: NewReview) -> Result<Review, DomainError> {
        let new_review = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            book_id: Set(review.book_id),
            body: Set(review.body),
            rating: Set(review.rating),
            author: Set(review.author),
            publication_date: Set(review.publication_date),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let model = new_review.insert(&self.db).await?;
        Ok(Review::from(model))
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let result = ReviewEntity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }
}
