//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::{BookFilter, BookRepository, DomainError, NewBook, PaginatedBooks};
use crate::models::book::{ActiveModel, Column, Entity as BookEntity, Model};
use crate::models::review::{self, Entity as ReviewEntity};
use crate::models::{Book, Review};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn with_reviews(&self, model: Model) -> Result<Book, DomainError> {
        let reviews = model
            .find_related(ReviewEntity)
            .order_by_asc(review::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut book = Book::from(model);
        book.reviews = reviews.into_iter().map(Review::from).collect();
        Ok(book)
    }
}

// Case-sensitive substring match with no wildcards; SQLite's LIKE folds ASCII case
fn contains_exact(column: Column, needle: &str) -> SimpleExpr {
    Expr::expr(
        Func::cust(Alias::new("instr"))
            .arg(Expr::col((BookEntity, column)))
            .arg(needle.to_owned()),
    )
    .gt(0)
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self, filter: BookFilter) -> Result<PaginatedBooks, DomainError> {
        let mut query = BookEntity::find();

        // Apply filters
        if let Some(archived) = filter.archived {
            query = query.filter(Column::Archived.eq(archived));
        }

        if let Some(title) = &filter.title
            && !title.is_empty()
        {
            query = query.filter(contains_exact(Column::Title, title));
        }

        if let Some(author) = &filter.author
            && !author.is_empty()
        {
            query = query.filter(contains_exact(Column::Author, author));
        }

        if let Some(isbn) = &filter.isbn
            && !isbn.is_empty()
        {
            query = query.filter(Column::Isbn.eq(isbn));
        }

        // Apply sorting
        match filter.sort.as_deref() {
            Some("title_asc") => query = query.order_by_asc(Column::Title),
            Some("title_desc") => query = query.order_by_desc(Column::Title),
            Some("recent") => query = query.order_by_desc(Column::CreatedAt),
            _ => query = query.order_by_asc(Column::CreatedAt),
        }
        query = query.order_by_asc(Column::Id);

        let page = filter.page.max(1);
        let items_per_page = filter.items_per_page.max(1);

        let paginator = query.paginate(&self.db, items_per_page);
        let total = paginator.num_items().await?;
        // Pages past the end (or whose offset overflows) are empty
        let models = match (page - 1).checked_mul(items_per_page) {
            Some(offset) if offset < total => paginator.fetch_page(page - 1).await?,
            _ => Vec::new(),
        };

        tracing::debug!(
            "Book page {} ({} per page) returned {} of {} books",
            page,
            items_per_page,
            models.len(),
            total
        );

        let mut books = Vec::with_capacity(models.len());
        for model in models {
            books.push(self.with_reviews(model).await?);
        }

        Ok(PaginatedBooks {
            books,
            total,
            page,
            items_per_page,
        })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, DomainError> {
        match BookEntity::find_by_id(id.to_owned()).one(&self.db).await? {
            Some(model) => Ok(Some(self.with_reviews(model).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, book: NewBook) -> Result<Book, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let new_book = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            isbn: Set(book.isbn),
            title: Set(book.title),
            description: Set(book.description),
            author: Set(book.author),
            publication_date: Set(book.publication_date),
            archived: Set(book.archived),
            cover: Set(book.cover),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let model = new_book.insert(&self.db).await?;
        tracing::info!("Book {} created: {}", model.id, model.title);
        Ok(Book::from(model))
    }

    async fn update(
        &self,
        id: &str,
        book: NewBook,
        replace_cover: bool,
    ) -> Result<Book, DomainError> {
        let existing = BookEntity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.isbn = Set(book.isbn);
        active.title = Set(book.title);
        active.description = Set(book.description);
        active.author = Set(book.author);
        active.publication_date = Set(book.publication_date);
        active.archived = Set(book.archived);
        if replace_cover {
            active.cover = Set(book.cover);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&self.db).await?;
        self.with_reviews(model).await
    }

    async fn set_cover(&self, id: &str, cover: Option<String>) -> Result<(), DomainError> {
        let existing = BookEntity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.cover = Set(cover);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.db).await?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        ReviewEntity::delete_many()
            .filter(review::Column::BookId.eq(id))
            .exec(&txn)
            .await?;

        let result = BookEntity::delete_by_id(id.to_owned()).exec(&txn).await?;
        if result.rows_affected == 0 {
            // dropping the transaction rolls back the review deletion
            return Err(DomainError::NotFound);
        }

        txn.commit().await?;
        tracing::info!("Book {} deleted", id);
        Ok(())
    }
}
