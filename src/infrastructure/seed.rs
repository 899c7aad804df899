use crate::domain::validation::complete_isbn13;
use crate::infrastructure::auth::{ROLE_ADMIN, ROLE_USER, hash_password};
use crate::models::{book, review, user};
use sea_orm::*;
use uuid::Uuid;

pub const DEMO_ACTIVE_BOOKS: usize = 100;
pub const DEMO_ARCHIVED_BOOKS: usize = 1;

const DEMO_AUTHORS: [&str; 5] = [
    "Margaret Atwood",
    "Ursula K. Le Guin",
    "Frank Herbert",
    "Octavia E. Butler",
    "Isaac Asimov",
];

/// Demo users and books. Books are only seeded into an empty catalog.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    seed_users(db).await?;

    if book::Entity::find().count(db).await? > 0 {
        tracing::info!("Catalog already has books, skipping demo books");
        return Ok(());
    }

    let total = DEMO_ACTIVE_BOOKS + DEMO_ARCHIVED_BOOKS;
    let mut first_book_id = None;

    for n in 1..=total {
        let now = chrono::Utc::now().to_rfc3339();
        let id = Uuid::new_v4().to_string();
        let author = DEMO_AUTHORS[n % DEMO_AUTHORS.len()];
        let year = 1950 + (n % 70);

        let demo_book = book::ActiveModel {
            id: Set(id.clone()),
            isbn: Set(complete_isbn13(&format!("978{:09}", n))),
            title: Set(format!("Demo Book {}", n)),
            description: Set(format!("Demo entry number {} by {}.", n, author)),
            author: Set(author.to_owned()),
            publication_date: Set(format!("{}-01-01T00:00:00+00:00", year)),
            archived: Set(n > DEMO_ACTIVE_BOOKS),
            cover: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };
        book::Entity::insert(demo_book).exec(db).await?;

        first_book_id.get_or_insert(id);
    }

    if let Some(book_id) = first_book_id {
        for (rating, body) in [(5, "A classic, reread every year."), (3, "Slow start.")] {
            let demo_review = review::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                book_id: Set(book_id.clone()),
                body: Set(body.to_owned()),
                rating: Set(rating),
                author: Set(Some("Demo Reader".to_owned())),
                publication_date: Set(None),
                created_at: Set(chrono::Utc::now().to_rfc3339()),
            };
            review::Entity::insert(demo_review).exec(db).await?;
        }
    }

    tracing::info!("Seeded {} demo books", total);
    Ok(())
}

async fn seed_users(db: &DatabaseConnection) -> Result<(), DbErr> {
    for (username, password, role) in [
        ("admin@example.com", "admin", ROLE_ADMIN),
        ("user@example.com", "user", ROLE_USER),
    ] {
        let password_hash = hash_password(password).map_err(|e| DbErr::Custom(e.to_string()))?;
        let now = chrono::Utc::now().to_rfc3339();

        let demo_user = user::ActiveModel {
            username: Set(username.to_owned()),
            password_hash: Set(password_hash),
            role: Set(role.to_owned()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        // on_conflict + do_nothing reports RecordNotInserted when the user exists
        let result = user::Entity::insert(demo_user)
            .on_conflict(
                sea_query::OnConflict::column(user::Column::Username)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(db)
            .await;

        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    Ok(())
}
