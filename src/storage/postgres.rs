//! PostgreSQL-backed book repository.

use crate::domain::book::DESCRIPTION_MAX_LEN;
use crate::domain::{Book, NewBook, Page, PageRequest};
use crate::storage::{BookRepository, RepositoryResult};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

const BOOK_COLUMNS: &str = "id, title, author, isbn, description, image_url, price, \
     publication_year, publisher, language, page_count, category, stock_quantity, \
     average_rating, ratings_count";

const TEXT_PREDICATE: &str = "LOWER(title) LIKE $1 ESCAPE '\\' \
     OR LOWER(author) LIKE $1 ESCAPE '\\' \
     OR LOWER(isbn) LIKE $1 ESCAPE '\\'";

const CATEGORY_PREDICATE: &str = "LOWER(category) LIKE $1 ESCAPE '\\'";

#[derive(Clone)]
pub struct PostgresBookRepository {
    pool: PgPool,
}

impl PostgresBookRepository {
    /// Connects to `database_url` and makes sure the `books` table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> RepositoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: PgPool) -> RepositoryResult<Self> {
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `books` table if missing. Existing tables are left untouched.
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS books (
                id BIGSERIAL PRIMARY KEY,
                title TEXT,
                author TEXT,
                isbn TEXT,
                description VARCHAR({DESCRIPTION_MAX_LEN}),
                image_url TEXT,
                price NUMERIC(19, 2),
                publication_year INTEGER,
                publisher TEXT,
                language TEXT,
                page_count INTEGER,
                category TEXT,
                stock_quantity INTEGER,
                average_rating DOUBLE PRECISION,
                ratings_count INTEGER
            )"
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }

    async fn fetch_page(
        &self,
        predicate: &str,
        pattern: &str,
        page: PageRequest,
    ) -> RepositoryResult<Page<Book>> {
        let count_sql = format!("SELECT COUNT(*) FROM books WHERE {predicate}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(pattern)
            .fetch_one(&self.pool)
            .await?;

        let select_sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE {predicate} ORDER BY id LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query(&select_sql)
            .bind(pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows.iter().map(row_to_book).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total.max(0) as u64))
    }
}

#[async_trait::async_trait]
impl BookRepository for PostgresBookRepository {
    async fn insert(&self, book: &NewBook) -> RepositoryResult<Book> {
        let sql = format!(
            "INSERT INTO books (title, author, isbn, description, image_url, price, \
             publication_year, publisher, language, page_count, category, stock_quantity, \
             average_rating, ratings_count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {BOOK_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.isbn)
            .bind(&book.description)
            .bind(&book.image_url)
            .bind(book.price)
            .bind(book.publication_year)
            .bind(&book.publisher)
            .bind(&book.language)
            .bind(book.page_count)
            .bind(&book.category)
            .bind(book.stock_quantity)
            .bind(book.average_rating)
            .bind(book.ratings_count)
            .fetch_one(&self.pool)
            .await?;
        Ok(row_to_book(&row)?)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_book).transpose()?)
    }

    async fn find_all(&self, page: PageRequest) -> RepositoryResult<Page<Book>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY title COLLATE \"C\" ASC NULLS LAST, id ASC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows.iter().map(row_to_book).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, total.max(0) as u64))
    }

    async fn search(&self, term: &str, page: PageRequest) -> RepositoryResult<Page<Book>> {
        self.fetch_page(TEXT_PREDICATE, &contains_pattern(term), page)
            .await
    }

    async fn find_by_category(
        &self,
        category: &str,
        page: PageRequest,
    ) -> RepositoryResult<Page<Book>> {
        self.fetch_page(CATEGORY_PREDICATE, &contains_pattern(category), page)
            .await
    }

    async fn ping(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn row_to_book(row: &PgRow) -> Result<Book, sqlx::Error> {
    Ok(Book {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        isbn: row.try_get("isbn")?,
        description: row.try_get("description")?,
        image_url: row.try_get("image_url")?,
        price: row.try_get("price")?,
        publication_year: row.try_get("publication_year")?,
        publisher: row.try_get("publisher")?,
        language: row.try_get("language")?,
        page_count: row.try_get("page_count")?,
        category: row.try_get("category")?,
        stock_quantity: row.try_get("stock_quantity")?,
        average_rating: row.try_get("average_rating")?,
        ratings_count: row.try_get("ratings_count")?,
    })
}

/// Builds a `LIKE` pattern matching `term` literally anywhere in a lowercased column.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
