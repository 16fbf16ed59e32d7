use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use spdlog::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::post::{join_comma_list, parse_comma_list, Post, PostId};
use crate::store::PostStore;

const SELECT_COLUMNS: &str =
    "SELECT id, title, date, location, tags, content, cover_image_url, gallery_image_urls, is_published FROM posts";

const SELECT_PUBLISHED: &str =
    "SELECT id, title, date, location, tags, content, cover_image_url, gallery_image_urls, is_published \
     FROM posts WHERE is_published = TRUE ORDER BY date DESC, id";

const INSERT_POST: &str =
    "INSERT INTO posts (id, title, date, location, tags, content, cover_image_url, gallery_image_urls, is_published) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)";

/// Post backend over a remote `posts` table (see res/schema.sql).
///
/// Two pools, two credentials: the read pool uses the unprivileged key the
/// backend restricts to published rows; the write pool uses the privileged
/// key and is the only path to drafts and inserts.
pub struct RemoteStore {
    read_pool: PgPool,
    write_pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: String,
    title: String,
    date: NaiveDate,
    location: String,
    tags: String,
    content: String,
    cover_image_url: String,
    gallery_image_urls: String,
    is_published: bool,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: PostId(row.id),
            title: row.title,
            date: row.date,
            location: row.location,
            tags: parse_comma_list(&row.tags),
            content: row.content,
            cover_image_url: row.cover_image_url,
            gallery_image_urls: parse_comma_list(&row.gallery_image_urls),
            is_published: row.is_published,
        }
    }
}

impl RemoteStore {
    pub async fn connect(read_url: &str, write_url: &str) -> Result<Self> {
        let read_pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(read_url)
            .await?;

        let write_pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(write_url)
            .await?;

        Ok(RemoteStore {
            read_pool,
            write_pool,
        })
    }
}

#[async_trait]
impl PostStore for RemoteStore {
    async fn fetch(&self, include_drafts: bool) -> Result<Vec<Post>> {
        let rows: Vec<PostRow> = if include_drafts {
            let all_rows = format!("{} ORDER BY date DESC, id", SELECT_COLUMNS);
            sqlx::query_as(&all_rows).fetch_all(&self.write_pool).await?
        } else {
            sqlx::query_as(SELECT_PUBLISHED).fetch_all(&self.read_pool).await?
        };

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn insert(&self, post: &Post) -> Result<()> {
        sqlx::query(INSERT_POST)
            .bind(&post.id.0)
            .bind(&post.title)
            .bind(post.date)
            .bind(&post.location)
            .bind(join_comma_list(&post.tags))
            .bind(&post.content)
            .bind(&post.cover_image_url)
            .bind(join_comma_list(&post.gallery_image_urls))
            .bind(post.is_published)
            .execute(&self.write_pool)
            .await?;

        info!("Inserted post {} ({})", post.id.0, post.display_title());
        Ok(())
    }
}
