use std::io;
use std::io::ErrorKind;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{Config, Secrets, StoreKind, READ_DB_URL_VAR, WRITE_DB_URL_VAR};
use crate::post::Post;

pub mod file_store;
pub mod remote_store;

use file_store::FileStore;
use remote_store::RemoteStore;

/// The content source. One contract, two backends: a local markdown
/// directory and a remote table.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts, newest date first. Drafts are included only when the
    /// caller asked for them (which the session gate allows for admins
    /// only); that path goes through the privileged credential.
    /// An empty source is `Ok(vec![])`, not an error.
    async fn fetch(&self, include_drafts: bool) -> Result<Vec<Post>>;

    /// Inserts one new post through the privileged credential. No
    /// duplicate guard: inserting twice stores two posts.
    async fn insert(&self, post: &Post) -> Result<()>;
}

pub async fn open_store(config: &Config, secrets: &Secrets) -> Result<Arc<dyn PostStore>> {
    match config.store.kind {
        StoreKind::Files => {
            let posts_dir = match config.paths.posts_dir {
                Some(ref dir) => dir.clone(),
                None => return Err(io::Error::new(
                    ErrorKind::InvalidData, "paths.posts_dir is not configured").into()),
            };
            Ok(Arc::new(FileStore::new(posts_dir)))
        }
        StoreKind::Database => {
            let read_url = match secrets.read_db_url {
                Some(ref url) => url,
                None => return Err(io::Error::new(
                    ErrorKind::NotFound, format!("{} is not set", READ_DB_URL_VAR)).into()),
            };
            let write_url = match secrets.write_db_url {
                Some(ref url) => url,
                None => return Err(io::Error::new(
                    ErrorKind::NotFound, format!("{} is not set", WRITE_DB_URL_VAR)).into()),
            };

            let store = RemoteStore::connect(read_url, write_url).await?;
            Ok(Arc::new(store))
        }
    }
}
