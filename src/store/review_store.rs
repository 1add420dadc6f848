use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::error::MergeError;

/// 수강평 DB 핸들
#[derive(Clone)]
pub struct ReviewStore {
    pool: Pool<Sqlite>,
}

impl ReviewStore {
    /// 기존 SQLite 파일에 연결한다
    ///
    /// 파일이 없으면 스키마도 없으므로 `DatabaseMissing` 으로 실패한다.
    pub async fn connect(path: &Path) -> Result<Self, MergeError> {
        info!("DB 연결: {}", path.display());

        if !path.exists() {
            return Err(MergeError::DatabaseMissing {
                path: path.to_path_buf(),
            });
        }

        let connect_options = SqliteConnectOptions::new()
            .filename(path)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .map_err(|source| MergeError::ConnectFailed {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn course_count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn review_count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM course_reviews")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
