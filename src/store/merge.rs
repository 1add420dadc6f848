//! CSV -> DB 병합 (학수번호 기준 upsert)

use std::path::Path;

use sqlx::SqliteConnection;
use tracing::{debug, info, warn};

use crate::error::MergeError;
use crate::models::CourseNames;
use crate::store::artifact::{read_artifact, ArtifactRow};
use crate::store::ReviewStore;

/// 새로 만드는 강의의 기본 수강생 수
pub const DEFAULT_TOTAL_STUDENTS: i64 = 99;

/// 진행 상황 로그 간격 (행)
const PROGRESS_EVERY: usize = 100;

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// 같은 강의에 같은 내용의 수강평이 이미 있으면 넣지 않는다
    pub skip_duplicate_reviews: bool,
}

/// 병합 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// 읽은 데이터 행 수
    pub rows_read: usize,
    /// 추가한 수강평 수
    pub inserted_reviews: usize,
    /// 새로 만든 강의 수
    pub created_courses: usize,
    /// 학수번호나 수강평이 비어 건너뛴 행 수
    pub skipped_rows: usize,
    /// 중복이라 넣지 않은 수강평 수 (`skip_duplicate_reviews` 일 때만)
    pub duplicate_reviews: usize,
}

impl ReviewStore {
    /// 내보낸 CSV 를 DB 에 병합한다
    ///
    /// 전체가 하나의 `BEGIN IMMEDIATE` 트랜잭션이다. 다른 쓰기 작업이 잠금을 쥐고
    /// 있으면 busy timeout 동안 기다린다. 스키마 오류나 파싱 오류는 트랜잭션을
    /// 열기 전에 드러나고, 중간의 DB 오류는 롤백되어 아무것도 남지 않는다.
    pub async fn merge(
        &self,
        artifact: &Path,
        names: &CourseNames,
        options: MergeOptions,
    ) -> Result<MergeReport, MergeError> {
        info!("📥 CSV 데이터 병합 시작... (파일: {})", artifact.display());

        let rows = read_artifact(artifact).await?;
        let mut report = MergeReport {
            rows_read: rows.len(),
            ..Default::default()
        };

        let mut conn = self.pool().acquire().await.map_err(MergeError::Transaction)?;
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(MergeError::Transaction)?;

        let outcome = match merge_rows(&mut conn, &rows, names, options, &mut report).await {
            Ok(()) => sqlx::query("COMMIT")
                .execute(&mut *conn)
                .await
                .map(|_| ())
                .map_err(MergeError::Transaction),
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            if let Err(rollback) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                warn!("롤백 실패: {}", rollback);
            }
            return Err(e);
        }

        info!("✅ 총 {}개의 리뷰 처리 완료!", report.inserted_reviews);
        Ok(report)
    }
}

async fn merge_rows(
    conn: &mut SqliteConnection,
    rows: &[ArtifactRow],
    names: &CourseNames,
    options: MergeOptions,
    report: &mut MergeReport,
) -> Result<(), MergeError> {
    for row in rows {
        if row.course_code.is_empty() || row.review.is_empty() {
            debug!("{}번째 행 건너뜀 (빈 값)", row.position);
            report.skipped_rows += 1;
            continue;
        }

        let store_err = |source: sqlx::Error| MergeError::Store {
            row: row.position,
            source,
        };

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM courses WHERE course_code = ?1 LIMIT 1")
                .bind(&row.course_code)
                .fetch_optional(&mut *conn)
                .await
                .map_err(store_err)?;

        let course_id = match existing {
            Some(id) => id,
            None => {
                let name = names.lookup(&row.course_code);
                let id = sqlx::query(
                    "INSERT INTO courses (name, course_code, total_students) VALUES (?1, ?2, ?3)",
                )
                .bind(name)
                .bind(&row.course_code)
                .bind(DEFAULT_TOTAL_STUDENTS)
                .execute(&mut *conn)
                .await
                .map_err(store_err)?
                .last_insert_rowid();
                info!("🆕 새 강의 추가: {} ({})", name, row.course_code);
                report.created_courses += 1;
                id
            }
        };

        if options.skip_duplicate_reviews {
            let duplicate: Option<i64> = sqlx::query_scalar(
                "SELECT id FROM course_reviews WHERE course_id = ?1 AND content = ?2 LIMIT 1",
            )
            .bind(course_id)
            .bind(&row.review)
            .fetch_optional(&mut *conn)
            .await
            .map_err(store_err)?;

            if duplicate.is_some() {
                report.duplicate_reviews += 1;
                continue;
            }
        }

        sqlx::query("INSERT INTO course_reviews (course_id, content) VALUES (?1, ?2)")
            .bind(course_id)
            .bind(&row.review)
            .execute(&mut *conn)
            .await
            .map_err(store_err)?;
        report.inserted_reviews += 1;

        if report.inserted_reviews % PROGRESS_EVERY == 0 {
            info!("   ...{}개 처리 중", report.inserted_reviews);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewRecord;
    use crate::services::export::export_reviews;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::collections::HashMap;

    async fn memory_store() -> ReviewStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE courses (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                course_code TEXT,
                total_students INTEGER
            )",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "CREATE TABLE course_reviews (
                id INTEGER PRIMARY KEY,
                course_id INTEGER NOT NULL,
                content TEXT,
                FOREIGN KEY (course_id) REFERENCES courses (id) ON DELETE CASCADE
            )",
        )
        .execute(&pool)
        .await
        .unwrap();
        ReviewStore::from_pool(pool)
    }

    fn record(code: &str, review: &str) -> ReviewRecord {
        ReviewRecord {
            course_code: code.to_string(),
            professor: "유혁".to_string(),
            lecture_id: 1,
            year: Some(2025),
            semester: Some(1),
            review_text: review.to_string(),
        }
    }

    fn sample_rows() -> Vec<ReviewRecord> {
        vec![
            record("COSE341", "운영체제 최고"),
            record("COSE341", "과제 많음"),
            record("COSE111", "수학 어려움"),
            record("MATH999", "매핑 없는 과목"),
        ]
    }

    #[tokio::test]
    async fn test_second_merge_reuses_courses_but_appends_reviews() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.csv");
        export_reviews(&sample_rows(), &path).unwrap();
        let store = memory_store().await;
        let names = CourseNames::builtin();

        let first = store.merge(&path, &names, MergeOptions::default()).await.unwrap();
        assert_eq!(first.created_courses, 3);
        assert_eq!(first.inserted_reviews, 4);
        assert_eq!(store.course_count().await.unwrap(), 3);
        assert_eq!(store.review_count().await.unwrap(), 4);

        let second = store.merge(&path, &names, MergeOptions::default()).await.unwrap();
        assert_eq!(second.created_courses, 0);
        assert_eq!(second.inserted_reviews, 4);
        assert_eq!(store.course_count().await.unwrap(), 3);
        assert_eq!(store.review_count().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_new_course_uses_mapped_name_and_default_students() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.csv");
        export_reviews(&sample_rows(), &path).unwrap();
        let store = memory_store().await;

        store
            .merge(&path, &CourseNames::builtin(), MergeOptions::default())
            .await
            .unwrap();

        let rows: Vec<(String, String, i64)> = sqlx::query_as(
            "SELECT name, course_code, total_students FROM courses ORDER BY id",
        )
        .fetch_all(store.pool())
        .await
        .unwrap();
        assert_eq!(
            rows,
            vec![
                ("운영체제".to_string(), "COSE341".to_string(), 99),
                ("전산수학I".to_string(), "COSE111".to_string(), 99),
                ("MATH999".to_string(), "MATH999".to_string(), 99),
            ]
        );
    }

    #[tokio::test]
    async fn test_blank_code_or_review_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.csv");
        std::fs::write(
            &path,
            "course_code,professor,lecture_id,year,semester,review\n\
             COSE341,유혁,1,2025,1,   \n\
             ,유혁,1,2025,1,내용 있음\n\
             COSE341,유혁,1,2025,1,좋아요\n",
        )
        .unwrap();
        let store = memory_store().await;

        let report = store
            .merge(&path, &CourseNames::default(), MergeOptions::default())
            .await
            .unwrap();

        assert_eq!(
            report,
            MergeReport {
                rows_read: 3,
                inserted_reviews: 1,
                created_courses: 1,
                skipped_rows: 2,
                duplicate_reviews: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_schema_mismatch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.csv");
        std::fs::write(&path, "code,review\nCOSE341,좋아요\n").unwrap();
        let store = memory_store().await;

        let err = store
            .merge(&path, &CourseNames::builtin(), MergeOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, MergeError::SchemaMismatch { .. }));
        assert_eq!(store.course_count().await.unwrap(), 0);
        assert_eq!(store.review_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_error_rolls_back_and_reports_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.csv");
        export_reviews(&sample_rows(), &path).unwrap();
        let store = memory_store().await;
        // 세 번째 행의 과목 생성을 막는다
        sqlx::query(
            "CREATE TRIGGER reject_cose111 BEFORE INSERT ON courses
             WHEN NEW.course_code = 'COSE111'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let err = store
            .merge(&path, &CourseNames::builtin(), MergeOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, MergeError::Store { row: 3, .. }));
        assert_eq!(store.course_count().await.unwrap(), 0);
        assert_eq!(store.review_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_skip_duplicates_makes_reimport_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.csv");
        export_reviews(&sample_rows(), &path).unwrap();
        let store = memory_store().await;
        let options = MergeOptions {
            skip_duplicate_reviews: true,
        };
        let names = CourseNames::new(HashMap::new());

        store.merge(&path, &names, options).await.unwrap();
        let second = store.merge(&path, &names, options).await.unwrap();

        assert_eq!(second.inserted_reviews, 0);
        assert_eq!(second.duplicate_reviews, 4);
        assert_eq!(store.review_count().await.unwrap(), 4);
    }
}
