//! CSV 내보내기 - 서비스 계층
//!
//! 수집한 수강평을 BOM 이 붙은 UTF-8 CSV 로 쓴다. 엑셀에서 열어도 한글이
//! 깨지지 않는다.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ExportError;
use crate::models::ReviewRecord;

/// 고정 컬럼 순서
pub const COLUMNS: [&str; 6] = [
    "course_code",
    "professor",
    "lecture_id",
    "year",
    "semester",
    "review",
];

/// UTF-8 BOM
pub const BOM: &[u8] = b"\xEF\xBB\xBF";

/// 수강평을 CSV 로 직렬화한다 (BOM, 헤더 포함)
///
/// # 반환
/// 쓴 데이터 행 수
pub fn write_reviews<W: Write>(rows: &[ReviewRecord], mut writer: W) -> Result<usize, ExportError> {
    writer.write_all(BOM).map_err(csv::Error::from)?;

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(COLUMNS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;

    Ok(rows.len())
}

/// 수강평을 파일로 내보낸다
///
/// 임시 파일에 전부 쓴 뒤 이름을 바꾸므로, 읽는 쪽은 완성된 파일만 본다.
pub fn export_reviews(rows: &[ReviewRecord], path: &Path) -> Result<usize, ExportError> {
    let tmp_path = temp_path(path);
    debug!("임시 파일에 쓰는 중: {}", tmp_path.display());

    let result = write_to(rows, &tmp_path).and_then(|count| {
        fs::rename(&tmp_path, path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(count)
    });

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }

    let count = result?;
    info!("💾 CSV 저장 완료: {} (총 {}행)", path.display(), count);
    Ok(count)
}

fn write_to(rows: &[ReviewRecord], path: &Path) -> Result<usize, ExportError> {
    let io_err = |source: std::io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let count = write_reviews(rows, &mut writer)?;
    let file = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
    file.sync_all().map_err(io_err)?;
    Ok(count)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "export.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// 내보낸 CSV 를 다시 읽는다
pub fn read_reviews(path: &Path) -> Result<Vec<ReviewRecord>, ExportError> {
    let bytes = fs::read(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let body = bytes.strip_prefix(BOM).unwrap_or(&bytes[..]);

    let mut reader = csv::Reader::from_reader(body);
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(review: &str, year: Option<i32>, semester: Option<u8>) -> ReviewRecord {
        ReviewRecord {
            course_code: "COSE341".to_string(),
            professor: "유혁".to_string(),
            lecture_id: 1024,
            year,
            semester,
            review_text: review.to_string(),
        }
    }

    #[test]
    fn test_output_starts_with_bom_and_header() {
        let mut buf = Vec::new();
        let count = write_reviews(&[record("좋아요", Some(2025), Some(1))], &mut buf).unwrap();

        assert_eq!(count, 1);
        assert!(buf.starts_with(BOM));
        let text = String::from_utf8(buf[BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("course_code,professor,lecture_id,year,semester,review")
        );
        assert_eq!(lines.next(), Some("COSE341,유혁,1024,2025,1,좋아요"));
    }

    #[test]
    fn test_header_written_for_empty_rows() {
        let mut buf = Vec::new();
        assert_eq!(write_reviews(&[], &mut buf).unwrap(), 0);

        let text = String::from_utf8(buf[BOM.len()..].to_vec()).unwrap();
        assert_eq!(text.trim_end(), COLUMNS.join(","));
    }

    #[test]
    fn test_missing_year_semester_are_empty_fields() {
        let mut buf = Vec::new();
        write_reviews(&[record("무난", None, None)], &mut buf).unwrap();

        let text = String::from_utf8(buf[BOM.len()..].to_vec()).unwrap();
        assert!(text.contains("COSE341,유혁,1024,,,무난"));
    }

    #[test]
    fn test_export_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.csv");
        let rows = vec![
            record("과제가 많지만, \"정말\" 유익함", Some(2025), Some(1)),
            record("시험 범위가 넓어요\n두 줄 리뷰", None, None),
            record("추천", Some(2023), Some(2)),
        ];

        let written = export_reviews(&rows, &path).unwrap();

        assert_eq!(written, 3);
        assert!(!temp_path(&path).exists());
        assert_eq!(read_reviews(&path).unwrap(), rows);
    }

    #[test]
    fn test_export_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviews.csv");
        fs::write(&path, "old contents").unwrap();

        export_reviews(&[record("새 리뷰", Some(2024), Some(2))], &path).unwrap();

        let rows = read_reviews(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].review_text, "새 리뷰");
    }
}
