use std::path::Path;

use tokio::fs;
use tracing::info;

use crate::error::MergeError;
use crate::services::export::BOM;

const COURSE_CODE_COLUMN: &str = "course_code";
const REVIEW_COLUMN: &str = "review";

/// 병합에 필요한 CSV 한 행
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRow {
    /// 헤더를 뺀 1부터 시작하는 행 번호
    pub position: usize,
    /// 앞뒤 공백 제거된 학수번호
    pub course_code: String,
    /// 앞뒤 공백 제거된 수강평
    pub review: String,
}

/// 내보낸 CSV 를 헤더 이름 기준으로 읽는다
///
/// 헤더 이름의 앞뒤 공백과 BOM 은 무시한다. `course_code` 컬럼이 없으면
/// `SchemaMismatch`, `review` 컬럼이 없으면 모든 행의 수강평이 빈 값으로 읽힌다.
pub async fn read_artifact(path: &Path) -> Result<Vec<ArtifactRow>, MergeError> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Err(MergeError::ArtifactMissing {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path).await.map_err(|source| MergeError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let body = bytes.strip_prefix(BOM).unwrap_or(&bytes[..]);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(body);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| MergeError::MalformedRecord { row: 0, source })?
        .iter()
        .map(str::to_string)
        .collect();
    info!("ℹ️  감지된 컬럼: {:?}", headers);

    let Some(code_idx) = headers.iter().position(|h| h == COURSE_CODE_COLUMN) else {
        return Err(MergeError::SchemaMismatch {
            column: COURSE_CODE_COLUMN,
            found: headers,
        });
    };
    let review_idx = headers.iter().position(|h| h == REVIEW_COLUMN);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let position = index + 1;
        let record = record.map_err(|source| MergeError::MalformedRecord { row: position, source })?;
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .unwrap_or("")
                .trim()
                .to_string()
        };
        rows.push(ArtifactRow {
            position,
            course_code: field(Some(code_idx)),
            review: field(review_idx),
        });
    }

    Ok(rows)
}
