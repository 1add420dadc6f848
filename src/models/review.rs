use serde::{Deserialize, Serialize};

use crate::models::{LectureRef, Target};

/// 수강평 한 건
///
/// 필드 순서가 곧 CSV 컬럼 순서다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub course_code: String,
    pub professor: String,
    pub lecture_id: i64,
    pub year: Option<i32>,
    pub semester: Option<u8>,
    #[serde(rename = "review")]
    pub review_text: String,
}

impl ReviewRecord {
    pub fn new(target: &Target, lecture: &LectureRef, review_text: impl Into<String>) -> Self {
        Self {
            course_code: target.course_code.clone(),
            professor: target.professor_name.clone(),
            lecture_id: lecture.lecture_id,
            year: lecture.year,
            semester: lecture.semester,
            review_text: review_text.into(),
        }
    }
}
