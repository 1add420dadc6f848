use serde::Deserialize;

/// 검색 결과에서 찾은 강의
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LectureRef {
    /// KLUE 강의 ID (`/lectures/{id}`)
    pub lecture_id: i64,
    /// 개설 연도, 헤더 해석 실패 시 None
    pub year: Option<i32>,
    /// 학기, 헤더 해석 실패 시 None
    pub semester: Option<u8>,
}

/// 검색 결과 페이지의 강의 카드 (앵커 하나)를 그대로 읽은 값
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LectureCard {
    /// 앵커의 href (상대/절대 경로)
    #[serde(default)]
    pub href: Option<String>,
    /// "교수님" 표기가 있는 문단의 텍스트, 없으면 None
    #[serde(default)]
    pub professor_text: Option<String>,
    /// 카드 첫 문단의 텍스트
    #[serde(default)]
    pub header_text: String,
}
