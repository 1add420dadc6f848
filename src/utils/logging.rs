//! 로그 도우미
//!
//! 실행 로그 파일과 운영자용 요약 출력

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::orchestrator::{CrawlReport, TargetOutcome};
use crate::store::MergeReport;

/// 실행 로그 파일을 새로 만들고 머리말을 쓴다
pub fn init_log_file(log_file_path: &Path) -> Result<()> {
    let log_header = format!(
        "{}\n수강평 크롤링 로그 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 대상별 결과를 실행 로그 파일에 덧붙인다
pub fn append_outcomes(log_file_path: &Path, outcomes: &[TargetOutcome]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    for outcome in outcomes {
        writeln!(file, "{}", outcome)?;
    }
    Ok(())
}

pub fn log_startup(target_count: usize, output: &Path) {
    info!("{}", "=".repeat(60));
    info!("🚀 KLUE 수강평 크롤러 시작");
    info!("📋 대상 {}개", target_count);
    info!("💾 출력 파일: {}", output.display());
    info!("{}", "=".repeat(60));
}

/// 대상별 한 줄 요약과 전체 통계
pub fn print_final_stats(report: &CrawlReport, log_file_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 크롤링 완료 통계");
    info!(
        "완료 시간: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "─".repeat(60));
    for outcome in &report.outcomes {
        info!("{}", outcome);
    }
    info!("{}", "─".repeat(60));
    info!("✅ 성공: {}/{}", report.succeeded(), report.outcomes.len());
    info!("❌ 실패: {}", report.failed());
    info!("📝 수집한 후기: {}개", report.rows.len());
    info!("{}", "=".repeat(60));
    info!("\n로그 저장 위치: {}", log_file_path.display());
}

pub fn print_merge_stats(report: &MergeReport, total_courses: i64, total_reviews: i64) {
    info!("\n{}", "=".repeat(60));
    info!("📊 병합 결과");
    info!("{}", "=".repeat(60));
    info!("읽은 행: {}", report.rows_read);
    info!("🆕 새 강의: {}", report.created_courses);
    info!("✅ 추가한 후기: {}", report.inserted_reviews);
    info!("⏭️  건너뛴 행: {}", report.skipped_rows);
    if report.duplicate_reviews > 0 {
        info!("♻️  중복 후기: {}", report.duplicate_reviews);
    }
    info!("DB 전체: 강의 {}개, 후기 {}개", total_courses, total_reviews);
    info!("{}", "=".repeat(60));
}

/// 긴 텍스트를 로그용으로 자른다
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Target;
    use crate::orchestrator::TargetStatus;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("운영체제 강의 최고", 4), "운영체제...");
        assert_eq!(truncate_text("짧음", 10), "짧음");
    }

    #[test]
    fn test_log_file_gets_outcomes_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawl_log.txt");
        init_log_file(&path).unwrap();

        let outcomes = vec![TargetOutcome {
            target: Target::new("COSE341", "유혁"),
            status: TargetStatus::Succeeded {
                lectures: 2,
                reviews: 5,
            },
        }];
        append_outcomes(&path, &outcomes).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("수강평 크롤링 로그"));
        assert!(contents.ends_with("✅ COSE341 / 유혁 - 강의 2개, 후기 5개\n"));
    }
}
