//! 크롤링 실행기 - 오케스트레이션 계층
//!
//! ## 역할
//!
//! 1. **초기화**: 실행 로그 파일, 시작 로그
//! 2. **세션 관리**: 브라우저를 열고 한 번 로그인한 뒤, 성공이든 실패든
//!    반드시 닫는다
//! 3. **대상 실행**: `TargetProcessor` 에 대상 목록을 넘긴다
//! 4. **내보내기**: 누적된 행을 CSV 로 저장
//! 5. **통계**: 대상별 한 줄 요약

use anyhow::{Context, Result};
use tracing::info;

use crate::browser::BrowserSession;
use crate::config::{Config, Credentials};
use crate::error::AppResult;
use crate::models::Target;
use crate::orchestrator::target_processor::{CrawlReport, TargetProcessor};
use crate::services::export_reviews;
use crate::utils::logging::{append_outcomes, init_log_file, log_startup, print_final_stats};

/// 크롤링 애플리케이션
pub struct App {
    config: Config,
    credentials: Credentials,
    targets: Vec<Target>,
    processor: TargetProcessor,
}

impl App {
    pub fn initialize(config: Config, credentials: Credentials, targets: Vec<Target>) -> Result<Self> {
        init_log_file(&config.run_log_file)
            .with_context(|| format!("로그 파일 생성 실패: {}", config.run_log_file.display()))?;

        log_startup(targets.len(), &config.output_csv);

        let processor = TargetProcessor::from_config(&config)?;

        Ok(Self {
            config,
            credentials,
            targets,
            processor,
        })
    }

    /// 로그인 -> 대상 처리 -> CSV 저장
    pub async fn run(&self) -> Result<CrawlReport> {
        let session = BrowserSession::open(&self.config).await?;
        let result = self.crawl(&session).await;
        session.close().await;
        let report = result?;

        export_reviews(&report.rows, &self.config.output_csv)?;

        append_outcomes(&self.config.run_log_file, &report.outcomes)?;
        print_final_stats(&report, &self.config.run_log_file);

        Ok(report)
    }

    async fn crawl(&self, session: &BrowserSession) -> AppResult<CrawlReport> {
        session
            .authenticate(
                &self.config.base_url,
                &self.credentials,
                self.config.login_settle(),
            )
            .await?;

        info!("📚 대상 {}개 처리 시작", self.targets.len());
        Ok(self.processor.run(session.executor(), &self.targets).await)
    }
}
