use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use klue_review_crawler::models::{load_course_names, load_targets};
use klue_review_crawler::utils::logging::print_merge_stats;
use klue_review_crawler::{logger, App, Config, Credentials, MergeOptions, ReviewStore};

#[derive(Parser, Debug)]
#[command(name = "klue_review_crawler", about = "KLUE 수강평 크롤러")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 로그인 후 대상 강의의 수강평을 모아 CSV 로 저장
    Crawl {
        /// 대상 목록 TOML
        #[arg(long)]
        targets: Option<PathBuf>,
        /// 출력 CSV
        #[arg(long)]
        output: Option<PathBuf>,
        /// 헤드리스 모드
        #[arg(long)]
        headless: bool,
    },
    /// CSV 를 SQLite DB 에 병합
    Merge {
        /// 입력 CSV
        #[arg(long)]
        input: Option<PathBuf>,
        /// SQLite 파일
        #[arg(long)]
        database: Option<PathBuf>,
        /// 학수번호 -> 강의명 TOML
        #[arg(long)]
        course_names: Option<PathBuf>,
        /// 같은 강의에 같은 내용의 후기가 있으면 넣지 않음
        #[arg(long)]
        skip_duplicates: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let mut config = Config::from_env();
    logger::init(config.verbose_logging);

    let result = match cli.command {
        Command::Crawl {
            targets,
            output,
            headless,
        } => {
            if let Some(path) = targets {
                config.targets_file = path;
            }
            if let Some(path) = output {
                config.output_csv = path;
            }
            config.headless |= headless;
            crawl(config).await
        }
        Command::Merge {
            input,
            database,
            course_names,
            skip_duplicates,
        } => {
            if let Some(path) = input {
                config.output_csv = path;
            }
            if let Some(path) = database {
                config.database_path = path;
            }
            if let Some(path) = course_names {
                config.course_names_file = path;
            }
            merge(config, MergeOptions {
                skip_duplicate_reviews: skip_duplicates,
            })
            .await
        }
    };

    if let Err(e) = &result {
        error!("❌ 오류 발생: {:#}", e);
    }
    result
}

async fn crawl(config: Config) -> Result<()> {
    let credentials = Credentials::from_env_or_prompt().context("로그인 정보를 읽을 수 없습니다")?;
    let targets = load_targets(&config.targets_file).await?;

    let report = App::initialize(config, credentials, targets)?.run().await?;
    if report.failed() > 0 {
        info!("⚠️ 실패한 대상 {}개는 다음 실행에서 다시 시도하세요", report.failed());
    }
    Ok(())
}

async fn merge(config: Config, options: MergeOptions) -> Result<()> {
    let names = load_course_names(&config.course_names_file).await?;
    let store = ReviewStore::connect(&config.database_path).await?;

    let outcome = store.merge(&config.output_csv, &names, options).await;
    let report = match outcome {
        Ok(report) => report,
        Err(e) if e.is_input_problem() => {
            error!("❌ 병합 중단 (DB 변경 없음): {}", e);
            store.close().await;
            return Ok(());
        }
        Err(e) => {
            store.close().await;
            return Err(e.into());
        }
    };

    let total_courses = store.course_count().await?;
    let total_reviews = store.review_count().await?;
    print_merge_stats(&report, total_courses, total_reviews);

    store.close().await;
    Ok(())
}
