//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes logging
//! - parses CLI arguments
//! - dispatches to the collection/forecast pipeline or the interactive menu

use std::path::Path;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{CollectArgs, Command, MenuArgs, PredictArgs, QueryArgs, StatsArgs};
use crate::config;
use crate::data::{ChatClient, MockService, QueryService};
use crate::domain::SchoolCategory;
use crate::error::AppError;
use crate::io::store;
use crate::{forecast, report, stats};

pub mod pipeline;

/// Entry point for the `zk` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    // We want a bare `zk` (and `zk --mock`) to behave like `zk menu ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while keeping the guided menu as the default experience.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Score(args) => handle_score(args),
        Command::Rate(args) => handle_rate(args),
        Command::Collect(args) => handle_collect(args),
        Command::Predict(args) => handle_predict(args),
        Command::Stats(args) => handle_stats(args),
        Command::Menu(args) => handle_menu(args),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,zk_schools=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn make_service(mock: bool) -> Result<Box<dyn QueryService>, AppError> {
    if mock {
        Ok(Box::new(MockService::default()))
    } else {
        Ok(Box::new(ChatClient::from_env()?))
    }
}

fn handle_score(args: QueryArgs) -> Result<(), AppError> {
    let service = make_service(args.mock)?;
    let record = pipeline::fetch_score(service.as_ref(), &args.school, args.year);
    print!("{}", report::format_score_record(&record));
    Ok(())
}

fn handle_rate(args: QueryArgs) -> Result<(), AppError> {
    let service = make_service(args.mock)?;
    let record = pipeline::fetch_rate(service.as_ref(), &args.school, args.year);
    print!("{}", report::format_rate_record(&record));
    Ok(())
}

fn handle_collect(args: CollectArgs) -> Result<(), AppError> {
    let service = make_service(args.mock)?;
    let schools = resolve_schools(args.category);

    let (n_scores, n_rates) =
        pipeline::collect_and_store(service.as_ref(), &schools, &config::DATA_YEARS)?;

    println!("数据收集完成，共收集了 {n_scores} 条录取分数数据和 {n_rates} 条升学率数据");
    println!("已保存至 {} / {}", config::SCORE_DATA_FILE, config::RATE_DATA_FILE);
    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let records = store::load_scores(Path::new(config::SCORE_DATA_FILE))?;
    let target_year = args.year.unwrap_or_else(config::default_prediction_year);

    if let Some(school) = &args.school {
        let prediction = forecast::predict_scores(&records, school, target_year);
        print!("{}", report::format_prediction(&prediction));
        return Ok(());
    }

    if records.is_empty() {
        return Err(AppError::new(
            3,
            "No stored score data to forecast from. Run `zk collect` first.",
        ));
    }

    let schools = resolve_schools(args.category);
    let predictions = forecast::batch_predict(&records, &schools, target_year);

    for prediction in &predictions {
        print!("{}", report::format_prediction(prediction));
        println!();
    }

    let path = Path::new(config::PREDICTION_FILE);
    store::save_predictions(path, &predictions)?;
    println!("预测结果已保存至 {}", path.display());
    Ok(())
}

fn handle_stats(args: StatsArgs) -> Result<(), AppError> {
    let scores = store::load_scores(Path::new(config::SCORE_DATA_FILE))?;
    let rates = store::load_rates(Path::new(config::RATE_DATA_FILE))?;

    let by_school = stats::category_scores(&scores, args.category, args.year);
    let per_school: Vec<(&str, f64)> = config::schools_in(args.category)
        .iter()
        .filter_map(|name| by_school.get(name).map(|r| (*name, r.avg_score)))
        .collect();
    let score_refs: Vec<_> = by_school.values().copied().collect();
    let summary = stats::score_statistics(&score_refs);
    print!(
        "{}",
        report::format_score_summary(args.category, args.year, &per_school, &summary)
    );

    println!();

    let by_school = stats::category_rates(&rates, args.category, args.year);
    let per_school: Vec<(&str, f64, f64, f64)> = config::schools_in(args.category)
        .iter()
        .filter_map(|name| {
            by_school
                .get(name)
                .map(|r| (*name, r.c9_rate, r.rate_985, r.rate_211))
        })
        .collect();
    let rate_refs: Vec<_> = by_school.values().copied().collect();
    let rate_stats = stats::rate_statistics(&rate_refs);
    print!(
        "{}",
        report::format_rate_summary(args.category, args.year, &per_school, &rate_stats)
    );

    Ok(())
}

fn handle_menu(args: MenuArgs) -> Result<(), AppError> {
    let service = make_service(args.mock)?;
    crate::cli::menu::run(service.as_ref())
}

/// Schools to operate on: one category's list, or every configured school.
///
/// A school listed under two categories is visited once.
fn resolve_schools(category: Option<SchoolCategory>) -> Vec<&'static str> {
    let categories: Vec<SchoolCategory> = match category {
        Some(c) => vec![c],
        None => SchoolCategory::ALL.to_vec(),
    };

    let mut out = Vec::new();
    for category in categories {
        for &school in config::schools_in(category) {
            if !out.contains(&school) {
                out.push(school);
            }
        }
    }
    out
}

/// Rewrite argv so `zk` defaults to `zk menu`.
///
/// Rules:
/// - `zk`                      -> `zk menu`
/// - `zk --mock`               -> `zk menu --mock`
/// - `zk --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("menu".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "score" | "rate" | "collect" | "predict" | "stats" | "menu"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "menu flags".
    if arg1.starts_with('-') {
        argv.insert(1, "menu".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
