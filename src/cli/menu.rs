//! Interactive console menu.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the menu provides the "run `zk` and pick from a list" UX
//!
//! The menus walk category -> school -> year and feed the same pipeline the
//! subcommands use. `q` (or reaching end-of-input) backs out of any picker.

use std::io::{self, Write};
use std::path::Path;

use crate::app::pipeline;
use crate::config;
use crate::data::QueryService;
use crate::domain::{SchoolCategory, SchoolRoster};
use crate::error::AppError;
use crate::forecast;
use crate::io::store;
use crate::report;

/// Run the interactive menu until the user exits.
pub fn run(service: &dyn QueryService) -> Result<(), AppError> {
    let roster = SchoolRoster::from_config();

    println!("{}", "=".repeat(60));
    println!("欢迎使用上海高中数据收集系统");
    println!("{}", "=".repeat(60));

    loop {
        println!("\n请选择功能：");
        println!("1. 录取分数查询");
        println!("2. 升学率查询");
        println!("3. 录取分数预测");
        println!("4. 批量数据收集");
        println!("0. 退出系统");

        let Some(choice) = prompt_line("\n请输入选项编号: ")? else {
            break;
        };

        match choice.as_str() {
            "1" => query_score(service, &roster)?,
            "2" => query_rate(service, &roster)?,
            "3" => predict_scores(&roster)?,
            "4" => batch_collect(service, &roster)?,
            "0" => break,
            _ => println!("\n无效的选择，请重新选择"),
        }
    }

    println!("\n感谢使用，再见！");
    Ok(())
}

fn query_score(service: &dyn QueryService, roster: &SchoolRoster) -> Result<(), AppError> {
    println!("\n===== 录取分数查询 =====");
    let Some((school, year)) = pick_school_and_year(roster)? else {
        return Ok(());
    };

    println!("\n正在查询 {year}年 {school} 的录取分数...");
    let record = pipeline::fetch_score(service, &school, year);

    println!("\n查询结果：");
    print!("{}", report::format_score_record(&record));
    Ok(())
}

fn query_rate(service: &dyn QueryService, roster: &SchoolRoster) -> Result<(), AppError> {
    println!("\n===== 升学率查询 =====");
    let Some((school, year)) = pick_school_and_year(roster)? else {
        return Ok(());
    };

    println!("\n正在查询 {year}年 {school} 的升学率...");
    let record = pipeline::fetch_rate(service, &school, year);

    println!("\n查询结果：");
    print!("{}", report::format_rate_record(&record));
    Ok(())
}

fn predict_scores(roster: &SchoolRoster) -> Result<(), AppError> {
    println!("\n===== 录取分数预测 =====");
    let Some(category) = pick_category()? else {
        return Ok(());
    };
    let Some(school) = pick_school(roster, category)? else {
        return Ok(());
    };

    let target_year = config::default_prediction_year();
    println!("\n正在预测 {school} {target_year}年的录取分数...");

    let records = store::load_scores(Path::new(config::SCORE_DATA_FILE))?;
    let prediction = forecast::predict_scores(&records, &school, target_year);

    println!("\n预测结果：");
    print!("{}", report::format_prediction(&prediction));
    Ok(())
}

fn batch_collect(service: &dyn QueryService, roster: &SchoolRoster) -> Result<(), AppError> {
    println!("\n===== 批量数据收集 =====");
    let Some(category) = pick_category()? else {
        return Ok(());
    };

    println!("\n正在为 {} 批量收集数据...", category.label());
    let names: Vec<String> = roster
        .by_category(category)
        .iter()
        .map(|s| s.name.clone())
        .collect();
    let schools: Vec<&str> = names.iter().map(String::as_str).collect();
    let (n_scores, n_rates) = pipeline::collect_and_store(service, &schools, &config::DATA_YEARS)?;

    println!("\n数据收集完成，共收集了 {n_scores} 条录取分数数据和 {n_rates} 条升学率数据");
    Ok(())
}

fn pick_school_and_year(roster: &SchoolRoster) -> Result<Option<(String, i32)>, AppError> {
    let Some(category) = pick_category()? else {
        return Ok(None);
    };
    let Some(school) = pick_school(roster, category)? else {
        return Ok(None);
    };
    let Some(year) = pick_year()? else {
        return Ok(None);
    };
    Ok(Some((school, year)))
}

fn pick_category() -> Result<Option<SchoolCategory>, AppError> {
    let labels: Vec<String> = SchoolCategory::ALL
        .iter()
        .map(|c| c.label().to_string())
        .collect();
    Ok(pick_index("请选择学校分类：", &labels)?.map(|idx| SchoolCategory::ALL[idx]))
}

fn pick_school(
    roster: &SchoolRoster,
    category: SchoolCategory,
) -> Result<Option<String>, AppError> {
    let schools = roster.by_category(category);
    let names: Vec<String> = schools.iter().map(|s| s.name.clone()).collect();
    let title = format!("{}包含的学校：", category.label());
    Ok(pick_index(&title, &names)?.map(|idx| names[idx].clone()))
}

fn pick_year() -> Result<Option<i32>, AppError> {
    let labels: Vec<String> = config::DATA_YEARS.iter().map(|y| format!("{y}年")).collect();
    Ok(pick_index("请选择年份：", &labels)?.map(|idx| config::DATA_YEARS[idx]))
}

/// Show a numbered list and read a 1-based selection.
///
/// Returns `None` when the user cancels (`q`) or input ends; otherwise the
/// 0-based index. Invalid input re-prompts.
fn pick_index(title: &str, items: &[String]) -> Result<Option<usize>, AppError> {
    println!("\n{title}");
    for (idx, item) in items.iter().enumerate() {
        println!("{:>3}. {item}", idx + 1);
    }

    loop {
        let Some(input) = prompt_line(&format!("\n请输入编号 (1-{}，q 返回): ", items.len()))?
        else {
            return Ok(None);
        };

        if input.eq_ignore_ascii_case("q") {
            return Ok(None);
        }

        if let Ok(choice) = input.parse::<usize>() {
            if (1..=items.len()).contains(&choice) {
                return Ok(Some(choice - 1));
            }
        }

        println!("无效的选择，请重新输入");
    }
}

/// Print a prompt and read one trimmed line; `None` on end-of-input.
fn prompt_line(prompt: &str) -> Result<Option<String>, AppError> {
    print!("{prompt}");
    io::stdout()
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

    let mut input = String::new();
    let bytes = io::stdin()
        .read_line(&mut input)
        .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}
