use crate::infra::default_scoring_config;
use ba7ath::error::AppError;
use ba7ath::registry::{load_dataset, RegistryError, Wilaya};
use ba7ath::scoring::{RankedRiskProfile, RiskEngine};
use chrono::Local;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct RiskReportArgs {
    /// Registry JSON export to score
    #[arg(long)]
    pub(crate) data: PathBuf,
    /// Print the full profile for one wilaya after the board
    #[arg(long)]
    pub(crate) wilaya: Option<String>,
    /// Number of board rows to print
    #[arg(long, default_value_t = 10)]
    pub(crate) top: usize,
}

pub(crate) fn run_risk_report(args: RiskReportArgs) -> Result<(), AppError> {
    let RiskReportArgs { data, wilaya, top } = args;

    let focus = match wilaya {
        Some(name) => Some(
            Wilaya::parse(&name).ok_or(AppError::Registry(RegistryError::UnknownWilaya(name)))?,
        ),
        None => None,
    };

    let outcome = load_dataset(&data)?;
    let engine = RiskEngine::new(default_scoring_config())?;
    let board = engine.ranked_board(&outcome.companies)?;

    println!("BA7ATH risk board");
    println!(
        "Dataset: {} ({} companies, {} rows skipped), scored {}",
        data.display(),
        outcome.companies.len(),
        outcome.skipped,
        Local::now().date_naive()
    );

    println!("\nRanked wilayas (top {top})");
    for entry in board.iter().take(top) {
        println!(
            "{:>3}. {} — {:.1} ({}){}",
            entry.rank,
            entry.profile.wilaya,
            entry.profile.baath_index,
            entry.profile.level_ar,
            if entry.profile.flags.is_empty() {
                String::new()
            } else {
                format!(" — {} flag(s)", entry.profile.flags.len())
            }
        );
    }

    if let Some(focus) = focus {
        let entry = board
            .iter()
            .find(|entry| entry.profile.wilaya == focus)
            .expect("board covers every wilaya");
        render_profile(entry);
    }

    Ok(())
}

fn render_profile(entry: &RankedRiskProfile) {
    let profile = &entry.profile;

    println!("\n{} (rank {})", profile.wilaya, entry.rank);
    println!(
        "Index {:.1} — {} | s1 {:.2}, s2 {:.2}, s3 {:.2}",
        profile.baath_index,
        profile.level_ar,
        profile.resource_dependency,
        profile.sector_concentration,
        profile.governance_imbalance
    );

    if profile.flags.is_empty() {
        println!("Flags: none");
    } else {
        println!("Flags");
        for flag in &profile.flags {
            println!("- [{:?}] {}", flag.severity, flag.label_ar);
        }
    }

    println!("Commentary: {}", profile.comment_ar);

    if profile.recommendations.is_empty() {
        println!("Recommendations: none");
    } else {
        println!("Recommendations");
        for recommendation in &profile.recommendations {
            println!("- {recommendation}");
        }
    }
}
