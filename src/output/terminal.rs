// Colored terminal output for the `analyze` and `train` commands.

use std::collections::BTreeMap;

use colored::Colorize;

use crate::activity::collect::ActivityReport;
use crate::model::scorer::{Prediction, RiskLevel, TrainingReport};

/// Display account metadata and engagement metrics.
pub fn display_report(report: &ActivityReport) {
    let info = &report.user_info;
    let m = &report.metrics;

    println!("\n{}", format!("=== u/{} ===", info.username).bold());
    println!("  Created:        {}", display_or_dash(&info.created_utc));
    println!(
        "  Karma:          {} link / {} comment",
        info.link_karma, info.comment_karma
    );

    let mut flags = Vec::new();
    if info.verified {
        flags.push("verified");
    }
    if info.has_verified_email {
        flags.push("verified email");
    }
    if info.is_employee {
        flags.push("employee");
    }
    if !flags.is_empty() {
        println!("  Flags:          {}", flags.join(", ").dimmed());
    }

    println!("\n{}", "Engagement".bold());
    println!("  Posts analyzed:           {}", m.post_count_analyzed);
    println!("  Average score:            {:.2}", m.average_score);
    println!("  Average comments:         {:.2}", m.average_comments);
    println!("  Post engagement:          {}", m.post_engagement);
    println!("  Subreddit diversity:      {}", m.subreddit_diversity);
    println!("  Own top-level comments:   {}", m.comment_activity);
    println!("  Replies to others:        {}", m.interactions_with_others);

    display_counts("Repeated subreddits", &m.common_subreddits);
    display_counts("Repeated flairs", &m.common_flairs);
}

/// Display the churn prediction with a colored label.
pub fn display_prediction(prediction: &Prediction) {
    let label = if prediction.prediction == 1 {
        "CHURN RISK".red().bold()
    } else {
        "ACTIVE".green().bold()
    };
    println!("\n{}", "Churn model".bold());
    println!("  Prediction:  {label}");
    let level = match prediction.risk_level {
        RiskLevel::High => prediction.risk_level.as_str().red(),
        RiskLevel::Medium => prediction.risk_level.as_str().yellow(),
        RiskLevel::Low => prediction.risk_level.as_str().green(),
    };
    println!("  Risk score:  {:.2}% ({level} risk)", prediction.risk_score);
    println!(
        "  {}",
        "Placeholder model trained on random data; the score carries no real signal.".dimmed()
    );
}

/// Display the outcome of a synthetic training run.
pub fn display_training(report: &TrainingReport) {
    println!(
        "  Trained on {} samples, held out {}",
        report.train_samples, report.test_samples
    );
    println!(
        "  Held-out accuracy: {:.2} {}",
        report.test_accuracy,
        "(random labels, ~0.5 expected)".dimmed()
    );
}

fn display_counts(title: &str, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }
    println!("\n{}", title.bold());
    for (name, count) in counts {
        println!("  {:<28} {}", name, count);
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
