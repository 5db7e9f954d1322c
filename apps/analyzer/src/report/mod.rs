//! Report Renderer — formats one `ResumeAnalysis` as a static HTML page.
//!
//! Pure formatting: no validation, no escaping beyond what the template
//! needs. Empty lists render as empty `<ul>` blocks. The only failure mode
//! of [`write_report`] is a file-system write error.

use std::path::Path;

use chrono::Local;

use crate::models::analysis::{ResumeAnalysis, WorkExperience};

const SCORE_RED: &str = "#e74c3c";
const SCORE_ORANGE: &str = "#f39c12";
const SCORE_GREEN: &str = "#27ae60";

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Resume Analysis Report - {name}</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; }
        .section { margin-bottom: 30px; }
        .section-title { color: #2c3e50; border-bottom: 2px solid #3498db; padding-bottom: 10px; }
        .info-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 20px; }
        .card { background: #f8f9fa; padding: 20px; border-radius: 8px; }
        .match-score { font-size: 24px; font-weight: bold; color: {score_color}; }
        .strength { color: #27ae60; }
    </style>
</head>
<body>
    <h1>Resume Analysis Report</h1>

    <div class="section">
        <h2 class="section-title">Candidate</h2>
        <div class="info-grid">
            <div class="card">
                <h3>Contact</h3>
                <p><strong>Name:</strong> {name}</p>
                <p><strong>Email:</strong> {email}</p>
                <p><strong>Phone:</strong> {phone}</p>
                <p><strong>Location:</strong> {location}</p>
            </div>
            <div class="card">
                <h3>Match Score</h3>
                <p class="match-score">{match_score}/100</p>
                <p><strong>Analyzed:</strong> {analyzed_at}</p>
                <p><strong>Estimated experience:</strong> {estimated_yoe} years</p>
            </div>
        </div>
    </div>

    <div class="section">
        <h2 class="section-title">Summary</h2>
        <p>{summary}</p>
    </div>

    <div class="section">
        <h2 class="section-title">Work Experience</h2>
        {work_experience}
    </div>

    <div class="section">
        <h2 class="section-title">Assessment</h2>
        <div class="info-grid">
            <div class="card">
                <h3>Strengths</h3>
                <ul>{strengths}</ul>
            </div>
            <div class="card">
                <h3>Recommendations</h3>
                <ul>{recommendations}</ul>
            </div>
        </div>
    </div>
</body>
</html>"#;

/// Badge color for a match score: red below 50, orange in [50, 70),
/// green from 70 up.
pub fn score_color(score: i32) -> &'static str {
    if score >= 70 {
        SCORE_GREEN
    } else if score >= 50 {
        SCORE_ORANGE
    } else {
        SCORE_RED
    }
}

pub fn render_html(analysis: &ResumeAnalysis) -> String {
    REPORT_TEMPLATE
        .replace("{score_color}", score_color(analysis.analysis.match_score))
        .replace("{name}", &analysis.personal_info.name)
        .replace("{email}", &analysis.personal_info.email)
        .replace("{phone}", &analysis.personal_info.phone)
        .replace("{location}", &analysis.personal_info.location)
        .replace("{match_score}", &analysis.analysis.match_score.to_string())
        .replace(
            "{analyzed_at}",
            &Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        )
        .replace(
            "{estimated_yoe}",
            &analysis.metadata.estimated_yoe.to_string(),
        )
        .replace("{summary}", &analysis.summary)
        .replace(
            "{work_experience}",
            &work_experience_cards(&analysis.work_experience),
        )
        .replace(
            "{strengths}",
            &list_items(&analysis.analysis.strengths, Some("strength")),
        )
        .replace(
            "{recommendations}",
            &list_items(&analysis.analysis.recommendations, None),
        )
}

/// Writes the rendered report to `path`.
pub fn write_report(path: &Path, analysis: &ResumeAnalysis) -> std::io::Result<()> {
    std::fs::write(path, render_html(analysis))
}

fn work_experience_cards(entries: &[WorkExperience]) -> String {
    entries
        .iter()
        .map(|exp| {
            format!(
                r#"
        <div class="card">
            <h3>{} - {}</h3>
            <p><strong>Position:</strong> {}</p>
            <p><strong>Duration:</strong> {}</p>
            <p><strong>Achievements:</strong> {}</p>
        </div>"#,
                exp.company,
                exp.position,
                exp.position,
                exp.duration,
                exp.achievements.join("; "),
            )
        })
        .collect()
}

fn list_items(items: &[String], class: Option<&str>) -> String {
    items
        .iter()
        .map(|item| match class {
            Some(class) => format!("<li class=\"{class}\">{item}</li>"),
            None => format!("<li>{item}</li>"),
        })
        .collect()
}
