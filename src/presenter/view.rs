use std::fmt;

use crate::domain::ScanResult;

use super::ranking::rank_contributions;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Empty,
    Error(String),
    Verdict(VerdictView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerdictView {
    pub url: String,
    pub rule_score: String,
    pub label: &'static str,
    pub ml_proba: Option<String>,
    pub contributions: Vec<ContributionLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContributionLine {
    pub feature: String,
    pub weight: String,
}

pub fn present(result: Option<&ScanResult>, top: usize) -> View {
    let verdict = match result {
        None => return View::Empty,
        Some(ScanResult::Failure(failure)) => return View::Error(failure.error.clone()),
        Some(ScanResult::Success(verdict)) => verdict,
    };

    let contributions = rank_contributions(&verdict.explain.contributions, top)
        .into_iter()
        .map(|c| ContributionLine {
            feature: c.feature.to_string(),
            weight: fixed3(c.weight),
        })
        .collect();

    View::Verdict(VerdictView {
        url: verdict.url.clone(),
        rule_score: fixed3(verdict.rule_score),
        label: verdict.label(),
        ml_proba: verdict.ml_proba.map(|p| p.to_string()),
        contributions,
    })
}

fn fixed3(value: f64) -> String {
    format!("{value:.3}")
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Empty => Ok(()),
            View::Error(message) => writeln!(f, "{message}"),
            View::Verdict(verdict) => fmt::Display::fmt(verdict, f),
        }
    }
}

impl fmt::Display for VerdictView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "URL: {}", self.url)?;
        writeln!(f, "Rule score: {} ({})", self.rule_score, self.label)?;
        if let Some(proba) = &self.ml_proba {
            writeln!(f, "ML prob: {proba}")?;
        }
        writeln!(f, "Top contributions")?;
        for line in &self.contributions {
            writeln!(f, "  {}: {}", line.feature, line.weight)?;
        }
        Ok(())
    }
}
