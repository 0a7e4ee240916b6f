//! Batch summary over many dossiers

use canon_domain::{Dossier, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Verdict distribution and score statistics for a batch of documents
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DossierSummary {
    /// Number of documents
    pub documents: usize,

    /// Documents per verdict
    pub verdicts: BTreeMap<Verdict, usize>,

    /// Mean document score
    pub mean_score: f64,

    /// Lowest document score
    pub min_score: f64,

    /// Highest document score
    pub max_score: f64,

    /// Median document score
    pub median_score: f64,

    /// Claims across all documents
    pub total_claims: usize,

    /// Citations across all documents
    pub total_citations: usize,

    /// Claims carrying at least one flag
    pub flagged_claims: usize,
}

impl DossierSummary {
    /// Summarize a batch; an empty batch gives an all-zero summary
    pub fn from_dossiers(dossiers: &[Dossier]) -> Self {
        if dossiers.is_empty() {
            return Self::default();
        }

        let mut verdicts = BTreeMap::new();
        for dossier in dossiers {
            *verdicts.entry(dossier.verdict()).or_insert(0) += 1;
        }

        let mut scores: Vec<f64> = dossiers.iter().map(|d| d.score()).collect();
        scores.sort_by(f64::total_cmp);
        let n = scores.len();
        let median_score = if n % 2 == 1 {
            scores[n / 2]
        } else {
            (scores[n / 2 - 1] + scores[n / 2]) / 2.0
        };

        let claims = dossiers.iter().flat_map(|d| d.claims());
        Self {
            documents: n,
            verdicts,
            mean_score: scores.iter().sum::<f64>() / n as f64,
            min_score: scores[0],
            max_score: scores[n - 1],
            median_score,
            total_claims: dossiers.iter().map(|d| d.claims().len()).sum(),
            total_citations: dossiers.iter().map(|d| d.total_evidence()).sum(),
            flagged_claims: claims.filter(|c| !c.flags.is_empty()).count(),
        }
    }

    /// Documents with the given verdict
    pub fn count(&self, verdict: Verdict) -> usize {
        self.verdicts.get(&verdict).copied().unwrap_or(0)
    }

    /// Average citations per claim (0.0 without claims)
    pub fn avg_citations_per_claim(&self) -> f64 {
        if self.total_claims == 0 {
            0.0
        } else {
            self.total_citations as f64 / self.total_claims as f64
        }
    }

    /// Pretty JSON rendering
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Generate a human-readable report
    pub fn report(&self) -> String {
        let mut lines = vec![
            "Verification Summary".to_string(),
            "====================".to_string(),
            format!("Documents: {}", self.documents),
            String::new(),
            "Verdicts:".to_string(),
        ];
        for verdict in [Verdict::Supported, Verdict::Contradicted, Verdict::Unverifiable] {
            lines.push(format!("  {}: {}", verdict, self.count(verdict)));
        }
        lines.push(String::new());
        lines.push(format!(
            "Score: mean {:.3}, median {:.3}, min {:.3}, max {:.3}",
            self.mean_score, self.median_score, self.min_score, self.max_score
        ));
        lines.push(format!(
            "Claims: {} ({} flagged), {:.2} citations per claim",
            self.total_claims,
            self.flagged_claims,
            self.avg_citations_per_claim()
        ));
        lines.join("\n")
    }
}
