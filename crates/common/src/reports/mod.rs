//! Dashboard report computation
//!
//! Pure aggregation over a loaded lead sequence: headline metrics, the
//! category demand breakdown for the pie chart, and per-company volume
//! series for the bar chart. All functions are deterministic; the
//! top-category tie-break is first among ties by ascending category name.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::leads::{Lead, MaterialCategory};

/// Headline metrics shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadSummary {
    pub total_leads: usize,
    pub top_category: MaterialCategory,
    /// `Date` of the most recently appended record
    pub latest_inquiry: String,
}

/// One pie slice: leads counted per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: MaterialCategory,
    pub count: usize,
}

/// One bar-chart series: the per-lead volumes for a single category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeSeries {
    pub category: MaterialCategory,
    pub companies: Vec<String>,
    pub quantities: Vec<f64>,
}

/// Compute the headline metrics. `None` when the store is empty.
pub fn summarize(leads: &[Lead]) -> Option<LeadSummary> {
    let last = leads.last()?;
    let top_category = category_breakdown(leads).first()?.category;
    Some(LeadSummary {
        total_leads: leads.len(),
        top_category,
        latest_inquiry: last.date.clone(),
    })
}

/// Count leads per category, most frequent first.
///
/// Counting runs over a BTreeMap keyed by category name, so equal counts
/// come out in ascending name order and the first entry is the mode with a
/// deterministic tie-break.
pub fn category_breakdown(leads: &[Lead]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&'static str, (MaterialCategory, usize)> = BTreeMap::new();
    for lead in leads {
        counts
            .entry(lead.material_category.as_str())
            .or_insert((lead.material_category, 0))
            .1 += 1;
    }

    let mut breakdown: Vec<CategoryCount> = counts
        .into_values()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    // Stable sort keeps the ascending-name order among equal counts.
    breakdown.sort_by(|a, b| b.count.cmp(&a.count));
    breakdown
}

/// Group per-lead volumes into one series per category, for a bar chart of
/// quantity per company colored by category. Categories keep form order;
/// categories with no leads are omitted.
pub fn volume_by_company(leads: &[Lead]) -> Vec<VolumeSeries> {
    MaterialCategory::ALL
        .iter()
        .filter_map(|&category| {
            let mut companies = Vec::new();
            let mut quantities = Vec::new();
            for lead in leads.iter().filter(|l| l.material_category == category) {
                companies.push(lead.company_name.clone());
                quantities.push(lead.quantity_kg);
            }
            if companies.is_empty() {
                None
            } else {
                Some(VolumeSeries {
                    category,
                    companies,
                    quantities,
                })
            }
        })
        .collect()
}
