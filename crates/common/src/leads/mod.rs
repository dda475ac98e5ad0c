//! Lead entity
//!
//! One record per submitted procurement request. Field names serialize to
//! the persisted CSV column headers.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DATE_FORMAT;

/// Fixed set of material categories offered on the buyer portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialCategory {
    #[serde(rename = "Specialty Chemicals")]
    SpecialtyChemicals,
    #[serde(rename = "Industrial Metals")]
    IndustrialMetals,
    #[serde(rename = "Polymers")]
    Polymers,
    #[serde(rename = "Agro-Commodities")]
    AgroCommodities,
    #[serde(rename = "Other")]
    Other,
}

impl MaterialCategory {
    /// All categories, in the order they appear on the intake form.
    pub const ALL: [MaterialCategory; 5] = [
        MaterialCategory::SpecialtyChemicals,
        MaterialCategory::IndustrialMetals,
        MaterialCategory::Polymers,
        MaterialCategory::AgroCommodities,
        MaterialCategory::Other,
    ];

    /// Display/CSV spelling of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialCategory::SpecialtyChemicals => "Specialty Chemicals",
            MaterialCategory::IndustrialMetals => "Industrial Metals",
            MaterialCategory::Polymers => "Polymers",
            MaterialCategory::AgroCommodities => "Agro-Commodities",
            MaterialCategory::Other => "Other",
        }
    }
}

impl fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MaterialCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaterialCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("unknown material category: {s}"))
    }
}

/// Lead follow-up status.
///
/// Only `New` is ever written by this service; the other variants exist so
/// hand-curated store files still round-trip. No transition logic is defined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Closed,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted procurement request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// Local submission time, `YYYY-MM-DD HH:MM`
    #[serde(rename = "Date")]
    pub date: String,

    #[serde(rename = "Company_Name")]
    pub company_name: String,

    #[serde(rename = "Material_Category")]
    pub material_category: MaterialCategory,

    /// Estimated monthly requirement in kilograms; never negative
    #[serde(rename = "Quantity_Kg")]
    pub quantity_kg: f64,

    #[serde(rename = "Contact_Info")]
    pub contact_info: String,

    #[serde(rename = "Status")]
    pub status: LeadStatus,
}

impl Lead {
    /// Build a new lead stamped with the current local time and `New` status.
    pub fn new(
        company_name: impl Into<String>,
        material_category: MaterialCategory,
        quantity_kg: f64,
        contact_info: impl Into<String>,
    ) -> Self {
        Self {
            date: Local::now().format(DATE_FORMAT).to_string(),
            company_name: company_name.into(),
            material_category,
            quantity_kg,
            contact_info: contact_info.into(),
            status: LeadStatus::New,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_spellings() {
        assert_eq!(
            MaterialCategory::SpecialtyChemicals.as_str(),
            "Specialty Chemicals"
        );
        assert_eq!(MaterialCategory::AgroCommodities.as_str(), "Agro-Commodities");
        assert_eq!(MaterialCategory::ALL.len(), 5);
    }

    #[test]
    fn test_category_serde_matches_display() {
        for category in MaterialCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category));
            let back: MaterialCategory = serde_json::from_str(&json).unwrap();
            assert_eq!(back, category);
        }
    }

    #[test]
    fn test_category_parses_from_display_name() {
        for category in MaterialCategory::ALL {
            assert_eq!(category.as_str().parse::<MaterialCategory>(), Ok(category));
        }
        assert!("Unobtainium".parse::<MaterialCategory>().is_err());
    }

    #[test]
    fn test_status_defaults_to_new() {
        assert_eq!(LeadStatus::default(), LeadStatus::New);
        assert_eq!(serde_json::to_string(&LeadStatus::New).unwrap(), "\"New\"");
    }

    #[test]
    fn test_new_lead_is_stamped() {
        let lead = Lead::new("Acme", MaterialCategory::IndustrialMetals, 500.0, "a@x.com");
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.company_name, "Acme");
        // YYYY-MM-DD HH:MM
        assert_eq!(lead.date.len(), 16);
        assert_eq!(&lead.date[4..5], "-");
        assert_eq!(&lead.date[13..14], ":");
    }
}
