//! Buyer intake handlers
//!
//! The public side of the portal: render the request-for-quote form and
//! capture submissions into the lead store. Validation is presence-only;
//! the category comes from a select over the closed set.

use askama::Template;
use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use validator::Validate;

use crate::AppState;
use rawmat_common::{
    errors::{AppError, Result},
    leads::{Lead, MaterialCategory},
    metrics,
};

/// Buyer portal page, with the previously entered values when a submission
/// bounced.
#[derive(Template)]
#[template(path = "buyer_portal.html")]
struct BuyerPortalTemplate {
    categories: &'static [MaterialCategory],
    error: Option<String>,
    company_name: String,
    contact_info: String,
    quantity_kg: String,
    selected_category: String,
}

impl BuyerPortalTemplate {
    fn blank() -> Self {
        Self {
            categories: &MaterialCategory::ALL,
            error: None,
            company_name: String::new(),
            contact_info: String::new(),
            quantity_kg: String::new(),
            selected_category: String::new(),
        }
    }

    fn bounced(form: &IntakeForm, message: &str) -> Self {
        Self {
            categories: &MaterialCategory::ALL,
            error: Some(message.to_string()),
            company_name: form.company_name.clone(),
            contact_info: form.contact_info.clone(),
            quantity_kg: form.quantity_kg.clone(),
            selected_category: form.material_category.clone(),
        }
    }
}

/// Acknowledgment page after a successful submission
#[derive(Template)]
#[template(path = "submitted.html")]
struct SubmittedTemplate {
    company_name: String,
}

/// Intake form fields as posted by the browser
#[derive(Debug, Default, Deserialize, Validate)]
pub struct IntakeForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Company name is required"))]
    pub company_name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Contact info is required"))]
    pub contact_info: String,

    #[serde(default)]
    pub material_category: String,

    #[serde(default)]
    pub quantity_kg: String,
}

/// Trim the required text fields so whitespace-only input fails the
/// presence checks.
fn normalized(mut form: IntakeForm) -> IntakeForm {
    form.company_name = form.company_name.trim().to_string();
    form.contact_info = form.contact_info.trim().to_string();
    form
}

/// Parse the quantity input: empty means zero, anything else must be a
/// finite non-negative number.
fn parse_quantity(raw: &str) -> std::result::Result<f64, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(format!("'{raw}' is not a non-negative number")),
    }
}

/// `GET /` - Buyer Portal (Public)
pub async fn buyer_portal() -> Result<Response> {
    render(BuyerPortalTemplate::blank())
}

/// `POST /leads` - capture one procurement request
pub async fn submit_lead(
    State(state): State<AppState>,
    Form(form): Form<IntakeForm>,
) -> Result<Response> {
    let form = normalized(form);

    // Presence checks; nothing is written when they fail.
    if let Err(errors) = form.validate() {
        for field in errors.field_errors().keys() {
            metrics::record_intake_rejection(field.as_ref());
        }
        tracing::info!(
            missing = ?errors.field_errors().keys().collect::<Vec<_>>(),
            "Intake submission rejected"
        );
        return render(BuyerPortalTemplate::bounced(
            &form,
            "Please fill in your company name and contact info.",
        ));
    }

    let quantity_kg = match parse_quantity(&form.quantity_kg) {
        Ok(value) => value,
        Err(message) => {
            metrics::record_intake_rejection("quantity_kg");
            return render(BuyerPortalTemplate::bounced(&form, &message));
        }
    };

    // The form's select only offers the closed set; a mismatch here means a
    // hand-crafted request.
    let material_category: MaterialCategory = match form.material_category.parse() {
        Ok(category) => category,
        Err(_) => {
            metrics::record_intake_rejection("material_category");
            return render(BuyerPortalTemplate::bounced(
                &form,
                "Please choose a material category.",
            ));
        }
    };

    let lead = Lead::new(
        form.company_name,
        material_category,
        quantity_kg,
        form.contact_info,
    );
    let company_name = lead.company_name.clone();

    state.store.append(lead).await?;

    metrics::record_lead_submitted(material_category.as_str());
    tracing::info!(
        company = %company_name,
        category = %material_category,
        quantity_kg,
        "Lead captured"
    );

    render(SubmittedTemplate { company_name })
}

fn render<T: Template>(template: T) -> Result<Response> {
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("template render failed: {e}"),
    })?;
    Ok(Html(html).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(company: &str, contact: &str) -> IntakeForm {
        IntakeForm {
            company_name: company.to_string(),
            contact_info: contact.to_string(),
            material_category: "Industrial Metals".to_string(),
            quantity_kg: "500".to_string(),
        }
    }

    #[test]
    fn test_presence_checks() {
        assert!(normalized(form("Acme", "a@x.com")).validate().is_ok());
        assert!(normalized(form("", "a@x.com")).validate().is_err());
        assert!(normalized(form("Acme", "")).validate().is_err());
        assert!(normalized(form("   ", "a@x.com")).validate().is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("500"), Ok(500.0));
        assert_eq!(parse_quantity("0"), Ok(0.0));
        assert_eq!(parse_quantity(""), Ok(0.0));
        assert_eq!(parse_quantity(" 12.5 "), Ok(12.5));
        assert!(parse_quantity("-1").is_err());
        assert!(parse_quantity("lots").is_err());
        assert!(parse_quantity("NaN").is_err());
    }

    #[test]
    fn test_bounced_form_keeps_entries() {
        let form = form("", "a@x.com");
        let template = BuyerPortalTemplate::bounced(&form, "missing company");
        assert_eq!(template.contact_info, "a@x.com");
        assert_eq!(template.selected_category, "Industrial Metals");
        assert_eq!(template.error.as_deref(), Some("missing company"));
    }

    #[test]
    fn test_submitted_template_names_company() {
        let html = SubmittedTemplate {
            company_name: "Acme".to_string(),
        }
        .render()
        .unwrap();
        assert!(html.contains("Acme"));
    }
}
