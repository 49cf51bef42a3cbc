//! HTML rendering of form-submission notification emails.
//!
//! Every value taken from the submitted form is HTML-escaped before it is
//! interpolated. Missing, null or empty values fall back to a per-field
//! placeholder.

use std::fmt::Write as _;

use webmarket_core::form_submission::{FormData, FormType};
use webmarket_core::types::Timestamp;

const NOT_AVAILABLE: &str = "N/A";

const ACCENT: &str = "#2563eb";

/// Subject line and HTML body of one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Render the notification for a submitted form.
pub fn render_form_notification(
    form_type: FormType,
    data: &FormData,
    submitted_at: Timestamp,
) -> RenderedEmail {
    match form_type {
        FormType::Contact => render_contact(data, submitted_at),
        FormType::StartProject => render_start_project(data, submitted_at),
    }
}

fn render_contact(data: &FormData, submitted_at: Timestamp) -> RenderedEmail {
    let subject = format!(
        "New Contact Form Submission - {}",
        text(data, "serviceType").unwrap_or_else(|| "General Inquiry".into())
    );

    let mut html = open_document("New Contact Form Submission");
    push_table(
        &mut html,
        "Contact Information",
        &[
            ("Name", field(data, "name", NOT_AVAILABLE)),
            ("Email", field(data, "email", NOT_AVAILABLE)),
            ("Phone", field(data, "phone", NOT_AVAILABLE)),
            ("Service Type", field(data, "serviceType", NOT_AVAILABLE)),
            ("Budget", field(data, "budget", "Not specified")),
        ],
    );
    push_block(
        &mut html,
        "Project Details",
        &field(data, "message", "No message provided"),
    );
    close_document(&mut html, "contact form", submitted_at);

    RenderedEmail { subject, html }
}

fn render_start_project(data: &FormData, submitted_at: Timestamp) -> RenderedEmail {
    let subject = format!(
        "New Project Request - {}",
        text(data, "businessName").unwrap_or_else(|| NOT_AVAILABLE.into())
    );

    let mut html = open_document("New Project Request");
    push_table(
        &mut html,
        "Business Information",
        &[
            ("Business Name", field(data, "businessName", NOT_AVAILABLE)),
            ("Business Type", field(data, "businessType", NOT_AVAILABLE)),
            ("Project Type", field(data, "projectType", NOT_AVAILABLE)),
        ],
    );
    push_table(
        &mut html,
        "Project Requirements",
        &[
            ("Budget", field(data, "budget", NOT_AVAILABLE)),
            ("Timeline", field(data, "timeline", NOT_AVAILABLE)),
        ],
    );

    let features = features(data);
    if !features.is_empty() {
        let items: String = features
            .iter()
            .map(|f| format!("<li>{}</li>", escape_html(f)))
            .collect();
        let _ = write!(
            html,
            "<div style=\"margin: 20px 0;\"><h3 style=\"color: #333;\">Required Features</h3>\
             <div style=\"padding: 15px; background: #f9fafb; border-left: 4px solid {ACCENT};\">\
             <ul style=\"margin: 0; padding-left: 20px;\">{items}</ul></div></div>"
        );
    }

    if let Some(description) = text(data, "description") {
        push_block(&mut html, "Additional Details", &escape_html(&description));
    }

    close_document(&mut html, "Start Project form", submitted_at);

    RenderedEmail { subject, html }
}

// ---------------------------------------------------------------------------
// Field access
// ---------------------------------------------------------------------------

/// Non-empty textual form of a field. Numbers and booleans are stringified.
fn text(data: &FormData, key: &str) -> Option<String> {
    match data.get(key)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Escaped field value or the escaped placeholder.
fn field(data: &FormData, key: &str, default: &str) -> String {
    escape_html(&text(data, key).unwrap_or_else(|| default.to_string()))
}

fn features(data: &FormData) -> Vec<String> {
    match data.get("features") {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

fn open_document(title: &str) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2 style=\"color: {ACCENT}; border-bottom: 3px solid {ACCENT}; padding-bottom: 10px;\">{title}</h2>"
    )
}

/// Rows are `(label, already-escaped value)`.
fn push_table(html: &mut String, heading: &str, rows: &[(&str, String)]) {
    let _ = write!(
        html,
        "<div style=\"margin: 20px 0;\"><h3 style=\"color: #333; margin-bottom: 15px;\">{heading}</h3>\
         <table style=\"width: 100%; border-collapse: collapse;\">"
    );
    for (label, value) in rows {
        let _ = write!(
            html,
            "<tr><td style=\"padding: 8px; background: #f3f4f6; font-weight: bold; width: 150px;\">{label}:</td>\
             <td style=\"padding: 8px; background: #fff;\">{value}</td></tr>"
        );
    }
    html.push_str("</table></div>");
}

/// `content` must already be escaped.
fn push_block(html: &mut String, heading: &str, content: &str) {
    let _ = write!(
        html,
        "<div style=\"margin: 20px 0;\"><h3 style=\"color: #333; margin-bottom: 10px;\">{heading}</h3>\
         <div style=\"padding: 15px; background: #f9fafb; border-left: 4px solid {ACCENT};\">{content}</div></div>"
    );
}

fn close_document(html: &mut String, source: &str, submitted_at: Timestamp) {
    let _ = write!(
        html,
        "<div style=\"margin-top: 30px; padding-top: 20px; border-top: 1px solid #e5e7eb; color: #6b7280; font-size: 12px;\">\
         <p>This email was sent from the WebMarket {source}.</p>\
         <p>Submitted on: {}</p></div></div>",
        submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}
