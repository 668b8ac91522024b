use url::Url;

use crate::{
    applications::{
        dto::{CreateApplicationRequest, UpdateApplicationRequest},
        repo_types::{ApplicationPatch, ApplicationStatus, NewApplication},
    },
    error::{AppError, AppResult},
};

const MAX_SHORT_TEXT: usize = 200;
const MAX_URL: usize = 2048;
const MAX_NOTES: usize = 5000;

fn required(value: Option<String>, message: &str) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::validation(message)),
    }
}

fn max_len(value: Option<&str>, max: usize, field: &str) -> AppResult<()> {
    match value {
        Some(v) if v.chars().count() > max => {
            Err(AppError::validation(format!("{field} is too long")))
        }
        _ => Ok(()),
    }
}

fn parse_status(value: Option<String>) -> AppResult<Option<ApplicationStatus>> {
    value
        .map(|s| s.parse().map_err(|_| AppError::validation("Invalid status")))
        .transpose()
}

/// Empty string means "no value".
fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Blank after trimming means "no value"; anything else must be an
/// absolute http(s) URL.
fn normalize_url(value: Option<String>) -> AppResult<Option<String>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match Url::parse(trimmed) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.has_host() => {
            Ok(Some(trimmed.to_string()))
        }
        _ => Err(AppError::validation("Invalid URL")),
    }
}

pub fn validate_create(req: CreateApplicationRequest) -> AppResult<NewApplication> {
    let company = required(req.company, "Company is required")?;
    max_len(Some(&company), MAX_SHORT_TEXT, "Company")?;
    let role_title = required(req.role_title, "Role title is required")?;
    max_len(Some(&role_title), MAX_SHORT_TEXT, "Role title")?;
    max_len(req.location.as_deref(), MAX_SHORT_TEXT, "Location")?;
    let status = parse_status(req.status)?.unwrap_or_default();
    max_len(req.url.as_deref(), MAX_URL, "URL")?;
    let url = normalize_url(req.url)?;
    max_len(req.salary_range.as_deref(), MAX_SHORT_TEXT, "Salary range")?;
    max_len(req.notes.as_deref(), MAX_NOTES, "Notes")?;

    Ok(NewApplication {
        company,
        role_title,
        location: blank_to_none(req.location),
        status,
        url,
        salary_range: blank_to_none(req.salary_range),
        notes: blank_to_none(req.notes),
    })
}

pub fn validate_update(req: UpdateApplicationRequest) -> AppResult<ApplicationPatch> {
    let company = req
        .company
        .map(|c| required(Some(c), "Company is required"))
        .transpose()?;
    max_len(company.as_deref(), MAX_SHORT_TEXT, "Company")?;
    let role_title = req
        .role_title
        .map(|r| required(Some(r), "Role title is required"))
        .transpose()?;
    max_len(role_title.as_deref(), MAX_SHORT_TEXT, "Role title")?;
    max_len(req.location.as_ref().and_then(|l| l.as_deref()), MAX_SHORT_TEXT, "Location")?;
    let status = parse_status(req.status)?;
    max_len(req.url.as_ref().and_then(|u| u.as_deref()), MAX_URL, "URL")?;
    let url = req.url.map(normalize_url).transpose()?;
    max_len(
        req.salary_range.as_ref().and_then(|s| s.as_deref()),
        MAX_SHORT_TEXT,
        "Salary range",
    )?;
    max_len(req.notes.as_ref().and_then(|n| n.as_deref()), MAX_NOTES, "Notes")?;

    Ok(ApplicationPatch {
        company,
        role_title,
        status,
        location: req.location.map(blank_to_none),
        url,
        salary_range: req.salary_range.map(blank_to_none),
        notes: req.notes.map(blank_to_none),
    })
}
