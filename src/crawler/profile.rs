//! Profile extractor
//!
//! Turns one tutor profile page into a [`TutorRecord`]. Labeled sections are
//! found by their `<h3>` heading and read by walking the document forward from
//! that heading until the next heading or the submit container.

use crate::crawler::fetcher::Fetcher;
use crate::model::{TutorRecord, NOT_AVAILABLE};
use crate::ExtractionError;
use ego_tree::{NodeId, NodeRef};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

static NAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".tf-profile-header h1").expect("valid name selector"));

static PROFILE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".tf-profile").expect("valid profile selector"));

static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3").expect("valid heading selector"));

static SECTION_END_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h3, div.tf-submit-container").expect("valid section end selector")
});

static NON_TEXT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script, style").expect("valid non-text selector"));

static CONTACT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.c_link").expect("valid contact selector"));

static UPDATED_NOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(updated profile on \d{2}-\w{3}-\d{4}\)").expect("valid regex pattern")
});

/// Australian landline (optional area code) or mobile number
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(?:\(0[2-8]\)|0[2-8])?\s?\d{4}\s?\d{4}|04\d{2}\s?\d{3}\s?\d{3})")
        .expect("valid regex pattern")
});

/// Resolves a listing link against the site base URL
pub fn resolve_link(base: &Url, link: &str) -> Result<Url, ExtractionError> {
    base.join(link.trim())
        .map_err(|source| ExtractionError::InvalidLink {
            link: link.to_string(),
            source,
        })
}

/// Fetches and extracts a profile, logging and dropping any failure
pub async fn scrape_profile(fetcher: &Fetcher, base: &Url, link: &str) -> Option<TutorRecord> {
    match try_scrape_profile(fetcher, base, link).await {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::error!("Failed to scrape tutor profile {}: {}", link, e);
            None
        }
    }
}

/// Fetches and extracts a profile
pub async fn try_scrape_profile(
    fetcher: &Fetcher,
    base: &Url,
    link: &str,
) -> Result<TutorRecord, ExtractionError> {
    let url = resolve_link(base, link)?;
    tracing::info!("Scraping tutor profile: {}", url);

    let html = fetcher.fetch(url.as_str()).await?;
    extract_profile(&html, url.as_str())
}

/// Extracts a record from profile HTML
///
/// `location` and `subject` are left empty; they come from the filter pair
/// that discovered the profile.
///
/// # Returns
///
/// * `Ok(TutorRecord)` - Extracted record; absent sections are empty strings
/// * `Err(ExtractionError::MissingProfile)` - The page has no profile section
pub fn extract_profile(html: &str, link: &str) -> Result<TutorRecord, ExtractionError> {
    let document = Html::parse_document(html);
    let mut record = TutorRecord::new(link);

    record.name = extract_name(&document);

    let profile = document
        .select(&PROFILE_SELECTOR)
        .next()
        .ok_or_else(|| ExtractionError::MissingProfile(link.to_string()))?;

    record.experience = section_text(profile, "Experience");
    record.qualifications = section_text(profile, "Qualifications");
    record.rates = section_text(profile, "Rates");
    record.gender = section_text(profile, "Gender");
    record.registered = clean_registered(&section_text(profile, "Registered"));

    let contacts = contact_lines(&document);
    record.contact_info = contacts.join("\n");
    record.email_extract = find_email(&contacts)
        .unwrap_or(NOT_AVAILABLE)
        .to_string();
    record.mobile_extract = find_phone(&contacts).unwrap_or_else(|| NOT_AVAILABLE.to_string());

    Ok(record)
}

/// Full text of the first profile heading, trimmed
///
/// The nested location tag stays part of the name.
fn extract_name(document: &Html) -> String {
    document
        .select(&NAME_SELECTOR)
        .next()
        .map(|heading| heading.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Cleaned text between the `label` heading and the end of its section
///
/// Returns an empty string when the profile has no such heading.
pub fn section_text(profile: ElementRef<'_>, label: &str) -> String {
    let heading = profile.select(&HEADING_SELECTOR).find(|h| {
        h.text()
            .collect::<String>()
            .trim()
            .eq_ignore_ascii_case(label)
    });
    let Some(heading) = heading else {
        return String::new();
    };

    let root = profile.id();
    let mut raw = String::new();
    let mut cursor = next_outside(*heading, root);

    while let Some(node) = cursor {
        if let Some(element) = ElementRef::wrap(node) {
            if SECTION_END_SELECTOR.matches(&element) {
                break;
            }
            if !NON_TEXT_SELECTOR.matches(&element) {
                if let Some(child) = node.first_child() {
                    cursor = Some(child);
                    continue;
                }
            }
        } else if let Some(text) = node.value().as_text() {
            raw.push_str(text);
        }
        cursor = next_outside(node, root);
    }

    clean_text(&raw)
}

/// Next node in document order that is not inside `node`, stopping at `root`
fn next_outside(node: NodeRef<'_, Node>, root: NodeId) -> Option<NodeRef<'_, Node>> {
    let mut current = node;
    loop {
        if current.id() == root {
            return None;
        }
        if let Some(sibling) = current.next_sibling() {
            return Some(sibling);
        }
        current = current.parent()?;
    }
}

/// Trims every line and drops blank ones
pub fn clean_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Removes the "(updated profile on DD-Mon-YYYY)" note and a trailing ')'
pub fn clean_registered(raw: &str) -> String {
    let without_note = UPDATED_NOTE.replace(raw, "");
    let trimmed = without_note.trim();
    trimmed.strip_suffix(')').unwrap_or(trimmed).trim().to_string()
}

/// Trimmed text of every contact link on the page
fn contact_lines(document: &Html) -> Vec<String> {
    document
        .select(&CONTACT_SELECTOR)
        .map(|span| span.text().collect::<String>().trim().to_string())
        .collect()
}

/// First contact line that looks like an email address
pub fn find_email(contacts: &[String]) -> Option<&str> {
    contacts
        .iter()
        .find(|line| line.contains('@'))
        .map(String::as_str)
}

/// First contact line holding a phone number, with whitespace removed
pub fn find_phone(contacts: &[String]) -> Option<String> {
    contacts
        .iter()
        .find(|line| PHONE_PATTERN.is_match(line))
        .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect())
}
