use crate::config::FilterConfig;
use std::fmt;

/// One (location, subject) combination driving a crawl-and-extract phase
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterPair {
    pub location: String,
    pub subject: String,
}

impl FilterPair {
    pub fn new(location: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            subject: subject.into(),
        }
    }

    /// Location as written into output records ("melbourne" -> "Melbourne")
    pub fn display_location(&self) -> String {
        capitalize_first(&self.location)
    }

    /// Subject as written into output records ("english-language" -> "English-language")
    pub fn display_subject(&self) -> String {
        capitalize_first(&self.subject)
    }
}

impl fmt::Display for FilterPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.location, self.subject)
    }
}

/// Expands the filter lists into pairs, location-major and subject-minor
pub fn filter_pairs(filters: &FilterConfig) -> Vec<FilterPair> {
    filters
        .locations
        .iter()
        .flat_map(|location| {
            filters
                .subjects
                .iter()
                .map(move |subject| FilterPair::new(location.clone(), subject.clone()))
        })
        .collect()
}

/// Uppercases the first character and leaves the rest untouched
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
