use crate::model::FilterPair;
use serde::Serialize;

/// Value used for optional extracted fields that were not found
pub const NOT_AVAILABLE: &str = "N/A";

/// One tutor's profile, as written to the output file
///
/// Field order matches the output column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TutorRecord {
    #[serde(rename = "Link")]
    pub link: String,

    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Contact Info")]
    pub contact_info: String,

    #[serde(rename = "Experience")]
    pub experience: String,

    #[serde(rename = "Qualifications")]
    pub qualifications: String,

    #[serde(rename = "Rates")]
    pub rates: String,

    #[serde(rename = "Gender")]
    pub gender: String,

    #[serde(rename = "Registered")]
    pub registered: String,

    #[serde(rename = "Location")]
    pub location: String,

    #[serde(rename = "Subject")]
    pub subject: String,

    #[serde(rename = "email_extract")]
    pub email_extract: String,

    #[serde(rename = "mobile_extract")]
    pub mobile_extract: String,
}

impl TutorRecord {
    /// Column headers in output order
    pub const HEADERS: [&'static str; 12] = [
        "Link",
        "Name",
        "Contact Info",
        "Experience",
        "Qualifications",
        "Rates",
        "Gender",
        "Registered",
        "Location",
        "Subject",
        "email_extract",
        "mobile_extract",
    ];

    /// Creates an empty record for a profile link
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            name: String::new(),
            contact_info: String::new(),
            experience: String::new(),
            qualifications: String::new(),
            rates: String::new(),
            gender: String::new(),
            registered: String::new(),
            location: String::new(),
            subject: String::new(),
            email_extract: NOT_AVAILABLE.to_string(),
            mobile_extract: NOT_AVAILABLE.to_string(),
        }
    }

    /// Stamps the filter pair that led to this profile
    pub fn with_filter(mut self, pair: &FilterPair) -> Self {
        self.location = pair.display_location();
        self.subject = pair.display_subject();
        self
    }
}
