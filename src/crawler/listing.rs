//! Listing crawler
//!
//! Walks the paginated search results for one filter pair and collects the
//! profile links of every result row.

use crate::crawler::fetcher::Fetcher;
use crate::model::FilterPair;
use crate::CrawlError;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table.tf-table tbody tr.clickable-row").expect("valid row selector")
});

static PAGE_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("ul.pagination a.page-link").expect("valid pagination selector"));

/// Links found on one search-results page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// `data-href` of every result row, in page order
    pub links: Vec<String>,

    /// Whether the pagination control offers the following page
    pub has_next: bool,
}

/// Builds the URL of a filtered listing page
///
/// # Example
///
/// ```
/// use tutor_harvest::crawler::listing_url;
/// use url::Url;
///
/// let base = Url::parse("https://www.tutorfinder.com.au").unwrap();
/// let url = listing_url(&base, "melbourne", "physics", 2).unwrap();
/// assert_eq!(url.as_str(), "https://www.tutorfinder.com.au/regions/melbourne/physics/?Page=2");
/// ```
pub fn listing_url(
    base: &Url,
    location: &str,
    subject: &str,
    page: u32,
) -> Result<Url, url::ParseError> {
    base.join(&format!("/regions/{}/{}/?Page={}", location, subject, page))
}

/// Parses a search-results page
///
/// `page` is the number of the page being parsed; the next-page check looks
/// for a pagination link whose text is exactly `page + 1`.
pub fn parse_listing_page(html: &str, page: u32) -> ListingPage {
    let document = Html::parse_document(html);

    let links = document
        .select(&ROW_SELECTOR)
        .filter_map(|row| row.value().attr("data-href"))
        .map(str::to_string)
        .collect();

    let next = (page + 1).to_string();
    let has_next = document
        .select(&PAGE_LINK_SELECTOR)
        .any(|a| a.text().collect::<String>().trim() == next);

    ListingPage { links, has_next }
}

/// Fetches and parses one listing page
pub async fn fetch_listing_page(
    fetcher: &Fetcher,
    base: &Url,
    pair: &FilterPair,
    page: u32,
) -> Result<ListingPage, CrawlError> {
    let url = listing_url(base, &pair.location, &pair.subject, page)?;
    tracing::info!(
        "Scraping search results for {}, {}, page {}: {}",
        pair.location,
        pair.subject,
        page,
        url
    );

    let html = fetcher
        .fetch(url.as_str())
        .await
        .map_err(|source| CrawlError::Fetch {
            url: url.to_string(),
            source,
        })?;

    Ok(parse_listing_page(&html, page))
}

/// Result of crawling all listing pages for a filter pair
#[derive(Debug, Clone, Default)]
pub struct ListingCrawl {
    /// Links collected before pagination stopped
    pub links: Vec<String>,

    /// Listing pages fetched and parsed
    pub pages: u32,

    /// Whether pagination ended on a failed page
    pub failed: bool,
}

/// Collects profile links for a filter pair
///
/// Pagination stops on the first page with no result rows, when the next-page
/// control is missing, after `max_pages` pages if a cap is set, or when a page
/// cannot be fetched. A failure keeps the links gathered so far; retries have
/// already happened inside the fetcher.
pub async fn crawl_listings(
    fetcher: &Fetcher,
    base: &Url,
    pair: &FilterPair,
    max_pages: Option<u32>,
) -> ListingCrawl {
    let mut crawl = ListingCrawl::default();
    let mut page = 1;
    let mut has_next = true;

    while has_next {
        let listing = match fetch_listing_page(fetcher, base, pair, page).await {
            Ok(listing) => listing,
            Err(e) => {
                tracing::error!(
                    "Failed to scrape search results for {}, {}, page {}: {}",
                    pair.location,
                    pair.subject,
                    page,
                    e
                );
                crawl.failed = true;
                break;
            }
        };
        crawl.pages += 1;

        if listing.links.is_empty() {
            tracing::debug!("No results on page {} for {}", page, pair);
            break;
        }

        crawl.links.extend(listing.links);
        has_next = listing.has_next;
        page += 1;

        if let Some(cap) = max_pages {
            if crawl.pages >= cap && has_next {
                tracing::warn!("Stopping {} at page cap {}", pair, cap);
                break;
            }
        }
    }

    crawl
}
