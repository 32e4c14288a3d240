//! Positional lookups over a parsed fight page.
//!
//! Fight pages carry a fixed set of four tables; everything here addresses
//! them by index and fails with a structure error when the document does not
//! match that shape.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::error::ParseError;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("static selector"));
static TBODY: Lazy<Selector> = Lazy::new(|| Selector::parse("tbody").expect("static selector"));
static TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("static selector"));
static TH: Lazy<Selector> = Lazy::new(|| Selector::parse("th").expect("static selector"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("static selector"));

pub fn table_count(doc: &Html) -> usize {
    doc.select(&TABLE).count()
}

fn nth_table(doc: &Html, table_num: usize) -> Result<ElementRef<'_>, ParseError> {
    doc.select(&TABLE).nth(table_num).ok_or_else(|| {
        ParseError::structure(format!(
            "expected at least {} tables, got {}",
            table_num + 1,
            table_count(doc)
        ))
    })
}

/// Returns the `<tbody>` rows of the Nth `<table>` on the page.
pub fn table_rows(doc: &Html, table_num: usize) -> Result<Vec<ElementRef<'_>>, ParseError> {
    let table = nth_table(doc, table_num)?;
    let body = table
        .select(&TBODY)
        .next()
        .ok_or_else(|| ParseError::structure(format!("table {table_num} has no body")))?;
    Ok(body.select(&TR).collect())
}

/// Returns the trimmed `<th>` texts of the Nth `<table>`.
pub fn header_cells(doc: &Html, table_num: usize) -> Result<Vec<String>, ParseError> {
    let table = nth_table(doc, table_num)?;
    Ok(table.select(&TH).map(|th| element_text(th)).collect())
}

/// Resolves the single event link on the page. Fight pages link back to
/// exactly one event; anything else is ambiguous.
pub fn event_uid(doc: &Html) -> Result<String, ParseError> {
    let hrefs: Vec<&str> = doc
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains("event-details"))
        .collect();
    let [href] = hrefs.as_slice() else {
        return Err(ParseError::structure(format!(
            "expected exactly one event link, got {}",
            hrefs.len()
        )));
    };
    Ok(uid_from_href(href))
}

/// Anchor hrefs within an element, document order.
pub fn anchor_hrefs<'a>(el: ElementRef<'a>) -> Vec<&'a str> {
    el.select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .collect()
}

/// Identifiers are the last path segment of detail-page urls.
pub fn uid_from_href(href: &str) -> String {
    href.rsplit('/').next().unwrap_or(href).to_string()
}

/// Full element text with runs of whitespace collapsed to single spaces.
pub fn element_text(el: ElementRef<'_>) -> String {
    collapse_ws(&el.text().collect::<String>())
}

pub fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenated text of the whole document, for banner scanning.
pub fn page_text(doc: &Html) -> String {
    doc.root_element().text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_comes_from_last_path_segment() {
        assert_eq!(
            uid_from_href("http://example.com/fight-details/6a060498e60756af"),
            "6a060498e60756af"
        );
        assert_eq!(uid_from_href("bare"), "bare");
    }

    #[test]
    fn table_rows_requires_the_table_and_a_body() {
        let doc = Html::parse_document("<html><body><table><tbody><tr></tr></tbody></table><table></table></body></html>");
        assert_eq!(table_rows(&doc, 0).unwrap().len(), 1);
        assert!(table_rows(&doc, 1).is_err());
        assert!(table_rows(&doc, 2).is_err());
    }

    #[test]
    fn event_uid_requires_exactly_one_link() {
        let doc = Html::parse_document(
            r#"<a href="http://x/event-details/abc">e</a><a href="http://x/fighter-details/f">f</a>"#,
        );
        assert_eq!(event_uid(&doc).unwrap(), "abc");

        let doc = Html::parse_document(
            r#"<a href="/event-details/a">1</a><a href="/event-details/b">2</a>"#,
        );
        assert!(event_uid(&doc).is_err());
    }
}
