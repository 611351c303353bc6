use scraper::{ElementRef, Html};

use super::PriceListError;
use crate::domain::product::ProductRecord;

const NAME_KEYWORDS: &[&str] = &["name", "item"];
const PRICE_KEYWORDS: &[&str] = &["sale price", "price"];
const UNIT_KEYWORDS: &[&str] = &["unit"];
const EXPIRY_KEYWORDS: &[&str] = &["exp"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ColumnMap {
    name: Option<usize>,
    price: Option<usize>,
    unit: Option<usize>,
    expiry: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Self {
        Self {
            name: find_column(headers, NAME_KEYWORDS),
            price: find_column(headers, PRICE_KEYWORDS),
            unit: find_column(headers, UNIT_KEYWORDS),
            expiry: find_column(headers, EXPIRY_KEYWORDS),
        }
    }
}

/// Parses the first `<table>` of the page into product records.
///
/// The first row is the header; columns are located by keyword so small
/// layout changes on the vendor side keep working. A column that cannot be
/// located leaves that field blank. Rows without a name are skipped.
pub fn parse_price_table(html: &str) -> Result<Vec<ProductRecord>, PriceListError> {
    let document = Html::parse_document(html);
    let table = elements_named(document.root_element(), &["table"])
        .next()
        .ok_or(PriceListError::MissingTable)?;

    let mut rows = elements_named(table, &["tr"]);
    let header_row = rows.next().ok_or(PriceListError::MissingRows)?;
    let headers: Vec<String> = elements_named(header_row, &["th", "td"])
        .map(|cell| cell_text(cell).to_lowercase())
        .collect();
    let columns = ColumnMap::from_headers(&headers);

    let mut records = Vec::new();
    for row in rows {
        let cells: Vec<String> = elements_named(row, &["td"]).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }

        let field = |index: Option<usize>| {
            index.and_then(|index| cells.get(index)).cloned().unwrap_or_default()
        };
        let name = field(columns.name);
        if name.is_empty() {
            continue;
        }

        records.push(ProductRecord {
            name,
            price: field(columns.price),
            unit: field(columns.unit),
            expiry: field(columns.expiry),
        });
    }

    Ok(records)
}

fn find_column(headers: &[String], keywords: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|header| keywords.iter().any(|keyword| header.contains(keyword)))
}

fn elements_named<'a>(
    root: ElementRef<'a>,
    names: &'a [&'a str],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |element| names.contains(&element.value().name()))
}

/// Trimmed text fragments concatenated with no separator, so `Euro<b> 10mg</b>`
/// reads `Euro10mg`.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).filter(|fragment| !fragment.is_empty()).collect()
}
