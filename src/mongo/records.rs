use mongodb::bson::{Bson, Document, doc};
use mongodb::sync::Database;

use crate::mongo::bson_format::cell_text;

pub const USERS_COLLECTION: &str = "users";
const PRICE_SUFFIX: &str = "원";

pub type Row = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Users,
    Markets,
    Products,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Users, RecordKind::Markets, RecordKind::Products];

    pub const fn title(self) -> &'static str {
        match self {
            RecordKind::Users => "Users",
            RecordKind::Markets => "Markets",
            RecordKind::Products => "Products",
        }
    }

    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            RecordKind::Users => &["Email", "Name", "Membership", "Credits"],
            RecordKind::Markets => {
                &["Market Name", "Grade", "Customer Count", "Male Ratio", "Female Ratio", "URL"]
            }
            RecordKind::Products => {
                &["Title", "Price", "Market", "Collection Date", "Reviews", "Purchases"]
            }
        }
    }

    /// Converts one query result into a row for this tab.
    pub fn to_row(self, document: &Document) -> Row {
        match self {
            RecordKind::Users => user_row(document),
            RecordKind::Markets => market_row(document),
            RecordKind::Products => product_row(document),
        }
    }
}

/// Rows materialized by one loader, plus the error that stopped it, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedRows {
    pub rows: Vec<Row>,
    pub error: Option<String>,
}

pub fn markets_pipeline() -> Vec<Document> {
    vec![
        doc! { "$unwind": "$collected_markets" },
        doc! { "$project": { "market": "$collected_markets" } },
    ]
}

pub fn products_pipeline() -> Vec<Document> {
    vec![
        doc! { "$unwind": "$collected_products" },
        doc! { "$project": { "product": "$collected_products" } },
    ]
}

/// Query results as they come off a cursor, with driver errors already mapped.
pub type RecordCursor<'a> = Box<dyn Iterator<Item = Result<Document, String>> + 'a>;

/// Where the tab loaders read their documents from.
pub trait RecordSource {
    fn records(&self, kind: RecordKind) -> Result<RecordCursor<'_>, String>;
}

impl RecordSource for Database {
    fn records(&self, kind: RecordKind) -> Result<RecordCursor<'_>, String> {
        let collection = self.collection::<Document>(USERS_COLLECTION);
        let cursor = match kind {
            RecordKind::Users => collection.find(doc! {}).run(),
            RecordKind::Markets => collection.aggregate(markets_pipeline()).run(),
            RecordKind::Products => collection.aggregate(products_pipeline()).run(),
        }
        .map_err(|err| err.to_string())?;

        Ok(Box::new(cursor.map(|result| result.map_err(|err| err.to_string()))))
    }
}

/// Runs the query behind one tab. Errors are logged and returned alongside
/// whatever rows were read before the failure.
pub fn load<S: RecordSource + ?Sized>(source: &S, kind: RecordKind) -> LoadedRows {
    let loaded = match source.records(kind) {
        Ok(cursor) => collect_rows(kind, cursor),
        Err(error) => LoadedRows { rows: Vec::new(), error: Some(error) },
    };

    match &loaded.error {
        Some(error) => log::error!(
            "Failed to load {} ({} rows read): {error}",
            kind.title(),
            loaded.rows.len()
        ),
        None => log::info!("Loaded {} {} rows", loaded.rows.len(), kind.title()),
    }

    loaded
}

pub fn collect_rows<I>(kind: RecordKind, results: I) -> LoadedRows
where
    I: IntoIterator<Item = Result<Document, String>>,
{
    let mut loaded = LoadedRows::default();
    for result in results {
        match result {
            Ok(document) => loaded.rows.push(kind.to_row(&document)),
            Err(error) => {
                loaded.error = Some(error);
                break;
            }
        }
    }
    loaded
}

fn user_row(document: &Document) -> Row {
    let empty = Document::new();
    let info = document.get_document("user_info").unwrap_or(&empty);
    vec![
        text_field(info, "email"),
        text_field(info, "name"),
        text_field(info, "membershipLevel"),
        count_field(info, "remainingCredits"),
    ]
}

fn market_row(document: &Document) -> Row {
    let empty = Document::new();
    let market = document.get_document("market").unwrap_or(&empty);
    let ratio = market.get_document("genderRatio").unwrap_or(&empty);
    vec![
        text_field(market, "mallName"),
        text_field(market, "mallGrade"),
        count_field(market, "customerCount"),
        format!("{}%", count_field(ratio, "male")),
        format!("{}%", count_field(ratio, "female")),
        text_field(market, "mallUrl"),
    ]
}

fn product_row(document: &Document) -> Row {
    let empty = Document::new();
    let product = document.get_document("product").unwrap_or(&empty);
    vec![
        text_field(product, "title"),
        format_price(product.get("price")),
        text_field(product, "mall_name"),
        date_part(product.get("collection_date")),
        count_field(product, "review_count"),
        count_field(product, "purchase_count"),
    ]
}

fn text_field(document: &Document, key: &str) -> String {
    document.get(key).map(cell_text).unwrap_or_default()
}

fn count_field(document: &Document, key: &str) -> String {
    match document.get(key) {
        None | Some(Bson::Null) => String::from("0"),
        Some(value) => cell_text(value),
    }
}

/// Price with thousands separators and the won suffix, e.g. `12,345원`.
pub fn format_price(value: Option<&Bson>) -> String {
    let grouped = match value {
        None | Some(Bson::Null) => String::from("0"),
        Some(Bson::Int32(price)) => group_number(&price.to_string()),
        Some(Bson::Int64(price)) => group_number(&price.to_string()),
        Some(Bson::Double(price)) if price.is_finite() => group_number(&format!("{price}")),
        Some(Bson::Decimal128(price)) => group_number(&price.to_string()),
        Some(Bson::String(text)) => {
            let digits: String = text.chars().filter(char::is_ascii_digit).collect();
            group_number(&digits)
        }
        Some(other) => cell_text(other),
    };
    format!("{grouped}{PRICE_SUFFIX}")
}

/// Inserts commas into the integer part of a plain decimal number.
fn group_number(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    if integer.is_empty() || !integer.chars().all(|ch| ch.is_ascii_digit()) {
        return if text.is_empty() { String::from("0") } else { text.to_string() };
    }

    let integer = integer.trim_start_matches('0');
    let integer = if integer.is_empty() { "0" } else { integer };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Date portion of an ISO datetime: everything before the first `T`.
pub fn date_part(value: Option<&Bson>) -> String {
    let text = value.map(cell_text).unwrap_or_default();
    text.split('T').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_match_row_arity() {
        let empty = Document::new();
        for kind in RecordKind::ALL {
            assert_eq!(kind.to_row(&empty).len(), kind.columns().len(), "{kind:?}");
        }
    }

    #[test]
    fn user_row_reads_nested_user_info() {
        let document = doc! {
            "user_info": {
                "email": "kim@example.com",
                "name": "Kim",
                "membershipLevel": "premium",
                "remainingCredits": 120
            }
        };
        assert_eq!(user_row(&document), vec!["kim@example.com", "Kim", "premium", "120"]);
    }

    #[test]
    fn missing_credits_default_to_zero() {
        let document = doc! { "user_info": { "email": "a@b.c" } };
        assert_eq!(user_row(&document), vec!["a@b.c", "", "", "0"]);
        assert_eq!(user_row(&doc! {}), vec!["", "", "", "0"]);
    }

    #[test]
    fn market_row_formats_ratios() {
        let document = doc! {
            "market": {
                "mallName": "Sunny Mall",
                "mallGrade": "Power",
                "customerCount": 1520,
                "genderRatio": { "male": 35, "female": 65 },
                "mallUrl": "https://smartstore.example.com/sunny"
            }
        };
        assert_eq!(
            market_row(&document),
            vec![
                "Sunny Mall",
                "Power",
                "1520",
                "35%",
                "65%",
                "https://smartstore.example.com/sunny"
            ]
        );
    }

    #[test]
    fn market_row_defaults() {
        let document = doc! { "market": { "mallName": "Bare" } };
        assert_eq!(market_row(&document), vec!["Bare", "", "0", "0%", "0%", ""]);
    }

    #[test]
    fn product_row_formats_price_and_date() {
        let document = doc! {
            "product": {
                "title": "Wool Scarf",
                "price": 12345,
                "mall_name": "Sunny Mall",
                "collection_date": "2024-05-01T10:00:00",
                "review_count": 12
            }
        };
        assert_eq!(
            product_row(&document),
            vec!["Wool Scarf", "12,345원", "Sunny Mall", "2024-05-01", "12", "0"]
        );
    }

    #[test]
    fn price_formatting() {
        assert_eq!(format_price(Some(&Bson::Int32(12345))), "12,345원");
        assert_eq!(format_price(Some(&Bson::Int64(1_234_567))), "1,234,567원");
        assert_eq!(format_price(Some(&Bson::Int32(999))), "999원");
        assert_eq!(format_price(Some(&Bson::Int32(-4500))), "-4,500원");
        assert_eq!(format_price(Some(&Bson::Double(12345.0))), "12,345원");
        assert_eq!(format_price(Some(&Bson::Double(1234.5))), "1,234.5원");
        assert_eq!(format_price(None), "0원");
    }

    #[test]
    fn string_price_keeps_digits_only() {
        assert_eq!(format_price(Some(&Bson::String("12,900원".into()))), "12,900원");
        assert_eq!(format_price(Some(&Bson::String("₩ 3000".into()))), "3,000원");
        assert_eq!(format_price(Some(&Bson::String("free".into()))), "0원");
    }

    #[test]
    fn date_truncation() {
        assert_eq!(date_part(Some(&Bson::String("2024-05-01T10:00:00".into()))), "2024-05-01");
        assert_eq!(date_part(Some(&Bson::String("2024-05-01".into()))), "2024-05-01");
        assert_eq!(date_part(None), "");
        let datetime = Bson::DateTime(mongodb::bson::DateTime::from_millis(1_714_557_600_000));
        assert_eq!(date_part(Some(&datetime)), "2024-05-01");
    }

    #[test]
    fn pipelines_unwind_into_single_field() {
        let markets = markets_pipeline();
        assert_eq!(markets[0], doc! { "$unwind": "$collected_markets" });
        assert_eq!(markets[1], doc! { "$project": { "market": "$collected_markets" } });

        let products = products_pipeline();
        assert_eq!(products[0], doc! { "$unwind": "$collected_products" });
        assert_eq!(products[1], doc! { "$project": { "product": "$collected_products" } });
    }

    #[test]
    fn rows_keep_result_order() {
        let results = vec![
            Ok(doc! { "user_info": { "email": "b@x.com" } }),
            Ok(doc! { "user_info": { "email": "a@x.com" } }),
            Ok(doc! { "user_info": { "email": "b@x.com" } }),
        ];
        let loaded = collect_rows(RecordKind::Users, results);
        let emails: Vec<_> = loaded.rows.iter().map(|row| row[0].as_str()).collect();
        assert_eq!(emails, vec!["b@x.com", "a@x.com", "b@x.com"]);
        assert_eq!(loaded.error, None);
    }

    #[test]
    fn cursor_error_keeps_rows_read_so_far() {
        let results = vec![
            Ok(doc! { "product": { "title": "First" } }),
            Err(String::from("cursor killed")),
            Ok(doc! { "product": { "title": "Never" } }),
        ];
        let loaded = collect_rows(RecordKind::Products, results);
        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(loaded.rows[0][0], "First");
        assert_eq!(loaded.error.as_deref(), Some("cursor killed"));
    }
}
