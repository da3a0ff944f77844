//! Reference extraction from asset content.
//!
//! Scans content for calls to catalog functions and yields the first argument
//! of each call. Only arguments written as a quoted literal on a single line
//! are recognized; a call built from variables (`Lookup(@de, ...)`) or one
//! whose opening quote is never closed is skipped.
//!
//! # Usage
//!
//! ```rust
//! use bldr_cli::references::{ReferenceCatalog, extract};
//!
//! # fn example() -> anyhow::Result<()> {
//! let catalog = ReferenceCatalog::global()?;
//! let lookup = catalog.get("Lookup").unwrap();
//!
//! let content = r#"%%=Lookup("Subscribers", "Name", "Id", @id)=%%"#;
//! let matches: Vec<_> = extract(lookup, content).collect();
//!
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].literal, r#""Subscribers""#);
//! assert_eq!(matches[0].value(), "Subscribers");
//! # Ok(())
//! # }
//! ```

use super::catalog::{ReferenceCatalog, ReferenceFunction};

/// One occurrence of a reference call in content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch<'c> {
    /// The function that matched
    pub function: &'c ReferenceFunction,
    /// The argument literal including its surrounding quotes
    pub literal: String,
    /// Byte offset of the literal's opening quote
    pub offset: usize,
}

impl RawMatch<'_> {
    /// The argument with its quotes stripped.
    #[must_use]
    pub fn value(&self) -> &str {
        // Both quote characters are single-byte ASCII
        &self.literal[1..self.literal.len() - 1]
    }

    /// Byte offset just past the closing quote.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.literal.len()
    }
}

/// Every occurrence of `function` in `content`, in content order.
///
/// The iterator borrows `content`; collect it before mutating the content.
pub fn extract<'c, 'a>(
    function: &'c ReferenceFunction,
    content: &'a str,
) -> impl Iterator<Item = RawMatch<'c>> + 'a
where
    'c: 'a,
{
    function.pattern.captures_iter(content).filter_map(move |captures| {
        let literal = captures.name("literal")?;
        Some(RawMatch {
            function,
            literal: literal.as_str().to_string(),
            offset: literal.start(),
        })
    })
}

/// Occurrences of every catalog function, grouped in catalog order.
#[must_use]
pub fn extract_all<'c>(catalog: &'c ReferenceCatalog, content: &str) -> Vec<RawMatch<'c>> {
    catalog
        .iter()
        .flat_map(|function| extract(function, content).collect::<Vec<_>>())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(name: &str) -> &'static ReferenceFunction {
        ReferenceCatalog::global().unwrap().get(name).unwrap()
    }

    #[test]
    fn test_no_references() {
        let content = "<p>Hello %%FirstName%%</p>";
        let catalog = ReferenceCatalog::global().unwrap();
        assert!(extract_all(catalog, content).is_empty());
    }

    #[test]
    fn test_both_quote_styles() {
        let content = r#"%%=ContentBlockByName("Folder\Header")=%% and ContentBlockByName('Folder\Footer')"#;
        let matches: Vec<_> = extract(function("ContentBlockByName"), content).collect();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].value(), r"Folder\Header");
        assert_eq!(matches[1].literal, r"'Folder\Footer'");
        assert_eq!(&content[matches[1].offset..matches[1].end()], r"'Folder\Footer'");
    }

    #[test]
    fn test_only_first_argument_is_captured() {
        let content = r#"Lookup("DE_Name","Field","Value")"#;
        let matches: Vec<_> = extract(function("Lookup"), content).collect();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].value(), "DE_Name");
    }

    #[test]
    fn test_prefix_names_do_not_overlap() {
        let content = r#"LookupRows("Orders","Id",1) LookupRowsCS("Carts","Id",1)"#;

        assert_eq!(extract(function("Lookup"), content).count(), 0);
        let rows: Vec<_> = extract(function("LookupRows"), content).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value(), "Orders");
    }

    #[test]
    fn test_unterminated_literal_is_skipped() {
        let content = "ContentBlockByID(\"123\n)";
        assert_eq!(extract(function("ContentBlockByID"), content).count(), 0);
    }

    #[test]
    fn test_variable_argument_is_skipped() {
        let content = "%%=Lookup(@deName, 'Field', 'Id', 1)=%%";
        assert_eq!(extract(function("Lookup"), content).count(), 0);
    }

    #[test]
    fn test_whitespace_after_paren() {
        let content = "Platform.Function.ContentBlockByKey( 'hdr-key' )";
        let matches: Vec<_> = extract(function("ContentBlockByKey"), content).collect();
        assert_eq!(matches[0].value(), "hdr-key");
    }

    #[test]
    fn test_catalog_order_then_content_order() {
        let content = r#"UpsertDE("B") ContentBlockByID("2") Lookup("A") ContentBlockById("1")"#;
        let catalog = ReferenceCatalog::global().unwrap();
        let values: Vec<_> = extract_all(catalog, content)
            .iter()
            .map(|m| (m.function.name, m.value().to_string()))
            .collect();

        assert_eq!(
            values,
            vec![
                ("ContentBlockById", "1".to_string()),
                ("ContentBlockByID", "2".to_string()),
                ("Lookup", "A".to_string()),
                ("UpsertDE", "B".to_string()),
            ]
        );
    }

    #[test]
    fn test_extraction_is_restartable() {
        let content = r#"ClaimRow("Coupons", "IsClaimed")"#;
        let first: Vec<_> = extract(function("ClaimRow"), content).collect();
        let second: Vec<_> = extract(function("ClaimRow"), content).collect();
        assert_eq!(first, second);
    }
}
