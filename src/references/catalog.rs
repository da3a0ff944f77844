//! The table of recognized reference functions.
//!
//! Every scripting function that can point at another platform object is
//! listed here once, in the order the assembler walks them. The table is
//! fixed at compile time; its patterns are compiled on first use and shared
//! for the rest of the process.

use regex::Regex;
use std::sync::OnceLock;

use crate::core::{BldrError, ContextTag};

/// What kind of object a reference function's first argument identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceClass {
    /// A Content Builder asset by numeric id.
    AssetById,
    /// A Content Builder asset by its `Folder\Sub\Name` path.
    AssetByName,
    /// A Content Builder asset by customer key.
    AssetByKey,
    /// A data extension by name.
    DataExtensionByName,
    /// A data extension by customer key.
    DataExtensionByKey,
    /// An automation activity by customer key.
    AutomationByKey,
}

impl ReferenceClass {
    /// The package bucket objects of this class land in.
    #[must_use]
    pub const fn context(self) -> ContextTag {
        match self {
            Self::AssetById | Self::AssetByName | Self::AssetByKey => ContextTag::ContentBuilder,
            Self::DataExtensionByName | Self::DataExtensionByKey => ContextTag::DataExtension,
            Self::AutomationByKey => ContextTag::AutomationStudio,
        }
    }
}

/// Function names and their classes, in walk order.
const ENTRIES: &[(&str, ReferenceClass)] = &[
    ("ContentBlockById", ReferenceClass::AssetById),
    ("ContentBlockByID", ReferenceClass::AssetById),
    ("ContentBlockByName", ReferenceClass::AssetByName),
    ("ContentBlockByKey", ReferenceClass::AssetByKey),
    ("Lookup", ReferenceClass::DataExtensionByName),
    ("LookupOrderedRows", ReferenceClass::DataExtensionByName),
    ("LookupOrderedRowsCS", ReferenceClass::DataExtensionByName),
    ("LookupRows", ReferenceClass::DataExtensionByName),
    ("LookupRowsCS", ReferenceClass::DataExtensionByName),
    ("DataExtensionRowCount", ReferenceClass::DataExtensionByName),
    ("DeleteData", ReferenceClass::DataExtensionByName),
    ("DeleteDE", ReferenceClass::DataExtensionByName),
    ("InsertData", ReferenceClass::DataExtensionByName),
    ("InsertDE", ReferenceClass::DataExtensionByName),
    ("UpdateData", ReferenceClass::DataExtensionByName),
    ("UpdateDE", ReferenceClass::DataExtensionByName),
    ("UpsertData", ReferenceClass::DataExtensionByName),
    ("UpsertDE", ReferenceClass::DataExtensionByName),
    ("ClaimRow", ReferenceClass::DataExtensionByName),
    ("DataExtension.Init", ReferenceClass::DataExtensionByKey),
    ("QueryDefinition.Init", ReferenceClass::AutomationByKey),
];

/// One recognized function with its compiled pattern.
#[derive(Debug, Clone)]
pub struct ReferenceFunction {
    /// Function name as written in content (case-sensitive)
    pub name: &'static str,
    /// What the first argument identifies
    pub class: ReferenceClass,
    /// Matches `name(` followed by a quoted first argument, captured as `literal`
    pub pattern: Regex,
}

impl ReferenceFunction {
    fn compile(name: &'static str, class: ReferenceClass) -> Result<Self, regex::Error> {
        // The leading boundary keeps `Lookup` from matching inside `MyLookup`;
        // the trailing `\(` keeps it from matching `LookupRows`.
        let pattern = Regex::new(&format!(
            r#"\b{}\(\s*(?P<literal>"[^"\r\n]+"|'[^'\r\n]+')"#,
            regex::escape(name)
        ))?;
        Ok(Self {
            name,
            class,
            pattern,
        })
    }
}

impl PartialEq for ReferenceFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ReferenceFunction {}

/// Ordered, immutable set of [`ReferenceFunction`]s.
#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    functions: Vec<ReferenceFunction>,
}

static CATALOG: OnceLock<ReferenceCatalog> = OnceLock::new();

impl ReferenceCatalog {
    /// Compile every entry of the built-in table.
    pub fn compile() -> Result<Self, regex::Error> {
        let functions = ENTRIES
            .iter()
            .map(|&(name, class)| ReferenceFunction::compile(name, class))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { functions })
    }

    /// The process-wide catalog, compiled on first call.
    pub fn global() -> Result<&'static Self, BldrError> {
        if let Some(catalog) = CATALOG.get() {
            return Ok(catalog);
        }
        let catalog = Self::compile().map_err(|e| BldrError::PackageError {
            reason: format!("reference pattern failed to compile: {e}"),
        })?;
        Ok(CATALOG.get_or_init(|| catalog))
    }

    /// Functions in walk order.
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceFunction> {
        self.functions.iter()
    }

    /// Function by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ReferenceFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Number of functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Always false for the built-in table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_and_size() {
        let catalog = ReferenceCatalog::global().unwrap();
        let names: Vec<_> = catalog.iter().map(|f| f.name).collect();

        assert_eq!(catalog.len(), ENTRIES.len());
        assert_eq!(names[0], "ContentBlockById");
        assert_eq!(names[2], "ContentBlockByName");
        assert_eq!(names.last(), Some(&"QueryDefinition.Init"));
    }

    #[test]
    fn test_classes_map_to_contexts() {
        let catalog = ReferenceCatalog::global().unwrap();

        assert_eq!(catalog.get("ContentBlockByID").unwrap().class, ReferenceClass::AssetById);
        assert_eq!(
            catalog.get("ClaimRow").unwrap().class.context(),
            ContextTag::DataExtension
        );
        assert_eq!(
            catalog.get("QueryDefinition.Init").unwrap().class.context(),
            ContextTag::AutomationStudio
        );
        assert!(catalog.get("lookup").is_none());
    }

    #[test]
    fn test_dotted_name_is_escaped() {
        let function = ReferenceCatalog::global().unwrap().get("DataExtension.Init").unwrap();

        assert!(function.pattern.is_match(r#"DataExtension.Init("de-key")"#));
        assert!(!function.pattern.is_match(r#"DataExtensionXInit("de-key")"#));
    }

    #[test]
    fn test_global_is_shared() {
        let first = ReferenceCatalog::global().unwrap() as *const ReferenceCatalog;
        let second = ReferenceCatalog::global().unwrap() as *const ReferenceCatalog;
        assert_eq!(first, second);
    }
}
