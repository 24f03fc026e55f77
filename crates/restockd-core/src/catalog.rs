use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CatalogError;

/// Alert priority tier for a monitored product.
///
/// Drives alert styling and list grouping; the four tiers are fixed and
/// every user-supplied priority string is validated against them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Top,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// All tiers in display order (most to least urgent).
    pub const ALL: [Priority; 4] = [
        Priority::Top,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Top => "top",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The supplied string is not one of the four priority tiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid priority '{0}'; valid values: top, high, medium, low")]
pub struct InvalidPriority(pub String);

impl FromStr for Priority {
    type Err = InvalidPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Priority::Top),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(InvalidPriority(s.to_string())),
        }
    }
}

/// One monitored product/location pair.
///
/// Identity is the `(sku, zip_code)` pair: the same sku monitored at two
/// zip codes is two independent entries. Everything else is display
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    /// Provider's product identifier.
    pub sku: String,
    /// Postal code scoping the availability query.
    pub zip_code: String,
    pub name: String,
    pub priority: Priority,
    pub category: String,
    pub set_name: String,
}

impl ProductSpec {
    fn matches(&self, sku: &str, zip_code: &str) -> bool {
        self.sku == sku && self.zip_code == zip_code
    }
}

/// On-disk shape of one catalog entry. Optional metadata fields are filled
/// with defaults when converting to [`ProductSpec`]: `name` falls back to
/// the sku, `category`/`set` to `"Unknown"`.
#[derive(Debug, Deserialize)]
struct RawProduct {
    sku: String,
    zip_code: String,
    name: Option<String>,
    priority: Option<Priority>,
    category: Option<String>,
    set: Option<String>,
}

impl From<RawProduct> for ProductSpec {
    fn from(raw: RawProduct) -> Self {
        let name = raw.name.unwrap_or_else(|| raw.sku.clone());
        ProductSpec {
            sku: raw.sku,
            zip_code: raw.zip_code,
            name,
            priority: raw.priority.unwrap_or_default(),
            category: raw.category.unwrap_or_else(|| "Unknown".to_string()),
            set_name: raw.set.unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Outcome of [`Catalog::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// A product with the same `(sku, zip_code)` pair is already monitored.
    AlreadyExists,
}

/// Outcome of [`Catalog::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The matching entry, handed back so callers can report its name.
    Removed(ProductSpec),
    NotFound,
}

/// Ordered register of monitored products.
///
/// Insertion order is preserved and is the order monitoring cycles iterate
/// in. Duplicate `(sku, zip_code)` pairs are rejected at load time and by
/// [`Catalog::add`].
#[derive(Debug, Default)]
pub struct Catalog {
    products: Vec<ProductSpec>,
}

impl Catalog {
    /// Builds a catalog from already-parsed products, rejecting duplicates.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if two entries share a
    /// `(sku, zip_code)` pair.
    pub fn from_products(products: Vec<ProductSpec>) -> Result<Self, CatalogError> {
        let mut seen = std::collections::HashSet::new();
        for product in &products {
            let key = (product.sku.clone(), product.zip_code.clone());
            if !seen.insert(key) {
                return Err(CatalogError::Validation(format!(
                    "duplicate product {} at {}",
                    product.sku, product.zip_code
                )));
            }
        }
        Ok(Catalog { products })
    }

    /// Appends a product unless its `(sku, zip_code)` pair is already present.
    pub fn add(&mut self, spec: ProductSpec) -> AddOutcome {
        if self
            .products
            .iter()
            .any(|p| p.matches(&spec.sku, &spec.zip_code))
        {
            return AddOutcome::AlreadyExists;
        }
        self.products.push(spec);
        AddOutcome::Added
    }

    /// Removes the entry matching the `(sku, zip_code)` pair, if any.
    ///
    /// Callers that track per-product status should evict the matching
    /// status entry as well so a later re-add starts from unknown state.
    pub fn remove(&mut self, sku: &str, zip_code: &str) -> RemoveOutcome {
        match self.products.iter().position(|p| p.matches(sku, zip_code)) {
            Some(index) => RemoveOutcome::Removed(self.products.remove(index)),
            None => RemoveOutcome::NotFound,
        }
    }

    #[must_use]
    pub fn products(&self) -> &[ProductSpec] {
        &self.products
    }

    /// Products in the given tier, in insertion order.
    pub fn by_priority(&self, priority: Priority) -> impl Iterator<Item = &ProductSpec> {
        self.products.iter().filter(move |p| p.priority == priority)
    }

    /// Per-tier product counts in [`Priority::ALL`] order.
    #[must_use]
    pub fn priority_counts(&self) -> [(Priority, usize); 4] {
        Priority::ALL.map(|priority| {
            (
                priority,
                self.products
                    .iter()
                    .filter(|p| p.priority == priority)
                    .count(),
            )
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Clones the current product list, e.g. for iterating a monitoring
    /// cycle without holding a lock on the catalog.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ProductSpec> {
        self.products.clone()
    }
}

/// Parse a catalog JSON document (an array of product objects).
///
/// # Errors
///
/// Returns `CatalogError::Parse` if the document is not valid JSON, does not
/// match the expected shape, or carries a priority outside the four tiers.
pub fn parse_products(content: &str) -> Result<Vec<ProductSpec>, CatalogError> {
    let raw: Vec<RawProduct> = serde_json::from_str(content)?;
    Ok(raw.into_iter().map(ProductSpec::from).collect())
}

/// Load catalog entries from a JSON file.
///
/// # Errors
///
/// Returns `CatalogError::Io` if the file cannot be read and
/// `CatalogError::Parse` if it cannot be parsed.
pub fn load_products(path: &Path) -> Result<Vec<ProductSpec>, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_products(&content)
}

/// Load and validate the full catalog from a JSON file.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read, parsed, or contains
/// duplicate `(sku, zip_code)` pairs.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    Catalog::from_products(load_products(path)?)
}
