//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - title: Neon Skyline Print
//!     description: A3 giclee print
//!     price: "1499.00"
//!     category: posters
//!     tags: [neon, cyberpunk]
//!     stock: 25
//! ```
//!
//! The whole file is validated before anything is written. Products whose
//! title already exists in the catalog (case-insensitive) are skipped, so
//! re-running a seed is harmless.

use std::collections::HashSet;
use std::path::Path;

use neobazaar_admin::services::ProductService;
use neobazaar_backend::Backend;
use neobazaar_core::NewProduct;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

/// Top-level layout of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<NewProduct>,
}

/// Problems found while validating a seed file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("product #{index}: {message}")]
    Invalid { index: usize, message: String },

    #[error("product #{index}: duplicate title '{title}' in file")]
    DuplicateTitle { index: usize, title: String },
}

/// Outcome of a seed run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Normalize every product, collecting all problems.
///
/// # Errors
///
/// Returns every validation problem in the file, numbered from 1.
pub fn validate(file: SeedFile) -> Result<Vec<NewProduct>, Vec<SeedError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut products = Vec::with_capacity(file.products.len());

    for (i, product) in file.products.into_iter().enumerate() {
        let index = i + 1;
        match product.normalized() {
            Ok(product) => {
                if seen.insert(product.title.to_lowercase()) {
                    products.push(product);
                } else {
                    errors.push(SeedError::DuplicateTitle {
                        index,
                        title: product.title,
                    });
                }
            }
            Err(message) => errors.push(SeedError::Invalid { index, message }),
        }
    }

    if errors.is_empty() {
        Ok(products)
    } else {
        Err(errors)
    }
}

/// Insert products missing from the catalog.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read or an insert fails.
pub async fn insert_missing(
    backend: &Backend,
    products: Vec<NewProduct>,
) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let existing: HashSet<String> = backend
        .catalog()
        .list_products()
        .await?
        .into_iter()
        .map(|p| p.title.to_lowercase())
        .collect();

    let service = ProductService::new(backend);
    let mut summary = SeedSummary::default();
    for product in products {
        if existing.contains(&product.title.to_lowercase()) {
            info!(title = %product.title, "Already in catalog, skipping");
            summary.skipped += 1;
            continue;
        }
        let created = service.create(product).await?;
        info!(product_id = %created.id, title = %created.title, "Inserted");
        summary.inserted += 1;
    }
    Ok(summary)
}

/// Seed products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or the backend rejects a write.
pub async fn products(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await?;
    let file: SeedFile = serde_yaml::from_str(&content)?;
    info!(products = file.products.len(), "Parsed seed file");

    let products = match validate(file) {
        Ok(products) => products,
        Err(errors) => {
            error!("Seed file validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(format!("{} validation errors found", errors.len()).into());
        }
    };

    if dry_run {
        info!(products = products.len(), "Dry run: seed file is valid, nothing written");
        return Ok(());
    }

    let backend = super::backend_from_env()?;
    let summary = insert_missing(&backend, products).await?;

    info!("Seeding complete!");
    info!("  Products inserted: {}", summary.inserted);
    info!("  Products skipped (already exist): {}", summary.skipped);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use neobazaar_backend::InMemoryBackend;
    use neobazaar_core::Money;

    use super::*;

    const SEED: &str = r#"
products:
  - title: Neon Skyline Print
    price: "1499.00"
    category: posters
    tags: [neon, " cyberpunk ", NEON]
    stock: 25
  - title: "  Chrome Jacket "
    description: Reflective shell
    price: 4200
    category: apparel
"#;

    #[test]
    fn test_parse_and_normalize() {
        let file: SeedFile = serde_yaml::from_str(SEED).unwrap();
        let products = validate(file).unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price, Money::from_units(1499));
        assert_eq!(products[0].tags, vec!["NEON", "CYBERPUNK"]);
        assert_eq!(products[1].title, "Chrome Jacket");
        assert_eq!(products[1].stock, Some(0));
    }

    #[test]
    fn test_all_problems_reported() {
        let yaml = r#"
products:
  - title: "   "
    price: 10
  - title: Poster
    price: 10
  - title: poster
    price: 12
"#;
        let file: SeedFile = serde_yaml::from_str(yaml).unwrap();
        let errors = validate(file).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], SeedError::Invalid { index: 1, .. }));
        assert!(matches!(errors[1], SeedError::DuplicateTitle { index: 3, .. }));
    }

    #[test]
    fn test_negative_price_rejected_by_parser() {
        let yaml = "products:\n  - title: Bad\n    price: \"-5\"\n";
        assert!(serde_yaml::from_str::<SeedFile>(yaml).is_err());
    }

    #[tokio::test]
    async fn test_reseeding_skips_existing() {
        let backend = Backend::in_memory(Arc::new(InMemoryBackend::new()));
        let file: SeedFile = serde_yaml::from_str(SEED).unwrap();
        let products = validate(file).unwrap();

        let first = insert_missing(&backend, products.clone()).await.unwrap();
        assert_eq!(first, SeedSummary { inserted: 2, skipped: 0 });

        let second = insert_missing(&backend, products).await.unwrap();
        assert_eq!(second, SeedSummary { inserted: 0, skipped: 2 });
        assert_eq!(backend.catalog().list_products().await.unwrap().len(), 2);
    }
}
