//! Server-side price catalog.
//!
//! Every amount charged through the payment endpoints comes from this table.
//! Request bodies carry at most a product identifier and an email address.

use serde::Serialize;

use crate::types::{CurrencyCode, Price};

/// A purchasable product with a fixed price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Stable identifier, sent by clients and recorded in payment metadata.
    pub id: &'static str,
    /// Human-readable name, recorded in payment metadata.
    pub name: &'static str,
    pub price: Price,
}

/// Professional services purchasable by service id.
pub const SERVICES: &[Product] = &[
    Product {
        id: "website-5",
        name: "Business Website (5 pages)",
        price: Price::from_minor(49_900, CurrencyCode::USD),
    },
    Product {
        id: "website-10",
        name: "Business Website (10 pages)",
        price: Price::from_minor(89_900, CurrencyCode::USD),
    },
    Product {
        id: "logo-design",
        name: "Logo Design",
        price: Price::from_minor(14_900, CurrencyCode::USD),
    },
    Product {
        id: "seo-audit",
        name: "Local SEO Audit",
        price: Price::from_minor(9_900, CurrencyCode::USD),
    },
    Product {
        id: "google-business-setup",
        name: "Google Business Profile Setup",
        price: Price::from_minor(7_900, CurrencyCode::USD),
    },
];

/// Promote a listing to the featured slot.
pub const FEATURED_LISTING: Product = Product {
    id: "featured-listing",
    name: "Featured Listing",
    price: Price::from_minor(4_900, CurrencyCode::USD),
};

/// Verify ownership of an existing listing.
pub const CLAIM_LISTING: Product = Product {
    id: "claim-listing",
    name: "Claim Listing",
    price: Price::from_minor(1_900, CurrencyCode::USD),
};

/// Look up a service by its identifier.
///
/// Matching is exact; identifiers are not trimmed or case-folded.
#[must_use]
pub fn find_service(id: &str) -> Option<&'static Product> {
    SERVICES.iter().find(|product| product.id == id)
}
