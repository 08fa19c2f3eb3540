//! Print the server-side price catalog.

use localguide_core::catalog::{CLAIM_LISTING, FEATURED_LISTING, Product, SERVICES};

/// Print every product the payment endpoints can charge for.
#[allow(clippy::print_stdout)]
pub fn print() {
    println!("{}", render());
}

fn render() -> String {
    let mut lines = vec![format!("{:<24} {:<32} {:>10}", "ID", "NAME", "PRICE")];
    lines.push("Services".to_string());
    lines.extend(SERVICES.iter().map(row));
    lines.push("Listing offers".to_string());
    lines.extend([&FEATURED_LISTING, &CLAIM_LISTING].into_iter().map(row));
    lines.join("\n")
}

fn row(product: &Product) -> String {
    format!(
        "  {:<22} {:<32} {:>10}",
        product.id,
        product.name,
        product.price.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_every_product() {
        let output = render();
        for product in SERVICES.iter().chain([&FEATURED_LISTING, &CLAIM_LISTING]) {
            assert!(output.contains(product.id), "missing {}", product.id);
        }
        assert!(output.contains("$499.00"));
        assert!(output.contains("$49.00"));
    }
}
