//! Terminal tables

use std::io;

use rusty_money::{Money, iso::Currency};
use storefront::{
    Cart, Category, Product,
    api::{Order, ProductPage, SalesSummary},
    cart::summary::OrderSummary,
    pricing::{TotalPriceError, line_total},
};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

/// Errors raised while rendering output.
#[derive(Debug, Error)]
pub(crate) enum RenderError {
    /// Writing to the output failed.
    #[error("failed to write output")]
    Io(#[from] io::Error),

    /// A line or summary total overflowed.
    #[error(transparent)]
    Price(#[from] TotalPriceError),
}

/// Cart lines followed by the checkout summary.
pub(crate) fn write_cart(
    out: &mut impl io::Write,
    cart: &Cart,
    summary: &OrderSummary,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    if cart.is_empty() {
        writeln!(out, "Your cart is empty")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Line", "Product", "Price", "Qty", "Total"]);

    for item in cart.items() {
        builder.push_record([
            item.id.to_string(),
            item.product.name.clone(),
            money(item.product.price, currency),
            item.quantity.to_string(),
            money(line_total(item)?, currency),
        ]);
    }

    write_table(out, builder, 2..5)?;

    let shipping = if summary.shipping.is_zero() {
        "Free".to_string()
    } else {
        summary.shipping.to_string()
    };

    writeln!(out, " Subtotal: {}", summary.subtotal)?;
    writeln!(out, " Shipping: {shipping}")?;
    writeln!(out, " Tax:      {}", summary.tax)?;
    writeln!(out, " Total:    {}", summary.total)?;

    if let Some(remaining) = &summary.free_shipping_remaining {
        writeln!(out, " Add {remaining} more for free shipping")?;
    }

    Ok(())
}

/// A page of products.
pub(crate) fn write_products(
    out: &mut impl io::Write,
    page: &ProductPage,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Name", "Category", "Price", "Was", "Stock"]);

    for product in &page.products {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.category.clone().unwrap_or_default(),
            money(product.price, currency),
            product
                .original_price
                .filter(|_| product.is_discounted())
                .map(|price| money(price, currency))
                .unwrap_or_default(),
            product.stock.to_string(),
        ]);
    }

    write_table(out, builder, 3..6)?;

    writeln!(
        out,
        " Page {} of {} ({} products)",
        page.current_page, page.pages, page.total
    )?;

    Ok(())
}

/// A single product's details.
pub(crate) fn write_product(
    out: &mut impl io::Write,
    product: &Product,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    writeln!(out, "{} (#{})", product.name, product.id)?;
    writeln!(out, "  Price:    {}", money(product.price, currency))?;

    if let Some(savings) = product.savings() {
        writeln!(out, "  You save: {}", money(savings, currency))?;
    }

    if let Some(brand) = &product.brand {
        writeln!(out, "  Brand:    {brand}")?;
    }

    if let Some(category) = &product.category {
        writeln!(out, "  Category: {category}")?;
    }

    writeln!(out, "  Rating:   {:.1}", product.rating)?;
    writeln!(
        out,
        "  Stock:    {}",
        if product.in_stock() {
            product.stock.to_string()
        } else {
            "out of stock".to_string()
        }
    )?;

    if let Some(description) = &product.description {
        writeln!(out, "\n{description}")?;
    }

    Ok(())
}

/// Category list.
pub(crate) fn write_categories(
    out: &mut impl io::Write,
    categories: &[Category],
) -> Result<(), RenderError> {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Name"]);

    for category in categories {
        builder.push_record([category.id.to_string(), category.name.clone()]);
    }

    write_table(out, builder, 0..0)
}

/// Admin order list.
pub(crate) fn write_orders(
    out: &mut impl io::Write,
    orders: &[Order],
    currency: &'static Currency,
) -> Result<(), RenderError> {
    let mut builder = Builder::default();

    builder.push_record(["Id", "User", "Total", "Status", "Placed"]);

    for order in orders {
        builder.push_record([
            order.id.to_string(),
            order.user_id.to_string(),
            money(order.total_amount, currency),
            order.status.clone(),
            order.created_at.strftime("%Y-%m-%d %H:%M").to_string(),
        ]);
    }

    write_table(out, builder, 2..3)
}

/// Admin sales totals.
pub(crate) fn write_sales(
    out: &mut impl io::Write,
    sales: &SalesSummary,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    writeln!(out, "Orders: {}", sales.order_count)?;
    writeln!(out, "Sales:  {}", money(sales.total_sales, currency))?;

    Ok(())
}

fn money(amount: rust_decimal::Decimal, currency: &'static Currency) -> String {
    Money::from_decimal(amount, currency).to_string()
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    right_aligned: std::ops::Range<usize>,
) -> Result<(), RenderError> {
    let mut table = builder.build();

    table.with(Style::modern_rounded());

    if !right_aligned.is_empty() {
        table.modify(Columns::new(right_aligned), Alignment::right());
    }

    writeln!(out, "{table}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::USD;
    use storefront::{CartItem, CartItemId, ProductId, Quantity};
    use testresult::TestResult;

    use super::*;

    fn bananas() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Organic Bananas".to_string(),
            description: None,
            price: Decimal::new(399, 2),
            original_price: Some(Decimal::new(499, 2)),
            image: None,
            category: Some("Produce".to_string()),
            brand: None,
            rating: 4.5,
            stock: 0,
        }
    }

    #[test]
    fn cart_lists_lines_and_summary() -> TestResult {
        let cart = Cart::with_items([CartItem::new(
            CartItemId::new(3),
            bananas(),
            Quantity::new(2).ok_or("zero")?,
        )]);
        let summary = OrderSummary::for_cart(&cart, USD)?;

        let mut out = Vec::new();

        write_cart(&mut out, &cart, &summary, USD)?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Organic Bananas"), "missing product name:\n{text}");
        assert!(text.contains("$7.98"), "missing line total:\n{text}");
        assert!(text.contains("Shipping: $9.99"), "missing shipping:\n{text}");
        assert!(text.contains("for free shipping"), "missing nudge:\n{text}");

        Ok(())
    }

    #[test]
    fn empty_cart_says_so() -> TestResult {
        let cart = Cart::new();
        let summary = OrderSummary::for_cart(&cart, USD)?;

        let mut out = Vec::new();

        write_cart(&mut out, &cart, &summary, USD)?;

        assert_eq!(String::from_utf8(out)?, "Your cart is empty\n");

        Ok(())
    }

    #[test]
    fn product_details_flag_stock_and_savings() -> TestResult {
        let mut out = Vec::new();

        write_product(&mut out, &bananas(), USD)?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("You save: $1.00"), "missing savings:\n{text}");
        assert!(text.contains("out of stock"), "missing stock flag:\n{text}");

        Ok(())
    }
}
