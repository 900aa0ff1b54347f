use std::io;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use storefront::{CartItemId, ProductId, Quantity, SyncMode};

use crate::render;

use super::Context;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show lines and the checkout summary
    Show,

    /// Add a product
    Add {
        /// Product id
        product: i64,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Remove a line
    Remove {
        /// Cart line id
        line: i64,
    },

    /// Set a line's quantity; zero or less removes it
    Update {
        /// Cart line id
        line: i64,

        /// New quantity
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },

    /// Remove every line
    Clear,
}

pub(super) async fn run(command: CartCommand, ctx: &Context, out: &mut impl io::Write) -> Result<()> {
    let store = ctx.cart_store().await;

    match command.command {
        CartSubcommand::Show => {}
        CartSubcommand::Add { product, quantity } => {
            let quantity = Quantity::new(quantity).context("quantity must be at least 1")?;

            let product = ctx
                .api
                .product(ProductId::new(product))
                .await
                .with_context(|| format!("failed to look up product {product}"))?;

            store
                .add(product, quantity)
                .await
                .context("failed to add to cart")?;
        }
        CartSubcommand::Remove { line } => store
            .remove(CartItemId::new(line))
            .await
            .context("failed to remove from cart")?,
        CartSubcommand::Update { line, quantity } => store
            .update_quantity(CartItemId::new(line), quantity)
            .await
            .context("failed to update cart")?,
        CartSubcommand::Clear => store.clear().await.context("failed to clear cart")?,
    }

    if store.mode() == SyncMode::Local {
        writeln!(out, "(not signed in: cart is stored on this device)")?;
    }

    render::write_cart(out, &store.cart(), &store.summary()?, store.currency())?;

    Ok(())
}
