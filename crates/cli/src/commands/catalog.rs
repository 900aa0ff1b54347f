use std::io;

use anyhow::{Context as _, Result};
use clap::Args;
use storefront::{ProductId, api::ProductQuery};

use crate::render;

use super::Context;

#[derive(Debug, Args)]
pub(crate) struct ProductsArgs {
    /// Page number
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Products per page
    #[arg(long, default_value_t = 12)]
    per_page: u32,

    /// Only this category
    #[arg(long)]
    category: Option<String>,

    /// Name contains
    #[arg(long)]
    search: Option<String>,
}

impl From<ProductsArgs> for ProductQuery {
    fn from(args: ProductsArgs) -> Self {
        let mut query = ProductQuery::default().page(args.page, args.per_page);

        if let Some(category) = args.category {
            query = query.in_category(category);
        }

        if let Some(search) = args.search {
            query = query.matching(search);
        }

        query
    }
}

#[derive(Debug, Args)]
pub(crate) struct ProductArgs {
    /// Product id
    id: i64,
}

pub(super) async fn products(
    args: ProductsArgs,
    ctx: &Context,
    out: &mut impl io::Write,
) -> Result<()> {
    let page = ctx
        .api
        .products(&args.into())
        .await
        .context("failed to list products")?;

    render::write_products(out, &page, ctx.currency)?;

    Ok(())
}

pub(super) async fn product(args: ProductArgs, ctx: &Context, out: &mut impl io::Write) -> Result<()> {
    let product = ctx
        .api
        .product(ProductId::new(args.id))
        .await
        .with_context(|| format!("failed to load product {}", args.id))?;

    render::write_product(out, &product, ctx.currency)?;

    Ok(())
}

pub(super) async fn categories(ctx: &Context, out: &mut impl io::Write) -> Result<()> {
    let categories = ctx
        .api
        .categories()
        .await
        .context("failed to list categories")?;

    render::write_categories(out, &categories)?;

    Ok(())
}
