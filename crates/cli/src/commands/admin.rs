use std::io;

use anyhow::{Context as _, Result, bail};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use storefront::{
    CategoryId, ProductId,
    api::{AdminClient, CategoryUpdate, NewCategory, NewProduct, ProductUpdate},
};

use crate::render;

use super::Context;

#[derive(Debug, Args)]
pub(crate) struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Debug, Subcommand)]
enum AdminSubcommand {
    /// Remember the admin secret
    Unlock {
        /// Shared admin secret
        #[arg(long, env = "STOREFRONT_ADMIN_SECRET", hide_env_values = true)]
        secret: String,
    },

    /// Forget the admin secret
    Lock,

    /// List orders
    Orders,

    /// Show sales totals
    Sales,

    /// Manage categories
    #[command(subcommand)]
    Category(CategorySubcommand),

    /// Manage products
    #[command(subcommand)]
    Product(ProductSubcommand),
}

#[derive(Debug, Subcommand)]
enum CategorySubcommand {
    /// Create a category
    Create {
        /// Name
        name: String,

        /// Description
        #[arg(long)]
        description: Option<String>,
    },

    /// Rename or describe a category
    Update {
        /// Category id
        id: i64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a category
    Delete {
        /// Category id
        id: i64,
    },
}

#[derive(Debug, Args)]
struct ProductFields {
    /// Description
    #[arg(long)]
    description: Option<String>,

    /// Price before discount
    #[arg(long)]
    original_price: Option<Decimal>,

    /// Image URL
    #[arg(long)]
    image: Option<String>,

    /// Brand
    #[arg(long)]
    brand: Option<String>,

    /// Units in stock
    #[arg(long)]
    stock: Option<i64>,

    /// Category id
    #[arg(long)]
    category_id: Option<i64>,
}

#[derive(Debug, Subcommand)]
enum ProductSubcommand {
    /// Create a product
    Create {
        /// Name
        name: String,

        /// Price
        price: Decimal,

        /// Category name, used when no id is given
        #[arg(long)]
        category: Option<String>,

        #[command(flatten)]
        fields: ProductFields,
    },

    /// Change a product
    Update {
        /// Product id
        id: i64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New price
        #[arg(long)]
        price: Option<Decimal>,

        #[command(flatten)]
        fields: ProductFields,
    },

    /// Delete a product
    Delete {
        /// Product id
        id: i64,
    },
}

pub(super) async fn run(command: AdminCommand, ctx: &Context, out: &mut impl io::Write) -> Result<()> {
    match command.command {
        AdminSubcommand::Unlock { secret } => {
            ctx.session.set_admin_secret(&secret)?;

            writeln!(out, "Admin secret saved")?;
        }
        AdminSubcommand::Lock => {
            ctx.session.clear_admin_secret()?;

            writeln!(out, "Admin secret cleared")?;
        }
        AdminSubcommand::Orders => {
            let orders = admin(ctx)?.orders().await.context("failed to list orders")?;

            render::write_orders(out, &orders, ctx.currency)?;
        }
        AdminSubcommand::Sales => {
            let sales = admin(ctx)?.sales().await.context("failed to load sales")?;

            render::write_sales(out, &sales, ctx.currency)?;
        }
        AdminSubcommand::Category(command) => category(command, &admin(ctx)?, out).await?,
        AdminSubcommand::Product(command) => product(command, &admin(ctx)?, out).await?,
    }

    Ok(())
}

fn admin(ctx: &Context) -> Result<AdminClient> {
    match ctx.session.admin()? {
        Some(client) => Ok(client),
        None => bail!("no admin secret stored; run `storefront admin unlock` first"),
    }
}

async fn category(
    command: CategorySubcommand,
    admin: &AdminClient,
    out: &mut impl io::Write,
) -> Result<()> {
    match command {
        CategorySubcommand::Create { name, description } => {
            let created = admin
                .create_category(&NewCategory { name, description })
                .await
                .context("failed to create category")?;

            writeln!(out, "Created category {} (#{})", created.name, created.id)?;
        }
        CategorySubcommand::Update {
            id,
            name,
            description,
        } => {
            let updated = admin
                .update_category(CategoryId::new(id), &CategoryUpdate { name, description })
                .await
                .context("failed to update category")?;

            writeln!(out, "Updated category {} (#{})", updated.name, updated.id)?;
        }
        CategorySubcommand::Delete { id } => {
            admin
                .delete_category(CategoryId::new(id))
                .await
                .context("failed to delete category")?;

            writeln!(out, "Deleted category #{id}")?;
        }
    }

    Ok(())
}

async fn product(
    command: ProductSubcommand,
    admin: &AdminClient,
    out: &mut impl io::Write,
) -> Result<()> {
    match command {
        ProductSubcommand::Create {
            name,
            price,
            category,
            fields,
        } => {
            let mut product = NewProduct::new(name, price);

            product.category_name = category;
            product.description = fields.description;
            product.original_price = fields.original_price;
            product.image = fields.image;
            product.brand = fields.brand;
            product.stock = fields.stock;
            product.category_id = fields.category_id.map(CategoryId::new);

            let created = admin
                .create_product(&product)
                .await
                .context("failed to create product")?;

            writeln!(out, "Created product {} (#{})", created.name, created.id)?;
        }
        ProductSubcommand::Update {
            id,
            name,
            price,
            fields,
        } => {
            let update = ProductUpdate {
                name,
                price,
                description: fields.description,
                original_price: fields.original_price,
                image: fields.image,
                brand: fields.brand,
                stock: fields.stock,
                category_id: fields.category_id.map(CategoryId::new),
                ..ProductUpdate::default()
            };

            let updated = admin
                .update_product(ProductId::new(id), &update)
                .await
                .context("failed to update product")?;

            writeln!(out, "Updated product {} (#{})", updated.name, updated.id)?;
        }
        ProductSubcommand::Delete { id } => {
            admin
                .delete_product(ProductId::new(id))
                .await
                .context("failed to delete product")?;

            writeln!(out, "Deleted product #{id}")?;
        }
    }

    Ok(())
}
