use std::io;

use anyhow::{Context as _, Result};
use clap::Args;

use super::Context;

#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    /// Account email
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Args)]
pub(crate) struct RegisterArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Account email
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(super) async fn login(args: LoginArgs, ctx: &Context, out: &mut impl io::Write) -> Result<()> {
    let user = ctx
        .session
        .login(&args.email, &args.password)
        .await
        .context("sign in failed")?;

    writeln!(out, "Signed in as {} <{}>", user.name, user.email)?;

    sync_cart(ctx, out).await
}

pub(super) async fn register(
    args: RegisterArgs,
    ctx: &Context,
    out: &mut impl io::Write,
) -> Result<()> {
    let user = ctx
        .session
        .register(&args.name, &args.email, &args.password)
        .await
        .context("registration failed")?;

    writeln!(out, "Welcome, {}", user.name)?;

    sync_cart(ctx, out).await
}

/// The server cart replaces the device cart once signed in.
async fn sync_cart(ctx: &Context, out: &mut impl io::Write) -> Result<()> {
    let store = ctx.cart_store().await;

    writeln!(out, "Your cart has {} item(s)", store.total_item_count())?;

    Ok(())
}

pub(super) fn logout(ctx: &Context, out: &mut impl io::Write) -> Result<()> {
    ctx.session.logout().context("sign out failed")?;

    writeln!(out, "Signed out")?;

    Ok(())
}

pub(super) fn whoami(ctx: &Context, out: &mut impl io::Write) -> Result<()> {
    match ctx.session.current_user() {
        Some(user) => writeln!(out, "{} <{}> (#{})", user.name, user.email, user.id)?,
        None => writeln!(out, "Not signed in")?,
    }

    Ok(())
}
