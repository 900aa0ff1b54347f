//! Subcommands

use std::{io, sync::Arc};

use anyhow::Result;
use clap::Subcommand;
use rusty_money::iso::Currency;
use storefront::{
    ApiClient, ApiConfig, CartStore, CartStoreDeps, FileStorage, SessionManager, StoredToken,
};
use tracing::debug;

use crate::config::CliConfig;

mod admin;
mod cart;
mod catalog;
mod session;

pub(crate) use admin::AdminCommand;
pub(crate) use cart::CartCommand;
pub(crate) use catalog::{ProductArgs, ProductsArgs};
pub(crate) use session::{LoginArgs, RegisterArgs};

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Show or change the cart
    Cart(CartCommand),

    /// Browse products
    Products(ProductsArgs),

    /// Show one product
    Product(ProductArgs),

    /// List categories
    Categories,

    /// Sign in
    Login(LoginArgs),

    /// Create an account and sign in
    Register(RegisterArgs),

    /// Sign out, keeping the local cart
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Admin console
    Admin(AdminCommand),
}

/// Everything a command needs, built once per invocation.
pub(crate) struct Context {
    storage: Arc<FileStorage>,
    api: ApiClient,
    session: SessionManager,
    currency: &'static Currency,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("storage", &self.storage.path())
            .field("api", &self.api)
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}

impl Context {
    pub(crate) fn new(config: &CliConfig) -> Self {
        let storage = Arc::new(FileStorage::in_dir(&config.storage.data_dir));
        let auth = Arc::new(StoredToken::new(storage.clone()));

        let api = ApiClient::new(
            ApiConfig {
                base_url: config.api.api_url.clone(),
            },
            auth,
        );

        let session = SessionManager::new(api.clone(), storage.clone());

        debug!(
            data = %storage.path().display(),
            api = api.base_url(),
            "context ready"
        );

        Self {
            storage,
            api,
            session,
            currency: config.api.currency,
        }
    }

    async fn cart_store(&self) -> CartStore {
        CartStore::open(CartStoreDeps {
            storage: self.storage.clone(),
            auth: Arc::new(StoredToken::new(self.storage.clone())),
            remote: Arc::new(self.api.clone()),
            currency: self.currency,
        })
        .await
    }
}

pub(crate) async fn run(command: Command, ctx: &Context, out: &mut impl io::Write) -> Result<()> {
    match command {
        Command::Cart(command) => cart::run(command, ctx, out).await,
        Command::Products(args) => catalog::products(args, ctx, out).await,
        Command::Product(args) => catalog::product(args, ctx, out).await,
        Command::Categories => catalog::categories(ctx, out).await,
        Command::Login(args) => session::login(args, ctx, out).await,
        Command::Register(args) => session::register(args, ctx, out).await,
        Command::Logout => session::logout(ctx, out),
        Command::Whoami => session::whoami(ctx, out),
        Command::Admin(command) => admin::run(command, ctx, out).await,
    }
}
