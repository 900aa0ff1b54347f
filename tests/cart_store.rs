//! Cart store behaviour against an in-memory backend.
//!
//! `FakeBackend` behaves like the storefront server: adding a product that is
//! already in the cart accumulates onto its line, every line gets a fresh
//! server id, and `fetch_cart` can be slowed down to widen race windows.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rusty_money::iso::USD;
use storefront::{
    ApiError, AuthStatus, Cart, CartItem, CartItemId, CartStore, CartStoreDeps, CartStoreError,
    KeyValueStorage, MemoryStorage, Product, ProductId, Quantity, RemoteCart, SyncMode,
    storage::{keys, read_snapshot},
};
use testresult::TestResult;

#[derive(Debug, Default)]
struct ServerState {
    lines: Vec<CartItem>,
    next_id: i64,
}

#[derive(Debug, Default)]
struct FakeBackend {
    catalog: HashMap<ProductId, Product>,
    state: Mutex<ServerState>,
    fail_adds: AtomicBool,
    fetch_delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn with_catalog(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            catalog: products
                .into_iter()
                .map(|product| (product.id, product))
                .collect(),
            state: Mutex::new(ServerState {
                lines: Vec::new(),
                next_id: 100,
            }),
            ..Self::default()
        }
    }

    fn fail_adds(&self) {
        self.fail_adds.store(true, Ordering::SeqCst);
    }

    fn slow_fetches(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap_or_else(PoisonError::into_inner) = Some(delay);
    }

    fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn server_cart(&self) -> Cart {
        Cart::with_items(
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .lines
                .clone(),
        )
    }

    fn enter(&self, call: String) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;

        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteCart for FakeBackend {
    async fn fetch_cart(&self) -> Result<Cart, ApiError> {
        self.enter("fetch".to_string());

        let snapshot = self.server_cart();
        let delay = *self.fetch_delay.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.leave();

        Ok(snapshot)
    }

    async fn add_item(&self, product: ProductId, quantity: Quantity) -> Result<(), ApiError> {
        self.enter(format!("add {product} x{quantity}"));

        tokio::task::yield_now().await;

        let result = if self.fail_adds.load(Ordering::SeqCst) {
            Err(ApiError::Status {
                status: 503,
                message: "network unreachable".to_string(),
            })
        } else if let Some(product) = self.catalog.get(&product) {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

            if let Some(line) = state
                .lines
                .iter_mut()
                .find(|line| line.product.id == product.id)
            {
                line.quantity = line.quantity.saturating_add(quantity);
            } else {
                state.next_id += 1;

                let id = CartItemId::new(state.next_id);

                state.lines.push(CartItem::new(id, product.clone(), quantity));
            }

            Ok(())
        } else {
            Err(ApiError::NotFound("Product not found".to_string()))
        };

        self.leave();

        result
    }

    async fn remove_item(&self, item: CartItemId) -> Result<(), ApiError> {
        self.enter(format!("remove {item}"));

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let before = state.lines.len();

        state.lines.retain(|line| line.id != item);

        let removed = state.lines.len() != before;

        drop(state);

        self.leave();

        if removed {
            Ok(())
        } else {
            Err(ApiError::NotFound("Item not found".to_string()))
        }
    }
}

/// Token presence decided by a flag, flipped by the test.
#[derive(Debug, Default)]
struct Switch(AtomicBool);

impl Switch {
    fn signed_in() -> Self {
        Self(AtomicBool::new(true))
    }

    fn set(&self, signed_in: bool) {
        self.0.store(signed_in, Ordering::SeqCst);
    }
}

impl AuthStatus for Switch {
    fn token(&self) -> Option<String> {
        self.0.load(Ordering::SeqCst).then(|| "jwt".to_string())
    }
}

fn product(id: i64, cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: None,
        price: Decimal::new(cents, 2),
        original_price: None,
        image: None,
        category: None,
        brand: None,
        rating: 4.5,
        stock: 20,
    }
}

fn qty(count: u32) -> Quantity {
    Quantity::new(count).unwrap_or(Quantity::ONE)
}

fn catalog() -> Vec<Product> {
    vec![product(1, 399), product(2, 1299), product(3, 550)]
}

struct Harness {
    store: Arc<CartStore>,
    storage: Arc<MemoryStorage>,
    backend: Arc<FakeBackend>,
    auth: Arc<Switch>,
}

async fn open(auth: Switch, storage: MemoryStorage) -> Harness {
    let storage = Arc::new(storage);
    let backend = Arc::new(FakeBackend::with_catalog(catalog()));
    let auth = Arc::new(auth);

    let store = CartStore::open(CartStoreDeps {
        storage: storage.clone(),
        auth: auth.clone(),
        remote: backend.clone(),
        currency: USD,
    })
    .await;

    Harness {
        store: Arc::new(store),
        storage,
        backend,
        auth,
    }
}

async fn anonymous() -> Harness {
    open(Switch::default(), MemoryStorage::new()).await
}

async fn signed_in() -> Harness {
    open(Switch::signed_in(), MemoryStorage::new()).await
}

fn line_id(store: &CartStore, product: i64) -> Result<CartItemId, &'static str> {
    store
        .items()
        .iter()
        .find(|item| item.product.id == ProductId::new(product))
        .map(|item| item.id)
        .ok_or("product not in cart")
}

fn same_lines(left: &Cart, right: &Cart) -> bool {
    let key = |cart: &Cart| {
        let mut lines: Vec<_> = cart
            .items()
            .iter()
            .map(|item| (item.id, item.product.id, item.quantity))
            .collect();

        lines.sort();
        lines
    };

    key(left) == key(right)
}

#[tokio::test]
async fn anonymous_add_accumulate_remove_scenario() -> TestResult {
    let Harness { store, backend, .. } = anonymous().await;

    assert!(store.is_empty());

    store.add(product(1, 399), qty(1)).await?;

    assert_eq!(store.total_item_count(), 1);
    assert_eq!(*store.total_price()?.amount(), Decimal::new(399, 2));

    store.add(product(1, 399), qty(2)).await?;

    assert_eq!(store.items().len(), 1);
    assert_eq!(store.total_item_count(), 3);

    store.remove(line_id(&store, 1)?).await?;

    assert!(store.is_empty());
    assert!(backend.calls().is_empty(), "anonymous session must stay local");

    Ok(())
}

#[tokio::test]
async fn adding_same_product_twice_yields_one_line() -> TestResult {
    let Harness { store, .. } = anonymous().await;

    store.add(product(2, 1299), qty(4)).await?;
    store.add(product(2, 1299), qty(5)).await?;

    let items = store.items();

    assert_eq!(items.len(), 1);
    assert_eq!(items.first().map(|item| item.quantity), Some(qty(9)));

    Ok(())
}

#[tokio::test]
async fn item_count_tracks_net_quantity_changes() -> TestResult {
    let Harness { store, .. } = anonymous().await;

    // Small LCG so the sequence is varied but reproducible.
    let mut seed: u64 = 0x5eed;
    let mut next = move |bound: u64| {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        (seed >> 33) % bound
    };

    let mut expected: HashMap<ProductId, u64> = HashMap::new();

    for _ in 0..200 {
        let id = i64::try_from(next(3))? + 1;
        let product_id = ProductId::new(id);

        match next(4) {
            0 | 1 => {
                let amount = u32::try_from(next(5))? + 1;

                store.add(product(id, 100), qty(amount)).await?;
                *expected.entry(product_id).or_default() += u64::from(amount);
            }
            2 => {
                if let Ok(line) = line_id(&store, id) {
                    let amount = i64::try_from(next(7))? - 1;

                    store.update_quantity(line, amount).await?;

                    if amount <= 0 {
                        expected.remove(&product_id);
                    } else {
                        expected.insert(product_id, u64::try_from(amount)?);
                    }
                }
            }
            _ => {
                if let Ok(line) = line_id(&store, id) {
                    store.remove(line).await?;
                    expected.remove(&product_id);
                }
            }
        }

        assert_eq!(store.total_item_count(), expected.values().sum::<u64>());
    }

    Ok(())
}

#[tokio::test]
async fn zero_and_negative_quantities_remove_the_line() -> TestResult {
    let Harness { store, .. } = anonymous().await;

    store.add(product(1, 399), qty(2)).await?;
    store.add(product(2, 1299), qty(2)).await?;

    store.update_quantity(line_id(&store, 1)?, 0).await?;
    store.update_quantity(line_id(&store, 2)?, -1).await?;

    assert!(store.is_empty());

    Ok(())
}

#[tokio::test]
async fn snapshot_reload_matches_memory_after_every_mutation() -> TestResult {
    let Harness { store, storage, .. } = anonymous().await;

    store.add(product(1, 399), qty(1)).await?;
    assert!(same_lines(&read_snapshot(storage.as_ref()), &store.cart()));

    store.add(product(2, 1299), qty(3)).await?;
    assert!(same_lines(&read_snapshot(storage.as_ref()), &store.cart()));

    store.update_quantity(line_id(&store, 2)?, 7).await?;
    assert!(same_lines(&read_snapshot(storage.as_ref()), &store.cart()));

    store.remove(line_id(&store, 1)?).await?;
    assert!(same_lines(&read_snapshot(storage.as_ref()), &store.cart()));

    store.clear().await?;
    assert!(read_snapshot(storage.as_ref()).is_empty());

    Ok(())
}

#[tokio::test]
async fn malformed_snapshot_starts_empty() -> TestResult {
    let storage = MemoryStorage::with_entries([(keys::CART, "{not json")]);

    let Harness { store, .. } = open(Switch::default(), storage).await;

    assert!(store.is_empty());

    store.add(product(3, 550), qty(1)).await?;

    assert_eq!(store.total_item_count(), 1);

    Ok(())
}

#[tokio::test]
async fn failed_remote_add_leaves_cart_unchanged() -> TestResult {
    let Harness {
        store,
        backend,
        storage,
        ..
    } = signed_in().await;

    store.add(product(1, 399), qty(1)).await?;

    let before = store.cart();

    backend.fail_adds();

    let result = store.add(product(2, 1299), qty(1)).await;

    assert!(
        matches!(
            &result,
            Err(CartStoreError::Remote(ApiError::Status { status: 503, .. }))
        ),
        "expected the simulated network error, got {result:?}"
    );
    assert_eq!(store.cart(), before);
    assert_eq!(read_snapshot(storage.as_ref()), before);

    Ok(())
}

#[tokio::test]
async fn remote_add_adopts_server_ids() -> TestResult {
    let Harness {
        store,
        backend,
        storage,
        ..
    } = signed_in().await;

    store.add(product(1, 399), qty(2)).await?;
    store.add(product(1, 399), qty(1)).await?;

    assert_eq!(store.mode(), SyncMode::Remote);
    assert_eq!(store.cart(), backend.server_cart());
    assert_eq!(store.total_item_count(), 3);
    assert_eq!(read_snapshot(storage.as_ref()), backend.server_cart());

    Ok(())
}

#[tokio::test]
async fn remote_update_and_clear_reach_the_server() -> TestResult {
    let Harness { store, backend, .. } = signed_in().await;

    store.add(product(1, 399), qty(2)).await?;
    store.add(product(2, 1299), qty(4)).await?;

    store.update_quantity(line_id(&store, 1)?, 5).await?;
    store.update_quantity(line_id(&store, 2)?, 1).await?;

    assert_eq!(store.cart(), backend.server_cart());
    assert_eq!(store.total_item_count(), 6);

    store.clear().await?;

    assert!(store.is_empty());
    assert!(backend.server_cart().is_empty());

    Ok(())
}

#[tokio::test]
async fn remote_remove_of_unknown_line_reports_not_found() -> TestResult {
    let Harness { store, .. } = signed_in().await;

    store.add(product(1, 399), qty(1)).await?;

    let before = store.cart();
    let result = store.remove(CartItemId::new(-5)).await;

    assert!(
        result
            .as_ref()
            .is_err_and(|error| matches!(error.api_error(), ApiError::NotFound(_))),
        "expected not found, got {result:?}"
    );
    assert_eq!(store.cart(), before);

    Ok(())
}

#[tokio::test]
async fn signing_in_switches_mode_on_next_call() -> TestResult {
    let Harness {
        store,
        backend,
        auth,
        ..
    } = anonymous().await;

    store.add(product(1, 399), qty(1)).await?;

    assert!(backend.calls().is_empty(), "anonymous add must stay local");

    auth.set(true);
    store.refresh().await?;

    assert!(store.is_empty(), "server cart replaces the local one");

    store.add(product(2, 1299), qty(1)).await?;

    assert_eq!(store.cart(), backend.server_cart());

    auth.set(false);
    store.add(product(3, 550), qty(1)).await?;

    assert_eq!(store.items().len(), 2);
    assert_eq!(backend.server_cart().len(), 1);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_remote_adds_are_serialised() -> TestResult {
    let Harness { store, backend, .. } = signed_in().await;

    backend.slow_fetches(Duration::from_millis(30));

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();

            tokio::spawn(async move { store.add(product(1, 399), qty(1)).await })
        })
        .collect();

    for task in tasks {
        task.await??;
    }

    assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(store.total_item_count(), 4);
    assert_eq!(store.cart(), backend.server_cart());

    Ok(())
}

#[tokio::test]
async fn signed_in_open_replaces_stored_cart() -> TestResult {
    let stored = Cart::with_items([CartItem::new(CartItemId::new(1), product(3, 550), qty(2))]);
    let storage = MemoryStorage::new();

    storage.save(keys::CART, &serde_json::to_string(&stored)?)?;

    let Harness { store, backend, .. } = open(Switch::signed_in(), storage).await;

    assert_eq!(backend.calls(), vec!["fetch".to_string()]);
    assert!(store.is_empty());

    Ok(())
}
