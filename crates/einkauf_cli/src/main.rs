//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `einkauf_core` linkage and run one in-memory store round trip.
//! - Keep output deterministic for quick local sanity checks.

use einkauf_core::{Item, ItemStore, RepoResult, StoreConfig};

fn main() {
    println!("einkauf_core ping={}", einkauf_core::ping());
    println!("einkauf_core version={}", einkauf_core::core_version());

    match smoke() {
        Ok(count) => println!("einkauf_core smoke=ok items={count}"),
        Err(err) => {
            eprintln!("einkauf_core smoke=error error={err}");
            std::process::exit(1);
        }
    }
}

fn smoke() -> RepoResult<usize> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|err| einkauf_core::RepoError::Background(err.to_string()))?;

    runtime.block_on(async {
        let store = ItemStore::open(&StoreConfig::in_memory())?;
        store.insert(Item::named(1, "Milk", 2, 150)).await?;
        store.update_amount(1, 5)?;
        let count = store.all_items().borrow().len();
        store.delete(1)?;
        Ok(count)
    })
}
