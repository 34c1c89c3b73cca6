//! Local-first repositories, one per aggregate.
//!
//! # Reads
//!
//! Reads never touch the network. `get` assembles an aggregate from the
//! local cache; `observe` re-runs the same query whenever one of the tables
//! it reads from changes. Read errors inside `observe` are logged and
//! surface as an empty result.
//!
//! # Writes
//!
//! Every write goes to the backend first. Only when the backend accepts it
//! is the row (as echoed by the backend) written to the local cache. A
//! failed backend call leaves the cache untouched.
//!
//! # Sync
//!
//! `sync(owner)` pulls every row the owner has, converts and upserts it by
//! id, then does the same for each child collection of each parent. Remote
//! values overwrite local ones. Rows deleted remotely are not pruned.

pub mod cv;
pub mod invitation;
pub mod menu;
pub mod portfolio;
pub mod profile;
pub mod shop;
pub mod subscription;

use std::future::Future;

use futures::Stream;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::local::{LocalStore, Table};

pub use cv::CvRepository;
pub use invitation::InvitationRepository;
pub use menu::MenuRepository;
pub use portfolio::PortfolioRepository;
pub use profile::ProfileRepository;
pub use shop::ShopRepository;
pub use subscription::SubscriptionRepository;

/// Emit `load()` now and again after every change to one of `tables`.
///
/// Notifications that arrive while a reload is pending are coalesced into
/// that reload. A lagged receiver just reloads.
pub(crate) fn watch_tables<T, F, Fut>(
    store: &LocalStore,
    tables: &'static [Table],
    load: F,
) -> impl Stream<Item = T> + Send + 'static
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send,
{
    let mut changes = store.subscribe();

    async_stream::stream! {
        yield load().await;

        loop {
            let relevant = match changes.recv().await {
                Ok(table) => tables.contains(&table),
                Err(RecvError::Lagged(_)) => true,
                Err(RecvError::Closed) => break,
            };
            if !relevant {
                continue;
            }

            loop {
                match changes.try_recv() {
                    Ok(_) | Err(TryRecvError::Lagged(_)) => {}
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }

            yield load().await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use futures::StreamExt;

    use super::*;

    #[tokio::test]
    async fn test_watch_tables_reloads_only_on_relevant_changes() {
        let store = LocalStore::in_memory().await.unwrap();
        let loads = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&loads);
        let stream = watch_tables(&store, &[Table::Menus], move || {
            let counter = Arc::clone(&counter);
            async move { counter.fetch_add(1, Ordering::SeqCst) + 1 }
        });
        let mut stream = std::pin::pin!(stream);

        assert_eq!(stream.next().await, Some(1));

        store.notify(&[Table::Shops]);
        store.notify(&[Table::Menus]);
        assert_eq!(stream.next().await, Some(2));
    }
}
