//! Process-wide cache of the execution backend's language catalog
//!
//! The catalog is fetched lazily on first use and then treated as
//! authoritative for the lifetime of the process. A failed fetch leaves the
//! cache empty so the next request tries again. `invalidate` swaps in a fresh
//! cell; requests already holding the previous catalog finish with it.

use crate::core_types::LanguageDescriptor;
use crate::errors::ProxyError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

pub type Catalog = Arc<Vec<LanguageDescriptor>>;

#[derive(Default)]
pub struct LanguageCatalog {
    cell: RwLock<Arc<OnceCell<Catalog>>>,
}

impl LanguageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached catalog, running `fetch` if nothing has been cached yet.
    ///
    /// Concurrent first callers share one fetch.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<Catalog, ProxyError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<LanguageDescriptor>, ProxyError>>,
    {
        let cell = self.cell.read().await.clone();
        let catalog = cell
            .get_or_try_init(|| async {
                let languages = fetch().await?;
                log::info!("Cached {} languages from execution backend", languages.len());
                Ok::<_, ProxyError>(Arc::new(languages))
            })
            .await?;
        Ok(catalog.clone())
    }

    /// The cached catalog, if one has been fetched.
    pub async fn cached(&self) -> Option<Catalog> {
        self.cell.read().await.get().cloned()
    }

    /// Forget the cached catalog so the next lookup fetches again.
    pub async fn invalidate(&self) {
        *self.cell.write().await = Arc::new(OnceCell::new());
        log::debug!("Language catalog invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn languages() -> Vec<LanguageDescriptor> {
        vec![LanguageDescriptor {
            id: 71,
            name: "Python (3.8.1)".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_fetches_once() {
        let catalog = LanguageCatalog::new();
        let fetches = AtomicUsize::new(0);

        for _ in 0..3 {
            let result = catalog
                .get_or_fetch(|| async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(languages())
                })
                .await
                .unwrap();
            assert_eq!(result.len(), 1);
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(catalog.cached().await.is_some());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let catalog = LanguageCatalog::new();

        let err = catalog
            .get_or_fetch(|| async { Err(ProxyError::RemoteUnavailable("down".to_string())) })
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::RemoteUnavailable(_)));
        assert!(catalog.cached().await.is_none());

        let result = catalog.get_or_fetch(|| async { Ok(languages()) }).await.unwrap();
        assert_eq!(result[0].id, 71);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let catalog = LanguageCatalog::new();
        catalog.get_or_fetch(|| async { Ok(languages()) }).await.unwrap();

        catalog.invalidate().await;
        assert!(catalog.cached().await.is_none());

        let result = catalog
            .get_or_fetch(|| async {
                Ok(vec![LanguageDescriptor {
                    id: 92,
                    name: "Python (3.11.2)".to_string(),
                }])
            })
            .await
            .unwrap();
        assert_eq!(result[0].id, 92);
    }
}
