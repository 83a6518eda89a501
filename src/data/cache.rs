use crate::data::cleaner::CleanSeries;
use crate::engines::forecast::FittedModel;
use crate::error::FitError;
use crate::types::ArimaOrder;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

type CacheKey = (u64, ArimaOrder);
type Slot = Arc<OnceLock<Result<Arc<FittedModel>, FitError>>>;

/// Fitted models keyed by (series fingerprint, order).
///
/// At most one fit runs per key: concurrent callers for the same key block on
/// the slot until the first fit finishes, then share its result. Only
/// successful fits stay cached.
pub struct ModelCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    capacity: usize,
    fits: AtomicUsize,
}

impl ModelCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::with_capacity(capacity)),
            capacity: capacity.max(1),
            fits: AtomicUsize::new(0),
        }
    }

    pub fn get_or_fit<F>(
        &self,
        series: &CleanSeries,
        order: ArimaOrder,
        fit: F,
    ) -> Result<Arc<FittedModel>, FitError>
    where
        F: FnOnce() -> Result<FittedModel, FitError>,
    {
        let key = (series.fingerprint(), order);
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            if !slots.contains_key(&key) && slots.len() >= self.capacity {
                // Clear when full
                slots.clear();
            }
            slots.entry(key).or_default().clone()
        };

        let result = slot
            .get_or_init(|| {
                self.fits.fetch_add(1, Ordering::SeqCst);
                log::debug!("Fitting {} for series {:016x}", order, key.0);
                fit().map(Arc::new)
            })
            .clone();

        // Failures depend on load and fit options, neither of which is in the key
        if result.is_err() {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            if slots.get(&key).is_some_and(|current| Arc::ptr_eq(current, &slot)) {
                slots.remove(&key);
            }
        }

        result
    }

    pub fn get(&self, series: &CleanSeries, order: ArimaOrder) -> Option<Arc<FittedModel>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .get(&(series.fingerprint(), order))
            .and_then(|slot| slot.get())
            .and_then(|result| result.as_ref().ok().cloned())
    }

    /// Number of fits actually computed
    pub fn fit_count(&self) -> usize {
        self.fits.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::connectors::{DataValidator, RawTable};
    use crate::data::cleaner::SeriesCleaner;
    use crate::engines::forecast::{FitOptions, ForecastEngine};
    use crate::types::MissingPolicy;
    use std::thread;

    fn series(offset: f64) -> CleanSeries {
        let dates = (1..=60)
            .map(|day| Some(format!("2024-{:02}-{:02}", 1 + (day - 1) / 28, 1 + (day - 1) % 28)))
            .collect();
        let values = (0..60)
            .map(|i| Some((offset + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.2).to_string()))
            .collect();
        let raw = RawTable::from_columns(vec![
            ("Date".to_string(), dates),
            ("Sales".to_string(), values),
        ])
        .unwrap();
        let selection = DataValidator::resolve(&raw, "Date", "Sales").unwrap();
        SeriesCleaner::clean(&raw, &selection, MissingPolicy::DropRows, 30).unwrap()
    }

    #[test]
    fn test_single_fit_under_concurrent_access() {
        let cache = Arc::new(ModelCache::new(8));
        let engine = Arc::new(ForecastEngine::new(FitOptions::default(), 0.95));
        let series = Arc::new(series(100.0));
        let order = ArimaOrder::new(2, 1, 0);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let engine = Arc::clone(&engine);
                let series = Arc::clone(&series);
                thread::spawn(move || {
                    cache
                        .get_or_fit(&series, order, || engine.fit(&series, order))
                        .unwrap()
                })
            })
            .collect();

        let models: Vec<Arc<FittedModel>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(cache.fit_count(), 1);
        assert!(models.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_distinct_keys_fit_separately_and_evict_when_full() {
        let cache = ModelCache::new(2);
        let engine = ForecastEngine::new(FitOptions::default(), 0.95);
        let order = ArimaOrder::new(1, 1, 0);

        for offset in [10.0, 20.0] {
            let s = series(offset);
            cache.get_or_fit(&s, order, || engine.fit(&s, order)).unwrap();
        }
        assert_eq!(cache.fit_count(), 2);
        assert_eq!(cache.len(), 2);

        let s = series(30.0);
        cache.get_or_fit(&s, order, || engine.fit(&s, order)).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&s, order).is_some());
        assert!(cache.get(&series(10.0), order).is_none());
    }

    #[test]
    fn test_failures_are_not_cached() {
        let cache = ModelCache::new(4);
        let s = series(50.0);
        let order = ArimaOrder::new(1, 0, 0);

        let err = cache
            .get_or_fit(&s, order, || Err(FitError::TimeBudgetExceeded { budget_ms: 1 }))
            .unwrap_err();
        assert_eq!(err.reason(), "time_budget_exceeded");
        assert!(cache.is_empty());

        let err = cache
            .get_or_fit(&s, order, || Err(FitError::NonConvergent { iterations: 3 }))
            .unwrap_err();
        assert_eq!(err.reason(), "non_convergent");
        assert!(cache.is_empty());

        // A later caller with a larger iteration limit gets a fresh fit
        let patient = ForecastEngine::new(
            FitOptions {
                max_iterations: 5000,
                ..FitOptions::default()
            },
            0.95,
        );
        let model = cache.get_or_fit(&s, order, || patient.fit(&s, order)).unwrap();
        assert_eq!(model.order(), order);
        assert_eq!(cache.fit_count(), 3);
        assert_eq!(cache.len(), 1);
    }
}
