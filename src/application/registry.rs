//! Hash → (configuration, routing context) lookup for the script endpoint.
//!
//! The footer injector records every pair it links; the script endpoint only
//! ever sees the hash in the requested file name.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;
use metrics::counter;
use tracing::warn;

use crate::domain::hash::ConfigHash;
use crate::domain::options::PagelessConfig;
use crate::domain::routing::RoutingContext;

const SOURCE: &str = "application::registry";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    pub config: PagelessConfig,
    pub context: RoutingContext,
}

pub struct ScriptRegistry {
    entries: Mutex<LruCache<ConfigHash, ScriptEntry>>,
}

impl ScriptRegistry {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Record a pair and return its hash.
    pub fn register(&self, config: &PagelessConfig, context: &RoutingContext) -> ConfigHash {
        let hash = ConfigHash::compute(config, context);
        let mut entries = self.lock("register");
        if entries.get(&hash).is_none() {
            let evicted = entries.push(
                hash,
                ScriptEntry {
                    config: config.clone(),
                    context: context.clone(),
                },
            );
            if matches!(evicted, Some((key, _)) if key != hash) {
                counter!("pageless_registry_evict_total").increment(1);
            }
        }
        hash
    }

    pub fn lookup(&self, hash: &ConfigHash) -> Option<ScriptEntry> {
        self.lock("lookup").get(hash).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock("len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self, op: &'static str) -> MutexGuard<'_, LruCache<ConfigHash, ScriptEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(
                    op,
                    target_module = SOURCE,
                    lock_kind = "mutex.lock",
                    result = "poisoned_recovered",
                    "Recovered from poisoned registry lock"
                );
                poisoned.into_inner()
            }
        }
    }
}
