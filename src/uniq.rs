//! Unique identifier generation.

use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

static GLOBAL_UNIQ: LazyLock<Uniq> = LazyLock::new(Uniq::new);

/// Generator of identifiers of the form `uniq<seed><n>`.
///
/// The seed is the creation time in milliseconds, `n` a counter that only ever
/// grows. Identifiers are opaque: the counter guarantees uniqueness, not order.
#[derive(Debug)]
pub struct Uniq {
    seed: u128,
    count: AtomicU64,
}

impl Default for Uniq {
    fn default() -> Self {
        Self::new()
    }
}

impl Uniq {
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u128) -> Self {
        Self {
            seed,
            count: AtomicU64::new(0),
        }
    }

    pub fn uniq(&self) -> String {
        let n = self.count.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        format!("{}{}", self.prefix(), n)
    }

    /// Key under which an object's identifier is stored.
    pub fn expando(&self) -> String {
        format!("__{}", self.seed)
    }

    pub fn prefix(&self) -> String {
        format!("uniq{}", self.seed)
    }

    /// Returns the identifier stored on `object`, assigning a fresh one first
    /// unless `only_get` is set.
    ///
    /// Non-object values cannot carry an identifier and always get a fresh one.
    pub fn identify(&self, object: &mut Value, only_get: bool) -> Option<String> {
        let Value::Object(map) = object else {
            return Some(self.uniq());
        };

        let expando = self.expando();
        if let Some(existing) = map.get(&expando) {
            return existing.as_str().map(str::to_owned);
        }
        if only_get {
            return None;
        }

        let id = self.uniq();
        map.insert(expando, Value::String(id.clone()));
        Some(id)
    }
}

/// Fresh identifier from the process-wide generator.
pub fn get_uniq() -> String {
    GLOBAL_UNIQ.uniq()
}

/// [`Uniq::identify`] against the process-wide generator.
pub fn identify(object: &mut Value, only_get: bool) -> Option<String> {
    GLOBAL_UNIQ.identify(object, only_get)
}
