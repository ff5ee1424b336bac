use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::debug;

/// A zero-argument constructor for `T`, as registered with a
/// [`FactoryRegistry`].
///
/// Cloning is cheap (one `Arc` bump). The decoder clones the factory out
/// of the registry and calls it after the registry lock is released, so
/// a slow or panicking constructor never blocks or poisons other
/// lookups.
pub struct Factory<T> {
    ctor: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T> Factory<T> {
    /// Produce a fresh, field-empty instance.
    #[must_use]
    pub fn create(&self) -> T {
        (self.ctor)()
    }
}

impl<T> Clone for Factory<T> {
    fn clone(&self) -> Self {
        Self {
            ctor: Arc::clone(&self.ctor),
        }
    }
}

/// Registry of caller-supplied constructors, keyed by target type.
///
/// The decoder consults the registry every time it needs a new
/// composite instance; only when no entry exists does it fall back to
/// the type's own default construction
/// ([`SqlData::construct_default`](crate::SqlData::construct_default)).
///
/// The registry is an explicit object rather than a process global:
/// create one at client start-up, wrap it in an `Arc`, and hand it to
/// every [`StructDecoder`](crate::StructDecoder). Registration takes
/// effect for all subsequent decodes sharing that registry, including
/// decodes already running on other threads.
///
/// # Concurrency
///
/// Entries are stored whole behind an [`RwLock`]: a lookup observes
/// either a fully installed factory or none. Lookups take the read lock;
/// `register` / `unregister` take the write lock. Multiple concurrent
/// lookups are allowed; mutations are exclusive.
///
/// # Example
///
/// ```rust
/// use strata_decoder::FactoryRegistry;
///
/// #[derive(Default)]
/// struct Point { x: i64, y: i64 }
///
/// let registry = FactoryRegistry::new();
/// registry.register::<Point>(Point::default);
/// assert!(registry.contains::<Point>());
///
/// let point = registry.lookup::<Point>().unwrap().create();
/// assert_eq!((point.x, point.y), (0, 0));
///
/// assert!(registry.unregister::<Point>());
/// assert!(registry.lookup::<Point>().is_none());
/// ```
pub struct FactoryRegistry {
    factories: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl FactoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// Install `ctor` as the constructor for `T`, replacing any previous
    /// entry for the same type.
    ///
    /// `ctor` must return a fresh instance on every call; the decoder
    /// fills it field by field and hands ownership to the caller.
    pub fn register<T: 'static>(&self, ctor: impl Fn() -> T + Send + Sync + 'static) {
        let factory = Factory::<T> {
            ctor: Arc::new(ctor),
        };
        let replaced = self
            .factories
            .write()
            .expect("factory registry lock poisoned")
            .insert(TypeId::of::<T>(), Box::new(factory))
            .is_some();
        debug!(target_type = type_name::<T>(), replaced, "registered factory");
    }

    /// Remove the constructor for `T`. Returns `true` if one was
    /// installed; unregistering an absent type is a no-op.
    pub fn unregister<T: 'static>(&self) -> bool {
        let removed = self
            .factories
            .write()
            .expect("factory registry lock poisoned")
            .remove(&TypeId::of::<T>())
            .is_some();
        debug!(target_type = type_name::<T>(), removed, "unregistered factory");
        removed
    }

    /// Return the constructor registered for `T`, if any.
    #[must_use]
    pub fn lookup<T: 'static>(&self) -> Option<Factory<T>> {
        self.factories
            .read()
            .expect("factory registry lock poisoned")
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Factory<T>>())
            .cloned()
    }

    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.factories
            .read()
            .expect("factory registry lock poisoned")
            .contains_key(&TypeId::of::<T>())
    }

    /// Number of registered target types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories
            .read()
            .expect("factory registry lock poisoned")
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[derive(Debug, Default, PartialEq)]
    struct Simple {
        tag: &'static str,
    }

    #[test]
    fn lookup_absent_returns_none() {
        let registry = FactoryRegistry::new();
        assert!(registry.lookup::<Simple>().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn register_then_lookup_creates_instances() {
        let registry = FactoryRegistry::new();
        registry.register(|| Simple { tag: "factory" });
        let factory = registry.lookup::<Simple>().unwrap();
        assert_eq!(factory.create(), Simple { tag: "factory" });
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_overwrites_previous_entry() {
        let registry = FactoryRegistry::new();
        registry.register(|| Simple { tag: "first" });
        registry.register(|| Simple { tag: "second" });
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup::<Simple>().unwrap().create().tag, "second");
    }

    #[test]
    fn unregister_absent_is_noop() {
        let registry = FactoryRegistry::new();
        assert!(!registry.unregister::<Simple>());
        registry.register(Simple::default);
        assert!(registry.unregister::<Simple>());
        assert!(!registry.contains::<Simple>());
    }

    #[test]
    fn entries_are_keyed_by_type() {
        let registry = FactoryRegistry::new();
        registry.register(|| 7_i64);
        registry.register(Simple::default);
        assert_eq!(registry.lookup::<i64>().unwrap().create(), 7);
        assert!(registry.lookup::<i32>().is_none());
    }

    #[test]
    fn factory_is_called_once_per_create() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = FactoryRegistry::new();
        let counter = Arc::clone(&calls);
        registry.register(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Simple::default()
        });
        let factory = registry.lookup::<Simple>().unwrap();
        factory.create();
        factory.create();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_lookups_see_whole_entries() {
        let registry = Arc::new(FactoryRegistry::new());
        let writer = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..500 {
                    registry.register(|| Simple { tag: "installed" });
                    registry.unregister::<Simple>();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..500 {
                        if let Some(factory) = registry.lookup::<Simple>() {
                            assert_eq!(factory.create().tag, "installed");
                        }
                    }
                })
            })
            .collect();
        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert!(registry.lookup::<Simple>().is_none());
    }
}
