//! Sharded string interner for identifier storage.
//!
//! Provides O(1) interning and lookup with thread-safe concurrent access via
//! per-shard locking. One interner may be shared by parsers running on
//! independent modules; the shard locks provide the required mutual
//! exclusion.

use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Per-shard storage for interned strings.
struct InternShard {
    /// Map from string content to local index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents.
    strings: Vec<&'static str>,
}

impl InternShard {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        }
    }

    fn with_empty() -> Self {
        let mut shard = Self::new();
        // Pre-intern empty string at index 0
        let empty: &'static str = "";
        shard.map.insert(empty, 0);
        shard.strings.push(empty);
        shard
    }
}

/// Sharded string interner for concurrent access.
///
/// Interned strings are leaked for `'static` lifetime; the pool is
/// append-only and never deallocates.
pub struct StringInterner {
    shards: [RwLock<InternShard>; Name::NUM_SHARDS],
    /// Total count of interned strings across all shards (O(1) `len()`).
    total_count: AtomicUsize,
    /// Counter for `generate_id` synthesized names.
    generated: AtomicUsize,
}

impl StringInterner {
    /// Create a new interner with pre-interned well-known identifiers.
    pub fn new() -> Self {
        let shards = std::array::from_fn(|i| {
            if i == 0 {
                RwLock::new(InternShard::with_empty())
            } else {
                RwLock::new(InternShard::new())
            }
        });

        // Start with 1 for the empty string pre-interned in shard 0
        let interner = Self {
            shards,
            total_count: AtomicUsize::new(1),
            generated: AtomicUsize::new(0),
        };
        interner.pre_intern_well_known();
        interner
    }

    /// Compute shard for a string based on its hash.
    #[inline]
    fn shard_for(s: &str) -> usize {
        let mut hash = 0u32;
        for byte in s.bytes().take(8) {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(byte));
        }
        (hash as usize) % Name::NUM_SHARDS
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if a shard exceeds capacity (over 256 million strings).
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        let shard_idx = Self::shard_for(s);
        let shard_idx_u32 = shard_idx as u32;
        let shard = &self.shards[shard_idx];

        // Fast path: check if already interned
        {
            let guard = shard.read();
            if let Some(&local) = guard.map.get(s) {
                return Name::new(shard_idx_u32, local);
            }
        }

        // Slow path: need to insert
        let mut guard = shard.write();

        // Double-check after acquiring write lock
        if let Some(&local) = guard.map.get(s) {
            return Name::new(shard_idx_u32, local);
        }

        // Leak the string to get 'static lifetime
        let owned: String = s.to_owned();
        let leaked: &'static str = Box::leak(owned.into_boxed_str());

        let local = u32::try_from(guard.strings.len())
            .ok()
            .filter(|&l| l <= Name::MAX_LOCAL)
            .unwrap_or_else(|| panic!("interner shard {shard_idx} exceeded capacity"));
        guard.strings.push(leaked);
        guard.map.insert(leaked, local);

        self.total_count.fetch_add(1, Ordering::Relaxed);

        Name::new(shard_idx_u32, local)
    }

    /// Look up the string for a Name.
    pub fn lookup(&self, name: Name) -> &'static str {
        let shard = &self.shards[name.shard()];
        let guard = shard.read();
        guard.strings[name.local()]
    }

    /// Generate a fresh synthesized identifier with the given prefix.
    ///
    /// Used for names the source never wrote: implicit template type
    /// parameters for untyped lambda parameters, mixin pseudo-filenames.
    pub fn generate_id(&self, prefix: &str) -> Name {
        let n = self.generated.fetch_add(1, Ordering::Relaxed);
        self.intern(&format!("__{prefix}{n}"))
    }

    /// Pre-intern identifiers the parser compares by handle identity.
    fn pre_intern_well_known(&self) {
        const WELL_KNOWN: &[&str] = &[
            // contract / scope-guard / linkage identifiers
            "body",
            "exit",
            "failure",
            "success",
            "Windows",
            "Pascal",
            "System",
            "C",
            "D",
            "Objective",
            // predefined @-attributes
            "safe",
            "trusted",
            "system",
            "live",
            "nogc",
            "property",
            "disable",
            "future",
            // pragma / version identifiers that get special handling
            "msg",
            "lib",
            "mangle",
            "unittest",
            "assert",
        ];

        for id in WELL_KNOWN {
            self.intern(id);
        }
    }

    /// Get the number of interned strings (O(1)).
    pub fn len(&self) -> usize {
        self.total_count.load(Ordering::Relaxed)
    }

    /// Check if the interner is empty (only has the empty string).
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
