// Drone Wx Profile - METAR/SPECI and PIREP summaries for drone operations
// Copyright (C) 2025 FiendishDrWu
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Short-lived memo of API answers. AviationWeather.gov rate limits
//! clients, and flipping between views re-asks the same questions.

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::awc_api::{normalize_station, ReportSource};
use crate::geo::BoundingBox;
use crate::report::RawReport;
use crate::Result;

pub const METAR_TTL: Duration = Duration::from_secs(120);
pub const PIREP_TTL: Duration = Duration::from_secs(180);

/// Distinct queries remembered per report kind before the least recently
/// used one is dropped.
pub const CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

struct CachedEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CachedEntry<V> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }
}

/// LRU map whose entries also go stale after a fixed TTL.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: LruCache<K, CachedEntry<V>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, CACHE_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, capacity: NonZeroUsize) -> Self {
        Self {
            ttl,
            entries: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        let expired = self.entries.get(key)?.is_expired(self.ttl);
        if expired {
            self.entries.pop(key);
            return None;
        }
        self.entries.peek(key).map(|entry| entry.value.clone())
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.evict_expired();
        self.entries.put(
            key,
            CachedEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    // Stale entries collect at the LRU end unless something keeps reading them.
    fn evict_expired(&mut self) {
        while let Some((_, entry)) = self.entries.peek_lru() {
            if !entry.is_expired(self.ttl) {
                break;
            }
            self.entries.pop_lru();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

type MetarKey = (String, u32);
type PirepKey = (String, u32);

/// A [`ReportSource`] that answers repeated identical queries from memory
/// until their TTL runs out. Failures are never cached.
pub struct CachedSource<S> {
    inner: S,
    metars: Mutex<TtlCache<MetarKey, Vec<RawReport>>>,
    pireps: Mutex<TtlCache<PirepKey, Vec<RawReport>>>,
}

impl<S: ReportSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self::with_ttls(inner, METAR_TTL, PIREP_TTL)
    }

    pub fn with_ttls(inner: S, metar_ttl: Duration, pirep_ttl: Duration) -> Self {
        Self {
            inner,
            metars: Mutex::new(TtlCache::new(metar_ttl)),
            pireps: Mutex::new(TtlCache::new(pirep_ttl)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.metars.lock() {
            cache.clear();
        }
        if let Ok(mut cache) = self.pireps.lock() {
            cache.clear();
        }
    }
}

impl<S: ReportSource> ReportSource for CachedSource<S> {
    fn metars(&self, station: &str, hours: u32) -> Result<Vec<RawReport>> {
        let key = (normalize_station(station), hours);
        cached(&self.metars, key, || self.inner.metars(station, hours))
    }

    fn pireps(&self, bbox: &BoundingBox, hours: u32) -> Result<Vec<RawReport>> {
        // the serialized form is what the API sees, so it is the identity
        let key = (bbox.to_query_param(), hours);
        cached(&self.pireps, key, || self.inner.pireps(bbox, hours))
    }
}

fn cached<K, F>(cache: &Mutex<TtlCache<K, Vec<RawReport>>>, key: K, fetch: F) -> Result<Vec<RawReport>>
where
    K: Eq + Hash + std::fmt::Debug,
    F: FnOnce() -> Result<Vec<RawReport>>,
{
    if let Ok(mut guard) = cache.lock() {
        if let Some(hit) = guard.get(&key) {
            debug!(?key, "cache hit");
            return Ok(hit);
        }
    }

    debug!(?key, "cache miss");
    let reports = fetch()?;
    if let Ok(mut guard) = cache.lock() {
        guard.insert(key, reports.clone());
    }
    Ok(reports)
}
