//! Cache LRU de resultados de apuração.

use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;
use sha2::{Digest, Sha256};

use crate::election::Election;
use crate::result::TabulationResult;
use crate::rules::Method;
use crate::types::config::{CacheConfig, TieBreakConfig};

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Chave de cache: SHA-256 (hex) de eleição, método, política e vagas.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resultado em cache.
#[derive(Debug, Clone)]
pub struct CachedResult {
    pub result: TabulationResult,
    pub cached_at: DateTime<Utc>,
}

impl CachedResult {
    fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        // relógio voltando no tempo não expira a entrada
        now.signed_duration_since(self.cached_at)
            .to_std()
            .is_ok_and(|age| age >= ttl)
    }
}

/// Estatísticas do cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fração das buscas atendidas pelo cache (0 sem buscas).
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }
}

/// Cache LRU com expiração para resultados de apuração.
///
/// Uma apuração é função pura da chave, então a expiração só limita por
/// quanto tempo um resultado antigo fica em memória.
pub struct TabulationCache {
    entries: LruCache<CacheKey, CachedResult>,
    ttl: Duration,
    hits: u64,
    misses: u64,
}

impl TabulationCache {
    /// Capacidade zero cai para 64 entradas.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY)),
            ttl,
            hits: 0,
            misses: 0,
        }
    }

    /// Cria o cache a partir da seção `[cache]` da configuração.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, Duration::from_secs(config.ttl_secs))
    }

    /// Chave para apurar `election` com `method`, a política `tie_break` e
    /// `winners` vagas. As opções do método e a semente entram no hash.
    pub fn cache_key(
        election: &Election,
        method: &Method,
        tie_break: &TieBreakConfig,
        winners: usize,
    ) -> CacheKey {
        let digest = Sha256::new()
            .chain_update(election.digest())
            .chain_update(format!("{:?}", method))
            .chain_update(format!("{:?}", tie_break))
            .chain_update((winners as u64).to_le_bytes())
            .finalize();
        CacheKey(hex::encode(digest))
    }

    /// Resultado guardado sob `key`, se existir e não tiver expirado.
    pub fn get(&mut self, key: &CacheKey) -> Option<&TabulationResult> {
        let now = Utc::now();
        if self
            .entries
            .peek(key)
            .is_some_and(|entry| entry.is_expired(self.ttl, now))
        {
            self.entries.pop(key);
        }

        match self.entries.get(key) {
            Some(entry) => {
                self.hits += 1;
                Some(&entry.result)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: CacheKey, result: TabulationResult) {
        self.entries.put(
            key,
            CachedResult {
                result,
                cached_at: Utc::now(),
            },
        );
    }

    pub fn invalidate(&mut self, key: &CacheKey) -> Option<TabulationResult> {
        self.entries.pop(key).map(|entry| entry.result)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            capacity: self.entries.cap().get(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Remove as entradas expiradas e devolve quantas saíram.
    pub fn purge_expired(&mut self) -> usize {
        let now = Utc::now();
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.ttl, now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            self.entries.pop(key);
        }
        if !expired.is_empty() {
            tracing::debug!(removed = expired.len(), "Entradas expiradas removidas");
        }
        expired.len()
    }
}

impl Default for TabulationCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
