//! Cache LRU para resultados de apuração.
//!
//! Uma apuração é função pura da eleição congelada, do método, da política
//! de desempate e do número de vagas. O cache guarda resultados recentes
//! sob um hash desses quatro elementos, evitando reapurar a mesma eleição
//! ao comparar métodos.

mod results;

pub use results::{CacheKey, CacheStats, CachedResult, TabulationCache};
