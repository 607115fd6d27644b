//! Comparação de métodos sobre a mesma eleição.
//!
//! O [`ElectionAnalyzer`] apura uma eleição congelada com vários métodos.
//! Como a eleição é só lida, as apurações que não estão no cache rodam em
//! paralelo, cada uma com sua própria instância da política de desempate.

use std::thread;

use serde::Serialize;

use crate::ballot::Candidate;
use crate::cache::{CacheKey, CacheStats, TabulationCache};
use crate::election::Election;
use crate::result::{Outcome, TabulationResult};
use crate::rules::Method;
use crate::tiebreak::{create_tie_breaker, Precedence};
use crate::types::config::{Config, MethodKind, TabulationConfig, TieBreakConfig, TieBreakPolicy};
use crate::types::errors::{TallyError, TallyResult};

/// Resumo de um método na comparação.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSummary {
    pub method: MethodKind,
    pub outcome: Outcome,
    pub majority: Option<Candidate>,
    pub rounds: u32,
}

/// Comparação entre métodos.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Digest da eleição comparada.
    pub election_digest: String,

    /// Um resumo por método apurado, na ordem pedida.
    pub summaries: Vec<MethodSummary>,

    /// Métodos que não aceitam a forma das cédulas.
    pub skipped: Vec<MethodKind>,

    /// Vencedor de Condorcet, se o método foi apurado e ele existe.
    pub condorcet_winner: Option<Candidate>,
}

impl Comparison {
    /// Indica se todos os métodos decidiram os mesmos vencedores.
    pub fn agreement(&self) -> bool {
        let mut decided = self.summaries.iter().map(|s| match &s.outcome {
            Outcome::Decided { winners } => Some(winners),
            Outcome::Unresolved { .. } => None,
        });
        match decided.next() {
            Some(Some(first)) => decided.all(|w| w == Some(first)),
            _ => false,
        }
    }

    /// Vencedores comuns a todos os métodos, se houver acordo.
    pub fn consensus(&self) -> Option<&[Candidate]> {
        if !self.agreement() {
            return None;
        }
        self.summaries.first().map(|s| match &s.outcome {
            Outcome::Decided { winners } | Outcome::Unresolved { winners, .. } => winners.as_slice(),
        })
    }

    pub fn summary(&self, method: MethodKind) -> Option<&MethodSummary> {
        self.summaries.iter().find(|s| s.method == method)
    }
}

/// Apura uma eleição com vários métodos, reaproveitando resultados em cache.
pub struct ElectionAnalyzer {
    tabulation: TabulationConfig,
    tie_break: TieBreakConfig,
    cache: Option<TabulationCache>,
}

impl ElectionAnalyzer {
    /// Cria o analisador a partir da configuração.
    pub fn new(config: &Config) -> Self {
        let cache = config
            .cache
            .enabled
            .then(|| TabulationCache::from_config(&config.cache));
        Self {
            tabulation: config.tabulation.clone(),
            tie_break: config.tie_break.clone(),
            cache,
        }
    }

    /// Desativa o cache.
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(TabulationCache::stats)
    }

    /// Método `kind` com as opções configuradas.
    pub fn method(&self, kind: MethodKind) -> Method {
        Method::for_kind(kind, &self.tabulation)
    }

    /// Apura com o método configurado.
    pub fn tabulate(&mut self, election: &Election) -> TallyResult<TabulationResult> {
        self.tabulate_with(election, self.method(self.tabulation.method))
    }

    /// Apura com um método específico.
    pub fn tabulate_with(
        &mut self,
        election: &Election,
        method: Method,
    ) -> TallyResult<TabulationResult> {
        self.check_policy(election)?;
        let winners = self.tabulation.winners;
        let key = TabulationCache::cache_key(election, &method, &self.tie_break, winners);

        if let Some(cache) = self.cache.as_mut() {
            if let Some(hit) = cache.get(&key) {
                tracing::debug!(method = %method, "Resultado em cache");
                return Ok(hit.clone());
            }
        }

        let result = method.tabulate(election, create_tie_breaker(&self.tie_break), winners)?;
        if let Some(cache) = self.cache.as_mut() {
            cache.insert(key, result.clone());
        }
        Ok(result)
    }

    /// Apura a eleição com cada método de `kinds` e compara os desfechos.
    ///
    /// Métodos incompatíveis com a forma das cédulas são pulados.
    pub fn compare(&mut self, election: &Election, kinds: &[MethodKind]) -> TallyResult<Comparison> {
        self.check_policy(election)?;
        let winners = self.tabulation.winners;

        let mut skipped = Vec::new();
        let mut slots: Vec<(Method, CacheKey, Option<TabulationResult>)> = Vec::new();
        for &kind in kinds {
            let method = self.method(kind);
            if !method.accepts(election.shape()) {
                skipped.push(kind);
                continue;
            }
            let key = TabulationCache::cache_key(election, &method, &self.tie_break, winners);
            let cached = self
                .cache
                .as_mut()
                .and_then(|cache| cache.get(&key).cloned());
            slots.push((method, key, cached));
        }

        let tie_break = &self.tie_break;
        let computed: Vec<TallyResult<TabulationResult>> = thread::scope(|scope| {
            let handles: Vec<_> = slots
                .iter()
                .filter(|(_, _, cached)| cached.is_none())
                .map(|(method, _, _)| {
                    scope.spawn(move || {
                        method.tabulate(election, create_tie_breaker(tie_break), winners)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(TallyError::other("apuração interrompida")))
                })
                .collect()
        });

        let mut computed = computed.into_iter();
        let mut results = Vec::with_capacity(slots.len());
        for (_, key, cached) in slots {
            let result = match cached {
                Some(result) => result,
                None => {
                    let result = computed
                        .next()
                        .unwrap_or_else(|| Err(TallyError::other("apuração ausente")))?;
                    if let Some(cache) = self.cache.as_mut() {
                        cache.insert(key, result.clone());
                    }
                    result
                }
            };
            results.push(result);
        }

        let condorcet_winner = results
            .iter()
            .filter_map(|r| r.pairwise.as_ref())
            .find_map(|p| p.condorcet_winner.clone());
        let summaries: Vec<MethodSummary> = results
            .into_iter()
            .map(|r| MethodSummary {
                method: r.method,
                rounds: r.rounds(),
                majority: r.majority,
                outcome: r.outcome,
            })
            .collect();

        let comparison = Comparison {
            election_digest: election.digest().to_string(),
            summaries,
            skipped,
            condorcet_winner,
        };
        tracing::info!(
            methods = comparison.summaries.len(),
            agreement = comparison.agreement(),
            "Comparação concluída"
        );
        Ok(comparison)
    }

    fn check_policy(&self, election: &Election) -> TallyResult<()> {
        if self.tie_break.policy == TieBreakPolicy::Precedence {
            Precedence::new(self.tie_break.precedence.iter()).validate(election)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ballot::{RankedBallot, RatedBallot, ScoreRange};
    use crate::election::ElectionBuilder;

    fn landslide() -> Election {
        let mut builder = ElectionBuilder::ranked(["A", "B", "C"]).unwrap();
        builder
            .add_ballots(RankedBallot::from_sequence(["A"]).unwrap(), 7)
            .unwrap();
        builder
            .add_ballots(RankedBallot::from_sequence(["B", "C"]).unwrap(), 2)
            .unwrap();
        builder.freeze()
    }

    fn split() -> Election {
        let mut builder = ElectionBuilder::ranked(["A", "B", "C"]).unwrap();
        for (order, count) in [
            (["A", "B", "C"], 2),
            (["B", "C", "A"], 1),
            (["C", "B", "A"], 2),
        ] {
            builder
                .add_ballots(RankedBallot::from_sequence(order).unwrap(), count)
                .unwrap();
        }
        builder.freeze()
    }

    #[test]
    fn test_compare_agreement() {
        let mut analyzer = ElectionAnalyzer::new(&Config::default());
        let comparison = analyzer.compare(&landslide(), &MethodKind::ALL).unwrap();

        assert_eq!(comparison.skipped, vec![MethodKind::Score]);
        assert_eq!(comparison.summaries.len(), 5);
        assert!(comparison.agreement());
        assert_eq!(comparison.consensus(), Some(&[Candidate::new("A")][..]));
        assert_eq!(comparison.condorcet_winner, Some(Candidate::new("A")));
    }

    #[test]
    fn test_compare_disagreement() {
        let mut analyzer = ElectionAnalyzer::new(&Config::default());
        let comparison = analyzer
            .compare(
                &split(),
                &[MethodKind::InstantRunoff, MethodKind::Condorcet, MethodKind::Borda],
            )
            .unwrap();

        assert!(!comparison.agreement());
        assert_eq!(comparison.consensus(), None);
        let irv = comparison.summary(MethodKind::InstantRunoff).unwrap();
        assert_eq!(
            irv.outcome,
            Outcome::Decided {
                winners: vec![Candidate::new("C")]
            }
        );
        assert_eq!(comparison.condorcet_winner, Some(Candidate::new("B")));
    }

    #[test]
    fn test_cache_reused_between_calls() {
        let mut analyzer = ElectionAnalyzer::new(&Config::default());
        let election = landslide();
        analyzer.compare(&election, &[MethodKind::Borda]).unwrap();
        analyzer.compare(&election, &[MethodKind::Borda]).unwrap();

        let stats = analyzer.cache_stats().unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_without_cache() {
        let analyzer = ElectionAnalyzer::new(&Config::default()).without_cache();
        assert!(analyzer.cache_stats().is_none());
    }

    #[test]
    fn test_tabulate_uses_configured_method() {
        let mut config = Config::default();
        config.tabulation.method = MethodKind::Plurality;
        let mut analyzer = ElectionAnalyzer::new(&config);
        let result = analyzer.tabulate(&landslide()).unwrap();
        assert_eq!(result.method, MethodKind::Plurality);
        assert_eq!(result.winner(), Some(&Candidate::new("A")));
    }

    #[test]
    fn test_unknown_precedence_candidate_rejected() {
        let mut config = Config::default();
        config.tie_break.policy = TieBreakPolicy::Precedence;
        config.tie_break.precedence = vec!["A".into(), "Zed".into()];
        let mut analyzer = ElectionAnalyzer::new(&config);
        assert!(matches!(
            analyzer.tabulate(&landslide()),
            Err(TallyError::UnknownCandidate(ref c)) if c == "Zed"
        ));
    }

    #[test]
    fn test_rated_election_includes_score() {
        let range = ScoreRange::default();
        let mut builder = ElectionBuilder::rated(["A", "B"], range).unwrap();
        builder
            .add_ballots(RatedBallot::new([("A", 8), ("B", 2)], &range).unwrap(), 4)
            .unwrap();
        let election = builder.freeze();

        let mut analyzer = ElectionAnalyzer::new(&Config::default());
        let comparison = analyzer.compare(&election, &MethodKind::ALL).unwrap();
        assert!(comparison.skipped.is_empty());
        assert!(comparison.summary(MethodKind::Score).is_some());
    }
}
