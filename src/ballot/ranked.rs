//! Cédula ordenada (ranking com empates).

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::Serialize;

use super::Candidate;
use crate::types::errors::{TallyError, TallyResult};

/// Ranking de um eleitor: posição -> candidatos.
///
/// Cada candidato aparece no máximo uma vez. Candidatos ausentes estão
/// "não ranqueados", abaixo de todos os ranqueados. Vários candidatos com
/// a mesma posição estão empatados. Lacunas nas posições são legais e
/// equivalem à versão compactada.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RankedBallot {
    ranks: BTreeMap<Candidate, u32>,
}

impl RankedBallot {
    /// Constrói a partir de pares (candidato, posição), posições >= 1.
    ///
    /// Falha com `MalformedBallot` se a posição for zero ou se o mesmo
    /// candidato aparecer em posições diferentes.
    pub fn from_ranks<I, C>(entries: I) -> TallyResult<Self>
    where
        I: IntoIterator<Item = (C, u32)>,
        C: Into<Candidate>,
    {
        let mut ranks = BTreeMap::new();
        for (candidate, rank) in entries {
            let candidate = candidate.into();
            if rank == 0 {
                return Err(TallyError::malformed(format!(
                    "posição 0 para '{}' (posições começam em 1)",
                    candidate
                )));
            }
            match ranks.entry(candidate) {
                Entry::Vacant(slot) => {
                    slot.insert(rank);
                }
                Entry::Occupied(slot) if *slot.get() != rank => {
                    return Err(TallyError::malformed(format!(
                        "'{}' aparece nas posições {} e {}",
                        slot.key(),
                        slot.get(),
                        rank
                    )));
                }
                Entry::Occupied(_) => {}
            }
        }
        Ok(Self { ranks })
    }

    /// Constrói a partir de grupos ordenados; o grupo `i` recebe a posição `i + 1`.
    pub fn from_groups<I, G, C>(groups: I) -> TallyResult<Self>
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = C>,
        C: Into<Candidate>,
    {
        let entries = groups.into_iter().enumerate().flat_map(|(position, group)| {
            group
                .into_iter()
                .map(move |candidate| (candidate, position as u32 + 1))
        });
        Self::from_ranks(entries)
    }

    /// Constrói um ranking estrito (sem empates) na ordem dada.
    pub fn from_sequence<I, C>(candidates: I) -> TallyResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Candidate>,
    {
        Self::from_groups(candidates.into_iter().map(std::iter::once))
    }

    /// Posição do candidato, ou `None` se não ranqueado.
    pub fn rank_of(&self, candidate: &Candidate) -> Option<u32> {
        self.ranks.get(candidate).copied()
    }

    /// Candidatos ranqueados (ordem do identificador).
    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.ranks.keys()
    }

    /// Número de candidatos ranqueados.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Indica se as posições já estão compactadas em `1..=k`.
    pub fn is_normalized(&self) -> bool {
        let mut distinct: Vec<u32> = self.ranks.values().copied().collect();
        distinct.sort_unstable();
        distinct.dedup();
        distinct
            .iter()
            .enumerate()
            .all(|(i, rank)| *rank == i as u32 + 1)
    }

    /// Retorna uma cópia com as lacunas removidas, preservando ordem e empates.
    pub fn normalized(&self) -> Self {
        let mut distinct: Vec<u32> = self.ranks.values().copied().collect();
        distinct.sort_unstable();
        distinct.dedup();

        let ranks = self
            .ranks
            .iter()
            .map(|(candidate, rank)| {
                // busca sempre encontra: `distinct` veio dos mesmos valores
                let compact = distinct.binary_search(rank).unwrap_or_default() as u32 + 1;
                (candidate.clone(), compact)
            })
            .collect();
        Self { ranks }
    }

    /// Grupos de preferência, do mais preferido ao menos preferido.
    pub fn groups(&self) -> Vec<Vec<&Candidate>> {
        let mut by_rank: BTreeMap<u32, Vec<&Candidate>> = BTreeMap::new();
        for (candidate, rank) in &self.ranks {
            by_rank.entry(*rank).or_default().push(candidate);
        }
        by_rank.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sequence() {
        let ballot = RankedBallot::from_sequence(["A", "B", "C"]).unwrap();
        assert_eq!(ballot.rank_of(&"A".into()), Some(1));
        assert_eq!(ballot.rank_of(&"C".into()), Some(3));
        assert_eq!(ballot.rank_of(&"D".into()), None);
        assert!(ballot.is_normalized());
    }

    #[test]
    fn test_rank_zero_rejected() {
        let err = RankedBallot::from_ranks([("A", 0)]).unwrap_err();
        assert!(matches!(err, TallyError::MalformedBallot(_)));
    }

    #[test]
    fn test_duplicate_different_rank_rejected() {
        let err = RankedBallot::from_ranks([("A", 1), ("B", 2), ("A", 3)]).unwrap_err();
        assert!(matches!(err, TallyError::MalformedBallot(_)));
    }

    #[test]
    fn test_duplicate_same_rank_tolerated() {
        let ballot = RankedBallot::from_ranks([("A", 1), ("A", 1)]).unwrap();
        assert_eq!(ballot.len(), 1);
    }

    #[test]
    fn test_normalize_compacts_gaps_and_keeps_ties() {
        let ballot = RankedBallot::from_ranks([("A", 2), ("B", 5), ("C", 5), ("D", 9)]).unwrap();
        assert!(!ballot.is_normalized());

        let normalized = ballot.normalized();
        assert!(normalized.is_normalized());
        assert_eq!(normalized.rank_of(&"A".into()), Some(1));
        assert_eq!(normalized.rank_of(&"B".into()), Some(2));
        assert_eq!(normalized.rank_of(&"C".into()), Some(2));
        assert_eq!(normalized.rank_of(&"D".into()), Some(3));
        assert_eq!(ballot.groups(), normalized.groups());
    }

    #[test]
    fn test_groups_with_ties() {
        let ballot = RankedBallot::from_groups([vec!["B", "A"], vec!["C"]]).unwrap();
        let groups = ballot.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1][0].as_str(), "C");
    }
}
