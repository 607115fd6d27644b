//! Cédula de notas (score/rated).

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::Candidate;
use crate::types::errors::{TallyError, TallyResult};

/// Intervalo fechado de notas válidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: i32,
    pub max: i32,
}

impl ScoreRange {
    /// Cria um intervalo, exigindo `min <= max`.
    pub fn new(min: i32, max: i32) -> TallyResult<Self> {
        if min > max {
            return Err(TallyError::invalid(format!(
                "intervalo de notas vazio: [{}, {}]",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// Verifica se a nota está dentro do intervalo.
    pub fn contains(&self, score: i32) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

impl Default for ScoreRange {
    fn default() -> Self {
        Self { min: 0, max: 9 }
    }
}

impl fmt::Display for ScoreRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Notas de um eleitor. Ausência de candidato = sem opinião (nulo),
/// diferente de nota zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RatedBallot {
    scores: BTreeMap<Candidate, i32>,
}

impl RatedBallot {
    /// Constrói a partir de pares (candidato, nota) validados contra `range`.
    pub fn new<I, C>(entries: I, range: &ScoreRange) -> TallyResult<Self>
    where
        I: IntoIterator<Item = (C, i32)>,
        C: Into<Candidate>,
    {
        let mut scores = BTreeMap::new();
        for (candidate, score) in entries {
            let candidate = candidate.into();
            match scores.entry(candidate) {
                Entry::Vacant(slot) => {
                    slot.insert(score);
                }
                Entry::Occupied(slot) if *slot.get() != score => {
                    return Err(TallyError::malformed(format!(
                        "'{}' recebeu as notas {} e {}",
                        slot.key(),
                        slot.get(),
                        score
                    )));
                }
                Entry::Occupied(_) => {}
            }
        }
        let ballot = Self { scores };
        ballot.validate(range)?;
        Ok(ballot)
    }

    /// Verifica que todas as notas estão no intervalo.
    pub fn validate(&self, range: &ScoreRange) -> TallyResult<()> {
        match self.scores.iter().find(|(_, score)| !range.contains(**score)) {
            Some((candidate, score)) => Err(TallyError::malformed(format!(
                "nota {} de '{}' fora do intervalo {}",
                score, candidate, range
            ))),
            None => Ok(()),
        }
    }

    /// Nota do candidato, ou `None` se o eleitor não opinou.
    pub fn score_of(&self, candidate: &Candidate) -> Option<i32> {
        self.scores.get(candidate).copied()
    }

    pub fn scores(&self) -> impl Iterator<Item = (&Candidate, i32)> {
        self.scores.iter().map(|(c, s)| (c, *s))
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.scores.keys()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Ranking induzido: nota maior primeiro, notas iguais empatadas.
    pub fn groups(&self) -> Vec<Vec<&Candidate>> {
        let mut by_score: BTreeMap<std::cmp::Reverse<i32>, Vec<&Candidate>> = BTreeMap::new();
        for (candidate, score) in &self.scores {
            by_score
                .entry(std::cmp::Reverse(*score))
                .or_default()
                .push(candidate);
        }
        by_score.into_values().collect()
    }

    /// Candidatos com a maior nota da cédula.
    pub fn top_scored(&self) -> Vec<&Candidate> {
        self.groups().into_iter().next().unwrap_or_default()
    }
}
