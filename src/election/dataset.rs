//! Conjunto de dados eleitoral: lista de candidatos + multiconjunto de cédulas.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::ballot::{Ballot, BallotShape, Candidate, ScoreRange};
use crate::types::errors::{TallyError, TallyResult};

/// Cédula com multiplicidade (cédulas idênticas agregadas).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightedBallot {
    pub ballot: Ballot,
    pub count: u64,
}

/// Cédula compilada para os motores: grupos de índices de candidatos.
#[derive(Debug, Clone)]
pub(crate) struct Profile {
    pub groups: Vec<Vec<usize>>,
    pub count: u64,
}

/// Construtor mutável de uma eleição.
///
/// Cada cédula é validada na inserção; `freeze` produz a [`Election`]
/// imutável consumida pelos motores de apuração.
#[derive(Debug, Clone)]
pub struct ElectionBuilder {
    candidates: BTreeSet<Candidate>,
    shape: BallotShape,
    score_range: Option<ScoreRange>,
    ballots: Vec<WeightedBallot>,
}

impl ElectionBuilder {
    /// Eleição com cédulas ordenadas.
    pub fn ranked<I, C>(candidates: I) -> TallyResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Candidate>,
    {
        Self::with_shape(candidates, BallotShape::Ranked, None)
    }

    /// Eleição com cédulas de notas no intervalo `range`.
    pub fn rated<I, C>(candidates: I, range: ScoreRange) -> TallyResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Candidate>,
    {
        Self::with_shape(candidates, BallotShape::Rated, Some(range))
    }

    fn with_shape<I, C>(
        candidates: I,
        shape: BallotShape,
        score_range: Option<ScoreRange>,
    ) -> TallyResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Candidate>,
    {
        let mut roster = BTreeSet::new();
        for candidate in candidates {
            let candidate = candidate.into();
            if !roster.insert(candidate.clone()) {
                return Err(TallyError::DuplicateCandidate(candidate.to_string()));
            }
        }
        Ok(Self {
            candidates: roster,
            shape,
            score_range,
            ballots: Vec::new(),
        })
    }

    /// Adiciona uma cédula.
    pub fn add_ballot(&mut self, ballot: impl Into<Ballot>) -> TallyResult<&mut Self> {
        self.add_ballots(ballot, 1)
    }

    /// Adiciona `count` cópias idênticas de uma cédula. `count == 0` é ignorado.
    pub fn add_ballots(&mut self, ballot: impl Into<Ballot>, count: u64) -> TallyResult<&mut Self> {
        let ballot = ballot.into();
        self.validate(&ballot)?;
        if count > 0 {
            self.ballots.push(WeightedBallot {
                ballot: ballot.normalized(),
                count,
            });
        }
        Ok(self)
    }

    fn validate(&self, ballot: &Ballot) -> TallyResult<()> {
        if ballot.shape() != self.shape {
            return Err(TallyError::malformed(format!(
                "cédula do tipo '{}' numa eleição do tipo '{}'",
                ballot.shape(),
                self.shape
            )));
        }
        if let Some(unknown) = ballot.candidates().find(|c| !self.candidates.contains(*c)) {
            return Err(TallyError::UnknownCandidate(unknown.to_string()));
        }
        if let (Ballot::Rated(rated), Some(range)) = (ballot, &self.score_range) {
            rated.validate(range)?;
        }
        Ok(())
    }

    /// Número de cédulas inseridas até agora (com multiplicidade).
    pub fn ballot_count(&self) -> u64 {
        self.ballots.iter().map(|b| b.count).sum()
    }

    /// Congela o conjunto de dados.
    ///
    /// Cédulas idênticas são fundidas e ordenadas canonicamente, então a
    /// ordem de inserção nunca chega aos motores.
    pub fn freeze(self) -> Election {
        let mut merged: BTreeMap<Ballot, u64> = BTreeMap::new();
        for entry in self.ballots {
            *merged.entry(entry.ballot).or_insert(0) += entry.count;
        }
        let ballots: Vec<WeightedBallot> = merged
            .into_iter()
            .map(|(ballot, count)| WeightedBallot { ballot, count })
            .collect();
        let total: u64 = ballots.iter().map(|b| b.count).sum();
        let candidates: Vec<Candidate> = self.candidates.into_iter().collect();
        let digest = compute_digest(&candidates, self.shape, self.score_range, &ballots);

        tracing::debug!(
            candidates = candidates.len(),
            ballots = total,
            distinct = ballots.len(),
            "Eleição congelada"
        );

        Election {
            candidates,
            shape: self.shape,
            score_range: self.score_range,
            ballots,
            total,
            digest,
        }
    }
}

/// Eleição congelada (imutável).
///
/// Pode ser compartilhada entre apurações concorrentes: os motores só leem.
#[derive(Debug, Clone)]
pub struct Election {
    candidates: Vec<Candidate>,
    shape: BallotShape,
    score_range: Option<ScoreRange>,
    ballots: Vec<WeightedBallot>,
    total: u64,
    digest: String,
}

impl Election {
    /// Candidatos, em ordem do identificador.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// Total de cédulas (eleitores).
    pub fn ballot_count(&self) -> u64 {
        self.total
    }

    /// Cédulas distintas com multiplicidade, em ordem canônica.
    pub fn ballots(&self) -> &[WeightedBallot] {
        &self.ballots
    }

    pub fn shape(&self) -> BallotShape {
        self.shape
    }

    pub fn score_range(&self) -> Option<ScoreRange> {
        self.score_range
    }

    /// Impressão digital SHA-256 (hex) do conteúdo canônico.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn contains(&self, candidate: &Candidate) -> bool {
        self.index_of(candidate).is_some()
    }

    pub(crate) fn index_of(&self, candidate: &Candidate) -> Option<usize> {
        self.candidates.binary_search(candidate).ok()
    }

    /// Quantas cédulas expressaram alguma opinião sobre cada candidato.
    pub fn participation(&self) -> BTreeMap<Candidate, u64> {
        let mut counts: BTreeMap<Candidate, u64> =
            self.candidates.iter().map(|c| (c.clone(), 0)).collect();
        for entry in &self.ballots {
            for candidate in entry.ballot.candidates() {
                if let Some(count) = counts.get_mut(candidate) {
                    *count += entry.count;
                }
            }
        }
        counts
    }

    /// Participação de um único candidato.
    pub fn participation_of(&self, candidate: &Candidate) -> u64 {
        self.ballots
            .iter()
            .filter(|entry| entry.ballot.has_opinion(candidate))
            .map(|entry| entry.count)
            .sum()
    }

    /// Falha com `EmptyElection` se não houver candidatos ou cédulas.
    pub fn ensure_tabulable(&self) -> TallyResult<()> {
        if self.candidates.is_empty() {
            return Err(TallyError::EmptyElection("nenhum candidato".to_string()));
        }
        if self.total == 0 {
            return Err(TallyError::EmptyElection("nenhuma cédula".to_string()));
        }
        Ok(())
    }

    /// Compila as cédulas em grupos de índices.
    pub(crate) fn profiles(&self) -> Vec<Profile> {
        self.ballots
            .iter()
            .map(|entry| Profile {
                groups: entry
                    .ballot
                    .preference_groups()
                    .into_iter()
                    .map(|group| group.into_iter().filter_map(|c| self.index_of(c)).collect())
                    .collect(),
                count: entry.count,
            })
            .collect()
    }
}

fn compute_digest(
    candidates: &[Candidate],
    shape: BallotShape,
    score_range: Option<ScoreRange>,
    ballots: &[WeightedBallot],
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(shape.to_string().as_bytes());
    if let Some(range) = score_range {
        hasher.update(format!("|{}:{}", range.min, range.max).as_bytes());
    }
    hasher.update(b"\n");
    for candidate in candidates {
        hasher.update(candidate.as_str().as_bytes());
        hasher.update(b"\x1f");
    }
    hasher.update(b"\n");
    for entry in ballots {
        hasher.update(entry.count.to_string().as_bytes());
        hasher.update(b"*");
        for (position, group) in entry.ballot.preference_groups().iter().enumerate() {
            for candidate in group {
                let value = entry
                    .ballot
                    .score_of(candidate)
                    .map(i64::from)
                    .unwrap_or(position as i64 + 1);
                hasher.update(format!("{}={};", candidate.as_str().len(), value).as_bytes());
                hasher.update(candidate.as_str().as_bytes());
            }
        }
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}
