//! Políticas de desempate embutidas.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{TieBreaker, TieContext, TieDecision, TieOutcome};
use crate::ballot::Candidate;
use crate::election::Election;
use crate::types::errors::{TallyError, TallyResult};

/// Sempre reporta o empate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportTie;

impl TieBreaker for ReportTie {
    fn name(&self) -> &str {
        "report"
    }

    fn resolve(&mut self, _tied: &[Candidate], _context: &TieContext<'_>) -> TieOutcome {
        TieOutcome::Unresolved
    }
}

/// Ordem fixa de precedência, do mais preferido ao menos preferido.
///
/// Candidatos fora da lista ficam abaixo de todos os listados e empatados
/// entre si. Numa seleção vence o primeiro listado; numa eliminação sai o
/// último. Se a decisão cair entre dois ou mais não listados, o empate fica
/// sem resolução.
#[derive(Debug, Clone, Default)]
pub struct Precedence {
    order: Vec<Candidate>,
}

impl Precedence {
    /// Cria a política com a ordem dada.
    pub fn new<I, C>(order: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Candidate>,
    {
        Self {
            order: order.into_iter().map(Into::into).collect(),
        }
    }

    /// Ordem configurada.
    pub fn order(&self) -> &[Candidate] {
        &self.order
    }

    /// Verifica que todos os candidatos da lista existem na eleição.
    pub fn validate(&self, election: &Election) -> TallyResult<()> {
        match self.order.iter().find(|c| !election.contains(c)) {
            Some(unknown) => Err(TallyError::UnknownCandidate(unknown.to_string())),
            None => Ok(()),
        }
    }

    fn position(&self, candidate: &Candidate) -> Option<usize> {
        self.order.iter().position(|c| c == candidate)
    }
}

impl TieBreaker for Precedence {
    fn name(&self) -> &str {
        "precedence"
    }

    fn resolve(&mut self, tied: &[Candidate], context: &TieContext<'_>) -> TieOutcome {
        let listed = tied
            .iter()
            .filter_map(|c| self.position(c).map(|p| (p, c)));
        let unlisted: Vec<&Candidate> = tied.iter().filter(|c| self.position(c).is_none()).collect();

        let chosen = match context.decision {
            TieDecision::Selection => match listed.min_by_key(|(p, _)| *p) {
                Some((_, candidate)) => Some(candidate),
                None if unlisted.len() == 1 => Some(unlisted[0]),
                None => None,
            },
            TieDecision::Elimination => match unlisted.len() {
                0 => listed.max_by_key(|(p, _)| *p).map(|(_, c)| c),
                1 => Some(unlisted[0]),
                _ => None,
            },
        };

        match chosen {
            Some(candidate) => TieOutcome::Resolved(candidate.clone()),
            None => TieOutcome::Unresolved,
        }
    }
}

/// Sorteio determinístico com semente.
///
/// Cada chamada consome um sorteio da sequência; a mesma semente e a mesma
/// sequência de empates produzem sempre as mesmas escolhas. Os empatados são
/// ordenados antes do sorteio, então a ordem em que chegam não importa.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: StdRng,
    draws: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            draws: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Número de sorteios já consumidos.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl TieBreaker for SeededRandom {
    fn name(&self) -> &str {
        "random"
    }

    fn resolve(&mut self, tied: &[Candidate], _context: &TieContext<'_>) -> TieOutcome {
        if tied.is_empty() {
            return TieOutcome::Unresolved;
        }
        let mut sorted: Vec<&Candidate> = tied.iter().collect();
        sorted.sort();
        let index = self.rng.gen_range(0..sorted.len());
        self.draws += 1;
        tracing::debug!(seed = self.seed, draw = self.draws, "Sorteio de desempate");
        TieOutcome::Resolved(sorted[index].clone())
    }
}
