//! Modelo de cédula.
//!
//! Representação canônica das preferências de um eleitor, independente
//! do método de apuração. Uma cédula tem uma de duas formas:
//!
//! - **Ranked**: posições com empates e truncamento ([`RankedBallot`])
//! - **Rated**: notas num intervalo fechado, nulos permitidos ([`RatedBallot`])
//!
//! Cédulas são anônimas; só o multiconjunto de conteúdos importa.

mod candidate;
mod ranked;
mod rated;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use candidate::Candidate;
pub use ranked::RankedBallot;
pub use rated::{RatedBallot, ScoreRange};

/// Forma das cédulas de um conjunto de dados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallotShape {
    Ranked,
    Rated,
}

impl fmt::Display for BallotShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BallotShape::Ranked => write!(f, "ranked"),
            BallotShape::Rated => write!(f, "rated"),
        }
    }
}

/// Cédula de um eleitor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ballot {
    Ranked(RankedBallot),
    Rated(RatedBallot),
}

impl Ballot {
    /// Forma da cédula.
    pub fn shape(&self) -> BallotShape {
        match self {
            Ballot::Ranked(_) => BallotShape::Ranked,
            Ballot::Rated(_) => BallotShape::Rated,
        }
    }

    /// Posição do candidato.
    ///
    /// Em cédulas de notas é a posição no ranking induzido (1 = maior nota).
    pub fn rank_of(&self, candidate: &Candidate) -> Option<u32> {
        match self {
            Ballot::Ranked(ballot) => ballot.rank_of(candidate),
            Ballot::Rated(ballot) => ballot
                .groups()
                .iter()
                .position(|group| group.contains(&candidate))
                .map(|position| position as u32 + 1),
        }
    }

    /// Nota do candidato (só cédulas de notas).
    pub fn score_of(&self, candidate: &Candidate) -> Option<i32> {
        match self {
            Ballot::Ranked(_) => None,
            Ballot::Rated(ballot) => ballot.score_of(candidate),
        }
    }

    /// Indica se o eleitor expressou alguma opinião sobre o candidato.
    pub fn has_opinion(&self, candidate: &Candidate) -> bool {
        match self {
            Ballot::Ranked(ballot) => ballot.rank_of(candidate).is_some(),
            Ballot::Rated(ballot) => ballot.score_of(candidate).is_some(),
        }
    }

    /// Candidatos mencionados na cédula.
    pub fn candidates(&self) -> Box<dyn Iterator<Item = &Candidate> + '_> {
        match self {
            Ballot::Ranked(ballot) => Box::new(ballot.candidates()),
            Ballot::Rated(ballot) => Box::new(ballot.candidates()),
        }
    }

    /// Cédula sem nenhuma opinião.
    pub fn is_blank(&self) -> bool {
        match self {
            Ballot::Ranked(ballot) => ballot.is_empty(),
            Ballot::Rated(ballot) => ballot.is_empty(),
        }
    }

    /// Grupos de preferência, do mais preferido ao menos preferido.
    pub fn preference_groups(&self) -> Vec<Vec<&Candidate>> {
        match self {
            Ballot::Ranked(ballot) => ballot.groups(),
            Ballot::Rated(ballot) => ballot.groups(),
        }
    }

    /// Forma canônica (posições compactadas).
    pub fn normalized(&self) -> Ballot {
        match self {
            Ballot::Ranked(ballot) => Ballot::Ranked(ballot.normalized()),
            Ballot::Rated(ballot) => Ballot::Rated(ballot.clone()),
        }
    }
}

impl From<RankedBallot> for Ballot {
    fn from(ballot: RankedBallot) -> Self {
        Ballot::Ranked(ballot)
    }
}

impl From<RatedBallot> for Ballot {
    fn from(ballot: RatedBallot) -> Self {
        Ballot::Rated(ballot)
    }
}
