//! Políticas de desempate.
//!
//! Toda vez que dois ou mais candidatos empatam exatamente num ponto de
//! decisão (eliminação do menos votado, escolha do mais votado, corte de
//! vagas), o motor consulta um [`TieBreaker`]. As políticas embutidas são:
//!
//! - **Precedence**: ordem fixa fornecida na construção
//! - **SeededRandom**: sorteio reprodutível (mesma semente => mesmo resultado)
//! - **ReportTie**: nunca decide; o empate é reportado no resultado
//!
//! Não existe política implícita: quem chama sempre escolhe uma.

mod policies;

use std::collections::BTreeMap;
use std::fmt;

pub use policies::{Precedence, ReportTie, SeededRandom};

use crate::ballot::Candidate;
use crate::types::config::{TieBreakConfig, TieBreakPolicy};

/// Tipo de decisão em que o empate ocorreu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieDecision {
    /// Escolher quem sai (menor contagem).
    Elimination,
    /// Escolher quem fica/vence (maior contagem).
    Selection,
}

impl fmt::Display for TieDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieDecision::Elimination => write!(f, "elimination"),
            TieDecision::Selection => write!(f, "selection"),
        }
    }
}

/// Contexto da apuração no momento do empate.
#[derive(Debug, Clone)]
pub struct TieContext<'a> {
    /// Rodada atual (0 quando o método não tem rodadas).
    pub round: u32,

    /// Tipo de decisão.
    pub decision: TieDecision,

    /// Contagens atuais.
    pub tallies: &'a BTreeMap<Candidate, f64>,
}

/// Resposta de uma política de desempate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TieOutcome {
    /// Candidato escolhido (eliminado ou selecionado, conforme a decisão).
    Resolved(Candidate),
    /// A política se recusa a decidir.
    Unresolved,
}

/// Trait para políticas de desempate.
pub trait TieBreaker: Send {
    /// Nome da política.
    fn name(&self) -> &str;

    /// Resolve um empate entre `tied` (dois ou mais candidatos).
    fn resolve(&mut self, tied: &[Candidate], context: &TieContext<'_>) -> TieOutcome;
}

impl<T: TieBreaker + ?Sized> TieBreaker for &mut T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn resolve(&mut self, tied: &[Candidate], context: &TieContext<'_>) -> TieOutcome {
        (**self).resolve(tied, context)
    }
}

impl<T: TieBreaker + ?Sized> TieBreaker for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn resolve(&mut self, tied: &[Candidate], context: &TieContext<'_>) -> TieOutcome {
        (**self).resolve(tied, context)
    }
}

/// Cria uma política de desempate a partir da configuração.
pub fn create_tie_breaker(config: &TieBreakConfig) -> Box<dyn TieBreaker> {
    match config.policy {
        TieBreakPolicy::Report => Box::new(ReportTie),
        TieBreakPolicy::Precedence => Box::new(Precedence::new(config.precedence.iter())),
        TieBreakPolicy::Random => Box::new(SeededRandom::new(config.seed)),
    }
}
