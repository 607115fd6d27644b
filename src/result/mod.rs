//! Modelo de resultado.
//!
//! Um [`TabulationResult`] é um valor imutável produzido do zero a cada
//! apuração. Ele não guarda referência alguma à eleição, só o digest dela.
//!
//! - **outcome**: vencedor(es) ou empate sem resolução
//! - **ranking**: classificação completa em grupos (empates = mesmo grupo)
//! - **audit**: trilha ordenada de decisões (rodada, contagens, ação)

mod audit;
mod selection;

use serde::Serialize;

pub use audit::{AuditAction, AuditEvent};
pub(crate) use audit::{snapshot, AuditLog};
pub(crate) use selection::{decide, rank_by_tally, Standing};

use crate::ballot::Candidate;
use crate::election::Election;
use crate::types::config::MethodKind;

/// Desfecho da apuração.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Todas as vagas preenchidas.
    Decided { winners: Vec<Candidate> },

    /// Empate que a política de desempate não resolveu.
    ///
    /// `winners` traz as vagas já decididas; `tied` os candidatos que
    /// disputam as `open_seats` restantes. `tied` pode ficar vazio quando
    /// não há candidatos elegíveis suficientes.
    Unresolved {
        winners: Vec<Candidate>,
        tied: Vec<Candidate>,
        open_seats: usize,
    },
}

/// Grupo da classificação final.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingGroup {
    /// Candidatos empatados nesta posição.
    pub candidates: Vec<Candidate>,

    /// Contagem do grupo (ausente quando o método não produz uma).
    pub tally: Option<f64>,
}

/// Matriz de preferências par a par e caminhos mais fortes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseSummary {
    /// Ordem das linhas/colunas.
    pub candidates: Vec<Candidate>,

    /// `preferences[a][b]`: cédulas que preferem `a` a `b`.
    pub preferences: Vec<Vec<f64>>,

    /// `strongest_paths[a][b]`: força do caminho mais forte de `a` a `b`.
    pub strongest_paths: Vec<Vec<f64>>,

    /// Vencedor de Condorcet, se existir.
    pub condorcet_winner: Option<Candidate>,
}

impl PairwiseSummary {
    fn index(&self, candidate: &Candidate) -> Option<usize> {
        self.candidates.iter().position(|c| c == candidate)
    }

    /// Cédulas que preferem `a` a `b`.
    pub fn preference(&self, a: &Candidate, b: &Candidate) -> Option<f64> {
        Some(self.preferences[self.index(a)?][self.index(b)?])
    }

    /// Força do caminho mais forte de `a` a `b`.
    pub fn path_strength(&self, a: &Candidate, b: &Candidate) -> Option<f64> {
        Some(self.strongest_paths[self.index(a)?][self.index(b)?])
    }
}

/// Resultado de uma apuração.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabulationResult {
    /// Método usado.
    pub method: MethodKind,

    /// Digest da eleição apurada.
    pub election_digest: String,

    /// Total de cédulas.
    pub total_ballots: u64,

    /// Vagas pedidas.
    pub winners_requested: usize,

    /// Política de desempate usada.
    pub tie_break_policy: String,

    /// Desfecho.
    pub outcome: Outcome,

    /// Classificação completa.
    pub ranking: Vec<RankingGroup>,

    /// Candidato com maioria absoluta (> 50%) da base configurada.
    pub majority: Option<Candidate>,

    /// Matriz par a par (Condorcet).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairwise: Option<PairwiseSummary>,

    /// Trilha de auditoria.
    pub audit: Vec<AuditEvent>,
}

impl TabulationResult {
    pub(crate) fn new(
        method: MethodKind,
        election: &Election,
        winners_requested: usize,
        tie_break_policy: &str,
        outcome: Outcome,
        ranking: Vec<RankingGroup>,
        audit: Vec<AuditEvent>,
    ) -> Self {
        Self {
            method,
            election_digest: election.digest().to_string(),
            total_ballots: election.ballot_count(),
            winners_requested,
            tie_break_policy: tie_break_policy.to_string(),
            outcome,
            ranking,
            majority: None,
            pairwise: None,
            audit,
        }
    }

    pub(crate) fn with_majority(mut self, majority: Option<Candidate>) -> Self {
        self.majority = majority;
        self
    }

    pub(crate) fn with_pairwise(mut self, pairwise: PairwiseSummary) -> Self {
        self.pairwise = Some(pairwise);
        self
    }

    /// Vencedor único, se a apuração decidiu exatamente uma vaga.
    pub fn winner(&self) -> Option<&Candidate> {
        match &self.outcome {
            Outcome::Decided { winners } if winners.len() == 1 => winners.first(),
            _ => None,
        }
    }

    /// Vencedores decididos (em ordem).
    pub fn winners(&self) -> &[Candidate] {
        match &self.outcome {
            Outcome::Decided { winners } | Outcome::Unresolved { winners, .. } => winners,
        }
    }

    /// Indica se sobrou empate sem resolução.
    pub fn is_tie(&self) -> bool {
        matches!(self.outcome, Outcome::Unresolved { .. })
    }

    /// Candidatos empatados sem resolução.
    pub fn tied(&self) -> &[Candidate] {
        match &self.outcome {
            Outcome::Unresolved { tied, .. } => tied,
            Outcome::Decided { .. } => &[],
        }
    }

    /// Posição (1 = primeiro grupo) do candidato na classificação.
    pub fn position_of(&self, candidate: &Candidate) -> Option<usize> {
        self.ranking
            .iter()
            .position(|group| group.candidates.contains(candidate))
            .map(|p| p + 1)
    }

    /// Contagem final do candidato na classificação.
    pub fn tally_of(&self, candidate: &Candidate) -> Option<f64> {
        self.ranking
            .iter()
            .find(|group| group.candidates.contains(candidate))
            .and_then(|group| group.tally)
    }

    /// Número de rodadas registradas na trilha.
    pub fn rounds(&self) -> u32 {
        self.audit.iter().map(|e| e.round).max().unwrap_or(0)
    }

    /// Eventos de contagem, em ordem.
    pub fn tally_events(&self) -> impl Iterator<Item = &AuditEvent> {
        self.audit
            .iter()
            .filter(|e| matches!(e.action, AuditAction::Tally))
    }
}
