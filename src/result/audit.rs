//! Trilha de auditoria.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ballot::Candidate;
use crate::tally::Votes;
use crate::tiebreak::TieDecision;

/// Ação registrada num evento de auditoria.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditAction {
    /// Parâmetros efetivos da apuração.
    Configured,
    /// Contagem (snapshot em `tally`).
    Tally,
    /// Candidato eleito.
    Elected { candidate: Candidate },
    /// Candidato(s) eliminado(s). Mais de um = eliminação em bloco.
    Eliminated { candidates: Vec<Candidate> },
    /// Consulta à política de desempate.
    TieBreak {
        decision: String,
        tied: Vec<Candidate>,
        selected: Option<Candidate>,
        policy: String,
    },
    /// Vencedor de Condorcet encontrado.
    CondorcetWinner { candidate: Candidate },
    /// Nenhum vencedor de Condorcet (ciclo).
    CondorcetCycle,
    /// Caminhos mais fortes (Schulze) calculados.
    StrongestPaths,
    /// Apuração terminou num empate sem resolução.
    Unresolved { tied: Vec<Candidate> },
}

/// Um evento da trilha de auditoria.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    /// Rodada (0 para métodos de passo único).
    pub round: u32,

    /// O que aconteceu.
    pub action: AuditAction,

    /// Snapshot das contagens.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tally: BTreeMap<Candidate, f64>,

    /// Cédulas esgotadas/em branco até aqui.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhausted: Option<f64>,

    /// Explicação livre.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note: String,
}

impl AuditEvent {
    pub fn new(round: u32, action: AuditAction) -> Self {
        Self {
            round,
            action,
            tally: BTreeMap::new(),
            exhausted: None,
            note: String::new(),
        }
    }

    pub fn with_tally(mut self, tally: BTreeMap<Candidate, f64>) -> Self {
        self.tally = tally;
        self
    }

    pub fn with_exhausted(mut self, exhausted: f64) -> Self {
        self.exhausted = Some(exhausted);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// Acumulador da trilha durante uma apuração.
#[derive(Debug, Default)]
pub(crate) struct AuditLog {
    events: Vec<AuditEvent>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: AuditEvent) {
        self.events.push(event);
    }

    pub fn configured(&mut self, note: impl Into<String>) {
        self.push(AuditEvent::new(0, AuditAction::Configured).with_note(note));
    }

    pub fn tally(&mut self, round: u32, tally: BTreeMap<Candidate, f64>, exhausted: Option<f64>) {
        let event = AuditEvent::new(round, AuditAction::Tally).with_tally(tally);
        self.push(match exhausted {
            Some(exhausted) => event.with_exhausted(exhausted),
            None => event,
        });
    }

    pub fn tie_break(
        &mut self,
        round: u32,
        decision: TieDecision,
        tied: &[Candidate],
        selected: Option<&Candidate>,
        policy: &str,
    ) {
        self.push(AuditEvent::new(
            round,
            AuditAction::TieBreak {
                decision: decision.to_string(),
                tied: tied.to_vec(),
                selected: selected.cloned(),
                policy: policy.to_string(),
            },
        ));
    }

    pub fn into_events(self) -> Vec<AuditEvent> {
        self.events
    }
}

/// Converte contagens exatas para o snapshot de exibição.
pub(crate) fn snapshot<'a, I>(tallies: I) -> BTreeMap<Candidate, f64>
where
    I: IntoIterator<Item = (&'a Candidate, &'a Votes)>,
{
    tallies
        .into_iter()
        .map(|(candidate, votes)| (candidate.clone(), votes.to_f64()))
        .collect()
}
