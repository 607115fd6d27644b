//! Verificações cruzadas sobre resultados.
//!
//! Confere invariantes que todo resultado deve respeitar, independente do
//! método:
//!
//! - **conservação**: contagens + esgotadas = total de cédulas (Plurality/IRV)
//! - **esgotamento**: cédulas esgotadas nunca diminuem dentro de uma disputa
//! - **classificação**: cada candidato aparece exatamente uma vez
//! - **vencedores**: todos pertencem à lista de candidatos
//! - **digest**: o resultado corresponde à eleição verificada

use std::collections::BTreeSet;

use serde::Serialize;

use crate::ballot::Candidate;
use crate::election::Election;
use crate::result::{AuditAction, AuditEvent, TabulationResult};
use crate::types::config::MethodKind;
use crate::types::errors::{TallyError, TallyResult};

const EPSILON: f64 = 1e-6;

/// Resultado de uma verificação.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Check {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

impl Check {
    fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail: String::new(),
        }
    }

    fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: detail.into(),
        }
    }
}

/// Relatório de validação.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub checks: Vec<Check>,
}

impl ValidationReport {
    /// Todas as verificações passaram.
    pub fn is_valid(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Verificações que falharam.
    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn check(&self, name: &str) -> Option<&Check> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Verifica um resultado contra a eleição que o produziu.
pub fn validate(result: &TabulationResult, election: &Election) -> ValidationReport {
    let mut checks = vec![
        check_digest(result, election),
        check_ranking(result, election),
        check_winners(result, election),
    ];
    if matches!(
        result.method,
        MethodKind::Plurality | MethodKind::InstantRunoff
    ) {
        checks.push(check_conservation(result));
    }
    if result.method == MethodKind::InstantRunoff {
        checks.push(check_exhaustion(result));
    }

    let report = ValidationReport { checks };
    for failure in report.failures() {
        tracing::warn!(check = %failure.name, detail = %failure.detail, "Verificação falhou");
    }
    report
}

fn check_digest(result: &TabulationResult, election: &Election) -> Check {
    if result.election_digest == election.digest() && result.total_ballots == election.ballot_count()
    {
        Check::pass("digest")
    } else {
        Check::fail("digest", "resultado não corresponde a esta eleição")
    }
}

fn check_ranking(result: &TabulationResult, election: &Election) -> Check {
    let mut seen = BTreeSet::new();
    for candidate in result.ranking.iter().flat_map(|g| &g.candidates) {
        if !seen.insert(candidate) {
            return Check::fail("ranking", format!("'{}' aparece mais de uma vez", candidate));
        }
    }
    match election.candidates().iter().find(|c| !seen.contains(c)) {
        Some(missing) => Check::fail("ranking", format!("'{}' ausente da classificação", missing)),
        None if seen.len() != election.num_candidates() => {
            Check::fail("ranking", "classificação com candidatos desconhecidos")
        }
        None => Check::pass("ranking"),
    }
}

fn check_winners(result: &TabulationResult, election: &Election) -> Check {
    match result
        .winners()
        .iter()
        .chain(result.tied())
        .find(|c| !election.contains(c))
    {
        Some(unknown) => Check::fail("winners", format!("'{}' fora da lista", unknown)),
        None if result.winners().len() > result.winners_requested => {
            Check::fail("winners", "mais vencedores que vagas")
        }
        None => Check::pass("winners"),
    }
}

fn check_conservation(result: &TabulationResult) -> Check {
    let total = result.total_ballots as f64;
    for event in result.tally_events() {
        let counted: f64 = event.tally.values().sum();
        let exhausted = event.exhausted.unwrap_or(0.0);
        if (counted + exhausted - total).abs() > EPSILON {
            return Check::fail(
                "conservation",
                format!(
                    "rodada {}: {} + {} esgotadas != {}",
                    event.round, counted, exhausted, total
                ),
            );
        }
    }
    Check::pass("conservation")
}

fn check_exhaustion(result: &TabulationResult) -> Check {
    let mut previous: Option<f64> = None;
    for event in &result.audit {
        match &event.action {
            AuditAction::Elected { .. } => previous = None,
            AuditAction::Tally => {
                let current = event.exhausted.unwrap_or(0.0);
                if let Some(before) = previous {
                    if current + EPSILON < before {
                        return Check::fail(
                            "exhaustion",
                            format!("rodada {}: {} < {}", event.round, current, before),
                        );
                    }
                }
                previous = Some(current);
            }
            _ => {}
        }
    }
    Check::pass("exhaustion")
}

// ═══════════════════════════════════════════════════════════════════════════
// Maiorias
// ═══════════════════════════════════════════════════════════════════════════

/// Rodada que decidiu a primeira vaga (Plurality: a única contagem).
fn deciding_tally(result: &TabulationResult) -> Option<&AuditEvent> {
    let mut last = None;
    for event in &result.audit {
        match event.action {
            AuditAction::Tally => last = Some(event),
            AuditAction::Elected { .. } => break,
            _ => {}
        }
    }
    last
}

/// Candidato com mais de 50% de todas as cédulas na rodada decisiva.
pub fn absolute_majority_winner(result: &TabulationResult) -> TallyResult<Option<Candidate>> {
    winner_above(result, 0.5)
}

/// Candidato com mais de `threshold` (fração em (0.5, 1]) de todas as cédulas.
pub fn super_majority_winner(
    result: &TabulationResult,
    threshold: f64,
) -> TallyResult<Option<Candidate>> {
    if !(threshold > 0.5 && threshold <= 1.0) {
        return Err(TallyError::invalid(format!(
            "limiar de supermaioria deve estar em (0.5, 1], recebido {}",
            threshold
        )));
    }
    winner_above(result, threshold)
}

fn winner_above(result: &TabulationResult, threshold: f64) -> TallyResult<Option<Candidate>> {
    if !matches!(
        result.method,
        MethodKind::Plurality | MethodKind::InstantRunoff
    ) {
        return Err(TallyError::invalid(format!(
            "maioria só se aplica a plurality e instant_runoff, não a {}",
            result.method
        )));
    }
    let total = result.total_ballots as f64;
    let winner = deciding_tally(result).and_then(|event| {
        event
            .tally
            .iter()
            .find(|(_, votes)| total > 0.0 && **votes / total > threshold)
            .map(|(candidate, _)| candidate.clone())
    });
    Ok(winner)
}
