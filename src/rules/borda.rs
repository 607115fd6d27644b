//! Contagem de Borda.
//!
//! Pontos por posição para N candidatos:
//!
//! - **Standard**: N-1 para a primeira posição até 0
//! - **FromOne**: N para a primeira posição até 1
//! - **Dowdall**: 1, 1/2, 1/3, ...
//!
//! Um grupo empatado divide igualmente os pontos das posições que ocupa.
//! Candidatos não ranqueados recebem zero.

use super::BordaOptions;
use crate::election::Election;
use crate::result::{decide, rank_by_tally, snapshot, AuditLog, TabulationResult};
use crate::tally::Votes;
use crate::tiebreak::TieBreaker;
use crate::types::config::{BordaScheme, MethodKind};

/// Pontos da posição `position` (0 = primeira) entre `n` candidatos.
fn points(scheme: BordaScheme, n: usize, position: usize) -> Votes {
    match scheme {
        BordaScheme::Standard => Votes::whole((n - 1 - position) as i128),
        BordaScheme::FromOne => Votes::whole((n - position) as i128),
        BordaScheme::Dowdall => Votes::fraction(1, position as i128 + 1),
    }
}

pub(crate) fn tabulate(
    election: &Election,
    options: &BordaOptions,
    seats: usize,
    tie_breaker: &mut dyn TieBreaker,
) -> TabulationResult {
    let mut audit = AuditLog::new();
    audit.configured(format!("scheme={:?}", options.scheme));

    let n = election.num_candidates();
    let mut totals = vec![Votes::zero(); n];

    for profile in election.profiles() {
        let mut position = 0;
        for group in &profile.groups {
            let span = group.len();
            let shared: Votes = (position..position + span)
                .map(|p| points(options.scheme, n, p))
                .sum::<Votes>()
                .split(span);
            for &index in group {
                totals[index] += &shared * profile.count;
            }
            position += span;
        }
    }

    let tallies: Vec<_> = election.candidates().iter().zip(totals.iter()).collect();
    audit.tally(0, snapshot(tallies.iter().copied()), None);

    let standings = rank_by_tally(
        election
            .candidates()
            .iter()
            .cloned()
            .zip(totals.into_iter().map(Some))
            .collect(),
    );
    let (outcome, ranking) = decide(standings, seats, tie_breaker, 0, &mut audit);

    TabulationResult::new(
        MethodKind::Borda,
        election,
        seats,
        tie_breaker.name(),
        outcome,
        ranking,
        audit.into_events(),
    )
}
