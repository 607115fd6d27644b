//! Approval: um voto para cada candidato aprovado.

use std::collections::BTreeMap;

use super::ApprovalOptions;
use crate::ballot::{Ballot, Candidate, ScoreRange};
use crate::election::Election;
use crate::result::{decide, rank_by_tally, snapshot, AuditLog, TabulationResult};
use crate::tally::Votes;
use crate::tiebreak::TieBreaker;
use crate::types::config::MethodKind;

pub(crate) fn tabulate(
    election: &Election,
    options: &ApprovalOptions,
    seats: usize,
    tie_breaker: &mut dyn TieBreaker,
) -> TabulationResult {
    let mut audit = AuditLog::new();
    audit.configured(format!(
        "max_rank={:?}, min_score={:?}",
        options.max_rank, options.min_score
    ));

    let range = election.score_range().unwrap_or_default();
    let mut tallies: BTreeMap<Candidate, Votes> = election
        .candidates()
        .iter()
        .map(|c| (c.clone(), Votes::zero()))
        .collect();
    let mut abstained: u64 = 0;

    for entry in election.ballots() {
        let approved = approved(&entry.ballot, options, &range);
        if approved.is_empty() {
            abstained += entry.count;
        }
        for candidate in approved {
            if let Some(tally) = tallies.get_mut(candidate) {
                *tally += Votes::from(entry.count);
            }
        }
    }

    audit.tally(0, snapshot(&tallies), Some(abstained as f64));
    tracing::debug!(abstained, "Approval contado");

    let standings = rank_by_tally(tallies.into_iter().map(|(c, v)| (c, Some(v))).collect());
    let (outcome, ranking) = decide(standings, seats, tie_breaker, 0, &mut audit);

    TabulationResult::new(
        MethodKind::Approval,
        election,
        seats,
        tie_breaker.name(),
        outcome,
        ranking,
        audit.into_events(),
    )
}

/// Candidatos aprovados por uma cédula.
fn approved<'a>(
    ballot: &'a Ballot,
    options: &ApprovalOptions,
    range: &ScoreRange,
) -> Vec<&'a Candidate> {
    match ballot {
        Ballot::Ranked(_) => {
            let limit = options.max_rank.map(|r| r as usize).unwrap_or(usize::MAX);
            ballot
                .preference_groups()
                .into_iter()
                .take(limit)
                .flatten()
                .collect()
        }
        Ballot::Rated(rated) => rated
            .scores()
            .filter(|(_, score)| match options.min_score {
                Some(threshold) => *score >= threshold,
                None => *score > range.min,
            })
            .map(|(candidate, _)| candidate)
            .collect(),
    }
}
