//! Score (range voting).
//!
//! Notas nulas ficam fora do denominador do candidato: não contam como
//! zero. Um candidato sem nenhuma nota não tem agregado e não concorre.

use std::collections::BTreeMap;

use super::ScoreOptions;
use crate::ballot::{Ballot, Candidate};
use crate::election::Election;
use crate::result::{decide, rank_by_tally, AuditAction, AuditEvent, AuditLog, TabulationResult};
use crate::tally::Votes;
use crate::tiebreak::TieBreaker;
use crate::types::config::{MethodKind, ScoreAggregation};

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: i128,
    opinions: u64,
}

impl Accumulator {
    fn aggregate(&self, aggregation: ScoreAggregation) -> Option<Votes> {
        if self.opinions == 0 {
            return None;
        }
        Some(match aggregation {
            ScoreAggregation::Sum => Votes::whole(self.sum),
            ScoreAggregation::Mean => Votes::fraction(self.sum, self.opinions as i128),
        })
    }
}

pub(crate) fn tabulate(
    election: &Election,
    options: &ScoreOptions,
    seats: usize,
    tie_breaker: &mut dyn TieBreaker,
) -> TabulationResult {
    let mut audit = AuditLog::new();
    audit.configured(format!("aggregation={:?}", options.aggregation));

    let mut accumulators: BTreeMap<Candidate, Accumulator> = election
        .candidates()
        .iter()
        .map(|c| (c.clone(), Accumulator::default()))
        .collect();

    for entry in election.ballots() {
        let Ballot::Rated(rated) = &entry.ballot else {
            continue;
        };
        for (candidate, score) in rated.scores() {
            if let Some(acc) = accumulators.get_mut(candidate) {
                acc.sum += i128::from(score) * i128::from(entry.count);
                acc.opinions += entry.count;
            }
        }
    }

    let aggregates: Vec<(Candidate, Option<Votes>)> = accumulators
        .into_iter()
        .map(|(candidate, acc)| (candidate, acc.aggregate(options.aggregation)))
        .collect();

    let silent: Vec<&Candidate> = aggregates
        .iter()
        .filter(|(_, aggregate)| aggregate.is_none())
        .map(|(candidate, _)| candidate)
        .collect();
    let tally = aggregates
        .iter()
        .filter_map(|(candidate, aggregate)| aggregate.as_ref().map(|v| (candidate.clone(), v.to_f64())))
        .collect();
    let mut event = AuditEvent::new(0, AuditAction::Tally).with_tally(tally);
    if !silent.is_empty() {
        tracing::debug!(candidates = ?silent, "Candidatos sem nenhuma nota");
        event = event.with_note(format!(
            "sem notas: {}",
            silent.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
        ));
    }
    audit.push(event);

    let standings = rank_by_tally(aggregates);
    let (outcome, ranking) = decide(standings, seats, tie_breaker, 0, &mut audit);

    TabulationResult::new(
        MethodKind::Score,
        election,
        seats,
        tie_breaker.name(),
        outcome,
        ranking,
        audit.into_events(),
    )
}
