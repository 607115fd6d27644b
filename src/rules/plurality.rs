//! Plurality (maioria simples).

use std::collections::BTreeMap;

use super::PluralityOptions;
use crate::ballot::{Ballot, Candidate};
use crate::election::Election;
use crate::result::{decide, rank_by_tally, snapshot, AuditLog, TabulationResult};
use crate::tally::Votes;
use crate::tiebreak::{TieBreaker, TieContext, TieDecision, TieOutcome};
use crate::types::config::{MajorityBase, MethodKind, TiedPreference};

pub(crate) fn tabulate(
    election: &Election,
    options: &PluralityOptions,
    seats: usize,
    tie_breaker: &mut dyn TieBreaker,
) -> TabulationResult {
    let mut audit = AuditLog::new();
    audit.configured(format!(
        "tied_preference={:?}, majority_base={:?}",
        options.tied_preference, options.majority_base
    ));

    let mut tallies: BTreeMap<Candidate, Votes> = election
        .candidates()
        .iter()
        .map(|c| (c.clone(), Votes::zero()))
        .collect();
    let mut cast: u64 = 0;

    for entry in election.ballots() {
        let groups = entry.ballot.preference_groups();
        let Some(top) = groups.first() else {
            continue;
        };

        if let [only] = top.as_slice() {
            add(&mut tallies, only, Votes::from(entry.count));
            cast += entry.count;
            continue;
        }

        // notas empatadas no topo: a política escolhe antes da divisão
        if matches!(entry.ballot, Ballot::Rated(_)) {
            let tied: Vec<Candidate> = top.iter().map(|c| (*c).clone()).collect();
            let current = snapshot(&tallies);
            let context = TieContext {
                round: 0,
                decision: TieDecision::Selection,
                tallies: &current,
            };
            if let TieOutcome::Resolved(chosen) = tie_breaker.resolve(&tied, &context) {
                if tied.contains(&chosen) {
                    let policy = tie_breaker.name();
                    audit.tie_break(0, TieDecision::Selection, &tied, Some(&chosen), policy);
                    add(&mut tallies, &chosen, Votes::from(entry.count));
                    cast += entry.count;
                    continue;
                }
            }
            audit.tie_break(0, TieDecision::Selection, &tied, None, tie_breaker.name());
        }

        match options.tied_preference {
            TiedPreference::Split => {
                let share = Votes::from(entry.count).split(top.len());
                for candidate in top {
                    add(&mut tallies, candidate, share.clone());
                }
                cast += entry.count;
            }
            TiedPreference::Exhaust => {}
        }
    }

    let uncounted = election.ballot_count() - cast;
    audit.tally(0, snapshot(&tallies), Some(uncounted as f64));

    let base = match options.majority_base {
        MajorityBase::Cast => cast,
        MajorityBase::All => election.ballot_count(),
    };
    let majority = tallies
        .iter()
        .find(|(_, votes)| base > 0 && *votes * 2 > Votes::from(base))
        .map(|(candidate, _)| candidate.clone());

    tracing::debug!(cast, uncounted, majority = ?majority, "Plurality contado");

    let standings = rank_by_tally(tallies.into_iter().map(|(c, v)| (c, Some(v))).collect());
    let (outcome, ranking) = decide(standings, seats, tie_breaker, 0, &mut audit);

    TabulationResult::new(
        MethodKind::Plurality,
        election,
        seats,
        tie_breaker.name(),
        outcome,
        ranking,
        audit.into_events(),
    )
    .with_majority(majority)
}

fn add(tallies: &mut BTreeMap<Candidate, Votes>, candidate: &Candidate, votes: Votes) {
    if let Some(tally) = tallies.get_mut(candidate) {
        *tally += votes;
    }
}
