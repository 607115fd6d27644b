//! Instant-runoff (IRV).
//!
//! Máquina de estados por disputa:
//!
//! ```text
//! Counting ──maioria / último restante──▶ Winner
//!    │  ▲
//!    ▼  │
//! Eliminating ──empate total sem resolução──▶ ExhaustedTie
//! ```
//!
//! Uma cédula esgota quando nenhum candidato ranqueado continua na disputa
//! e não volta a contar. Com várias vagas a disputa é repetida excluindo os
//! eleitos anteriores (IRV sequencial).

use super::IrvOptions;
use crate::ballot::Candidate;
use crate::election::{Election, Profile};
use crate::result::{AuditAction, AuditEvent, AuditLog, Outcome, RankingGroup, TabulationResult};
use crate::tally::Votes;
use crate::tiebreak::{TieBreaker, TieContext, TieDecision, TieOutcome};
use crate::types::config::{MethodKind, TiedPreference};

// ═══════════════════════════════════════════════════════════════════════════
// Estado da disputa
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Counting,
    Eliminating,
    Winner(usize),
    ExhaustedTie(Vec<usize>),
}

/// Uma disputa de vaga única.
struct Runoff<'a> {
    candidates: &'a [Candidate],
    profiles: &'a [Profile],
    tied_preference: TiedPreference,
    continuing: Vec<bool>,
    exhausted: Vec<bool>,
    tallies: Vec<Votes>,
    final_tally: Vec<Option<Votes>>,
    eliminated: Vec<Vec<usize>>,
    by_majority: bool,
}

impl<'a> Runoff<'a> {
    fn new(
        candidates: &'a [Candidate],
        profiles: &'a [Profile],
        tied_preference: TiedPreference,
        excluded: &[usize],
    ) -> Self {
        let mut continuing = vec![true; candidates.len()];
        for &index in excluded {
            continuing[index] = false;
        }
        Self {
            candidates,
            profiles,
            tied_preference,
            continuing,
            exhausted: vec![false; profiles.len()],
            tallies: vec![Votes::zero(); candidates.len()],
            final_tally: vec![None; candidates.len()],
            eliminated: Vec::new(),
            by_majority: false,
        }
    }

    fn active(&self) -> Vec<usize> {
        (0..self.candidates.len())
            .filter(|&i| self.continuing[i])
            .collect()
    }

    fn names(&self, indices: &[usize]) -> Vec<Candidate> {
        indices.iter().map(|&i| self.candidates[i].clone()).collect()
    }

    fn snapshot(&self) -> std::collections::BTreeMap<Candidate, f64> {
        self.active()
            .into_iter()
            .map(|i| (self.candidates[i].clone(), self.tallies[i].to_f64()))
            .collect()
    }

    /// Executa a disputa até um estado terminal.
    fn run(
        &mut self,
        round: &mut u32,
        tie_breaker: &mut dyn TieBreaker,
        audit: &mut AuditLog,
    ) -> State {
        let mut state = State::Counting;
        loop {
            state = match state {
                State::Counting => {
                    *round += 1;
                    self.count(*round, audit)
                }
                State::Eliminating => self.eliminate(*round, tie_breaker, audit),
                terminal => return terminal,
            };
        }
    }

    /// Conta as primeiras preferências entre os candidatos restantes.
    fn count(&mut self, round: u32, audit: &mut AuditLog) -> State {
        self.tallies.iter_mut().for_each(|t| *t = Votes::zero());

        for (i, profile) in self.profiles.iter().enumerate() {
            if self.exhausted[i] {
                continue;
            }
            let top = profile
                .groups
                .iter()
                .map(|group| {
                    group
                        .iter()
                        .copied()
                        .filter(|&c| self.continuing[c])
                        .collect::<Vec<_>>()
                })
                .find(|group| !group.is_empty());

            match top {
                None => self.exhausted[i] = true,
                Some(group) if group.len() == 1 => {
                    self.tallies[group[0]] += Votes::from(profile.count);
                }
                Some(group) => match self.tied_preference {
                    TiedPreference::Split => {
                        let share = Votes::from(profile.count).split(group.len());
                        for c in group {
                            self.tallies[c] += &share;
                        }
                    }
                    TiedPreference::Exhaust => self.exhausted[i] = true,
                },
            }
        }

        let exhausted: u64 = self
            .profiles
            .iter()
            .zip(&self.exhausted)
            .filter(|(_, done)| **done)
            .map(|(profile, _)| profile.count)
            .sum();
        audit.tally(round, self.snapshot(), Some(exhausted as f64));

        let active = self.active();
        let total: Votes = active.iter().map(|&i| &self.tallies[i]).sum();
        tracing::debug!(round, exhausted, continuing = active.len(), "Rodada contada");

        if let [only] = active.as_slice() {
            return State::Winner(*only);
        }
        let leader = active
            .iter()
            .copied()
            .find(|&i| total.is_positive() && &self.tallies[i] * 2 > total);
        match leader {
            Some(winner) => {
                self.by_majority = true;
                State::Winner(winner)
            }
            None => State::Eliminating,
        }
    }

    /// Elimina o(s) menos votado(s).
    fn eliminate(
        &mut self,
        round: u32,
        tie_breaker: &mut dyn TieBreaker,
        audit: &mut AuditLog,
    ) -> State {
        let active = self.active();
        let lowest = active
            .iter()
            .map(|&i| &self.tallies[i])
            .min()
            .cloned()
            .unwrap_or_default();
        let tied: Vec<usize> = active
            .iter()
            .copied()
            .filter(|&i| self.tallies[i] == lowest)
            .collect();

        let batch = if tied.len() == 1 {
            tied
        } else {
            let names = self.names(&tied);
            let current = self.snapshot();
            let context = TieContext {
                round,
                decision: TieDecision::Elimination,
                tallies: &current,
            };
            match tie_breaker.resolve(&names, &context) {
                TieOutcome::Resolved(chosen) if names.contains(&chosen) => {
                    audit.tie_break(
                        round,
                        TieDecision::Elimination,
                        &names,
                        Some(&chosen),
                        tie_breaker.name(),
                    );
                    tied.into_iter()
                        .filter(|&i| self.candidates[i] == chosen)
                        .collect()
                }
                _ => {
                    let policy = tie_breaker.name();
                    audit.tie_break(round, TieDecision::Elimination, &names, None, policy);
                    if tied.len() == active.len() {
                        return State::ExhaustedTie(tied);
                    }
                    tracing::warn!(round, tied = ?names, "Empate sem resolução: eliminação em bloco");
                    tied
                }
            }
        };

        for &index in &batch {
            self.continuing[index] = false;
            self.final_tally[index] = Some(self.tallies[index].clone());
        }
        let names = self.names(&batch);
        tracing::debug!(round, eliminated = ?names, "Eliminação");
        let mut event = AuditEvent::new(round, AuditAction::Eliminated { candidates: names });
        if batch.len() > 1 {
            event = event.with_note("eliminação em bloco");
        }
        audit.push(event);
        self.eliminated.push(batch);
        State::Counting
    }

    /// Candidatos ainda na disputa (exceto `winner`), por contagem decrescente.
    fn standing_groups(&self, winner: usize) -> Vec<RankingGroup> {
        let mut rest: Vec<usize> = self.active().into_iter().filter(|&i| i != winner).collect();
        rest.sort_by(|&a, &b| self.tallies[b].cmp(&self.tallies[a]).then(a.cmp(&b)));

        let mut groups: Vec<Vec<usize>> = Vec::new();
        for index in rest {
            match groups.last_mut() {
                Some(group) if self.tallies[group[0]] == self.tallies[index] => group.push(index),
                _ => groups.push(vec![index]),
            }
        }
        groups.iter().map(|group| self.group(group)).collect()
    }

    /// Grupos eliminados, do último ao primeiro.
    fn elimination_groups(&self) -> Vec<RankingGroup> {
        self.eliminated
            .iter()
            .rev()
            .map(|batch| self.group(batch))
            .collect()
    }

    fn group(&self, indices: &[usize]) -> RankingGroup {
        let tally = indices
            .first()
            .map(|&i| {
                self.final_tally[i]
                    .as_ref()
                    .unwrap_or(&self.tallies[i])
                    .to_f64()
            });
        RankingGroup {
            candidates: self.names(indices),
            tally,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Apuração
// ═══════════════════════════════════════════════════════════════════════════

pub(crate) fn tabulate(
    election: &Election,
    options: &IrvOptions,
    seats: usize,
    tie_breaker: &mut dyn TieBreaker,
) -> TabulationResult {
    let mut audit = AuditLog::new();
    audit.configured(format!(
        "tied_preference={:?}, seats={}",
        options.tied_preference, seats
    ));

    let profiles = election.profiles();
    let candidates = election.candidates();
    let mut round = 0;
    let mut winners: Vec<usize> = Vec::new();
    let mut ranking: Vec<RankingGroup> = Vec::new();
    let mut majority: Option<Candidate> = None;
    let mut outcome: Option<Outcome> = None;

    while winners.len() < seats {
        let mut runoff = Runoff::new(candidates, &profiles, options.tied_preference, &winners);
        match runoff.run(&mut round, tie_breaker, &mut audit) {
            State::Winner(winner) => {
                let name = candidates[winner].clone();
                if winners.is_empty() && runoff.by_majority {
                    majority = Some(name.clone());
                }
                audit.push(AuditEvent::new(
                    round,
                    AuditAction::Elected {
                        candidate: name.clone(),
                    },
                ));
                ranking.push(runoff.group(&[winner]));
                winners.push(winner);
                if winners.len() == seats {
                    ranking.extend(runoff.standing_groups(winner));
                    ranking.extend(runoff.elimination_groups());
                }
            }
            State::ExhaustedTie(tied) => {
                let names = runoff.names(&tied);
                audit.push(AuditEvent::new(
                    round,
                    AuditAction::Unresolved {
                        tied: names.clone(),
                    },
                ));
                ranking.push(runoff.group(&tied));
                ranking.extend(runoff.elimination_groups());
                outcome = Some(Outcome::Unresolved {
                    winners: winners.iter().map(|&i| candidates[i].clone()).collect(),
                    tied: names,
                    open_seats: seats - winners.len(),
                });
                break;
            }
            State::Counting | State::Eliminating => break,
        }
    }

    let outcome = outcome.unwrap_or_else(|| Outcome::Decided {
        winners: winners.iter().map(|&i| candidates[i].clone()).collect(),
    });

    TabulationResult::new(
        MethodKind::InstantRunoff,
        election,
        seats,
        tie_breaker.name(),
        outcome,
        ranking,
        audit.into_events(),
    )
    .with_majority(majority)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::rules::Method;
    use crate::tiebreak::{Precedence, ReportTie, SeededRandom};

    fn irv() -> Method {
        Method::InstantRunoff(IrvOptions::default())
    }

    fn exhausted_series(result: &TabulationResult) -> Vec<f64> {
        result
            .tally_events()
            .filter_map(|event| event.exhausted)
            .collect()
    }

    #[test]
    fn test_three_way_hand_count() {
        // rodada 1: A 2, B 1, C 2; B sai e sua cédula vai para C
        let result = irv().tabulate(&three_way(), ReportTie, 1).unwrap();
        assert_eq!(result.winner(), Some(&c("C")));
        assert_eq!(result.majority, Some(c("C")));
        assert_eq!(result.rounds(), 2);
        assert_eq!(result.tally_of(&c("C")), Some(3.0));
        assert_eq!(result.position_of(&c("A")), Some(2));
        assert_eq!(result.position_of(&c("B")), Some(3));
    }

    #[test]
    fn test_elimination_tie_uses_policy() {
        // B e C empatam no último lugar da primeira rodada
        let election = ranked(
            &["A", "B", "C"],
            &[(&["A", "B"], 3), (&["B", "C"], 2), (&["C", "B"], 2)],
        );

        let keep_b = irv()
            .tabulate(&election, Precedence::new(["A", "B", "C"]), 1)
            .unwrap();
        assert_eq!(keep_b.winner(), Some(&c("B")));

        let keep_c = irv()
            .tabulate(&election, Precedence::new(["A", "C", "B"]), 1)
            .unwrap();
        assert_eq!(keep_c.winner(), Some(&c("C")));

        let tie_breaks = keep_c
            .audit
            .iter()
            .filter(|e| matches!(e.action, AuditAction::TieBreak { .. }))
            .count();
        assert_eq!(tie_breaks, 1);
    }

    #[test]
    fn test_unresolved_partial_tie_batch_eliminates() {
        let election = ranked(
            &["A", "B", "C", "D"],
            &[(&["A"], 4), (&["B", "A"], 1), (&["C", "A"], 1), (&["D"], 3)],
        );
        let result = irv().tabulate(&election, ReportTie, 1).unwrap();

        // B e C saem juntos; as duas cédulas vão para A
        assert_eq!(result.winner(), Some(&c("A")));
        let batch = result.audit.iter().find_map(|e| match &e.action {
            AuditAction::Eliminated { candidates } if candidates.len() > 1 => {
                Some(candidates.clone())
            }
            _ => None,
        });
        assert_eq!(batch, Some(vec![c("B"), c("C")]));
        assert_eq!(result.position_of(&c("B")), result.position_of(&c("C")));
    }

    #[test]
    fn test_total_tie_is_exhausted_tie() {
        let election = ranked(&["A", "B"], &[(&["A"], 2), (&["B"], 2)]);
        let result = irv().tabulate(&election, ReportTie, 1).unwrap();
        assert_eq!(
            result.outcome,
            Outcome::Unresolved {
                winners: vec![],
                tied: vec![c("A"), c("B")],
                open_seats: 1
            }
        );
        assert!(result
            .audit
            .iter()
            .any(|e| matches!(e.action, AuditAction::Unresolved { .. })));
    }

    #[test]
    fn test_exhaustion_is_non_decreasing() {
        let election = ranked(
            &["A", "B", "C", "D"],
            &[
                (&["A"], 5),
                (&["B"], 2),
                (&["C", "B"], 3),
                (&["D"], 1),
                (&[], 2),
            ],
        );
        let result = irv().tabulate(&election, ReportTie, 1).unwrap();
        let series = exhausted_series(&result);
        assert!(series.windows(2).all(|w| w[0] <= w[1]), "{:?}", series);

        // em branco (2) + D (1) + B depois de sair (2)
        assert_eq!(series.first(), Some(&2.0));
        assert_eq!(result.winner(), Some(&c("A")));
    }

    #[test]
    fn test_final_exhausted_matches_ballots_without_continuing_candidates() {
        let election = ranked(
            &["A", "B", "C"],
            &[(&["A"], 3), (&["B"], 2), (&["C", "A"], 1)],
        );
        let result = irv().tabulate(&election, ReportTie, 1).unwrap();
        // C sai (1 voto, vai para A); A 4 contra B 2
        assert_eq!(result.winner(), Some(&c("A")));
        assert_eq!(exhausted_series(&result).last(), Some(&0.0));
    }

    #[test]
    fn test_tied_preference_split_fraction() {
        let election = grouped(
            &["A", "B", "C"],
            &[
                (vec![vec!["A", "B"]], 2),
                (vec![vec!["A"]], 1),
                (vec![vec!["C"]], 2),
            ],
        );
        let result = irv().tabulate(&election, ReportTie, 1).unwrap();
        let first = result.tally_events().next().unwrap();
        assert_eq!(first.tally[&c("A")], 2.0);
        assert_eq!(first.tally[&c("B")], 1.0);

        let exhaust = Method::InstantRunoff(IrvOptions {
            tied_preference: TiedPreference::Exhaust,
        })
        .tabulate(&election, ReportTie, 1)
        .unwrap();
        let first = exhaust.tally_events().next().unwrap();
        assert_eq!(first.exhausted, Some(2.0));
        assert_eq!(exhaust.winner(), Some(&c("C")));
    }

    #[test]
    fn test_sequential_seats() {
        let election = ranked(
            &["A", "B", "C"],
            &[(&["A", "B"], 4), (&["B", "A"], 3), (&["C", "B"], 2)],
        );
        let result = irv().tabulate(&election, ReportTie, 2).unwrap();
        // B vence a primeira disputa com a transferência de C; A vence a segunda
        assert_eq!(result.winners(), &[c("B"), c("A")]);
        assert_eq!(result.ranking.len(), 3);
        assert_eq!(result.ranking[2].candidates, vec![c("C")]);
    }

    #[test]
    fn test_seeded_policy_reproducible() {
        let election = ranked(
            &["A", "B", "C", "D"],
            &[(&["A"], 1), (&["B"], 1), (&["C"], 1), (&["D"], 1)],
        );
        let first = irv().tabulate(&election, SeededRandom::new(11), 1).unwrap();
        let second = irv().tabulate(&election, SeededRandom::new(11), 1).unwrap();
        assert_eq!(first, second);
        assert!(first.winner().is_some());
    }
}
