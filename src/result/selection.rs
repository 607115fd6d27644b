//! Corte de vagas comum a todos os métodos.

use std::collections::BTreeMap;

use super::{AuditLog, Outcome, RankingGroup};
use crate::ballot::Candidate;
use crate::tally::Votes;
use crate::tiebreak::{TieBreaker, TieContext, TieDecision, TieOutcome};

/// Grupo de candidatos com a mesma contagem. `tally == None` = inelegível.
#[derive(Debug, Clone)]
pub(crate) struct Standing {
    pub candidates: Vec<Candidate>,
    pub tally: Option<Votes>,
}

impl Standing {
    fn into_group(self) -> RankingGroup {
        RankingGroup {
            candidates: self.candidates,
            tally: self.tally.map(|t| t.to_f64()),
        }
    }
}

/// Agrupa contagens iguais, da maior para a menor; inelegíveis no fim.
pub(crate) fn rank_by_tally(tallies: Vec<(Candidate, Option<Votes>)>) -> Vec<Standing> {
    let mut scored: BTreeMap<std::cmp::Reverse<Votes>, Vec<Candidate>> = BTreeMap::new();
    let mut ineligible = Vec::new();
    for (candidate, tally) in tallies {
        match tally {
            Some(votes) => scored
                .entry(std::cmp::Reverse(votes))
                .or_default()
                .push(candidate),
            None => ineligible.push(candidate),
        }
    }

    let mut standings: Vec<Standing> = scored
        .into_iter()
        .map(|(std::cmp::Reverse(votes), mut candidates)| {
            candidates.sort();
            Standing {
                candidates,
                tally: Some(votes),
            }
        })
        .collect();
    if !ineligible.is_empty() {
        ineligible.sort();
        standings.push(Standing {
            candidates: ineligible,
            tally: None,
        });
    }
    standings
}

/// Preenche `seats` vagas a partir dos grupos ordenados.
///
/// Um grupo que não cabe inteiro nas vagas restantes vai para a política
/// de desempate, uma escolha por vez. Se a política recusar, o desfecho
/// fica `Unresolved` com o grupo em disputa.
pub(crate) fn decide(
    standings: Vec<Standing>,
    seats: usize,
    tie_breaker: &mut dyn TieBreaker,
    round: u32,
    audit: &mut AuditLog,
) -> (Outcome, Vec<RankingGroup>) {
    let tallies: BTreeMap<Candidate, f64> = standings
        .iter()
        .filter_map(|s| s.tally.as_ref().map(|t| (s, t.to_f64())))
        .flat_map(|(s, t)| s.candidates.iter().map(move |c| (c.clone(), t)))
        .collect();

    let mut winners: Vec<Candidate> = Vec::new();
    let mut ranking: Vec<RankingGroup> = Vec::new();
    let mut contested: Option<(Vec<Candidate>, usize)> = None;

    for standing in standings {
        let open = seats.saturating_sub(winners.len());
        if contested.is_some() || standing.tally.is_none() || open == 0 {
            ranking.push(standing.into_group());
            continue;
        }
        if standing.candidates.len() <= open {
            winners.extend(standing.candidates.iter().cloned());
            ranking.push(standing.into_group());
            continue;
        }

        let tally = standing.tally.as_ref().map(Votes::to_f64);
        let mut pool = standing.candidates;
        while winners.len() < seats {
            let context = TieContext {
                round,
                decision: TieDecision::Selection,
                tallies: &tallies,
            };
            match tie_breaker.resolve(&pool, &context) {
                TieOutcome::Resolved(chosen) if pool.contains(&chosen) => {
                    audit.tie_break(
                        round,
                        TieDecision::Selection,
                        &pool,
                        Some(&chosen),
                        tie_breaker.name(),
                    );
                    pool.retain(|c| c != &chosen);
                    ranking.push(RankingGroup {
                        candidates: vec![chosen.clone()],
                        tally,
                    });
                    winners.push(chosen);
                }
                _ => {
                    audit.tie_break(round, TieDecision::Selection, &pool, None, tie_breaker.name());
                    tracing::warn!(tied = ?pool, "Empate sem resolução no corte de vagas");
                    contested = Some((pool.clone(), seats - winners.len()));
                    break;
                }
            }
        }
        if !pool.is_empty() {
            ranking.push(RankingGroup {
                candidates: pool,
                tally,
            });
        }
    }

    let outcome = match contested {
        Some((tied, open_seats)) => Outcome::Unresolved {
            winners,
            tied,
            open_seats,
        },
        None if winners.len() < seats => Outcome::Unresolved {
            open_seats: seats - winners.len(),
            winners,
            tied: Vec::new(),
        },
        None => Outcome::Decided { winners },
    };
    (outcome, ranking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiebreak::{Precedence, ReportTie};

    fn c(id: &str) -> Candidate {
        Candidate::new(id)
    }

    #[test]
    fn test_rank_by_tally_groups_and_orders() {
        let standings = rank_by_tally(vec![
            (c("A"), Some(Votes::whole(2))),
            (c("B"), Some(Votes::whole(5))),
            (c("C"), None),
            (c("D"), Some(Votes::whole(2))),
        ]);
        assert_eq!(standings.len(), 3);
        assert_eq!(standings[0].candidates, vec![c("B")]);
        assert_eq!(standings[1].candidates, vec![c("A"), c("D")]);
        assert!(standings[2].tally.is_none());
    }

    #[test]
    fn test_decide_clear_winner() {
        let standings = rank_by_tally(vec![
            (c("A"), Some(Votes::whole(3))),
            (c("B"), Some(Votes::whole(1))),
        ]);
        let mut audit = AuditLog::new();
        let (outcome, ranking) = decide(standings, 1, &mut ReportTie, 0, &mut audit);
        assert_eq!(outcome, Outcome::Decided { winners: vec![c("A")] });
        assert_eq!(ranking.len(), 2);
        assert!(audit.into_events().is_empty());
    }

    #[test]
    fn test_decide_unresolved_tie_at_cut() {
        let standings = rank_by_tally(vec![
            (c("A"), Some(Votes::whole(3))),
            (c("B"), Some(Votes::whole(3))),
        ]);
        let mut audit = AuditLog::new();
        let (outcome, _) = decide(standings, 1, &mut ReportTie, 0, &mut audit);
        assert_eq!(
            outcome,
            Outcome::Unresolved {
                winners: vec![],
                tied: vec![c("A"), c("B")],
                open_seats: 1
            }
        );
        assert_eq!(audit.into_events().len(), 1);
    }

    #[test]
    fn test_decide_tie_resolved_by_precedence() {
        let standings = rank_by_tally(vec![
            (c("A"), Some(Votes::whole(4))),
            (c("B"), Some(Votes::whole(3))),
            (c("C"), Some(Votes::whole(3))),
        ]);
        let mut audit = AuditLog::new();
        let mut policy = Precedence::new(["C", "B"]);
        let (outcome, ranking) = decide(standings, 2, &mut policy, 0, &mut audit);
        assert_eq!(
            outcome,
            Outcome::Decided {
                winners: vec![c("A"), c("C")]
            }
        );
        assert_eq!(ranking[1].candidates, vec![c("C")]);
        assert_eq!(ranking[2].candidates, vec![c("B")]);
    }

    #[test]
    fn test_decide_not_enough_eligible() {
        let standings = rank_by_tally(vec![(c("A"), Some(Votes::whole(1))), (c("B"), None)]);
        let mut audit = AuditLog::new();
        let (outcome, _) = decide(standings, 2, &mut ReportTie, 0, &mut audit);
        assert_eq!(
            outcome,
            Outcome::Unresolved {
                winners: vec![c("A")],
                tied: vec![],
                open_seats: 1
            }
        );
    }
}
