//! Testes de integração para os motores de apuração.

use std::thread;

use votecount::result::AuditAction;
use votecount::rules::{BordaOptions, IrvOptions};
use votecount::types::config::{BordaScheme, TiedPreference};
use votecount::validation::validate;
use votecount::{
    Candidate, Election, ElectionBuilder, Method, MethodKind, Outcome, Precedence, RankedBallot,
    RatedBallot, ReportTie, ScoreRange, SeededRandom,
};

fn c(id: &str) -> Candidate {
    Candidate::new(id)
}

fn ranked(candidates: &[&str], ballots: &[(&[&str], u64)]) -> Election {
    let mut builder = ElectionBuilder::ranked(candidates.iter().copied()).unwrap();
    for (order, count) in ballots {
        builder
            .add_ballots(RankedBallot::from_sequence(order.iter().copied()).unwrap(), *count)
            .unwrap();
    }
    builder.freeze()
}

/// `A>B>C x2, B>C>A, C>B>A x2`.
fn three_way() -> Election {
    ranked(
        &["A", "B", "C"],
        &[
            (&["A", "B", "C"], 2),
            (&["B", "C", "A"], 1),
            (&["C", "B", "A"], 2),
        ],
    )
}

fn ranked_methods() -> Vec<Method> {
    MethodKind::ALL
        .into_iter()
        .filter(|kind| *kind != MethodKind::Score)
        .map(Method::from)
        .collect()
}

// Propriedades gerais
mod properties {
    use super::*;

    #[test]
    fn test_ballot_order_invariance() {
        let ballots: Vec<(Vec<&str>, u64)> = vec![
            (vec!["A", "B"], 1),
            (vec!["C"], 1),
            (vec!["B", "A", "C"], 1),
            (vec!["A", "B"], 1),
            (vec!["D", "C"], 1),
            (vec!["C", "D"], 1),
            (vec!["B"], 1),
        ];

        let build = |order: &[(Vec<&str>, u64)]| {
            let mut builder = ElectionBuilder::ranked(["A", "B", "C", "D"]).unwrap();
            for (ranking, count) in order {
                builder
                    .add_ballots(
                        RankedBallot::from_sequence(ranking.iter().copied()).unwrap(),
                        *count,
                    )
                    .unwrap();
            }
            builder.freeze()
        };
        let forward = build(&ballots);
        let mut reversed_order = ballots.clone();
        reversed_order.reverse();
        let reversed = build(&reversed_order);
        let mut rotated_order = ballots.clone();
        rotated_order.rotate_left(3);
        let rotated = build(&rotated_order);

        assert_eq!(forward.digest(), reversed.digest());
        assert_eq!(forward.digest(), rotated.digest());

        for method in ranked_methods() {
            for seats in 1..=2 {
                let first = method
                    .tabulate(&forward, SeededRandom::new(11), seats)
                    .unwrap();
                let second = method
                    .tabulate(&reversed, SeededRandom::new(11), seats)
                    .unwrap();
                let third = method
                    .tabulate(&rotated, SeededRandom::new(11), seats)
                    .unwrap();
                assert_eq!(first, second, "{} com {} vaga(s)", method, seats);
                assert_eq!(first, third, "{} com {} vaga(s)", method, seats);
            }
        }
    }

    #[test]
    fn test_plurality_majority_wins() {
        let election = ranked(
            &["A", "B", "C"],
            &[(&["A", "B"], 6), (&["B"], 3), (&["C", "A"], 2), (&[], 4)],
        );
        let result = Method::from(MethodKind::Plurality)
            .tabulate(&election, ReportTie, 1)
            .unwrap();
        assert_eq!(result.winner(), Some(&c("A")));
        assert_eq!(result.majority, Some(c("A")));
        assert_eq!(result.tally_of(&c("A")), Some(6.0));
    }

    #[test]
    fn test_irv_exhaustion_is_monotonic() {
        let election = ranked(
            &["A", "B", "C", "D"],
            &[(&["A"], 4), (&["B"], 3), (&["C", "B"], 2), (&["D", "C"], 1)],
        );
        let result = Method::from(MethodKind::InstantRunoff)
            .tabulate(&election, Precedence::new(["A", "B", "C", "D"]), 1)
            .unwrap();

        let exhausted: Vec<f64> = result
            .tally_events()
            .map(|e| e.exhausted.unwrap_or(0.0))
            .collect();
        assert!(exhausted.windows(2).all(|w| w[0] <= w[1]), "{:?}", exhausted);
        assert_eq!(result.winner(), Some(&c("B")));
        assert!(validate(&result, &election).is_valid());
    }

    #[test]
    fn test_irv_final_exhausted_matches_ballots_without_candidates() {
        // B e C empatam em 3 depois da saída de D e saem juntos
        let election = ranked(
            &["A", "B", "C", "D"],
            &[(&["A"], 4), (&["B"], 3), (&["C"], 2), (&["D", "C"], 1)],
        );
        let result = Method::from(MethodKind::InstantRunoff)
            .tabulate(&election, ReportTie, 1)
            .unwrap();

        assert_eq!(result.winner(), Some(&c("A")));
        let last = result.tally_events().last().unwrap();
        assert_eq!(last.exhausted, Some(6.0));
        assert!(result.audit.iter().any(|e| matches!(
            &e.action,
            AuditAction::Eliminated { candidates } if candidates.len() == 2
        )));
    }

    #[test]
    fn test_condorcet_consistency() {
        let datasets = [
            three_way(),
            ranked(
                &["A", "B", "C", "D"],
                &[
                    (&["D", "A", "B"], 3),
                    (&["A", "D", "C"], 2),
                    (&["B", "C", "D"], 2),
                    (&["C", "D"], 1),
                ],
            ),
            ranked(&["X", "Y"], &[(&["Y"], 2), (&["X", "Y"], 1)]),
        ];
        for election in &datasets {
            let result = Method::Condorcet
                .tabulate(election, ReportTie, 1)
                .unwrap();
            let pairwise = result.pairwise.as_ref().unwrap();
            let expected = pairwise.condorcet_winner.clone();
            assert!(expected.is_some());
            assert_eq!(result.winner(), expected.as_ref());
        }
    }

    #[test]
    fn test_borda_full_ranking_sums_to_triangular_number() {
        let candidates = ["A", "B", "C", "D", "E"];
        let election = ranked(&candidates, &[(&["C", "A", "E", "B", "D"], 1)]);
        let result = Method::from(MethodKind::Borda)
            .tabulate(&election, ReportTie, 1)
            .unwrap();
        let total: f64 = candidates
            .iter()
            .map(|id| result.tally_of(&c(id)).unwrap())
            .sum();
        assert_eq!(total, 10.0);
        assert_eq!(result.winner(), Some(&c("C")));
    }

    #[test]
    fn test_score_silent_candidate_excluded() {
        let range = ScoreRange::new(0, 5).unwrap();
        let mut builder = ElectionBuilder::rated(["A", "B", "Z"], range).unwrap();
        builder
            .add_ballots(RatedBallot::new([("A", 1), ("B", 0)], &range).unwrap(), 3)
            .unwrap();
        let election = builder.freeze();

        let result = Method::from(MethodKind::Score)
            .tabulate(&election, ReportTie, 1)
            .unwrap();
        assert_eq!(result.winner(), Some(&c("A")));
        assert_eq!(result.tally_of(&c("B")), Some(0.0));
        assert_eq!(result.tally_of(&c("Z")), None);
        assert_eq!(result.position_of(&c("Z")), Some(3));
    }

    #[test]
    fn test_concurrent_tabulations_match_sequential() {
        let election = three_way();
        let methods = ranked_methods();
        let sequential: Vec<_> = methods
            .iter()
            .map(|m| m.tabulate(&election, SeededRandom::new(5), 1).unwrap())
            .collect();

        let concurrent: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = methods
                .iter()
                .map(|m| {
                    let election = &election;
                    scope.spawn(move || m.tabulate(election, SeededRandom::new(5), 1).unwrap())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(sequential, concurrent);
    }
}

// Cenários documentados
mod scenarios {
    use super::*;

    #[test]
    fn test_three_way_plurality() {
        let election = three_way();
        let plurality = Method::from(MethodKind::Plurality);

        // A e C empatam com 2 votos; ninguém tem maioria
        let report = plurality.tabulate(&election, ReportTie, 1).unwrap();
        assert_eq!(report.tied(), &[c("A"), c("C")]);
        assert_eq!(report.majority, None);

        let decided = plurality
            .tabulate(&election, Precedence::new(["A", "C", "B"]), 1)
            .unwrap();
        assert_eq!(decided.winner(), Some(&c("A")));
        assert_eq!(decided.majority, None);
    }

    #[test]
    fn test_three_way_irv_hand_count() {
        let result = Method::from(MethodKind::InstantRunoff)
            .tabulate(&three_way(), ReportTie, 1)
            .unwrap();

        // rodada 1: A=2 B=1 C=2, B sai; rodada 2: A=2 C=3
        let tallies: Vec<_> = result.tally_events().collect();
        assert_eq!(tallies.len(), 2);
        assert_eq!(tallies[0].tally[&c("B")], 1.0);
        assert_eq!(tallies[1].tally[&c("C")], 3.0);
        assert_eq!(tallies[1].tally[&c("A")], 2.0);
        assert_eq!(result.winner(), Some(&c("C")));
        assert_eq!(result.majority, Some(c("C")));
    }

    #[test]
    fn test_irv_tied_last_place_uses_policy() {
        // A=3, B=1, C=1, D=2: B e C empatam no último lugar
        let election = ranked(
            &["A", "B", "C", "D"],
            &[(&["A"], 3), (&["B", "A"], 1), (&["C", "A"], 1), (&["D"], 2)],
        );
        let result = Method::from(MethodKind::InstantRunoff)
            .tabulate(&election, Precedence::new(["B", "C", "A", "D"]), 1)
            .unwrap();
        assert!(result.audit.iter().any(|e| matches!(
            &e.action,
            AuditAction::TieBreak { selected: Some(s), .. } if *s == c("C")
        )));
        assert_eq!(result.winner(), Some(&c("A")));
    }

    #[test]
    fn test_cycle_symmetric_paths_reported() {
        let cycle = ranked(
            &["A", "B", "C"],
            &[
                (&["A", "B", "C"], 1),
                (&["B", "C", "A"], 1),
                (&["C", "A", "B"], 1),
            ],
        );
        let result = Method::Condorcet.tabulate(&cycle, ReportTie, 1).unwrap();
        assert!(matches!(
            &result.outcome,
            Outcome::Unresolved { tied, open_seats: 1, .. } if tied.len() == 3
        ));
        assert_eq!(result.pairwise.as_ref().unwrap().condorcet_winner, None);
    }

    #[test]
    fn test_cycle_asymmetric_paths_broken() {
        let cycle = ranked(
            &["A", "B", "C"],
            &[
                (&["A", "B", "C"], 4),
                (&["B", "C", "A"], 3),
                (&["C", "A", "B"], 2),
            ],
        );
        let result = Method::Condorcet.tabulate(&cycle, ReportTie, 1).unwrap();
        assert_eq!(result.winner(), Some(&c("A")));
        let order: Vec<_> = result
            .ranking
            .iter()
            .flat_map(|g| g.candidates.clone())
            .collect();
        assert_eq!(order, vec![c("A"), c("B"), c("C")]);
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let election = ranked(
            &["A", "B", "C", "D"],
            &[(&["A"], 1), (&["B"], 1), (&["C"], 1), (&["D"], 1)],
        );
        let plurality = Method::from(MethodKind::Plurality);
        let first = plurality
            .tabulate(&election, SeededRandom::new(2024), 2)
            .unwrap();
        let second = plurality
            .tabulate(&election, SeededRandom::new(2024), 2)
            .unwrap();
        assert_eq!(first.winners(), second.winners());
        assert_eq!(first.winners().len(), 2);
        assert!(!first.is_tie());
    }
}

// Listas longas: denominadores que não cabem em 128 bits
mod large_rosters {
    use super::*;

    fn roster(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("C{:02}", i)).collect()
    }

    #[test]
    fn test_dowdall_with_many_candidates() {
        let names = roster(47);
        let mut builder = ElectionBuilder::ranked(names.iter().map(String::as_str)).unwrap();
        for shift in 0..names.len() {
            let mut order = names.clone();
            order.rotate_left(shift);
            builder
                .add_ballot(RankedBallot::from_sequence(order).unwrap())
                .unwrap();
        }
        builder
            .add_ballot(RankedBallot::from_sequence(["C00"]).unwrap())
            .unwrap();
        let election = builder.freeze();

        let dowdall = Method::Borda(BordaOptions {
            scheme: BordaScheme::Dowdall,
        });
        let result = dowdall.tabulate(&election, ReportTie, 1).unwrap();

        // cada candidato recebe H(47) das rotações; C00 ganha 1 a mais
        let harmonic: f64 = (1..=47).map(|k| 1.0 / k as f64).sum();
        assert_eq!(result.winner(), Some(&c("C00")));
        assert!((result.tally_of(&c("C00")).unwrap() - harmonic - 1.0).abs() < 1e-9);
        assert!((result.tally_of(&c("C46")).unwrap() - harmonic).abs() < 1e-9);
        assert_eq!(result.ranking.len(), 2);
        assert_eq!(result.ranking[1].candidates.len(), 46);
    }

    #[test]
    fn test_irv_split_with_many_tied_group_sizes() {
        // uma cédula por tamanho de grupo: {C00..C(s-1)} empatados no topo
        let names = roster(60);
        let mut builder = ElectionBuilder::ranked(names.iter().map(String::as_str)).unwrap();
        for size in 2..=names.len() {
            let top: Vec<&str> = names[..size].iter().map(String::as_str).collect();
            builder
                .add_ballot(RankedBallot::from_groups([top]).unwrap())
                .unwrap();
        }
        let election = builder.freeze();

        let irv = Method::InstantRunoff(IrvOptions {
            tied_preference: TiedPreference::Split,
        });
        let result = irv.tabulate(&election, ReportTie, 1).unwrap();

        // um eliminado por rodada até C00 e C01 empatarem em 59/2
        assert_eq!(result.tally_events().count(), 59);
        let last = result.tally_events().last().unwrap();
        assert_eq!(last.tally[&c("C00")], 29.5);
        assert_eq!(last.tally[&c("C01")], 29.5);
        assert_eq!(result.tied(), &[c("C00"), c("C01")]);
        assert!(validate(&result, &election).is_valid());
    }
}
