//! Condorcet com resolução de ciclos por Schulze.
//!
//! `d[a][b]` conta as cédulas que preferem `a` a `b`. Candidatos não
//! ranqueados ficam abaixo de todos os ranqueados; empates (inclusive dois
//! não ranqueados) dão meia preferência para cada lado.
//!
//! Os caminhos mais fortes usam as margens `d[a][b] - d[b][a]` como peso
//! das arestas (só margens positivas viram arestas).

use crate::election::{Election, Profile};
use crate::result::{
    decide, snapshot, AuditAction, AuditEvent, AuditLog, PairwiseSummary, Standing,
    TabulationResult,
};
use crate::tally::Votes;
use crate::tiebreak::TieBreaker;
use crate::types::config::MethodKind;

type Matrix = Vec<Vec<Votes>>;

/// Matriz de preferências par a par.
fn pairwise(n: usize, profiles: &[Profile]) -> Matrix {
    let mut d = vec![vec![Votes::zero(); n]; n];
    for profile in profiles {
        let mut position = vec![usize::MAX; n];
        for (p, group) in profile.groups.iter().enumerate() {
            for &c in group {
                position[c] = p;
            }
        }

        let whole = Votes::from(profile.count);
        let half = whole.split(2);
        for a in 0..n {
            for b in (a + 1)..n {
                match position[a].cmp(&position[b]) {
                    std::cmp::Ordering::Less => d[a][b] += &whole,
                    std::cmp::Ordering::Greater => d[b][a] += &whole,
                    std::cmp::Ordering::Equal => {
                        d[a][b] += &half;
                        d[b][a] += &half;
                    }
                }
            }
        }
    }
    d
}

/// Candidato que vence todos os outros par a par.
fn condorcet_winner(d: &Matrix) -> Option<usize> {
    let n = d.len();
    (0..n).find(|&a| (0..n).all(|b| a == b || d[a][b] > d[b][a]))
}

/// Caminhos mais fortes (widest path, Floyd–Warshall).
fn strongest_paths(d: &Matrix) -> Matrix {
    let n = d.len();
    let mut p = vec![vec![Votes::zero(); n]; n];
    for a in 0..n {
        for b in 0..n {
            if a != b {
                let margin = &d[a][b] - &d[b][a];
                if margin.is_positive() {
                    p[a][b] = margin;
                }
            }
        }
    }

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            for k in 0..n {
                if k != i && k != j {
                    let through = (&p[j][i]).min(&p[i][k]).clone();
                    if through > p[j][k] {
                        p[j][k] = through;
                    }
                }
            }
        }
    }
    p
}

/// Camadas da ordem de Schulze: cada camada reúne os restantes que nenhum
/// outro restante derrota por caminho mais forte.
fn schulze_layers(p: &Matrix) -> Vec<Vec<usize>> {
    let mut remaining: Vec<usize> = (0..p.len()).collect();
    let mut layers = Vec::new();
    while !remaining.is_empty() {
        let unbeaten: Vec<usize> = remaining
            .iter()
            .copied()
            .filter(|&a| remaining.iter().all(|&b| p[b][a] <= p[a][b]))
            .collect();
        // relação transitiva: `unbeaten` só fica vazio com matriz corrompida
        let layer = if unbeaten.is_empty() {
            remaining.clone()
        } else {
            unbeaten
        };
        remaining.retain(|c| !layer.contains(c));
        layers.push(layer);
    }
    layers
}

fn to_f64(matrix: &Matrix) -> Vec<Vec<f64>> {
    matrix
        .iter()
        .map(|row| row.iter().map(Votes::to_f64).collect())
        .collect()
}

pub(crate) fn tabulate(
    election: &Election,
    seats: usize,
    tie_breaker: &mut dyn TieBreaker,
) -> TabulationResult {
    let mut audit = AuditLog::new();
    audit.configured("unranked=below_all, tied=half, paths=margins");

    let candidates = election.candidates();
    let n = candidates.len();
    let d = pairwise(n, &election.profiles());

    // vitórias par a par de cada candidato (Copeland), só para a trilha
    let wins: Vec<Votes> = (0..n)
        .map(|a| Votes::from((0..n).filter(|&b| a != b && d[a][b] > d[b][a]).count() as u64))
        .collect();
    audit.push(
        AuditEvent::new(0, AuditAction::Tally)
            .with_tally(snapshot(candidates.iter().zip(wins.iter())))
            .with_note("vitórias par a par"),
    );

    let winner = condorcet_winner(&d);
    match winner {
        Some(index) => {
            tracing::debug!(winner = %candidates[index], "Vencedor de Condorcet");
            audit.push(AuditEvent::new(
                0,
                AuditAction::CondorcetWinner {
                    candidate: candidates[index].clone(),
                },
            ));
        }
        None => {
            tracing::debug!("Sem vencedor de Condorcet: resolvendo por Schulze");
            audit.push(AuditEvent::new(0, AuditAction::CondorcetCycle));
        }
    }

    let p = strongest_paths(&d);
    audit.push(AuditEvent::new(0, AuditAction::StrongestPaths));

    let layers = schulze_layers(&p);
    let depth = layers.len();
    let standings: Vec<Standing> = layers
        .iter()
        .enumerate()
        .map(|(level, layer)| Standing {
            candidates: layer.iter().map(|&i| candidates[i].clone()).collect(),
            tally: Some(Votes::from((depth - level) as u64)),
        })
        .collect();
    let (outcome, mut ranking) = decide(standings, seats, tie_breaker, 0, &mut audit);
    // o nível de Schulze não é uma contagem
    for group in &mut ranking {
        group.tally = None;
    }

    let summary = PairwiseSummary {
        candidates: candidates.to_vec(),
        preferences: to_f64(&d),
        strongest_paths: to_f64(&p),
        condorcet_winner: winner.map(|i| candidates[i].clone()),
    };

    TabulationResult::new(
        MethodKind::Condorcet,
        election,
        seats,
        tie_breaker.name(),
        outcome,
        ranking,
        audit.into_events(),
    )
    .with_pairwise(summary)
}
