//! Motores de apuração.
//!
//! Conjunto fechado de métodos, todos com o mesmo contrato:
//!
//! - **Plurality**: um voto para a primeira preferência
//! - **Approval**: um voto para cada candidato aprovado
//! - **Score**: soma ou média das notas (nulos excluídos)
//! - **Borda**: pontos por posição
//! - **InstantRunoff**: eliminação iterativa com transferência
//! - **Condorcet**: vencedor par a par, ciclos resolvidos por Schulze
//!
//! Cada chamada a [`Method::tabulate`] aloca seu próprio estado de trabalho;
//! a eleição é só lida, então apurações concorrentes não se coordenam.

mod approval;
mod borda;
mod condorcet;
mod irv;
mod plurality;
mod score;

use crate::ballot::BallotShape;
use crate::election::Election;
use crate::result::TabulationResult;
use crate::tiebreak::TieBreaker;
use crate::types::config::{
    BordaScheme, MajorityBase, MethodKind, ScoreAggregation, TabulationConfig, TiedPreference,
};
use crate::types::errors::{TallyError, TallyResult};

/// Opções do Plurality.
///
/// Em cédulas de notas com empate no topo a política de desempate é
/// consultada uma vez por cédula distinta, e todas as cópias dessa cédula
/// seguem a mesma escolha (um único sorteio no `SeededRandom`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PluralityOptions {
    pub tied_preference: TiedPreference,
    pub majority_base: MajorityBase,
}

/// Opções do Approval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ApprovalOptions {
    /// Cédulas ordenadas aprovam posições `<= max_rank` (todas se `None`).
    pub max_rank: Option<u32>,
    /// Cédulas de notas aprovam notas `>= min_score` (acima do mínimo se `None`).
    pub min_score: Option<i32>,
}

/// Opções do Score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ScoreOptions {
    pub aggregation: ScoreAggregation,
}

/// Opções do Borda.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BordaOptions {
    pub scheme: BordaScheme,
}

/// Opções do IRV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IrvOptions {
    pub tied_preference: TiedPreference,
}

/// Método de apuração com suas opções.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Plurality(PluralityOptions),
    Approval(ApprovalOptions),
    Score(ScoreOptions),
    Borda(BordaOptions),
    InstantRunoff(IrvOptions),
    Condorcet,
}

impl Method {
    /// Monta o método a partir da configuração de apuração.
    pub fn from_config(config: &TabulationConfig) -> Self {
        Self::for_kind(config.method, config)
    }

    /// Monta o método `kind` com as opções da configuração.
    pub fn for_kind(kind: MethodKind, config: &TabulationConfig) -> Self {
        match kind {
            MethodKind::Plurality => Method::Plurality(PluralityOptions {
                tied_preference: config.tied_preference,
                majority_base: config.majority_base,
            }),
            MethodKind::Approval => Method::Approval(ApprovalOptions {
                max_rank: config.approval_max_rank,
                min_score: config.approval_min_score,
            }),
            MethodKind::Score => Method::Score(ScoreOptions {
                aggregation: config.score_aggregation,
            }),
            MethodKind::Borda => Method::Borda(BordaOptions {
                scheme: config.borda_scheme,
            }),
            MethodKind::InstantRunoff => Method::InstantRunoff(IrvOptions {
                tied_preference: config.tied_preference,
            }),
            MethodKind::Condorcet => Method::Condorcet,
        }
    }

    pub fn kind(&self) -> MethodKind {
        match self {
            Method::Plurality(_) => MethodKind::Plurality,
            Method::Approval(_) => MethodKind::Approval,
            Method::Score(_) => MethodKind::Score,
            Method::Borda(_) => MethodKind::Borda,
            Method::InstantRunoff(_) => MethodKind::InstantRunoff,
            Method::Condorcet => MethodKind::Condorcet,
        }
    }

    /// Indica se o método consome cédulas da forma dada.
    ///
    /// Só o Score exige notas; os demais leem cédulas de notas pelo
    /// ranking induzido.
    pub fn accepts(&self, shape: BallotShape) -> bool {
        match self {
            Method::Score(_) => shape == BallotShape::Rated,
            _ => true,
        }
    }

    /// Apura a eleição.
    ///
    /// A política de desempate é recebida por valor; para reaproveitar a
    /// sequência de um sorteio entre chamadas, passe `&mut policy`.
    pub fn tabulate<T: TieBreaker>(
        &self,
        election: &Election,
        mut tie_breaker: T,
        winners: usize,
    ) -> TallyResult<TabulationResult> {
        election.ensure_tabulable()?;
        if winners == 0 || winners > election.num_candidates() {
            return Err(TallyError::invalid(format!(
                "vagas pedidas ({}) fora de 1..={}",
                winners,
                election.num_candidates()
            )));
        }
        if !self.accepts(election.shape()) {
            return Err(TallyError::ShapeMismatch {
                method: self.kind().to_string(),
                shape: election.shape().to_string(),
            });
        }

        tracing::debug!(
            method = %self.kind(),
            winners,
            policy = tie_breaker.name(),
            ballots = election.ballot_count(),
            "Iniciando apuração"
        );

        let policy: &mut dyn TieBreaker = &mut tie_breaker;
        let result = match self {
            Method::Plurality(options) => plurality::tabulate(election, options, winners, policy),
            Method::Approval(options) => approval::tabulate(election, options, winners, policy),
            Method::Score(options) => score::tabulate(election, options, winners, policy),
            Method::Borda(options) => borda::tabulate(election, options, winners, policy),
            Method::InstantRunoff(options) => irv::tabulate(election, options, winners, policy),
            Method::Condorcet => condorcet::tabulate(election, winners, policy),
        };

        if result.is_tie() {
            tracing::warn!(
                method = %self.kind(),
                tied = ?result.tied(),
                "Apuração terminou com empate sem resolução"
            );
        } else {
            tracing::info!(
                method = %self.kind(),
                winners = ?result.winners(),
                rounds = result.rounds(),
                "Apuração concluída"
            );
        }
        Ok(result)
    }
}

impl From<MethodKind> for Method {
    fn from(kind: MethodKind) -> Self {
        Self::for_kind(kind, &TabulationConfig::default())
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::ballot::{Candidate, RankedBallot, RatedBallot, ScoreRange};
    use crate::election::{Election, ElectionBuilder};

    pub fn c(id: &str) -> Candidate {
        Candidate::new(id)
    }

    /// Eleição ordenada a partir de pares (sequência, quantidade).
    pub fn ranked(candidates: &[&str], ballots: &[(&[&str], u64)]) -> Election {
        let mut builder = ElectionBuilder::ranked(candidates.iter().copied()).unwrap();
        for (order, count) in ballots {
            builder
                .add_ballots(RankedBallot::from_sequence(order.iter().copied()).unwrap(), *count)
                .unwrap();
        }
        builder.freeze()
    }

    /// Eleição com grupos empatados: cada cédula é uma lista de grupos.
    pub fn grouped(candidates: &[&str], ballots: &[(Vec<Vec<&str>>, u64)]) -> Election {
        let mut builder = ElectionBuilder::ranked(candidates.iter().copied()).unwrap();
        for (groups, count) in ballots {
            builder
                .add_ballots(RankedBallot::from_groups(groups.clone()).unwrap(), *count)
                .unwrap();
        }
        builder.freeze()
    }

    /// Eleição de notas no intervalo padrão (0..=9).
    pub fn rated(candidates: &[&str], ballots: &[(&[(&str, i32)], u64)]) -> Election {
        let range = ScoreRange::default();
        let mut builder = ElectionBuilder::rated(candidates.iter().copied(), range).unwrap();
        for (scores, count) in ballots {
            builder
                .add_ballots(RatedBallot::new(scores.iter().copied(), &range).unwrap(), *count)
                .unwrap();
        }
        builder.freeze()
    }

    /// Cenário clássico: A>B>C ×2, B>C>A, C>B>A ×2.
    pub fn three_way() -> Election {
        ranked(
            &["A", "B", "C"],
            &[
                (&["A", "B", "C"], 2),
                (&["B", "C", "A"], 1),
                (&["C", "B", "A"], 2),
            ],
        )
    }

    /// Ciclo simétrico: A>B>C, B>C>A, C>A>B.
    pub fn cycle() -> Election {
        ranked(
            &["A", "B", "C"],
            &[
                (&["A", "B", "C"], 1),
                (&["B", "C", "A"], 1),
                (&["C", "A", "B"], 1),
            ],
        )
    }
}
