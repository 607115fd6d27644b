//! # votecount
//!
//! Apuração determinística e auditável de eleições.
//!
//! Uma eleição é montada com [`ElectionBuilder`], validada e congelada.
//! A eleição congelada é imutável e pode ser apurada por qualquer
//! [`Method`], várias vezes e em paralelo. Cada apuração devolve um
//! [`TabulationResult`] com vencedores, classificação e trilha de
//! auditoria. Empates que a política de desempate não resolve fazem parte
//! do resultado, não são erros.
//!
//! ```
//! use votecount::{ElectionBuilder, Method, MethodKind, RankedBallot, ReportTie};
//!
//! let mut builder = ElectionBuilder::ranked(["A", "B", "C"]).unwrap();
//! builder.add_ballots(RankedBallot::from_sequence(["A", "B"]).unwrap(), 3).unwrap();
//! builder.add_ballots(RankedBallot::from_sequence(["B", "A"]).unwrap(), 2).unwrap();
//! let election = builder.freeze();
//!
//! let result = Method::from(MethodKind::InstantRunoff)
//!     .tabulate(&election, ReportTie, 1)
//!     .unwrap();
//! assert_eq!(result.winner().map(|c| c.as_str()), Some("A"));
//! ```
//!
//! ## Módulos
//!
//! - [`ballot`] - Candidatos e cédulas (ranqueadas e com notas)
//! - [`election`] - Conjunto de cédulas validado e congelado
//! - [`rules`] - Métodos de apuração
//! - [`tiebreak`] - Políticas de desempate
//! - [`result`] - Resultado e trilha de auditoria
//! - [`validation`] - Verificações cruzadas e maiorias
//! - [`analysis`] - Comparação entre métodos
//! - [`cache`] - Cache LRU para resultados de apuração
//! - [`tally`] - Aritmética exata de votos
//! - [`types`] - Configuração e erros

pub mod analysis;
pub mod ballot;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod election;
pub mod result;
pub mod rules;
pub mod tally;
pub mod tiebreak;
pub mod types;
pub mod validation;

pub use analysis::{Comparison, ElectionAnalyzer};
pub use ballot::{Ballot, BallotShape, Candidate, RankedBallot, RatedBallot, ScoreRange};
pub use election::{BallotTable, Election, ElectionBuilder};
pub use result::{Outcome, RankingGroup, TabulationResult};
pub use rules::Method;
pub use tiebreak::{create_tie_breaker, Precedence, ReportTie, SeededRandom, TieBreaker};
pub use types::config::{Config, MethodKind};
pub use types::errors::{TallyError, TallyResult};
