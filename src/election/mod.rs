//! Conjunto de dados eleitoral.
//!
//! Fluxo: cédulas validadas entram no [`ElectionBuilder`], que ao ser
//! congelado produz uma [`Election`] imutável. Os motores de apuração só
//! aceitam `&Election`, então "congelado" é garantido pelo tipo.
//!
//! [`BallotTable`] é o formato tabular de intercâmbio usado pela camada de
//! ingestão (uma linha por cédula, uma coluna por candidato).

mod dataset;
mod table;

pub(crate) use dataset::Profile;
pub use dataset::{Election, ElectionBuilder, WeightedBallot};
pub use table::{BallotRow, BallotTable};
