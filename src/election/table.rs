//! Formato tabular de intercâmbio.
//!
//! Uma linha por cédula, uma célula por candidato. A célula contém uma
//! posição (ranked) ou uma nota (rated); `null` ou ausência = sem opinião.
//! A ordem das colunas não carrega significado algum.
//!
//! ```json
//! {
//!   "candidates": ["A", "B", "C"],
//!   "shape": "ranked",
//!   "rows": [
//!     { "A": 1, "B": 2, "C": null },
//!     { "C": 1, "count": 4 }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Election, ElectionBuilder};
use crate::ballot::{BallotShape, RankedBallot, RatedBallot, ScoreRange};
use crate::types::errors::{TallyError, TallyResult};

/// Tabela de cédulas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallotTable {
    /// Lista de candidatos.
    pub candidates: Vec<String>,

    /// Forma das cédulas.
    #[serde(default = "default_shape")]
    pub shape: BallotShape,

    /// Intervalo de notas (só para `rated`).
    #[serde(default)]
    pub score_range: Option<ScoreRange>,

    /// Linhas (cédulas).
    #[serde(default)]
    pub rows: Vec<BallotRow>,
}

fn default_shape() -> BallotShape {
    BallotShape::Ranked
}

/// Uma linha da tabela.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallotRow {
    /// Número de cédulas idênticas representadas pela linha.
    #[serde(default = "default_count")]
    pub count: u64,

    /// Célula por candidato.
    #[serde(flatten)]
    pub cells: BTreeMap<String, Option<i64>>,
}

fn default_count() -> u64 {
    1
}

impl BallotRow {
    /// Cria uma linha com contagem 1.
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<i64>)>,
        S: Into<String>,
    {
        Self {
            count: 1,
            cells: cells.into_iter().map(|(c, v)| (c.into(), v)).collect(),
        }
    }

    /// Define a contagem.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }
}

impl BallotTable {
    /// Carrega uma tabela de um arquivo JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> TallyResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let table: BallotTable = serde_json::from_str(&content)?;
        Ok(table)
    }

    /// Valida a tabela e produz a eleição congelada.
    pub fn into_election(self) -> TallyResult<Election> {
        let mut builder = match self.shape {
            BallotShape::Ranked => ElectionBuilder::ranked(&self.candidates)?,
            BallotShape::Rated => {
                ElectionBuilder::rated(&self.candidates, self.score_range.unwrap_or_default())?
            }
        };
        let range = self.score_range.unwrap_or_default();

        for (line, row) in self.rows.iter().enumerate() {
            let present = row
                .cells
                .iter()
                .filter_map(|(candidate, value)| value.map(|v| (candidate.as_str(), v)));

            let added = match self.shape {
                BallotShape::Ranked => {
                    let entries = present
                        .map(|(candidate, value)| {
                            u32::try_from(value)
                                .map(|rank| (candidate, rank))
                                .map_err(|_| {
                                    TallyError::malformed(format!(
                                        "posição inválida {} para '{}'",
                                        value, candidate
                                    ))
                                })
                        })
                        .collect::<TallyResult<Vec<_>>>();
                    entries
                        .and_then(RankedBallot::from_ranks)
                        .and_then(|ballot| builder.add_ballots(ballot, row.count).map(|_| ()))
                }
                BallotShape::Rated => {
                    let entries = present
                        .map(|(candidate, value)| {
                            i32::try_from(value)
                                .map(|score| (candidate, score))
                                .map_err(|_| {
                                    TallyError::malformed(format!(
                                        "nota inválida {} para '{}'",
                                        value, candidate
                                    ))
                                })
                        })
                        .collect::<TallyResult<Vec<_>>>();
                    entries
                        .and_then(|entries| RatedBallot::new(entries, &range))
                        .and_then(|ballot| builder.add_ballots(ballot, row.count).map(|_| ()))
                }
            };

            added.map_err(|e| match e {
                TallyError::MalformedBallot(msg) => {
                    TallyError::MalformedBallot(format!("linha {}: {}", line + 1, msg))
                }
                other => other,
            })?;
        }

        Ok(builder.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ranked_table() {
        let json = r#"{
            "candidates": ["A", "B", "C"],
            "rows": [
                {"A": 1, "B": 2, "C": null},
                {"C": 1, "B": 1, "count": 3}
            ]
        }"#;
        let table: BallotTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.shape, BallotShape::Ranked);
        assert_eq!(table.rows[1].count, 3);

        let election = table.into_election().unwrap();
        assert_eq!(election.ballot_count(), 4);
        assert_eq!(election.participation()["A"], 1);
        assert_eq!(election.participation()["C"], 3);
    }

    #[test]
    fn test_unknown_column_rejected() {
        let table = BallotTable {
            candidates: vec!["A".into()],
            shape: BallotShape::Ranked,
            score_range: None,
            rows: vec![BallotRow::new([("A", Some(1)), ("Q", Some(2))])],
        };
        assert!(matches!(
            table.into_election(),
            Err(TallyError::UnknownCandidate(_))
        ));
    }

    #[test]
    fn test_negative_rank_reports_line() {
        let table = BallotTable {
            candidates: vec!["A".into(), "B".into()],
            shape: BallotShape::Ranked,
            score_range: None,
            rows: vec![
                BallotRow::new([("A", Some(1))]),
                BallotRow::new([("B", Some(-2))]),
            ],
        };
        match table.into_election() {
            Err(TallyError::MalformedBallot(msg)) => assert!(msg.starts_with("linha 2")),
            other => panic!("esperava MalformedBallot, obteve {:?}", other),
        }
    }

    #[test]
    fn test_rated_table_with_nulls() {
        let json = r#"{
            "candidates": ["A", "B"],
            "shape": "rated",
            "score_range": {"min": 0, "max": 5},
            "rows": [{"A": 5, "B": null}, {"A": 0, "B": 3, "count": 2}]
        }"#;
        let table: BallotTable = serde_json::from_str(json).unwrap();
        let election = table.into_election().unwrap();
        assert_eq!(election.shape(), BallotShape::Rated);
        assert_eq!(election.participation()["B"], 2);
    }

    #[test]
    fn test_rated_out_of_range() {
        let json = r#"{
            "candidates": ["A"],
            "shape": "rated",
            "score_range": {"min": 0, "max": 5},
            "rows": [{"A": 6}]
        }"#;
        let table: BallotTable = serde_json::from_str(json).unwrap();
        assert!(table.into_election().is_err());
    }
}
