//! Identificador de candidato.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identificador opaco de um candidato, único dentro de uma eleição.
///
/// Identificadores inteiros são aceitos e guardados na forma textual.
/// A ordenação derivada serve apenas para iteração determinística;
/// ela nunca é usada como critério de desempate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate(String);

impl Candidate {
    /// Cria um novo candidato.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Retorna o identificador textual.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Candidate {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Candidate {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Candidate {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&String> for Candidate {
    fn from(id: &String) -> Self {
        Self(id.clone())
    }
}

impl From<&Candidate> for Candidate {
    fn from(candidate: &Candidate) -> Self {
        candidate.clone()
    }
}

impl From<u64> for Candidate {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}
