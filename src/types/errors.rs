//! Tipos de erro do votecount.
//!
//! Erros de validação aparecem na construção do conjunto de dados.
//! Uma apuração sobre uma eleição congelada só falha por pré-condição
//! (eleição vazia, método incompatível, número de vagas inválido).
//! Empates não resolvidos nunca são erros: fazem parte do resultado.

use thiserror::Error;

/// Tipo de resultado padrão do votecount.
pub type TallyResult<T> = Result<T, TallyError>;

/// Erros possíveis no votecount.
#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Cédula malformada: {0}")]
    MalformedBallot(String),

    #[error("Candidato desconhecido: '{0}'")]
    UnknownCandidate(String),

    #[error("Candidato duplicado na lista: '{0}'")]
    DuplicateCandidate(String),

    #[error("Eleição vazia: {0}")]
    EmptyElection(String),

    #[error("Método '{method}' não aceita cédulas do tipo '{shape}'")]
    ShapeMismatch { method: String, shape: String },

    #[error("Parâmetro inválido: {0}")]
    InvalidParameter(String),

    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TallyError {
    /// Cria um erro de cédula malformada.
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedBallot(msg.into())
    }

    /// Cria um erro de parâmetro inválido.
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Indica se o erro veio da validação dos dados de entrada.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedBallot(_) | Self::UnknownCandidate(_) | Self::DuplicateCandidate(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TallyError::UnknownCandidate("Zed".to_string());
        assert_eq!(err.to_string(), "Candidato desconhecido: 'Zed'");

        let err = TallyError::ShapeMismatch {
            method: "score".to_string(),
            shape: "ranked".to_string(),
        };
        assert!(err.to_string().contains("score"));
        assert!(err.to_string().contains("ranked"));
    }

    #[test]
    fn test_validation_classification() {
        assert!(TallyError::malformed("rank 0").is_validation_error());
        assert!(TallyError::UnknownCandidate("x".into()).is_validation_error());
        assert!(!TallyError::EmptyElection("sem cédulas".into()).is_validation_error());
        assert!(!TallyError::invalid("winners = 0").is_validation_error());
    }
}
