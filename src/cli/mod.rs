//! Interface de linha de comando do votecount.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::config::MethodKind;

/// votecount - apuração determinística e auditável de eleições.
#[derive(Parser, Debug)]
#[command(name = "votecount")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = "votecount.toml")]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inicializa configuração no diretório atual.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Apura uma tabela de cédulas.
    Tabulate {
        /// Tabela de cédulas (JSON).
        input: PathBuf,

        /// Método (sobrescreve a configuração).
        #[arg(short, long)]
        method: Option<MethodKind>,

        /// Número de vencedores (sobrescreve a configuração).
        #[arg(short, long)]
        winners: Option<usize>,

        /// Saída em JSON, com trilha de auditoria completa.
        #[arg(long)]
        json: bool,
    },

    /// Apura com todos os métodos compatíveis e compara.
    Compare {
        /// Tabela de cédulas (JSON).
        input: PathBuf,

        /// Número de vencedores (sobrescreve a configuração).
        #[arg(short, long)]
        winners: Option<usize>,

        /// Saída em JSON.
        #[arg(long)]
        json: bool,
    },

    /// Mostra candidatos, cédulas e participação de uma tabela.
    Inspect {
        /// Tabela de cédulas (JSON).
        input: PathBuf,
    },

    /// Mostra versão.
    Version,
}
