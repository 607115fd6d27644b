//! Implementação dos comandos CLI do votecount.

use std::path::{Path, PathBuf};

use crate::analysis::{Comparison, ElectionAnalyzer};
use crate::election::{BallotTable, Election};
use crate::result::{AuditAction, Outcome, TabulationResult};
use crate::types::config::{Config, MethodKind};
use crate::validation::{absolute_majority_winner, validate, ValidationReport};
use crate::TallyResult;

/// Initializes configuration in the specified directory.
pub fn init(path: Option<PathBuf>) -> TallyResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join("votecount.toml");

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    Config::default_config().save(&config_path)?;

    println!("votecount initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Choose a method and tie-break policy in votecount.toml");
    println!("  2. Tabulate a ballot table: votecount tabulate ballots.json");

    Ok(())
}

/// Carrega a tabela e congela a eleição.
fn load_election(input: &Path) -> TallyResult<Election> {
    let election = BallotTable::load(input)?.into_election()?;
    tracing::debug!(
        input = %input.display(),
        candidates = election.num_candidates(),
        ballots = election.ballot_count(),
        digest = %election.digest(),
        "Eleição carregada"
    );
    Ok(election)
}

/// Aplica os parâmetros da linha de comando sobre a configuração.
fn with_overrides(
    config: &Config,
    method: Option<MethodKind>,
    winners: Option<usize>,
) -> TallyResult<Config> {
    let mut config = config.clone();
    if let Some(method) = method {
        config.tabulation.method = method;
    }
    if let Some(winners) = winners {
        config.tabulation.winners = winners;
    }
    config.validate()?;
    Ok(config)
}

/// Apura uma tabela de cédulas.
pub fn tabulate(
    input: &Path,
    method: Option<MethodKind>,
    winners: Option<usize>,
    json: bool,
    config: &Config,
) -> TallyResult<()> {
    let config = with_overrides(config, method, winners)?;
    let election = load_election(input)?;

    let mut analyzer = ElectionAnalyzer::new(&config);
    let result = analyzer.tabulate(&election)?;
    let report = validate(&result, &election);

    if json {
        let output = serde_json::json!({
            "result": result,
            "validation": report,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_result(&result);
        print_validation(&result, &report);
    }

    Ok(())
}

/// Apura com todos os métodos compatíveis.
pub fn compare(
    input: &Path,
    winners: Option<usize>,
    json: bool,
    config: &Config,
) -> TallyResult<()> {
    let config = with_overrides(config, None, winners)?;
    let election = load_election(input)?;

    let mut analyzer = ElectionAnalyzer::new(&config);
    let comparison = analyzer.compare(&election, &MethodKind::ALL)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        print_comparison(&comparison);
    }

    Ok(())
}

/// Mostra o conteúdo de uma tabela.
pub fn inspect(input: &Path) -> TallyResult<()> {
    let election = load_election(input)?;

    println!("Forma: {}", election.shape());
    if let Some(range) = election.score_range() {
        println!("Notas: {}", range);
    }
    println!("Cédulas: {}", election.ballot_count());
    println!("Cédulas distintas: {}", election.ballots().len());
    println!("Digest: {}", election.digest());
    println!();
    println!("Candidatos (cédulas com opinião):");
    for (candidate, count) in election.participation() {
        println!("  {} - {}", candidate, count);
    }

    Ok(())
}

/// Mostra versão.
pub fn version() {
    println!("votecount {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Apuração determinística e auditável de eleições");
}

fn print_result(result: &TabulationResult) {
    println!("Método: {}", result.method);
    println!("Cédulas: {}", result.total_ballots);
    println!("Vagas: {}", result.winners_requested);
    println!("Desempate: {}", result.tie_break_policy);
    println!();

    match &result.outcome {
        Outcome::Decided { winners } => {
            for winner in winners {
                println!("Vencedor: {}", winner);
            }
        }
        Outcome::Unresolved {
            winners,
            tied,
            open_seats,
        } => {
            for winner in winners {
                println!("Vencedor: {}", winner);
            }
            println!(
                "Empate sem resolução ({} vaga(s) em aberto): {}",
                open_seats,
                join(tied)
            );
        }
    }
    if let Some(majority) = &result.majority {
        println!("Maioria: {}", majority);
    }

    println!();
    println!("Classificação:");
    for (position, group) in result.ranking.iter().enumerate() {
        match group.tally {
            Some(tally) => println!("  {}. {} ({})", position + 1, join(&group.candidates), tally),
            None => println!("  {}. {}", position + 1, join(&group.candidates)),
        }
    }

    let rounds = result.tally_events().count();
    if rounds > 1 {
        println!();
        println!("Rodadas:");
        for event in &result.audit {
            match &event.action {
                AuditAction::Tally => {
                    let counts: Vec<String> = event
                        .tally
                        .iter()
                        .map(|(candidate, votes)| format!("{}={}", candidate, votes))
                        .collect();
                    println!(
                        "  {}: {} (esgotadas: {})",
                        event.round,
                        counts.join(", "),
                        event.exhausted.unwrap_or(0.0)
                    );
                }
                AuditAction::Eliminated { candidates } => {
                    println!("  {}: eliminado(s) {}", event.round, join(candidates));
                }
                _ => {}
            }
        }
    }
}

fn print_validation(result: &TabulationResult, report: &ValidationReport) {
    println!();
    if report.is_valid() {
        println!("Verificações: ok ({})", report.checks.len());
    } else {
        for failure in report.failures() {
            println!("Verificação '{}' falhou: {}", failure.name, failure.detail);
        }
    }
    if let Ok(Some(candidate)) = absolute_majority_winner(result) {
        println!("Maioria absoluta: {}", candidate);
    }
}

fn print_comparison(comparison: &Comparison) {
    for summary in &comparison.summaries {
        let outcome = match &summary.outcome {
            Outcome::Decided { winners } => join(winners),
            Outcome::Unresolved { winners, tied, .. } if winners.is_empty() => {
                format!("empate ({})", join(tied))
            }
            Outcome::Unresolved { winners, tied, .. } => {
                format!("{} + empate ({})", join(winners), join(tied))
            }
        };
        println!("  {:<16} {}", summary.method.as_str(), outcome);
    }
    for skipped in &comparison.skipped {
        println!("  {:<16} (incompatível com as cédulas)", skipped.as_str());
    }

    println!();
    match &comparison.condorcet_winner {
        Some(winner) => println!("Vencedor de Condorcet: {}", winner),
        None => println!("Vencedor de Condorcet: nenhum"),
    }
    match comparison.consensus() {
        Some(winners) => println!("Consenso: {}", join(winners)),
        None => println!("Consenso: não"),
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
