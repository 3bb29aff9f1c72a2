//! Interface de terminal do dataproc-watch: spinner e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner de progresso e `console` para
//! estilização com cores. O [`WaitProgress`] acompanha visualmente a espera
//! de um job e repassa a saída do driver para o stdout.

use std::io::Write;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::dataproc::ClusterResource;
use crate::waiter::{JobHandle, JobState, WaitError, WaitObserver, WaitOutcome};

/// Indicador visual de progresso durante a espera de um job.
///
/// Exibe um spinner com o último estado conhecido e mensagens coloridas
/// para sucesso (verde), falha (vermelho) e avisos (amarelo).
pub struct WaitProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
    /// Desligado após a primeira falha de escrita no stdout.
    relay_output: bool,
}

impl WaitProgress {
    /// Inicia o spinner para o job e retorna a instância de progresso.
    pub fn start(job_id: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("{job_id}: waiting for first status"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            relay_output: true,
        }
    }

    /// Copia a saída do driver para `out`, desistindo após a primeira falha.
    fn relay(&mut self, out: &mut impl Write, bytes: &[u8]) {
        if !self.relay_output {
            return;
        }
        if let Err(err) = out.write_all(bytes).and_then(|()| out.flush()) {
            warn!(error = %err, "stdout closed, driver output is no longer relayed");
            self.relay_output = false;
        }
    }

    /// Finaliza o spinner e exibe o resultado da espera.
    pub fn finish(&self, result: &Result<WaitOutcome, WaitError>) {
        self.pb.finish_and_clear();
        match result {
            Ok(outcome) => {
                if let Some(warning) = outcome.output_warning {
                    eprintln!("  {} {warning}", self.yellow.apply_to("!"));
                }
                eprintln!(
                    "  {} Job {} finished in state {}",
                    self.green.apply_to("✓"),
                    outcome.job.job_id,
                    outcome.job.state
                );
            }
            Err(err) => {
                eprintln!("  {} {err}", self.red.apply_to("✗"));
            }
        }
    }
}

impl WaitObserver for WaitProgress {
    fn job_polled(&mut self, job: &JobHandle) {
        self.pb.set_message(format!("{}: {}", job.job_id, job.state));
    }

    fn output(&mut self, bytes: &[u8]) {
        // O spinner é suspenso para não misturar a saída do driver com ele.
        let pb = self.pb.clone();
        pb.suspend(|| self.relay(&mut std::io::stdout().lock(), bytes));
    }
}

fn state_style(state: JobState) -> Style {
    match state {
        JobState::Done => Style::new().green(),
        JobState::Error | JobState::AttemptFailure => Style::new().red(),
        JobState::Cancelled | JobState::CancelPending | JobState::CancelStarted => {
            Style::new().yellow()
        }
        _ => Style::new().cyan(),
    }
}

/// Imprime um job em detalhe.
pub fn print_job(job: &JobHandle) {
    println!(
        "{} {}",
        console::style(&job.job_id).bold(),
        state_style(job.state).apply_to(job.state)
    );
    let fields = [
        ("project", job.project_id.clone()),
        ("cluster", job.cluster_name.clone()),
        ("cluster uuid", job.cluster_uuid.map(|u| u.to_string())),
        ("since", job.state_start_time.map(|t| t.to_rfc3339())),
        ("details", job.detail.clone()),
        ("driver output", job.output_uri.clone()),
        ("control files", job.control_files_uri.clone()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("  {label:<14} {value}");
        }
    }
}

/// Imprime uma linha por job.
pub fn print_jobs(jobs: &[JobHandle]) {
    for job in jobs {
        println!(
            "{:<40} {:<16} {}",
            job.job_id,
            state_style(job.state).apply_to(job.state.as_str()),
            job.cluster_name.as_deref().unwrap_or("-")
        );
    }
}

/// Imprime uma linha por cluster.
pub fn print_clusters(clusters: &[ClusterResource]) {
    for cluster in clusters {
        let state = cluster
            .status
            .as_ref()
            .map(|s| s.state.as_str())
            .unwrap_or("UNKNOWN");
        let zone = cluster.zone().unwrap_or("-");
        let since = cluster
            .status
            .as_ref()
            .and_then(|s| s.state_start_time)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        println!(
            "{:<40} {:<16} {:<20} {since}",
            cluster.cluster_name, state, zone
        );
    }
}

/// Imprime qualquer valor serializável como JSON formatado.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
