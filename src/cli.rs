//! Interface de linha de comando do dataproc-watch baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (wait, tail, status,
//! jobs, clusters) e flags globais (--project, --region, --json, --verbose).

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::dataproc::client::DEFAULT_PAGE_SIZE;
use crate::waiter::JobState;

/// dataproc-watch: espera jobs do Dataproc terminarem e transmite a saída do driver.
#[derive(Debug, Parser)]
#[command(name = "dataproc-watch", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Projeto GCP (sobrescreve arquivo e ambiente).
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Região do Dataproc (sobrescreve arquivo e ambiente).
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Imprime resultados como JSON.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Estado terminal aceito como objetivo, mapeado para [`JobState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GoalArg {
    Done,
    Error,
    Cancelled,
}

impl From<GoalArg> for JobState {
    fn from(goal: GoalArg) -> Self {
        match goal {
            GoalArg::Done => JobState::Done,
            GoalArg::Error => JobState::Error,
            GoalArg::Cancelled => JobState::Cancelled,
        }
    }
}

#[derive(Debug, Args)]
pub struct WaitArgs {
    /// Id do job.
    pub job_id: String,

    /// Estado terminal considerado sucesso.
    #[arg(long, value_enum, default_value_t = GoalArg::Done)]
    pub goal: GoalArg,

    /// Transmite a saída do driver enquanto espera.
    #[arg(long)]
    pub stream_output: bool,

    /// Tempo máximo de espera em segundos.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Intervalo entre leituras da saída, em milissegundos.
    #[arg(long)]
    pub output_poll_ms: Option<u64>,

    /// Intervalo entre consultas de status, em milissegundos.
    #[arg(long)]
    pub status_poll_ms: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Espera o job atingir um estado terminal.
    Wait(WaitArgs),

    /// Atalho para `wait --stream-output --goal done`.
    Tail {
        job_id: String,

        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Mostra o estado atual de um job.
    Status { job_id: String },

    /// Lista os jobs do projeto.
    Jobs {
        /// Filtra pelo nome do cluster.
        #[arg(long)]
        cluster: Option<String>,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
    },

    /// Lista os clusters do projeto, ou mostra um só.
    Clusters {
        /// Nome de um cluster específico.
        name: Option<String>,
    },
}

impl Command {
    /// Normaliza `tail` para os argumentos equivalentes de `wait`.
    pub fn into_wait_args(self) -> Option<WaitArgs> {
        match self {
            Command::Wait(args) => Some(args),
            Command::Tail { job_id, timeout } => Some(WaitArgs {
                job_id,
                goal: GoalArg::Done,
                stream_output: true,
                timeout,
                output_poll_ms: None,
                status_poll_ms: None,
            }),
            _ => None,
        }
    }
}
