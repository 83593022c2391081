//! Interface de linha de comando do cliente LES baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] e flags globais
//! (--api-url, --verbose).

use clap::{Parser, Subcommand};

/// LES: cliente de inscrição de Load Modifying Resources.
#[derive(Debug, Parser)]
#[command(name = "les", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// URL base do serviço LES (sobrescreve `les.toml` e `LES_API_URL`).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lista todas as inscrições.
    List,

    /// Mostra uma inscrição, sua elegibilidade e os avisos aplicáveis.
    Show {
        /// Identificador do LMR.
        lmr_id: String,
    },

    /// Cria uma nova inscrição em DRAFT.
    Create {
        #[arg(long)]
        lmr_id: String,

        /// Nome do LMR.
        #[arg(long)]
        name: String,

        /// Nome do participante de mercado.
        #[arg(long)]
        participant: String,

        /// LMR_DR ou LMR_BTMG.
        #[arg(long, default_value = "LMR_DR")]
        resource_type: String,

        /// Ano de planejamento com quatro dígitos.
        #[arg(long)]
        planning_year: String,
    },

    /// Envia uma inscrição em DRAFT para aprovação.
    Submit {
        lmr_id: String,

        /// Continua acompanhando o status após a ação.
        #[arg(long)]
        watch: bool,
    },

    /// Aprova uma inscrição em SUBMITTED.
    Approve {
        lmr_id: String,

        #[arg(long)]
        watch: bool,
    },

    /// Solicita a retirada de uma inscrição em APPROVED.
    Withdraw {
        lmr_id: String,

        #[arg(long)]
        watch: bool,
    },

    /// Acompanha uma inscrição até que saia dos estados monitorados.
    Watch { lmr_id: String },

    /// Lista as retiradas rejeitadas pelo MECT (administração).
    Rejections,

    /// Restaura para APPROVED uma inscrição em WITHDRAW_REJECTED (administração).
    Restore {
        lmr_id: String,

        /// Usuário administrador.
        #[arg(long)]
        admin_user: String,

        /// Senha do administrador.
        #[arg(long, env = "LES_ADMIN_PASSWORD", hide_env_values = true)]
        admin_password: String,
    },
}
