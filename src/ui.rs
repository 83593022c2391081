//! Interface de terminal do cliente LES: spinners e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner de acompanhamento e `console` para
//! estilização com cores. O [`WatchProgress`] acompanha visualmente o loop de
//! reconciliação de uma inscrição.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{Enrollment, WithdrawRejection};
use crate::lifecycle::EnrollmentStatus;
use crate::view::{DetailState, Notice, NoticeKind};

/// Indicador visual do acompanhamento de uma inscrição no terminal.
pub struct WatchProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl WatchProgress {
    /// Inicia o spinner para o LMR informado.
    pub fn start(lmr_id: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("{lmr_id}: loading"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Atualiza a mensagem do spinner com o status observado.
    pub fn update(&self, lmr_id: &str, status: EnrollmentStatus) {
        self.pb.set_message(format!("{lmr_id}: {status}"));
    }

    /// Imprime uma linha acima do spinner sem interrompê-lo.
    pub fn note(&self, text: &str) {
        self.pb
            .println(format!("  {} {text}", self.yellow.apply_to("↻")));
    }

    /// Finaliza o spinner com o status em que o acompanhamento parou.
    pub fn finish(&self, lmr_id: &str, status: Option<EnrollmentStatus>) {
        self.pb.finish_and_clear();
        match status {
            Some(EnrollmentStatus::WithdrawRejected) => {
                println!("  {} {lmr_id} settled in WITHDRAW_REJECTED", self.red.apply_to("✗"));
            }
            Some(status) => {
                println!("  {} {lmr_id} settled in {status}", self.green.apply_to("✓"));
            }
            None => {
                println!("  {} {lmr_id}: polling stopped", self.yellow.apply_to("!"));
            }
        }
    }

    /// Finaliza o spinner quando o usuário interrompe com Ctrl-C.
    pub fn interrupted(&self) {
        self.pb.finish_and_clear();
        println!("  {} Stopped watching", self.yellow.apply_to("■"));
    }
}

fn status_style(status: EnrollmentStatus) -> Style {
    match status {
        EnrollmentStatus::Approved | EnrollmentStatus::Withdrawn => Style::new().green(),
        EnrollmentStatus::WithdrawRejected => Style::new().red(),
        EnrollmentStatus::WithdrawnRequested | EnrollmentStatus::Submitted => Style::new().yellow(),
        EnrollmentStatus::Draft => Style::new().dim(),
    }
}

/// Imprime o painel de detalhes de uma inscrição.
pub fn print_enrollment(state: &DetailState) {
    let Some(e) = &state.enrollment else {
        println!("{}", Style::new().dim().apply_to("(not loaded)"));
        return;
    };
    let label = Style::new().bold();
    println!("{} {}", label.apply_to("LMR ID:"), e.lmr_id);
    println!("{} {}", label.apply_to("Name:"), e.lmr_name);
    println!("{} {}", label.apply_to("Participant:"), e.market_participant_name);
    println!("{} {}", label.apply_to("Resource type:"), e.resource_type);
    println!("{} {}", label.apply_to("Planning year:"), e.planning_year);
    let settled = if e.status.is_terminal() { " (final)" } else { "" };
    println!(
        "{} {}{settled}",
        label.apply_to("Status:"),
        status_style(e.status).apply_to(e.status)
    );
    if let Some(summary) = state.eligibility_summary() {
        println!("{} {summary}", label.apply_to("Eligibility:"));
    }
    println!(
        "{} {}",
        label.apply_to("Updated:"),
        e.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(action) = state.available_action() {
        println!(
            "{} {} (les {action} {})",
            label.apply_to("Next:"),
            action.label(),
            e.lmr_id
        );
    }
}

pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        let (marker, style) = match notice.kind {
            NoticeKind::Error => ("✗", Style::new().red().bold()),
            NoticeKind::Success => ("✓", Style::new().green().bold()),
            NoticeKind::Info => ("i", Style::new().cyan()),
            NoticeKind::Pending => ("…", Style::new().yellow()),
        };
        println!("  {} {}", style.apply_to(marker), notice.text);
    }
}

pub fn print_enrollment_table(enrollments: &[Enrollment]) {
    if enrollments.is_empty() {
        println!("{}", Style::new().dim().apply_to("No enrollments."));
        return;
    }
    println!(
        "{}",
        Style::new().bold().apply_to(format!(
            "{:<16} {:<24} {:<24} {:<9} {:<5} {}",
            "LMR ID", "NAME", "PARTICIPANT", "TYPE", "YEAR", "STATUS"
        ))
    );
    for e in enrollments {
        println!(
            "{:<16} {:<24} {:<24} {:<9} {:<5} {}",
            e.lmr_id,
            e.lmr_name,
            e.market_participant_name,
            e.resource_type.to_string(),
            e.planning_year,
            status_style(e.status).apply_to(e.status)
        );
    }
}

pub fn print_rejections(rejections: &[WithdrawRejection]) {
    if rejections.is_empty() {
        println!("{}", Style::new().dim().apply_to("No rejected withdrawals."));
        return;
    }
    for r in rejections {
        let rejected_at = r
            .withdraw_rejected_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {} ({}, {}) rejected {rejected_at}",
            Style::new().red().bold().apply_to("✗"),
            r.lmr_id,
            r.lmr_name,
            r.planning_year
        );
        println!("    {}", r.market_participant_name);
        if let Some(message) = r.message.as_deref().filter(|m| !m.is_empty()) {
            println!("    {message}");
        }
    }
}
