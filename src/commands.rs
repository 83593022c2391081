//! Executes a parsed [`Command`] against an LES API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::api::{AdminCredentials, LesApi};
use crate::cli::Command;
use crate::config::LesConfig;
use crate::lifecycle::{Action, EnrollmentStatus};
use crate::ui::{self, WatchProgress};
use crate::view::{CreateForm, EnrollmentList, EnrollmentView, RejectionsView, create_enrollment};

const WATCH_REFRESH: Duration = Duration::from_millis(250);

pub async fn run<A: LesApi>(command: Command, api: Arc<A>, config: &LesConfig) -> Result<()> {
    match command {
        Command::List => {
            let mut list = EnrollmentList::new(api);
            list.load().await?;
            ui::print_enrollment_table(&list.state().enrollments);
        }
        Command::Show { lmr_id } => {
            let mut view = EnrollmentView::new(api, lmr_id, config.poll_interval());
            let result = view.load().await;
            view.teardown();
            result?;
            ui::print_enrollment(&view.snapshot());
            ui::print_notices(&view.notices());
        }
        Command::Create {
            lmr_id,
            name,
            participant,
            resource_type,
            planning_year,
        } => {
            let form = CreateForm {
                lmr_id,
                lmr_name: name,
                market_participant_name: participant,
                resource_type,
                planning_year,
            };
            let created = create_enrollment(api.as_ref(), &form).await?;
            println!("Created {} in {}", created.lmr_id, created.status);
        }
        Command::Submit { lmr_id, watch } => {
            act(api, lmr_id, Action::Submit, watch, config).await?;
        }
        Command::Approve { lmr_id, watch } => {
            act(api, lmr_id, Action::Approve, watch, config).await?;
        }
        Command::Withdraw { lmr_id, watch } => {
            act(api, lmr_id, Action::Withdraw, watch, config).await?;
        }
        Command::Watch { lmr_id } => {
            let mut view = EnrollmentView::new(api, lmr_id, config.poll_interval());
            view.load().await?;
            watch_until_settled(&mut view).await;
            ui::print_enrollment(&view.snapshot());
            ui::print_notices(&view.notices());
        }
        Command::Rejections => {
            let mut view = RejectionsView::new(api);
            ui::print_rejections(view.load().await?);
        }
        Command::Restore {
            lmr_id,
            admin_user,
            admin_password,
        } => {
            let credentials = AdminCredentials::new(admin_user, admin_password);
            let mut view = RejectionsView::new(api);
            let restored = view.correct(&lmr_id, credentials).await?;
            info!(lmr_id = %restored.lmr_id, status = %restored.status, "restore finished");
            if let Some(message) = &view.state().action_success {
                println!("{message}");
            }
            ui::print_rejections(&view.state().list);
        }
    }
    Ok(())
}

/// Loads the enrollment, performs `action` and optionally follows the result.
async fn act<A: LesApi>(
    api: Arc<A>,
    lmr_id: String,
    action: Action,
    watch: bool,
    config: &LesConfig,
) -> Result<()> {
    let mut view = EnrollmentView::new(api, lmr_id, config.poll_interval());
    view.load().await?;
    let result = match action {
        Action::Submit => view.submit().await,
        Action::Approve => view.approve().await,
        Action::Withdraw => view.withdraw().await,
    };
    if result.is_ok() && watch {
        watch_until_settled(&mut view).await;
    }
    view.teardown();
    ui::print_enrollment(&view.snapshot());
    ui::print_notices(&view.notices());
    result?;
    Ok(())
}

/// Follows the view's poll loop until it stops on its own or the user
/// interrupts with Ctrl-C. The view is torn down on return.
async fn watch_until_settled<A: LesApi>(view: &mut EnrollmentView<A>) {
    if !view.is_polling() {
        debug!(lmr_id = view.lmr_id(), "nothing to watch");
        view.teardown();
        return;
    }

    let lmr_id = view.lmr_id().to_string();
    let progress = WatchProgress::start(&lmr_id);
    let mut last: Option<EnrollmentStatus> = None;
    let mut refresh = tokio::time::interval(WATCH_REFRESH);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                view.teardown();
                progress.interrupted();
                return;
            }
            _ = refresh.tick() => {
                let snapshot = view.snapshot();
                let status = snapshot.status();
                if status != last {
                    if let Some(status) = status {
                        progress.update(&lmr_id, status);
                        if last.is_some() {
                            progress.note(&format!("status changed to {status}"));
                        }
                    }
                    last = status;
                }
                if !snapshot.polling {
                    view.teardown();
                    let settled = status.filter(|s| !s.is_pollable());
                    progress.finish(&lmr_id, settled);
                    return;
                }
            }
        }
    }
}
