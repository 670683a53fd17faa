use std::{io::Write, sync::Arc};

use anyhow::Context;
use client_core::{
    BackendHandle, CheckOutcome, DeleteAllOutcome, PendingFile, SessionController,
    SubmitRejection, UploadOutcome,
};
use shared::domain::Identity;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracing::{debug, error, info};

use crate::{
    config::Settings,
    controller::{
        dashboard::Dashboard,
        events::{UiError, UiErrorContext},
        orchestration::{parse_command, Command},
        router::{AuthView, FaultBoundary, RenderFault, Router, ShellMode},
    },
    ui::render,
};

/// Line-driven shell: reads commands from `input`, drives the controllers
/// and prints panels to `out`.
pub struct ShellApp<R, W> {
    backend: Arc<dyn BackendHandle>,
    settings: Settings,
    session: SessionController,
    router: Router,
    dashboard: Option<Dashboard>,
    boundary: FaultBoundary,
    input: Lines<BufReader<R>>,
    out: W,
    rendered_turns: usize,
}

impl<R, W> ShellApp<R, W>
where
    R: AsyncRead + Unpin,
    W: Write,
{
    pub fn new(backend: Arc<dyn BackendHandle>, settings: Settings, input: R, out: W) -> Self {
        Self {
            session: SessionController::new(backend.clone()),
            backend,
            settings,
            router: Router::new(),
            dashboard: None,
            boundary: FaultBoundary::default(),
            input: BufReader::new(input).lines(),
            out,
            rendered_turns: 0,
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs until `quit` or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.start().await?;
        loop {
            self.prompt()?;
            let Some(line) = self
                .input
                .next_line()
                .await
                .context("failed to read command")?
            else {
                debug!("shell: input closed");
                break;
            };

            let command = parse_command(&line, self.router.mode(), self.boundary.is_tripped());
            debug!(command = command.name(), "shell: dispatching command");
            if !self.dispatch(command).await? {
                break;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    async fn start(&mut self) -> anyhow::Result<()> {
        render::checking_session(&mut self.out)?;
        match self.session.check().await {
            CheckOutcome::Resolved(session) => self.router.on_session_resolved(&session),
            CheckOutcome::Suppressed => return Ok(()),
        }
        self.enter_mode().await
    }

    async fn enter_mode(&mut self) -> anyhow::Result<()> {
        match self.router.mode().clone() {
            ShellMode::CheckingSession => render::checking_session(&mut self.out)?,
            ShellMode::Anonymous(view) => {
                self.dashboard = None;
                render::auth_card(&mut self.out, view)?;
            }
            ShellMode::Authenticated(identity) => self.open_dashboard(identity).await?,
        }
        Ok(())
    }

    async fn open_dashboard(&mut self, identity: Identity) -> anyhow::Result<()> {
        info!(user_id = identity.user_id().0, "shell: opening dashboard");
        let mut dashboard = Dashboard::new(self.backend.clone(), identity);
        let listed = dashboard.registry.sync().await;
        self.dashboard = Some(dashboard);
        self.rendered_turns = 0;

        let window = self.settings.transcript_window;
        self.draw(|out, dashboard| render::dashboard(out, dashboard, window))?;
        if let Err(notice) = listed {
            self.draw(|out, _| render::notice(out, &notice))?;
        }
        Ok(())
    }

    /// Renders inside the fault boundary. A fault swaps the dashboard for
    /// the error panel until `reload`.
    fn draw(
        &mut self,
        paint: impl FnOnce(&mut W, &Dashboard) -> Result<(), RenderFault>,
    ) -> anyhow::Result<()> {
        let Some(dashboard) = self.dashboard.as_ref() else {
            return Ok(());
        };
        if self.boundary.is_tripped() {
            return Ok(());
        }
        let out = &mut self.out;
        if self.boundary.guard(|| paint(out, dashboard)).is_none() {
            if let Some(fault) = self.boundary.fault() {
                if let Err(err) = render::fault_panel(&mut self.out, fault) {
                    error!(error = %err, "failed to draw error panel; boundary stays tripped");
                }
            }
        }
        Ok(())
    }

    fn prompt(&mut self) -> anyhow::Result<()> {
        match self.router.identity() {
            Some(identity) if !self.boundary.is_tripped() => {
                write!(self.out, "{}> ", identity.username())?
            }
            _ => write!(self.out, "documind> ")?,
        }
        self.out.flush()?;
        Ok(())
    }

    async fn ask_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        self.input
            .next_line()
            .await
            .context("failed to read input")
    }

    /// Returns `false` when the shell should exit.
    async fn dispatch(&mut self, command: Command) -> anyhow::Result<bool> {
        match command {
            Command::Quit => return Ok(false),
            Command::Empty => {}
            Command::Help => render::help(&mut self.out, self.router.mode())?,
            Command::Invalid(message) => render::ui_error(
                &mut self.out,
                &UiError::from_message(UiErrorContext::Command, message),
            )?,
            Command::Login => self.login().await?,
            Command::Register => self.register().await?,
            Command::Health => self.health().await?,
            Command::Reload => self.reload().await?,
            Command::Logout => self.logout().await?,
            command => {
                self.dashboard_command(command).await?;
                self.sync_documents().await?;
            }
        }
        Ok(true)
    }

    async fn login(&mut self) -> anyhow::Result<()> {
        let &ShellMode::Anonymous(view) = self.router.mode() else {
            return Ok(());
        };
        if view == AuthView::Register {
            self.router.switch_auth_view();
            render::auth_card(&mut self.out, AuthView::Login)?;
            return Ok(());
        }

        let Some(username) = self.ask_line("Username: ").await? else {
            return Ok(());
        };
        let Some(password) = self.ask_line("Password (shown as typed): ").await? else {
            return Ok(());
        };
        match self.session.login(&username, &password).await {
            Ok(identity) => {
                self.router.on_login(identity.clone());
                self.open_dashboard(identity).await?;
            }
            Err(failure) => render::auth_message(&mut self.out, &failure.message)?,
        }
        Ok(())
    }

    async fn register(&mut self) -> anyhow::Result<()> {
        let &ShellMode::Anonymous(view) = self.router.mode() else {
            return Ok(());
        };
        if view == AuthView::Login {
            self.router.switch_auth_view();
            render::auth_card(&mut self.out, AuthView::Register)?;
            return Ok(());
        }

        let Some(username) = self.ask_line("Username: ").await? else {
            return Ok(());
        };
        let Some(password) = self.ask_line("Password (shown as typed): ").await? else {
            return Ok(());
        };
        let Some(confirm) = self.ask_line("Confirm password (shown as typed): ").await? else {
            return Ok(());
        };

        match self.session.register(&username, &password, &confirm).await {
            Ok(registration) => {
                render::auth_message(&mut self.out, &registration.message)?;
                self.out.flush()?;
                tokio::time::sleep(self.settings.register_redirect_delay()).await;
                if let Some(identity) = registration.identity.clone() {
                    self.session.adopt(identity).await;
                }
                self.router.on_registered(registration.identity);
                self.enter_mode().await?;
            }
            Err(failure) => render::auth_message(&mut self.out, &failure.message)?,
        }
        Ok(())
    }

    async fn health(&mut self) -> anyhow::Result<()> {
        match self.backend.health().await {
            Ok(health) => writeln!(
                self.out,
                "Backend {}: {} {}",
                health.status,
                health.service.as_deref().unwrap_or("unknown service"),
                health.version.as_deref().unwrap_or("")
            )?,
            Err(err) => render::ui_error(
                &mut self.out,
                &UiError::from_client_error(UiErrorContext::Health, &err),
            )?,
        }
        Ok(())
    }

    async fn logout(&mut self) -> anyhow::Result<()> {
        self.session.logout().await;
        self.router.on_logout();
        self.dashboard = None;
        self.boundary.reset();
        self.enter_mode().await
    }

    /// Discards every piece of client state and starts over from the
    /// session check. The backend's cookie store is kept.
    async fn reload(&mut self) -> anyhow::Result<()> {
        info!("shell: reloading application");
        self.session = SessionController::new(self.backend.clone());
        self.router.reload();
        self.dashboard = None;
        self.boundary.reset();
        self.rendered_turns = 0;
        self.start().await
    }

    async fn dashboard_command(&mut self, command: Command) -> anyhow::Result<()> {
        let Some(dashboard) = self.dashboard.as_mut() else {
            return Ok(());
        };

        match command {
            Command::Select(path) => match PendingFile::from_path(&path).await {
                Ok(file) => {
                    let name = file.name().to_string();
                    if !dashboard.uploads.select(file) {
                        let note = format!(
                            "Note: {name} is not a supported format; the server may reject it."
                        );
                        self.draw(|out, _| render::line(out, &note))?;
                    }
                    self.draw(|out, dashboard| render::upload_panel(out, &dashboard.uploads))?;
                }
                Err(err) => render::ui_error(
                    &mut self.out,
                    &UiError::from_message(UiErrorContext::FileSelection, format!("{err:#}")),
                )?,
            },
            Command::RemoveSelection => {
                if dashboard.uploads.remove().is_some() {
                    self.draw(|out, dashboard| render::upload_panel(out, &dashboard.uploads))?;
                } else {
                    self.draw(|out, _| render::line(out, "No file selected."))?;
                }
            }
            Command::Upload => {
                let outcome = dashboard.uploads.upload().await;
                match outcome {
                    UploadOutcome::Skipped => {
                        self.draw(|out, _| render::line(out, "Select a file first."))?
                    }
                    UploadOutcome::Uploaded(notice) | UploadOutcome::Failed(notice) => {
                        self.draw(|out, _| render::notice(out, &notice))?
                    }
                }
            }
            Command::ListDocuments => {
                let listed = dashboard.registry.list().await;
                match listed {
                    Ok(()) => self.draw(|out, dashboard| {
                        render::documents(
                            out,
                            dashboard.registry.documents(),
                            dashboard.registry.is_loading(),
                        )
                    })?,
                    Err(notice) => self.draw(|out, _| render::notice(out, &notice))?,
                }
            }
            Command::Delete(document_id) => {
                let deleted = dashboard.registry.delete(document_id).await;
                match deleted {
                    Ok(()) => self.draw(|out, dashboard| {
                        render::documents(out, dashboard.registry.documents(), false)
                    })?,
                    Err(notice) => self.draw(|out, _| render::notice(out, &notice))?,
                }
            }
            Command::DeleteAll => {
                if !dashboard.registry.can_clear_all() {
                    self.draw(|out, _| render::line(out, "No documents to delete."))?;
                    return Ok(());
                }
                let out = &mut self.out;
                let input = &mut self.input;
                let outcome = dashboard
                    .registry
                    .delete_all(|prompt| async move {
                        if write!(out, "{prompt} [y/N] ")
                            .and_then(|()| out.flush())
                            .is_err()
                        {
                            return false;
                        }
                        match input.next_line().await {
                            Ok(Some(answer)) => {
                                matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
                            }
                            _ => false,
                        }
                    })
                    .await;
                match outcome {
                    Ok(DeleteAllOutcome::Declined) => {
                        self.draw(|out, _| render::line(out, "Cancelled."))?
                    }
                    Ok(DeleteAllOutcome::Cleared) => self.draw(|out, dashboard| {
                        render::documents(out, dashboard.registry.documents(), false)
                    })?,
                    Err(notice) => self.draw(|out, _| render::notice(out, &notice))?,
                }
            }
            Command::ClearChat => {
                if dashboard.conversation.clear() {
                    dashboard.conversation.take_scroll_request();
                    self.rendered_turns = 0;
                    let window = self.settings.transcript_window;
                    self.draw(|out, dashboard| {
                        render::line(out, "Chat cleared.")?;
                        render::transcript(out, dashboard.conversation.transcript(), window, false)
                    })?;
                } else {
                    self.draw(|out, _| render::line(out, "Chat is already empty."))?;
                }
            }
            Command::History => self.draw(|out, dashboard| {
                render::transcript(
                    out,
                    dashboard.conversation.transcript(),
                    0,
                    dashboard.conversation.is_sending(),
                )
            })?,
            Command::Ask(question) => {
                dashboard.conversation.set_input(question);
                let pending = match dashboard.conversation.begin_submit() {
                    Ok(pending) => pending,
                    Err(SubmitRejection::Blank) => return Ok(()),
                    Err(rejection) => {
                        render::ui_error(
                            &mut self.out,
                            &UiError::from_message(UiErrorContext::Command, rejection.to_string()),
                        )?;
                        return Ok(());
                    }
                };
                self.scroll_transcript()?;

                let Some(dashboard) = self.dashboard.as_mut() else {
                    return Ok(());
                };
                let result = dashboard.conversation.request_answer(&pending).await;
                dashboard.conversation.complete(pending, result);
                self.scroll_transcript()?;
            }
            other => debug!(command = other.name(), "shell: not a dashboard command"),
        }
        Ok(())
    }

    /// Prints the turns added since the last scroll, plus the thinking
    /// indicator while a question is in flight.
    fn scroll_transcript(&mut self) -> anyhow::Result<()> {
        let Some(dashboard) = self.dashboard.as_mut() else {
            return Ok(());
        };
        if !dashboard.conversation.take_scroll_request() {
            return Ok(());
        }
        let total = dashboard.conversation.transcript().len();
        let from = self.rendered_turns.min(total);
        self.rendered_turns = total;

        self.draw(|out, dashboard| {
            for turn in &dashboard.conversation.transcript()[from..] {
                render::turn(out, turn)?;
            }
            if dashboard.conversation.is_sending() {
                render::thinking(out)?;
            }
            Ok(())
        })
    }

    async fn sync_documents(&mut self) -> anyhow::Result<()> {
        let Some(dashboard) = self.dashboard.as_mut() else {
            return Ok(());
        };
        let synced = dashboard.registry.sync().await;
        match synced {
            Ok(true) => self.draw(|out, dashboard| {
                render::documents(
                    out,
                    dashboard.registry.documents(),
                    dashboard.registry.is_loading(),
                )
            })?,
            Ok(false) => {}
            Err(notice) => self.draw(|out, _| render::notice(out, &notice))?,
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/app_tests.rs"]
mod tests;
