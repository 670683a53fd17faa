//! Text panels for every shell mode. Dashboard panels return
//! [`RenderFault`] so the caller can route them through the fault boundary.

use std::io::Write;

use client_core::{Notice, NoticeKind, UploadCoordinator};
use shared::domain::{Document, Turn, TurnRole};

use crate::controller::{
    dashboard::Dashboard,
    events::UiError,
    router::{AuthView, RenderFault, ShellMode},
};

const RULE: &str = "------------------------------------------------------------";

pub fn checking_session(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Validating session...")
}

pub fn auth_card(out: &mut impl Write, view: AuthView) -> std::io::Result<()> {
    writeln!(out, "{RULE}")?;
    match view {
        AuthView::Login => {
            writeln!(out, "DocuMind | Sign in")?;
            writeln!(out, "Type 'login' to enter your credentials.")?;
            writeln!(out, "Don't have an account? Type 'register'.")?;
        }
        AuthView::Register => {
            writeln!(out, "DocuMind | Create account")?;
            writeln!(out, "Type 'register' to choose a username and password.")?;
            writeln!(out, "Already have an account? Type 'login'.")?;
        }
    }
    writeln!(out, "{RULE}")
}

pub fn auth_message(out: &mut impl Write, message: &str) -> std::io::Result<()> {
    writeln!(out, "  {message}")
}

pub fn help(out: &mut impl Write, mode: &ShellMode) -> std::io::Result<()> {
    match mode {
        ShellMode::CheckingSession => writeln!(out, "Please wait while the session is validated."),
        ShellMode::Anonymous(_) => {
            writeln!(out, "Commands: login, register, health, quit")?;
            writeln!(out, "Passwords are not masked; they echo as you type.")
        }
        ShellMode::Authenticated(_) => {
            writeln!(out, "Commands:")?;
            writeln!(out, "  select <path>   choose a file to upload")?;
            writeln!(out, "  remove          drop the selected file")?;
            writeln!(out, "  upload          upload the selected file")?;
            writeln!(out, "  docs            reload your documents")?;
            writeln!(out, "  delete <id>     delete one document")?;
            writeln!(out, "  delete-all      delete every document")?;
            writeln!(out, "  clear           clear the chat")?;
            writeln!(out, "  history         show the whole chat")?;
            writeln!(out, "  health          check the backend")?;
            writeln!(out, "  logout | quit")?;
            writeln!(out, "Anything else is sent as a question ('/ask <text>' forces it).")
        }
    }
}

pub fn ui_error(out: &mut impl Write, error: &UiError) -> std::io::Result<()> {
    writeln!(out, "[{}] {}", error.label(), error.message())
}

pub fn fault_panel(out: &mut impl Write, fault: &RenderFault) -> std::io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "Dashboard Component Error")?;
    writeln!(out, "{}", fault.message())?;
    writeln!(out, "Type 'reload' to reload the application.")?;
    writeln!(out, "{RULE}")
}

pub fn dashboard(
    out: &mut impl Write,
    dashboard: &Dashboard,
    transcript_window: usize,
) -> Result<(), RenderFault> {
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "DocuMind | {} (user {})",
        dashboard.identity().username(),
        dashboard.identity().user_id()
    )?;
    writeln!(out, "{RULE}")?;
    documents(out, dashboard.registry.documents(), dashboard.registry.is_loading())?;
    upload_panel(out, &dashboard.uploads)?;
    writeln!(out, "Chat Assistant")?;
    transcript(
        out,
        dashboard.conversation.transcript(),
        transcript_window,
        dashboard.conversation.is_sending(),
    )
}

pub fn documents(
    out: &mut impl Write,
    documents: &[Document],
    loading: bool,
) -> Result<(), RenderFault> {
    writeln!(out, "Your Documents")?;
    if loading {
        writeln!(out, "  Loading...")?;
        return Ok(());
    }
    if documents.is_empty() {
        writeln!(out, "  No documents. Upload a PDF to start.")?;
        return Ok(());
    }
    for document in documents {
        writeln!(
            out,
            "  [{}] {}  (uploaded {})",
            document.id,
            document.file_name,
            document.uploaded_at.format("%Y-%m-%d %H:%M")
        )?;
    }
    if documents.len() > 1 {
        writeln!(out, "  'delete-all' removes all {} documents.", documents.len())?;
    }
    Ok(())
}

pub fn upload_panel(out: &mut impl Write, uploads: &UploadCoordinator) -> Result<(), RenderFault> {
    writeln!(out, "Upload")?;
    match uploads.pending() {
        Some(file) if uploads.is_uploading() => {
            writeln!(out, "  Uploading {}...", file.name())?;
        }
        Some(file) => {
            writeln!(
                out,
                "  Selected: {} ({:.1} KB). Type 'upload' or 'remove'.",
                file.name(),
                file.len() as f64 / 1024.0
            )?;
        }
        None => writeln!(out, "  No file selected. Type 'select <path>'.")?,
    }
    writeln!(out, "  Supported formats: PDF, TXT, Excel, and CSV files")?;
    Ok(())
}

/// Shows the newest `window` turns; `0` shows everything.
pub fn transcript(
    out: &mut impl Write,
    turns: &[Turn],
    window: usize,
    sending: bool,
) -> Result<(), RenderFault> {
    if turns.is_empty() && !sending {
        writeln!(out, "  Ask me anything about your documents")?;
        return Ok(());
    }
    let start = if window == 0 {
        0
    } else {
        turns.len().saturating_sub(window)
    };
    if start > 0 {
        writeln!(out, "  ({start} earlier messages hidden; type 'history' to see all)")?;
    }
    for turn in &turns[start..] {
        self::turn(out, turn)?;
    }
    if sending {
        thinking(out)?;
    }
    Ok(())
}

pub fn turn(out: &mut impl Write, turn: &Turn) -> Result<(), RenderFault> {
    let speaker = match turn.role {
        TurnRole::User => "You",
        TurnRole::Assistant => "DocuMind",
    };
    let mut lines = turn.text.lines();
    writeln!(out, "  {speaker}: {}", lines.next().unwrap_or_default())?;
    for line in lines {
        writeln!(out, "    {line}")?;
    }
    Ok(())
}

pub fn thinking(out: &mut impl Write) -> Result<(), RenderFault> {
    writeln!(out, "  Thinking...")?;
    Ok(())
}

pub fn notice(out: &mut impl Write, notice: &Notice) -> Result<(), RenderFault> {
    let tag = match notice.kind {
        NoticeKind::Success => "ok",
        NoticeKind::Error => "error",
    };
    writeln!(out, "[{tag}] {}", notice.text)?;
    Ok(())
}

pub fn line(out: &mut impl Write, text: &str) -> Result<(), RenderFault> {
    writeln!(out, "{text}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared::domain::DocumentId;

    fn rendered(render: impl FnOnce(&mut Vec<u8>) -> Result<(), RenderFault>) -> String {
        let mut out = Vec::new();
        render(&mut out).expect("render");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn empty_states_use_placeholder_text() {
        let docs = rendered(|out| documents(out, &[], false));
        assert!(docs.contains("No documents. Upload a PDF to start."));

        let chat = rendered(|out| transcript(out, &[], 20, false));
        assert!(chat.contains("Ask me anything about your documents"));
    }

    #[test]
    fn documents_list_ids_names_and_dates() {
        let doc = Document {
            id: DocumentId(3),
            file_name: "report.pdf".into(),
            uploaded_at: Utc
                .with_ymd_and_hms(2025, 3, 4, 9, 30, 0)
                .single()
                .expect("timestamp"),
        };
        let text = rendered(|out| documents(out, &[doc], false));
        assert!(text.contains("[3] report.pdf  (uploaded 2025-03-04 09:30)"));
    }

    #[test]
    fn transcript_window_hides_older_turns() {
        let turns = vec![
            Turn::user("first"),
            Turn::assistant("one"),
            Turn::user("second"),
            Turn::assistant("two"),
        ];
        let text = rendered(|out| transcript(out, &turns, 2, true));
        assert!(text.contains("(2 earlier messages hidden"));
        assert!(!text.contains("first"));
        assert!(text.contains("You: second"));
        assert!(text.contains("DocuMind: two"));
        assert!(text.ends_with("Thinking...\n"));

        let all = rendered(|out| transcript(out, &turns, 0, false));
        assert!(all.contains("You: first"));
    }
}
