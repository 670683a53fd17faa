//! Maps typed lines to shell commands for the active mode.

use std::path::PathBuf;

use shared::domain::DocumentId;

use crate::controller::router::{AuthView, ShellMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Empty,
    Login,
    Register,
    Select(PathBuf),
    RemoveSelection,
    Upload,
    ListDocuments,
    Delete(DocumentId),
    DeleteAll,
    ClearChat,
    History,
    Health,
    Logout,
    Ask(String),
    Reload,
    Invalid(String),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Quit => "quit",
            Command::Empty => "empty",
            Command::Login => "login",
            Command::Register => "register",
            Command::Select(_) => "select",
            Command::RemoveSelection => "remove",
            Command::Upload => "upload",
            Command::ListDocuments => "docs",
            Command::Delete(_) => "delete",
            Command::DeleteAll => "delete_all",
            Command::ClearChat => "clear",
            Command::History => "history",
            Command::Health => "health",
            Command::Logout => "logout",
            Command::Ask(_) => "ask",
            Command::Reload => "reload",
            Command::Invalid(_) => "invalid",
        }
    }
}

/// Parses one input line. Command words only count when they stand alone
/// (or carry their argument); any other dashboard line is a question.
/// `dashboard_faulted` routes everything but `reload`/`quit` to
/// [`Command::Invalid`] while the error panel is shown.
pub fn parse_command(line: &str, mode: &ShellMode, dashboard_faulted: bool) -> Command {
    let trimmed = line.trim();
    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };

    if rest.is_empty() {
        match head {
            "quit" | "exit" => return Command::Quit,
            "help" | "?" => return Command::Help,
            _ => {}
        }
    }

    match mode {
        ShellMode::CheckingSession => Command::Invalid("session check in progress".into()),
        ShellMode::Anonymous(view) => match (head, rest.is_empty()) {
            ("", _) => Command::Empty,
            ("login", true) => Command::Login,
            ("register", true) => Command::Register,
            ("health", true) => Command::Health,
            _ => Command::Invalid(format!(
                "unknown command '{trimmed}' on the {} screen",
                match view {
                    AuthView::Login => "login",
                    AuthView::Register => "register",
                }
            )),
        },
        ShellMode::Authenticated(_) if dashboard_faulted => match trimmed {
            "reload" => Command::Reload,
            _ => Command::Invalid(
                "dashboard failed; type 'reload' to reload the application".into(),
            ),
        },
        ShellMode::Authenticated(_) => parse_dashboard_command(line, head, rest),
    }
}

fn parse_dashboard_command(line: &str, head: &str, rest: &str) -> Command {
    let question = || Command::Ask(line.trim_end_matches(['\r', '\n']).to_string());

    if rest.is_empty() {
        return match head {
            "" => Command::Empty,
            "select" => Command::Invalid("usage: select <path>".into()),
            "delete" => Command::Invalid("usage: delete <document id>".into()),
            "remove" => Command::RemoveSelection,
            "upload" => Command::Upload,
            "docs" => Command::ListDocuments,
            "delete-all" => Command::DeleteAll,
            "clear" => Command::ClearChat,
            "history" => Command::History,
            "health" => Command::Health,
            "logout" => Command::Logout,
            "reload" => Command::Reload,
            "/ask" => Command::Ask(String::new()),
            _ => question(),
        };
    }

    match head {
        "select" => Command::Select(PathBuf::from(rest)),
        "delete" => match rest.parse::<i64>() {
            Ok(id) => Command::Delete(DocumentId(id)),
            Err(_) => question(),
        },
        "/ask" => Command::Ask(rest.to_string()),
        _ => question(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{Identity, UserId};

    fn dashboard() -> ShellMode {
        ShellMode::Authenticated(Identity::new(UserId(1), "a").expect("identity"))
    }

    #[test]
    fn free_text_on_dashboard_is_a_question() {
        assert_eq!(
            parse_command("What is in report.pdf?", &dashboard(), false),
            Command::Ask("What is in report.pdf?".into())
        );
        assert_eq!(
            parse_command("/ask delete everything?", &dashboard(), false),
            Command::Ask("delete everything?".into())
        );
    }

    #[test]
    fn dashboard_commands_take_arguments() {
        assert_eq!(
            parse_command("select ./docs/report.pdf", &dashboard(), false),
            Command::Select(PathBuf::from("./docs/report.pdf"))
        );
        assert_eq!(
            parse_command("delete 42", &dashboard(), false),
            Command::Delete(DocumentId(42))
        );
        assert!(matches!(
            parse_command("delete", &dashboard(), false),
            Command::Invalid(_)
        ));
        assert!(matches!(
            parse_command("select", &dashboard(), false),
            Command::Invalid(_)
        ));
    }

    #[test]
    fn command_words_followed_by_text_are_questions() {
        for line in [
            "exit strategy in report.pdf?",
            "clear up the terms in section 2?",
            "help me summarize report.pdf",
            "logout procedure described where?",
            "delete which clauses?",
            "upload limits per quarter?",
            "history of the contract",
        ] {
            assert_eq!(
                parse_command(line, &dashboard(), false),
                Command::Ask(line.to_string()),
                "{line}"
            );
        }
        assert_eq!(parse_command("clear", &dashboard(), false), Command::ClearChat);
        assert_eq!(parse_command("exit", &dashboard(), false), Command::Quit);
    }

    #[test]
    fn anonymous_screens_only_accept_auth_commands() {
        let login = ShellMode::Anonymous(AuthView::Login);
        assert_eq!(parse_command("login", &login, false), Command::Login);
        assert_eq!(parse_command("register", &login, false), Command::Register);
        assert!(matches!(
            parse_command("upload", &login, false),
            Command::Invalid(_)
        ));
        assert!(matches!(
            parse_command("login as admin", &login, false),
            Command::Invalid(_)
        ));
        assert_eq!(parse_command("  ", &login, false), Command::Empty);
    }

    #[test]
    fn faulted_dashboard_only_reloads_or_quits() {
        assert_eq!(parse_command("reload", &dashboard(), true), Command::Reload);
        assert_eq!(parse_command("quit", &dashboard(), true), Command::Quit);
        assert!(matches!(
            parse_command("docs", &dashboard(), true),
            Command::Invalid(_)
        ));
        assert!(matches!(
            parse_command("reload everything", &dashboard(), true),
            Command::Invalid(_)
        ));
    }
}
