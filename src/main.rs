#![allow(dead_code)]

use std::io::{BufRead, Write as _};
use std::path::PathBuf;

mod application;
mod message;
mod pages;

use senar_portal::config;
use senar_portal::core;
use senar_portal::remote;
use senar_portal::session;

use application::{AuthState, Portal, parse_launch_url, perform};
use config::PortalConfig;
use message::{Message, Screen};
use remote::PortalClient;
use senar_portal::core::consultation::{phase_transfer_groups, standard, stats};
use senar_portal::core::response::YesNo;
use session::{FileStore, SessionStore};

fn init_logging(config: &PortalConfig) {
    // Log to the systemd user journal (`journalctl --user -t senar-portal -f`).
    // Wrapper filters: portal crates at info/debug (per config), everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            let target = metadata.target();
            if target.starts_with("senar_portal")
                || target.starts_with("application")
                || target.starts_with("pages")
            {
                let max = if senar_portal::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    senar_portal::set_debug_logging(config.debug_logging);

    let Ok(journal) = systemd_journal_logger::JournalLog::new() else {
        return;
    };
    let journal = journal.with_syslog_identifier("senar-portal".to_string());
    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so portal debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

enum Action {
    Dispatch(Message),
    Quit,
    Unknown,
}

/// Map a console line to a message; the active screen decides how the
/// shared verbs (`submit`, `open`, …) resolve.
fn parse_command(line: &str, app: &Portal<FileStore>) -> Action {
    let line = line.trim();
    if line.is_empty() {
        return Action::Unknown;
    }
    let (verb, rest) = match line.split_once(' ') {
        Some((v, r)) => (v, r.trim()),
        None => (line, ""),
    };

    let yes_no = |s: &str| -> Option<YesNo> {
        if s.eq_ignore_ascii_case("yes") {
            Some(YesNo::Yes)
        } else if s.eq_ignore_ascii_case("no") {
            Some(YesNo::No)
        } else {
            None
        }
    };

    let message = match verb {
        "quit" | "exit" | "q" => return Action::Quit,

        "home" => Message::SetScreen(Screen::Home),
        "consultations" => Message::SetScreen(Screen::Consultations),
        "phase" => Message::SetScreen(Screen::PhaseTransfer),
        "reviews" => Message::SetScreen(Screen::AnnualReviews),
        "logout" => Message::Logout,

        "dfe" => Message::DfeChanged(rest.to_string()),
        "code" => Message::SchoolCodeChanged(rest.to_string()),
        "login" => Message::LoginSubmit,

        "open" if !rest.is_empty() => Message::SelectConsultation(rest.to_string()),
        "back" => Message::BackToList,

        "suitable" => match yes_no(rest) {
            Some(choice) => Message::SetSuitableSetting(choice),
            None => return Action::Unknown,
        },
        "attendance" => match yes_no(rest) {
            Some(choice) => Message::SetAttendanceIncompatible(choice),
            None => return Action::Unknown,
        },
        "suitable-reason" => Message::SuitableReasoningChanged(rest.to_string()),
        "attendance-reason" => Message::AttendanceReasoningChanged(rest.to_string()),
        "start" => Message::ProposedStartDateChanged(rest.to_string()),
        "banding" => Message::BandingOrFundingChanged(rest.to_string()),
        "info" => Message::AdditionalInfoChanged(rest.to_string()),
        "name" => Message::ResponderNameChanged(rest.to_string()),
        "role" => Message::ResponderRoleChanged(rest.to_string()),
        "clear" => Message::ClearResponseForm,

        "impulse" => Message::ReviewImpulseIdChanged(rest.to_string()),
        "dob" => Message::ReviewDobChanged(rest.to_string()),
        "review-date" => Message::ReviewDateChanged(rest.to_string()),
        "recommendation" => Message::ReviewRecommendationChanged(rest.to_string()),
        "attach" if !rest.is_empty() => Message::AddAttachment(PathBuf::from(rest)),
        "remove" => match rest.parse::<usize>() {
            Ok(index) => Message::RemoveAttachment(index),
            Err(_) => return Action::Unknown,
        },

        "submit" => {
            if app.screen == Screen::AnnualReviews {
                Message::SubmitReview
            } else {
                Message::SubmitResponse
            }
        }

        _ => return Action::Unknown,
    };
    Action::Dispatch(message)
}

fn render(app: &Portal<FileStore>) -> String {
    let today = chrono::Local::now().date_naive();

    if app.token_mode() && !app.auth.is_authenticated() {
        return match &app.auth {
            AuthState::Failed(message) => format!("Could not load the consultation: {message}\n"),
            _ => "Loading consultation…\n".to_string(),
        };
    }
    if app.show_login() {
        return pages::login::view(&app.dfe_input, &app.school_code_input, &app.auth);
    }

    match app.screen {
        Screen::Home => {
            let stats = stats(&app.consultations, today);
            pages::home::view(&app.portal_setting_name, &stats, today)
        }
        Screen::Consultations => match app.selected_consultation() {
            Some(c) => pages::consultations::form_view(
                c,
                &app.response_form,
                &app.submit_message,
                app.submitting,
                app.token_mode(),
            ),
            None => pages::consultations::list_view(&standard(&app.consultations), today),
        },
        Screen::PhaseTransfer => match app.selected_consultation() {
            Some(c) => pages::consultations::form_view(
                c,
                &app.response_form,
                &app.submit_message,
                app.submitting,
                app.token_mode(),
            ),
            None => pages::phase_transfer::view(&phase_transfer_groups(&app.consultations), today),
        },
        Screen::AnnualReviews => {
            pages::annual_reviews::view(&app.review_form, &app.submit_message, app.submitting)
        }
    }
}

/// Process one message and any effect chain it starts, to completion.
async fn dispatch(app: &mut Portal<FileStore>, client: &PortalClient, message: Message) {
    let mut effect = app.update(message);
    while let Some(e) = effect.take() {
        let follow_up = perform(client, e).await;
        effect = app.update(follow_up);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = PortalConfig::from_env();
    init_logging(&config);
    if let Err(e) = config.ensure_dirs() {
        log::warn!("Could not create data dir {}: {}", config.data_dir.display(), e);
    }

    // The emailed portal link, when present, carries the token and an
    // optional consultation id; its presence fixes the mode for this run.
    let launch = std::env::args().skip(1).find_map(|a| parse_launch_url(&a));

    let sessions = SessionStore::new(FileStore::new(config.data_dir.clone()));
    let client = PortalClient::new(config)?;
    let (mut app, initial) = Portal::new(sessions, launch);
    if let Some(effect) = initial {
        let follow_up = perform(&client, effect).await;
        dispatch(&mut app, &client, follow_up).await;
    }

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        println!("{}", render(&app));
        if app.auth.is_authenticated() && !app.token_mode() {
            let menu = Screen::ALL
                .iter()
                .map(|s| s.title())
                .collect::<Vec<_>>()
                .join(" | ");
            println!("Menu: {}", menu);
        }
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match parse_command(&line, &app) {
            Action::Quit => break,
            Action::Unknown => {
                if !line.trim().is_empty() {
                    println!("Unrecognized command.");
                }
            }
            Action::Dispatch(message) => dispatch(&mut app, &client, message).await,
        }
    }

    Ok(())
}
