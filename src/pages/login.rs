use std::fmt::Write;

use crate::application::AuthState;

pub fn view(dfe: &str, school_code: &str, auth: &AuthState) -> String {
    let mut out = String::new();
    writeln!(out, "== SENAR School Portal Login ==").unwrap();
    writeln!(
        out,
        "Enter your DfE number and login code to view outstanding consultations."
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "  DfE Number: {}",
        if dfe.is_empty() { "<not set>" } else { dfe }
    )
    .unwrap();
    writeln!(
        out,
        "  Login Code: {}",
        if school_code.is_empty() {
            "<not set>".to_string()
        } else {
            "*".repeat(school_code.len())
        }
    )
    .unwrap();
    writeln!(out).unwrap();

    match auth {
        AuthState::Restoring => writeln!(out, "Restoring saved session…").unwrap(),
        AuthState::Authenticating => writeln!(out, "Logging in…").unwrap(),
        AuthState::Failed(message) => writeln!(out, "Login failed: {}", message).unwrap(),
        _ => {}
    }
    if dfe.trim().is_empty() || school_code.trim().is_empty() {
        writeln!(out, "Enter both fields to continue.").unwrap();
    }
    writeln!(out, "Commands: dfe <number> | code <code> | login | quit").unwrap();
    out
}
