//! # Interactive Confirmation Module
//!
//! Conferma sì/no per le operazioni distruttive (cancellazione della
//! directory di output esistente). L'orchestratore dipende dal trait,
//! così i test e gli usi non interattivi iniettano una risposta fissa.

use std::io::Write;

/// Yes/no confirmation capability for destructive operations
pub trait Confirmation: Send + Sync {
    /// Ask a yes/no question; only an affirmative answer returns true
    fn confirm(&self, prompt: &str) -> bool;
}

/// Reads the answer from stdin
pub struct StdinConfirmation;

impl Confirmation for StdinConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} (y/n): ", prompt);
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Fixed answer, for tests and non-interactive runs (`--yes`)
pub struct AutoConfirm(pub bool);

impl Confirmation for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}
