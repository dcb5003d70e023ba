//! User-facing output
//!
//! Status lines go to stdout; the emulator TLS warning goes to stderr.

use std::io::{self, Write};

use crate::config::ConnectionConfig;
use crate::provisioner::ProvisionResult;

/// Printed once when certificate verification is turned off
pub const INSECURE_TLS_WARNING: &str =
    "Warning: TLS certificate verification is disabled (emulator mode). Do not use against a production account.";

/// The warning to show for `config`, if any
pub fn tls_warning(config: &ConnectionConfig) -> Option<&'static str> {
    (!config.verify_tls()).then_some(INSECURE_TLS_WARNING)
}

/// Write the TLS warning to `out` when verification is disabled.
///
/// Returns whether anything was written.
pub fn emit_tls_warning<W: Write>(out: &mut W, config: &ConnectionConfig) -> io::Result<bool> {
    match tls_warning(config) {
        Some(warning) => {
            writeln!(out, "{}", warning)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Write one status line
pub fn write_result<W: Write>(out: &mut W, result: &ProvisionResult) -> io::Result<()> {
    writeln!(out, "{}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMULATOR_KEY: &str =
        "C2y6yDjf5/R+ob0N8A7Cgv30VRDJIWEHLM+4QDU5DE2nQ9nDuVTqobD4b8mGGyPMbIZnqyMsEcaGQy67XIw/Jw==";

    #[test]
    fn test_emulator_emits_single_warning_line() {
        let config = ConnectionConfig::emulator("https://localhost:8081", EMULATOR_KEY).unwrap();
        let mut stderr = Vec::new();

        assert!(emit_tls_warning(&mut stderr, &config).unwrap());

        let text = String::from_utf8(stderr).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Warning:"));
    }

    #[test]
    fn test_production_emits_nothing() {
        let config = ConnectionConfig::production("https://localhost:8081", EMULATOR_KEY).unwrap();
        let mut stderr = Vec::new();

        assert!(!emit_tls_warning(&mut stderr, &config).unwrap());
        assert!(stderr.is_empty());
        assert!(tls_warning(&config).is_none());
    }

    #[test]
    fn test_write_result_lines() {
        let mut stdout = Vec::new();
        write_result(&mut stdout, &ProvisionResult::created("LodeRunnerDB", "LodeRunner")).unwrap();
        write_result(
            &mut stdout,
            &ProvisionResult::already_exists("LodeRunnerTestDB", "LodeRunner"),
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(stdout).unwrap(),
            "Created DB: LodeRunnerDB, Container: LodeRunner\nLodeRunnerTestDB/LodeRunner Already exists\n"
        );
    }
}
