//! `check-code`: runs the protocol 2 access code gate.

use std::io::BufRead;

use crate::cli::args::{CheckCodeArgs, OutputFormat};
use crate::error::{AccessCodeError, AuroraError};
use crate::gate::{self, FORMAT_HINT};

/// Check an access code given as argument or as the first line of stdin.
///
/// Only the trailing line terminator is removed; every other character
/// counts.
///
/// # Errors
///
/// Returns an access code error (exit code 6) if the code is rejected, or
/// an I/O error if stdin cannot be read.
pub fn run(args: &CheckCodeArgs) -> Result<(), AuroraError> {
    let code = match &args.code {
        Some(code) => code.clone(),
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            strip_line_terminator(&line).to_string()
        }
    };

    let verdict = gate::check_access_code(&code);
    tracing::debug!(chars = code.chars().count(), ok = verdict.is_ok(), "access code checked");

    match args.format {
        OutputFormat::Human => match verdict {
            Ok(()) => println!("ACCESO CONCEDIDO"),
            Err(AccessCodeError::Empty) => println!("CÓDIGO VACÍO"),
            Err(AccessCodeError::Invalid) => println!("ACCESO DENEGADO. FORMATO: {FORMAT_HINT}"),
        },
        OutputFormat::Json => {
            let reason = match verdict {
                Ok(()) => None,
                Err(AccessCodeError::Empty) => Some("empty"),
                Err(AccessCodeError::Invalid) => Some("invalid"),
            };
            println!(
                "{}",
                serde_json::json!({ "valid": verdict.is_ok(), "reason": reason })
            );
        }
    }

    verdict.map_err(AuroraError::from)
}

fn strip_line_terminator(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_terminator_is_removed() {
        assert_eq!(strip_line_terminator("CODE\n"), "CODE");
        assert_eq!(strip_line_terminator("CODE\r\n"), "CODE");
        assert_eq!(strip_line_terminator("CODE \n\n"), "CODE \n");
        assert_eq!(strip_line_terminator("CODE"), "CODE");
    }

    #[test]
    fn argument_is_checked() {
        let ok = CheckCodeArgs {
            code: Some("AURORAxMxIxSxIxOxNx2".to_string()),
            format: OutputFormat::Json,
        };
        assert!(run(&ok).is_ok());

        let bad = CheckCodeArgs {
            code: Some("AURORA".to_string()),
            format: OutputFormat::Human,
        };
        let err = run(&bad).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::ExitCode::ACCESS_DENIED);
    }
}
