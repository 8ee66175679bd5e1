//! `validate`: checks script files without running them.

use std::path::Path;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoaderOptions};
use crate::error::{AuroraError, ConfigError, Severity, ValidationIssue};

/// Outcome for one file.
struct FileReport {
    file: String,
    issues: Vec<ValidationIssue>,
    failure: Option<ConfigError>,
}

/// Validate every file and report all issues.
///
/// Every file is checked even after a failure.
///
/// # Errors
///
/// Returns the first file's config error if any file fails. With
/// `--strict`, warnings fail the file too.
pub fn run(args: &ValidateArgs) -> Result<(), AuroraError> {
    let loader = ConfigLoader::new(LoaderOptions::default());
    let reports: Vec<FileReport> = args
        .files
        .iter()
        .map(|path| check_file(&loader, path, args.strict))
        .collect();

    match args.format {
        OutputFormat::Human => print_human(&reports),
        OutputFormat::Json => print_json(&reports)?,
    }

    reports
        .into_iter()
        .find_map(|r| r.failure)
        .map_or(Ok(()), |e| Err(e.into()))
}

fn check_file(loader: &ConfigLoader, path: &Path, strict: bool) -> FileReport {
    let file = path.display().to_string();
    tracing::info!(%file, "validating script");

    match loader.load(path) {
        Ok(result) => {
            let failure = (strict && !result.warnings.is_empty()).then(|| {
                ConfigError::ValidationError {
                    path: file.clone(),
                    errors: result.warnings.clone(),
                }
            });
            FileReport {
                file,
                issues: result.warnings,
                failure,
            }
        }
        Err(ConfigError::ValidationError { path, errors }) => FileReport {
            file,
            issues: errors.clone(),
            failure: Some(ConfigError::ValidationError { path, errors }),
        },
        Err(e) => FileReport {
            file,
            issues: Vec::new(),
            failure: Some(e),
        },
    }
}

fn print_human(reports: &[FileReport]) {
    for report in reports {
        for issue in &report.issues {
            println!("{}: {issue}", report.file);
        }
        match &report.failure {
            None => println!("{}: ok", report.file),
            Some(ConfigError::ValidationError { .. }) => println!("{}: invalid", report.file),
            Some(e) => println!("{}: {e}", report.file),
        }
    }
}

fn print_json(reports: &[FileReport]) -> Result<(), AuroraError> {
    let files: Vec<serde_json::Value> = reports
        .iter()
        .map(|r| {
            let issues: Vec<serde_json::Value> = r
                .issues
                .iter()
                .map(|i| {
                    serde_json::json!({
                        "severity": match i.severity {
                            Severity::Error => "error",
                            Severity::Warning => "warning",
                        },
                        "path": i.path,
                        "message": i.message,
                    })
                })
                .collect();
            let error = match &r.failure {
                Some(ConfigError::ValidationError { .. }) | None => None,
                Some(e) => Some(e.to_string()),
            };
            serde_json::json!({
                "file": r.file,
                "valid": r.failure.is_none(),
                "issues": issues,
                "error": error,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&files)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn script_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn warnings_pass_unless_strict() {
        let file = script_file("timing:\n  typewriter_speed: 0\n");
        let loader = ConfigLoader::default();

        let lenient = check_file(&loader, file.path(), false);
        assert_eq!(lenient.issues.len(), 1);
        assert!(lenient.failure.is_none());

        let strict = check_file(&loader, file.path(), true);
        assert!(matches!(
            strict.failure,
            Some(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn errors_are_reported_per_file() {
        let good = script_file("");
        let bad = script_file("narrative:\n  boot_sequence: []\n");
        let args = ValidateArgs {
            files: vec![good.path().to_path_buf(), bad.path().to_path_buf()],
            format: OutputFormat::Json,
            strict: false,
        };
        let err = run(&args).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn missing_file_fails() {
        let loader = ConfigLoader::default();
        let report = check_file(&loader, Path::new("/nonexistent/script.yaml"), false);
        assert!(matches!(
            report.failure,
            Some(ConfigError::MissingFile { .. })
        ));
    }
}
