//! `missions`: lists the mission catalog.

use crate::cli::args::{MissionsArgs, OutputFormat};
use crate::cli::commands::load_script;
use crate::error::AuroraError;
use crate::hub::Protocol;

/// Print every protocol level and its URL.
///
/// # Errors
///
/// Returns a config error if the script cannot be loaded.
pub fn run(args: &MissionsArgs) -> Result<(), AuroraError> {
    let script = load_script(args.config.as_deref())?;
    let catalog = &script.missions;

    match args.format {
        OutputFormat::Human => {
            for protocol in Protocol::ALL {
                let access = if protocol.is_gated() {
                    "requiere código de acceso"
                } else {
                    "abierto"
                };
                println!("PROTOCOLO {protocol} ({access})");
                for (i, (level, url)) in catalog.levels(protocol).iter().enumerate() {
                    let letter = char::from(b'a' + u8::try_from(i % 26).unwrap_or(0));
                    println!("  [{letter}] {level:<16} {url}");
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(catalog)?),
    }

    Ok(())
}
