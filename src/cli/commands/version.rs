//! Version information display.

use crate::cli::args::{OutputFormat, VersionArgs};

/// Print version information.
pub fn run(args: &VersionArgs) {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match args.format {
        OutputFormat::Human => println!("aurora ({name}) {version}"),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({ "name": name, "binary": "aurora", "version": version })
            );
        }
    }
}
