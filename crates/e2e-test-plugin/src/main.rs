use std::process::ExitCode;

use notation_local_signer::{PluginMetadata, run};

const METADATA: PluginMetadata = PluginMetadata {
    name: "e2e-test-plugin",
    description: "Sign artifacts with local keys for testing purposes",
    version: env!("CARGO_PKG_VERSION"),
    url: "https://github.com/notaryproject/notation-action",
};

fn main() -> ExitCode {
    run(METADATA)
}
