use std::process::ExitCode;

use notation_local_signer::{PluginMetadata, run};

const METADATA: PluginMetadata = PluginMetadata {
    name: "local-signer",
    description: "Sign artifacts with local keys",
    version: env!("CARGO_PKG_VERSION"),
    url: "https://github.com/shizhMSFT/notation-local-signer",
};

fn main() -> ExitCode {
    run(METADATA)
}
