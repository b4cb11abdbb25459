//! Shows the resolved configuration.

use crate::output;
use crate::GlobalOpts;

pub async fn run(opts: &GlobalOpts) -> std::result::Result<(), String> {
    let provider = opts.build_provider();
    let config = provider.load().map_err(|e| e.to_string())?;

    output::print_kv("backend_api_url", &config.backend_api_url, opts.json);
    output::print_kv(
        "solana_network",
        &config.solana_network.to_string(),
        opts.json,
    );
    output::print_kv(
        "rpc_endpoint",
        config.solana_network.rpc_endpoint(),
        opts.json,
    );
    Ok(())
}
