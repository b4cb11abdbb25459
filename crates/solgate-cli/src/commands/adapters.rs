//! Lists the wallet adapters available in this build.

use solgate_wallet::factory::usable;

use crate::output;
use crate::GlobalOpts;

pub async fn run(opts: &GlobalOpts) -> std::result::Result<(), String> {
    let factory = opts.build_factory();
    let discovered = factory.discover().map_err(|e| e.to_string())?;
    let total = discovered.len();
    let adapters = usable(discovered);

    if total > adapters.len() {
        output::print_info(
            &format!("{} adapter(s) skipped (no name)", total - adapters.len()),
            opts.json,
        );
    }

    let rows: Vec<Vec<String>> = adapters
        .iter()
        .map(|a| {
            vec![
                a.name().to_string(),
                if a.public_key().is_some() {
                    "connected".to_string()
                } else {
                    "available".to_string()
                },
            ]
        })
        .collect();

    output::print_table(&["name", "state"], &rows, opts.json);
    Ok(())
}
