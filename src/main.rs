//! paraxfer
//!
//! Without arguments the registry is loaded and kept fresh until Ctrl-C.
//! With `<source> <asset> <recipient> <destination-para-id> <amount>` a single
//! transfer is planned and printed as JSON.

use paraxfer::{serde_json, PlannerBuilder, TransferRequest};
use paraxfer::config::log_service_shutdown;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args: Vec<String> = std::env::args().skip(1).collect();
	let paraxfer = PlannerBuilder::new().start().await?;

	if let [source, asset, recipient, para_id, amount] = args.as_slice() {
		let request = TransferRequest::new(
			source.as_str(),
			asset.as_str(),
			recipient.as_str(),
			para_id.parse::<u32>()?,
			amount.parse::<u128>()?,
		);
		let plan = paraxfer.planner.plan(request).await?;
		println!("{}", serde_json::to_string_pretty(&plan)?);
		return Ok(());
	}
	if !args.is_empty() {
		return Err("usage: paraxfer [<source> <asset> <recipient> <destination-para-id> <amount>]".into());
	}

	let refresh = paraxfer.start_refresh();
	tokio::signal::ctrl_c().await?;
	refresh.abort();
	log_service_shutdown();
	Ok(())
}
