//! RPC endpoint ranking
//!
//! Only WebSocket endpoints qualify, since fee queries hold a live connection.
//! Endpoints are ranked by a static provider preference list; this is policy,
//! not a health check. Liveness is established later by the connection pool,
//! which walks the ranked list.

use paraxfer_types::{EndpointCandidate, Provider};
use std::collections::BTreeSet;

/// Provider keywords in order of preference
pub const DEFAULT_PRIORITY: [&str; 3] = ["onfinality", "dwellir", "blastapi"];

/// Ranks a chain's providers by keyword preference
#[derive(Debug, Clone)]
pub struct EndpointSelector {
	priority: Vec<String>,
}

impl Default for EndpointSelector {
	fn default() -> Self {
		Self::new(DEFAULT_PRIORITY.iter().map(|keyword| keyword.to_string()).collect())
	}
}

impl EndpointSelector {
	/// `priority` lists keywords from most to least preferred
	pub fn new(priority: Vec<String>) -> Self {
		let priority = priority
			.into_iter()
			.map(|keyword| keyword.trim().to_ascii_lowercase())
			.filter(|keyword| !keyword.is_empty())
			.collect();
		Self { priority }
	}

	/// Priority class of a provider; unmatched providers rank last
	fn class_of(&self, provider: &Provider) -> usize {
		let url = provider.url.to_ascii_lowercase();
		let label = provider.label.as_deref().unwrap_or_default().to_ascii_lowercase();
		self.priority
			.iter()
			.position(|keyword| url.contains(keyword.as_str()) || label.contains(keyword.as_str()))
			.unwrap_or(self.priority.len())
	}

	/// All WebSocket providers, best first
	///
	/// Ties inside a class are ordered by lower-cased URL and repeated URLs are
	/// collapsed, so the result does not depend on input order.
	pub fn rank(&self, providers: &[Provider]) -> Vec<EndpointCandidate> {
		let mut ranked: Vec<(usize, String, &Provider)> = providers
			.iter()
			.filter(|provider| is_websocket(&provider.url))
			.map(|provider| (self.class_of(provider), provider.url.to_ascii_lowercase(), provider))
			.collect();
		ranked.sort_by(|a, b| {
			(a.0, &a.1)
				.cmp(&(b.0, &b.1))
				.then_with(|| a.2.url.cmp(&b.2.url))
				.then_with(|| a.2.label.cmp(&b.2.label))
		});

		let mut seen = BTreeSet::new();
		ranked
			.into_iter()
			.filter(|(_, key, _)| seen.insert(key.clone()))
			.map(|(class, _, provider)| EndpointCandidate::from_provider(provider, class))
			.collect()
	}

	/// The preferred WebSocket endpoint, if any
	pub fn select(&self, providers: &[Provider]) -> Option<String> {
		self.rank(providers).into_iter().next().map(|candidate| candidate.url)
	}
}

/// `ws://` or `wss://`, case-insensitive
pub fn is_websocket(url: &str) -> bool {
	let url = url.trim_start();
	["ws://", "wss://"].iter().any(|scheme| {
		url.get(..scheme.len())
			.map(|prefix| prefix.eq_ignore_ascii_case(scheme))
			.unwrap_or(false)
	})
}

/// Select from bare URLs with the default preference list
pub fn select_endpoint<S: AsRef<str>>(urls: &[S]) -> Option<String> {
	let providers: Vec<Provider> = urls.iter().map(|url| Provider::new(url.as_ref())).collect();
	EndpointSelector::default().select(&providers)
}

#[cfg(test)]
mod tests {
	use super::*;

	const PROVIDERS: [&str; 4] = [
		"https://x",
		"wss://foo.blastapi.io",
		"wss://bar.onfinality.io",
		"wss://baz.dwellir.com",
	];

	fn permutations(items: &[&'static str]) -> Vec<Vec<&'static str>> {
		if items.len() <= 1 {
			return vec![items.to_vec()];
		}
		let mut all = Vec::new();
		for (i, first) in items.iter().enumerate() {
			let mut rest = items.to_vec();
			rest.remove(i);
			for mut tail in permutations(&rest) {
				tail.insert(0, *first);
				all.push(tail);
			}
		}
		all
	}

	#[test]
	fn test_selects_onfinality_first() {
		assert_eq!(
			select_endpoint(&PROVIDERS),
			Some("wss://bar.onfinality.io".to_string())
		);
	}

	#[test]
	fn test_rank_order_and_classes() {
		let providers: Vec<Provider> = PROVIDERS.iter().map(|url| Provider::new(*url)).collect();
		let ranked = EndpointSelector::default().rank(&providers);
		let urls: Vec<&str> = ranked.iter().map(|c| c.url.as_str()).collect();
		assert_eq!(
			urls,
			vec!["wss://bar.onfinality.io", "wss://baz.dwellir.com", "wss://foo.blastapi.io"]
		);
		assert_eq!(ranked.iter().map(|c| c.priority).collect::<Vec<_>>(), vec![0, 1, 2]);
	}

	#[test]
	fn test_no_websocket_endpoint() {
		assert_eq!(select_endpoint(&["https://a", "http://b"]), None);
		assert_eq!(select_endpoint::<&str>(&[]), None);
	}

	#[test]
	fn test_scheme_and_keyword_case_insensitive() {
		assert_eq!(
			select_endpoint(&["WSS://rpc.example", "Wss://Polkadot.API.OnFinality.io"]),
			Some("Wss://Polkadot.API.OnFinality.io".to_string())
		);
		assert!(is_websocket("ws://127.0.0.1:9944"));
		assert!(!is_websocket("wss:/broken"));
	}

	#[test]
	fn test_label_matches_keyword() {
		let providers = vec![
			Provider::labelled("Parity", "wss://rpc.polkadot.io"),
			Provider::labelled("Dwellir", "wss://polkadot.example"),
		];
		assert_eq!(
			EndpointSelector::default().select(&providers),
			Some("wss://polkadot.example".to_string())
		);
	}

	#[test]
	fn test_permutation_invariance() {
		let urls = [
			"wss://b.example",
			"wss://a.example",
			"https://x",
			"wss://foo.blastapi.io",
			"wss://A.example",
		];
		let expected = select_endpoint(&urls);
		for permutation in permutations(&urls) {
			assert_eq!(select_endpoint(&permutation), expected);
		}
		assert_eq!(expected, Some("wss://foo.blastapi.io".to_string()));

		let reference = EndpointSelector::default()
			.rank(&urls.iter().map(|url| Provider::new(*url)).collect::<Vec<_>>());
		for permutation in permutations(&urls) {
			let providers: Vec<Provider> = permutation.iter().map(|url| Provider::new(*url)).collect();
			let ranked = EndpointSelector::default().rank(&providers);
			assert_eq!(ranked, reference);
		}
	}

	#[test]
	fn test_duplicates_collapsed() {
		let ranked = EndpointSelector::default().rank(&[
			Provider::new("wss://rpc.example"),
			Provider::labelled("Mirror", "wss://rpc.example"),
		]);
		assert_eq!(ranked.len(), 1);
	}

	#[test]
	fn test_custom_priority() {
		let selector = EndpointSelector::new(vec!["Parity".to_string(), " ".to_string()]);
		let providers = vec![
			Provider::labelled("OnFinality", "wss://polkadot.api.onfinality.io/public-ws"),
			Provider::labelled("Parity", "wss://rpc.polkadot.io"),
		];
		let ranked = selector.rank(&providers);
		assert_eq!(ranked[0].url, "wss://rpc.polkadot.io");
		assert_eq!(ranked[1].priority, 1);
	}
}
