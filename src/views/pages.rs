//! Full pages. Most are shells whose sections load via htmx.

use super::components;
use super::escape;
use super::layout::{lazy, lazy_refresh, page};
use crate::data::addresses::abbreviate;
use crate::models::icx::{ChainBlock, ScoreApiEntry, TrackerPrep, TransactionDetail, TransactionLog};
use crate::utils::{format_number, micros_to_datetime};

fn section(title: &str, content: &str) -> String {
    format!(
        r#"<section class="section"><h2>{}</h2>{}</section>"#,
        escape(title),
        content
    )
}

pub fn home() -> String {
    let modules = [
        "/components/icx/icx-usd-price/",
        "/components/icx/average-block-time/",
        "/components/icx/total-transactions/",
        "/components/icx/total-token-transfers/",
    ]
    .iter()
    .map(|url| lazy(url, "load, every 30s"))
    .collect::<String>();

    let body = format!(
        r#"<div class="modules">{}</div>{}{}"#,
        modules,
        section("Latest Blocks", &lazy("/components/home/block-stream/", "load, every 5s")),
        section(
            "Latest Token Transfers",
            &lazy("/components/home/latest-token-transfers/", "load, every 10s")
        ),
    );
    page("Home", &body)
}

pub fn address(address: &str, page_number: u64, limit: u64, refresh: bool) -> String {
    let body = format!(
        "<h1>Address</h1><p class=\"mono\">{}</p>{}{}",
        escape(address),
        lazy(&format!("/components/address/overview/{}/", address), "load"),
        section(
            "Transactions",
            &lazy_refresh(
                &format!(
                    "/components/address/transactions/{}/?page={}&limit={}&refresh={}",
                    address, page_number, limit, refresh
                ),
                refresh && page_number == 1,
                10,
            )
        ),
    );
    page(&format!("{}... | RHIZOME Tracker", &address[..address.len().min(8)]), &body)
}

pub fn addresses(page_number: u64) -> String {
    let body = format!(
        "<h1>Addresses</h1>{}",
        section(
            "Address Book",
            &format!(
                r##"{}<form hx-post="/components/address-book/" hx-target="#address-book-registered" hx-swap="beforeend">
  <input type="text" name="icx-address" placeholder="hx...">
  <input type="text" name="name" placeholder="Name">
  <button type="submit">Register</button>
</form>
<ul id="address-book-registered"></ul>
<p class="page">Page {}</p>"##,
                lazy("/components/address-book/", "load"),
                page_number
            )
        )
    );
    page("Addresses", &body)
}

pub fn block(block: &ChainBlock) -> String {
    let transactions: String = block
        .confirmed_transaction_list
        .iter()
        .filter_map(|tx| tx.get("txHash").and_then(|h| h.as_str()))
        .map(|hash| {
            let hash = if hash.starts_with("0x") {
                hash.to_string()
            } else {
                format!("0x{}", hash)
            };
            format!(
                r#"<li><a class="mono" href="/transaction/{0}/">{0}</a></li>"#,
                escape(&hash)
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Block #{height}</h1>
<dl class="details">
  <dt>Hash</dt><dd class="mono">{hash}</dd>
  <dt>Timestamp</dt><dd>{timestamp} UTC</dd>
  <dt>Validator</dt><dd><a href="/address/{peer}/">{peer_short}</a></dd>
  <dt>Transactions</dt><dd>{count}</dd>
</dl>
{transactions}"#,
        height = format_number(block.height.into(), 0, false),
        hash = escape(&block.block_hash),
        timestamp = micros_to_datetime(block.time_stamp),
        peer = escape(&block.peer_id),
        peer_short = escape(&abbreviate(&block.peer_id)),
        count = block.confirmed_transaction_list.len(),
        transactions = section("Transactions", &format!("<ul>{}</ul>", transactions)),
    );
    page(&format!("Block {}", block.height), &body)
}

pub fn btp() -> String {
    page(
        "BTP & ICON Bridge",
        "<h1>BTP &amp; ICON Bridge</h1><p>Cross-chain messaging between ICON and connected networks.</p>",
    )
}

pub fn build() -> String {
    let body = format!(
        "<h1>Build</h1>{}{}{}{}{}{}",
        section("Last 7 Days", &lazy("/components/build/commits-7d-chart/", "load")),
        section("Year to Date", &lazy("/components/build/commits-ytd-chart/", "load")),
        section("Owners", &lazy("/components/build/owners/", "load")),
        section("Leaderboard", &lazy("/components/build/commits/leaderboard/", "load")),
        section("Recent Commits", &lazy("/components/build/commits/", "load")),
        section("Repositories", &lazy("/components/build/repos/", "load")),
    );
    page("Build", &body)
}

pub fn contract(address: &str, methods: &[ScoreApiEntry]) -> String {
    let body = format!(
        "<h1>Contract</h1><p class=\"mono\">{}</p>{}{}{}",
        escape(address),
        lazy(&format!("/components/address/overview/{}/", address), "load"),
        section(
            "Transactions",
            &lazy(
                &format!("/components/address/transactions/{}/?page=1&limit=50", address),
                "load"
            )
        ),
        section("Methods", &components::score_api(methods)),
    );
    page("Contract", &body)
}

pub fn contracts(page_number: u64, limit: u64) -> String {
    let body = format!(
        "<h1>Contracts</h1>{}",
        lazy(
            &format!("/components/contracts/?page={}&limit={}", page_number, limit),
            "load"
        )
    );
    page("Contracts", &body)
}

pub fn dapps() -> String {
    page(
        "ICON dApps",
        r#"<h1>ICON dApps</h1>
<ul class="cards">
  <li><a href="/dapps/balanced/">Balanced</a> DeFi: DEX, stablecoin loans and liquidations.</li>
</ul>"#,
    )
}

pub fn balanced() -> String {
    let body = format!(
        r#"<h1>Balanced</h1>
<p><a href="/dapps/balanced/loans/">Loans</a> · <a href="/dapps/balanced/liquidations/">Liquidations</a></p>
{}{}{}{}{}"#,
        section("bnUSD Price", &lazy("/components/balanced/bnusd-usd-price-chart/", "load")),
        section("Pools", &lazy("/components/balanced/pools/", "load, every 60s")),
        section("Loans", &lazy("/components/balanced/loans/overview/", "load")),
        section("Stability Fund", &lazy("/components/balanced/stability-fund/", "load")),
        section("DAO Fund", &lazy("/components/balanced/dao-fund-balance-sheet/", "load")),
    );
    page("Balanced", &body)
}

pub fn balanced_liquidations() -> String {
    let body = format!(
        "<h1>Balanced Liquidations</h1>{}",
        lazy("/components/balanced/liquidations/?page=1", "load")
    );
    page("Balanced Liquidations", &body)
}

pub fn balanced_loans() -> String {
    let body = format!(
        "<h1>Balanced Loans</h1>{}{}",
        lazy("/components/balanced/loans/overview/", "load"),
        lazy("/components/balanced/loans/", "load"),
    );
    page("Balanced", &body)
}

pub fn governance() -> String {
    let body = format!(
        "<h1>Governance</h1>{}{}",
        section("IISS", &lazy("/components/governance/iiss-overview/", "load")),
        section("Validators", &lazy("/components/governance/validators/", "load")),
    );
    page("Governance", &body)
}

pub fn tokens(page_number: u64) -> String {
    let body = format!(
        "<h1>Tokens</h1>{}",
        lazy(
            &format!(
                "/components/contracts/?page={}&limit=100&token_standard=irc2",
                page_number
            ),
            "load"
        )
    );
    page("Tokens", &body)
}

pub fn transaction(
    transaction: &TransactionDetail,
    summary: Option<&str>,
    logs: &[TransactionLog],
) -> String {
    let summary = summary
        .map(|s| format!(r#"<p class="summary">{}</p>"#, escape(s)))
        .unwrap_or_default();
    let status = if transaction.status == 1 { "Success" } else { "Failed" };
    let data = transaction
        .data
        .formatted
        .as_deref()
        .map(|d| format!("<pre>{}</pre>", escape(d)))
        .unwrap_or_default();

    let body = format!(
        r#"<h1>Transaction</h1>
{summary}
<dl class="details">
  <dt>Hash</dt><dd class="mono">{hash}</dd>
  <dt>Status</dt><dd>{status}</dd>
  <dt>Block</dt><dd><a href="/block/{block}/">{block_formatted}</a></dd>
  <dt>Confirmations</dt><dd>{confirmations}</dd>
  <dt>Timestamp</dt><dd>{timestamp} UTC ({relative})</dd>
  <dt>From</dt><dd>{from}</dd>
  <dt>To</dt><dd>{to}</dd>
  <dt>Method</dt><dd>{method}</dd>
  <dt>Value</dt><dd>{value} ICX</dd>
  <dt>Fee</dt><dd>{fee} ICX</dd>
  <dt>Step Used</dt><dd>{step_used} / {step_limit}</dd>
</dl>
{data}
{logs}"#,
        summary = summary,
        hash = escape(&transaction.hash),
        status = status,
        block = transaction.block_number.default,
        block_formatted = transaction.block_number.formatted,
        confirmations = lazy(
            &format!(
                "/components/transaction/confirmations/?tx_block_height={}&tx_hash={}",
                transaction.block_number.default,
                transaction.hash
            ),
            "load, every 10s"
        ),
        timestamp = transaction.block_timestamp.formatted,
        relative = escape(transaction.block_timestamp.relative.as_deref().unwrap_or_default()),
        from = components::address_link(&transaction.from_address),
        to = components::address_link(&transaction.to_address),
        method = escape(transaction.method.as_deref().unwrap_or("-")),
        value = transaction.value.formatted,
        fee = transaction.transaction_fee.formatted,
        step_used = transaction.step_used.formatted,
        step_limit = transaction.step_limit.formatted,
        data = data,
        logs = section("Logs", &components::transaction_logs(logs)),
    );
    page("Transaction", &body)
}

pub fn transactions(page_number: u64, limit: u64, refresh: bool) -> String {
    let body = format!(
        "<h1>Transactions</h1>{}{}",
        lazy("/components/transactions/total-transactions/", "load"),
        lazy_refresh(
            &format!(
                "/components/transactions/?page={}&limit={}&refresh={}",
                page_number, limit, refresh
            ),
            refresh && page_number == 1,
            10,
        ),
    );
    page("Transactions", &body)
}

pub fn validator(address: &str, prep: Option<&TrackerPrep>) -> String {
    let heading = match prep {
        Some(prep) if !prep.name.is_empty() => format!(
            "<h1>{}</h1><p>{} · {}</p>",
            escape(&prep.name),
            escape(&prep.grade),
            escape(&prep.status)
        ),
        _ => "<h1>Validator</h1>".to_string(),
    };
    let body = format!(
        "{}<p class=\"mono\">{}</p>{}{}",
        heading,
        escape(address),
        lazy(&format!("/components/address/overview/{}/", address), "load"),
        section(
            "Transactions",
            &lazy(
                &format!("/components/address/transactions/{}/?page=1&limit=50", address),
                "load"
            )
        ),
    );
    page("Validator", &body)
}

pub fn status(service_up: bool) -> String {
    let (class, label) = if service_up {
        ("up", "All systems operational")
    } else {
        ("down", "Tracker API unavailable")
    };
    page(
        "Status",
        &format!(r#"<h1>Status</h1><p class="status {}">{}</p>"#, class, label),
    )
}

pub fn not_found() -> String {
    page(
        "Not Found",
        r#"<h1>404</h1><p>This page could not be found.</p><p><a href="/">Back home</a></p>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_page_lists_transactions() {
        let chain_block: ChainBlock = serde_json::from_value(json!({
            "height": "0x2710",
            "block_hash": "abcd",
            "time_stamp": "0x5d2a3b3c4e5f0",
            "peer_id": "hx0000000000000000000000000000000000000001",
            "confirmed_transaction_list": [{ "txHash": "ff" }, { "txHash": "0xee" }]
        }))
        .unwrap();
        let html = block(&chain_block);
        assert!(html.contains("Block #10,000"));
        assert!(html.contains(r#"href="/transaction/0xff/""#));
        assert!(html.contains(r#"href="/transaction/0xee/""#));
    }

    #[test]
    fn test_address_page_polls_first_page_only() {
        let addr = format!("hx{}", "a".repeat(40));
        assert!(address(&addr, 1, 50, true).contains("every 10s"));
        assert!(!address(&addr, 2, 50, true).contains("every 10s"));
    }

    #[test]
    fn test_validator_page_uses_tracker_name() {
        let addr = format!("hx{}", "b".repeat(40));
        let prep = TrackerPrep {
            address: addr.clone(),
            name: "ICON Foundation".to_string(),
            grade: "Main P-Rep".to_string(),
            ..Default::default()
        };
        assert!(validator(&addr, Some(&prep)).contains("<h1>ICON Foundation</h1>"));
        assert!(validator(&addr, None).contains("<h1>Validator</h1>"));
    }

    #[test]
    fn test_contract_page_lists_functions_only() {
        let api: Vec<ScoreApiEntry> = serde_json::from_value(json!([
            { "type": "function", "name": "transfer", "inputs": [{ "name": "_to" }, { "name": "_value" }] },
            { "type": "eventlog", "name": "Transfer", "inputs": [] }
        ]))
        .unwrap();
        let html = contract(&format!("cx{}", "c".repeat(40)), &api);
        assert!(html.contains("_to, _value"));
        assert!(!html.contains(">Transfer<"));
    }

    #[test]
    fn test_not_found() {
        assert!(not_found().contains("404"));
    }
}
