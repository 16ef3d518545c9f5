//! htmx fragments served under `/components`.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::escape;
use crate::data::addresses::{AddressType, abbreviate};
use crate::entities::{github_commits, github_repos};
use crate::models::balanced::{Liquidation, LoanSort, LoanView, LoansOverview, PoolView, PricePoint};
use crate::models::github::{Datapoint, GithubOrg, LeaderboardEntry, OwnerSummary};
use crate::models::icx::{
    AddressField, Contract, IissOverview, RecentBlock, ScoreApiEntry, SortDirection, TokenTransfer,
    Transaction, TransactionLog, Validator, ValidatorSort, grade_name,
};
use crate::services::balanced_api::DaoFundBalance;
use crate::services::tracker::AddressDetails;
use crate::utils::{format_number, format_number_f64};

const EMPTY_ROW: &str = r#"<p class="empty">Nothing to show yet.</p>"#;

/// Small headline card used on the home page.
pub fn module(id: &str, title: &str, body: &str) -> String {
    format!(
        r#"<div class="module" id="{}"><span class="module-title">{}</span><span class="module-body">{}</span></div>"#,
        escape(id),
        escape(title),
        escape(body)
    )
}

fn link(href: &str, label: &str) -> String {
    format!(r#"<a href="{}">{}</a>"#, escape(href), escape(label))
}

fn address_href(address: &str, kind: Option<AddressType>) -> String {
    match kind {
        Some(AddressType::Contract) => format!("/contract/{}/", address),
        _ if address.starts_with("cx") => format!("/contract/{}/", address),
        _ => format!("/address/{}/", address),
    }
}

/// Address link labelled with its known name, or an abbreviation.
pub fn address_link(field: &AddressField) -> String {
    match field.default.as_deref() {
        Some(address) => {
            let label = field
                .formatted
                .clone()
                .unwrap_or_else(|| abbreviate(address));
            format!(
                r#"<a class="mono" href="{}" title="{}">{}</a>"#,
                escape(&address_href(address, field.kind)),
                escape(address),
                escape(&label)
            )
        }
        None => "-".to_string(),
    }
}

fn raw_address_link(address: &str) -> String {
    address_link(&AddressField::new(Some(address.to_string())))
}

fn tx_link(hash: &str) -> String {
    format!(
        r#"<a class="mono" href="/transaction/{}/">{}</a>"#,
        escape(hash),
        escape(&abbreviate(hash))
    )
}

fn block_link(number: i64, formatted: &str) -> String {
    format!(r#"<a href="/block/{}/">{}</a>"#, number, escape(formatted))
}

fn datetime(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn table(headers: &[&str], rows: &str) -> String {
    if rows.is_empty() {
        return EMPTY_ROW.to_string();
    }
    let head: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape(h)))
        .collect();
    format!(
        r#"<table class="table"><thead><tr>{}</tr></thead><tbody>{}</tbody></table>"#,
        head, rows
    )
}

/// Previous/next controls that swap the enclosing fragment.
fn pager(base_url: &str, page: u64, limit: u64, has_next: bool) -> String {
    // Written straight into the attribute, so `&` has to be an entity.
    let separator = if base_url.contains('?') { "&amp;" } else { "?" };
    let button = |target: u64, label: &str| {
        format!(
            r#"<button hx-get="{}{}page={}&amp;limit={}" hx-target="closest .fragment" hx-swap="outerHTML">{}</button>"#,
            escape(base_url),
            separator,
            target,
            limit,
            label
        )
    };
    let prev = if page > 1 { button(page - 1, "Prev") } else { String::new() };
    let next = if has_next { button(page + 1, "Next") } else { String::new() };
    format!(
        r#"<div class="pager">{}<span>Page {}</span>{}</div>"#,
        prev, page, next
    )
}

fn fragment(id: &str, content: &str) -> String {
    format!(r#"<div class="fragment" id="{}">{}</div>"#, escape(id), content)
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

pub fn address_overview(details: &AddressDetails) -> String {
    let kind = if details.is_contract {
        "Contract"
    } else if details.is_prep {
        "Validator"
    } else {
        "Wallet"
    };
    format!(
        r#"<dl class="details">
  <dt>Name</dt><dd>{name}</dd>
  <dt>Type</dt><dd>{kind}</dd>
  <dt>Balance</dt><dd>{balance} ICX</dd>
  <dt>Transactions</dt><dd>{transactions}</dd>
  <dt>Token Transfers</dt><dd>{token_transfers}</dd>
  <dt>Logs</dt><dd>{logs}</dd>
</dl>"#,
        name = escape(details.name.as_deref().unwrap_or("-")),
        kind = kind,
        balance = format_number_f64(details.balance, 4, false),
        transactions = format_number(details.transaction_count.into(), 0, false),
        token_transfers = format_number(details.token_transfer_count.into(), 0, false),
        logs = format_number(details.log_count.into(), 0, false),
    )
}

fn transaction_rows(transactions: &[Transaction]) -> String {
    transactions
        .iter()
        .map(|tx| {
            format!(
                r#"<tr class="{status}"><td>{hash}</td><td>{block}</td><td>{age}</td><td>{from}</td><td>{to}</td><td>{method}</td><td>{value}</td><td>{fee}</td></tr>"#,
                status = if tx.is_success() { "success" } else { "failed" },
                hash = tx_link(&tx.hash),
                block = block_link(tx.block_number.default, &tx.block_number.formatted),
                age = escape(tx.block_timestamp.relative.as_deref().unwrap_or_default()),
                from = address_link(&tx.from_address),
                to = address_link(&tx.to_address),
                method = escape(tx.method.as_deref().unwrap_or("-")),
                value = tx.value.formatted,
                fee = tx.transaction_fee.formatted,
            )
        })
        .collect()
}

fn transactions_table(transactions: &[Transaction]) -> String {
    table(
        &["Hash", "Block", "Age", "From", "To", "Method", "Value", "Fee"],
        &transaction_rows(transactions),
    )
}

pub fn address_transactions(
    address: &str,
    transactions: &[Transaction],
    page: u64,
    limit: u64,
    refresh: bool,
) -> String {
    let base = format!("/components/address/transactions/{}/?refresh={}", address, refresh);
    fragment(
        "address-transactions",
        &format!(
            "{}{}",
            transactions_table(transactions),
            pager(&base, page, limit, transactions.len() as u64 >= limit)
        ),
    )
}

/// Address book entries passed through the query string as `address=name`.
pub fn address_book(entries: &[(String, String)]) -> String {
    if entries.is_empty() {
        return r#"<p class="empty">No saved addresses.</p>"#.to_string();
    }
    let items: String = entries
        .iter()
        .map(|(address, name)| register_address(address, name))
        .collect();
    format!(r#"<ul class="address-book">{}</ul>"#, items)
}

pub fn register_address(icx_address: &str, name: &str) -> String {
    format!(
        r#"<li><span class="name">{}</span> {}</li>"#,
        escape(name),
        link(&format!("/address/{}/", icx_address), icx_address)
    )
}

// ---------------------------------------------------------------------------
// Balanced
// ---------------------------------------------------------------------------

pub fn dao_fund_balance_sheet(assets: &[DaoFundBalance]) -> String {
    let rows: String = assets
        .iter()
        .map(|asset| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(&asset.symbol),
                format_number(asset.amount, 4, false)
            )
        })
        .collect();
    table(&["Asset", "Amount"], &rows)
}

pub fn liquidations(liquidations: &[Liquidation], page: u64) -> String {
    let rows: String = liquidations
        .iter()
        .map(|l| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{} sICX</td></tr>",
                tx_link(&l.transaction_hash),
                block_link(l.block_number, &format_number(l.block_number.into(), 0, false)),
                escape(l.block_timestamp.relative.as_deref().unwrap_or_default()),
                raw_address_link(&l.address),
                l.amount.formatted,
            )
        })
        .collect();
    let prev = if page > 1 {
        format!(
            r#"<button hx-get="/components/balanced/liquidations/?page={}" hx-target="closest .fragment" hx-swap="outerHTML">Prev</button>"#,
            page - 1
        )
    } else {
        String::new()
    };
    let next = if liquidations.is_empty() {
        String::new()
    } else {
        format!(
            r#"<button hx-get="/components/balanced/liquidations/?page={}" hx-target="closest .fragment" hx-swap="outerHTML">Next</button>"#,
            page + 1
        )
    };
    fragment(
        "liquidations",
        &format!(
            r#"{}<div class="pager">{}<span>Page {}</span>{}</div>"#,
            table(&["Transaction", "Block", "Age", "Position", "Amount"], &rows),
            prev,
            page,
            next
        ),
    )
}

fn loans_sort_header(label: &str, key: LoanSort, current: LoanSort, dir: SortDirection, show_liquidated: bool) -> String {
    let next_dir = if key == current && dir == SortDirection::Asc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    format!(
        r#"<th><a hx-get="/components/balanced/loans/?sort_by={}&amp;sort_dir={}&amp;show_liquidated={}" hx-target="closest .fragment" hx-swap="outerHTML">{}</a></th>"#,
        key.as_str(),
        next_dir.as_str(),
        show_liquidated,
        label
    )
}

pub fn loans(
    loans: &[LoanView],
    loan_count: &str,
    sort_by: LoanSort,
    sort_dir: SortDirection,
    show_liquidated: bool,
) -> String {
    let header: String = [
        ("ID", LoanSort::Id),
        ("Date", LoanSort::Date),
        ("Collateral", LoanSort::Collateral),
        ("Debt", LoanSort::Debt),
        ("Ratio", LoanSort::Ratio),
        ("Status", LoanSort::Status),
    ]
    .iter()
    .map(|(label, key)| loans_sort_header(label, *key, sort_by, sort_dir, show_liquidated))
    .collect();

    let rows: String = loans
        .iter()
        .map(|loan| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                loan.id.formatted,
                datetime(loan.created),
                raw_address_link(&loan.address),
                loan.collateral.formatted,
                loan.total_debt.formatted,
                loan.ratio.formatted,
                escape(&loan.standing),
            )
        })
        .collect();

    let toggle = format!(
        r#"<label><input type="checkbox" hx-get="/components/balanced/loans/?sort_by={}&amp;sort_dir={}&amp;show_liquidated={}" hx-target="closest .fragment" hx-swap="outerHTML"{}> Show liquidated</label>"#,
        sort_by.as_str(),
        sort_dir.as_str(),
        !show_liquidated,
        if show_liquidated { " checked" } else { "" }
    );

    let body = if rows.is_empty() {
        EMPTY_ROW.to_string()
    } else {
        format!(
            r#"<table class="table"><thead><tr>{}<th>Owner</th></tr></thead><tbody>{}</tbody></table>"#,
            header, rows
        )
    };
    fragment(
        "loans",
        &format!(r#"<p class="count">{} loans</p>{}{}"#, escape(loan_count), toggle, body),
    )
}

pub fn loans_overview(overview: &LoansOverview) -> String {
    format!(
        r#"<div class="modules">{}{}{}{}{}</div>"#,
        module("loan-count", "Loans", &overview.loan_count),
        module("total-collateral", "Collateral (sICX)", &overview.total_collateral),
        module("total-debt", "Debt (bnUSD)", &overview.total_debt),
        module("mean-ratio", "Mean Ratio", &overview.mean_ratio),
        module("max-ratio", "Max Ratio", &overview.max_ratio),
    )
}

pub fn stability_fund(assets: &[(String, Decimal)]) -> String {
    let rows: String = assets
        .iter()
        .map(|(symbol, amount)| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(symbol),
                format_number(*amount, 4, false)
            )
        })
        .collect();
    table(&["Asset", "Amount"], &rows)
}

pub fn pools(pools: &[PoolView]) -> String {
    let rows: String = pools
        .iter()
        .map(|pool| {
            let trend = if pool.price_daily_change_amount.default.is_sign_negative() {
                "down"
            } else {
                "up"
            };
            format!(
                r#"<tr><td>{}</td><td>{}</td><td>{} {}</td><td>{} {}</td><td>{}</td><td class="{}">{} ({})</td></tr>"#,
                pool.id,
                escape(&pool.pool_name),
                pool.base.formatted,
                escape(&pool.base_symbol),
                pool.quote.formatted,
                escape(&pool.quote_symbol),
                pool.price.formatted,
                trend,
                pool.price_daily_change_amount.formatted,
                pool.price_daily_change_percent.formatted,
            )
        })
        .collect();
    table(&["ID", "Pool", "Base", "Quote", "Price", "24h"], &rows)
}

fn line_chart(chart_id: &str, label: &str, points_json: &str) -> String {
    format!(
        r#"<canvas id="{id}" class="chart" data-label="{label}" data-points="{points}"></canvas>
<script>renderLineChart("{id}");</script>"#,
        id = escape(chart_id),
        label = escape(label),
        points = escape(points_json),
    )
}

pub fn bnusd_price_chart(points: &[PricePoint]) -> String {
    if points.is_empty() {
        return EMPTY_ROW.to_string();
    }
    let json = serde_json::to_string(points).unwrap_or_else(|_| "[]".to_string());
    line_chart("bnusd-usd-price-chart", "bnUSD/USD", &json)
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

pub fn commits(commits: &[github_commits::Model], start_timestamp: i64, end_timestamp: i64) -> String {
    let rows: String = commits
        .iter()
        .map(|c| {
            let author = c.author_username.as_deref().unwrap_or(&c.author_name);
            let title = c.message.lines().next().unwrap_or_default();
            format!(
                r#"<tr><td>{}</td><td>{}/{}</td><td>{}</td><td>{}</td><td class="mono">{}</td><td>+{} / -{}</td></tr>"#,
                datetime(c.date),
                escape(&c.owner_name),
                escape(&c.repo_name),
                escape(author),
                escape(title),
                escape(&c.sha[..c.sha.len().min(7)]),
                c.changes_additions,
                c.changes_deletions,
            )
        })
        .collect();
    format!(
        r#"<p class="range" data-start="{}" data-end="{}">{} commits in the last 30 days</p>{}"#,
        start_timestamp,
        end_timestamp,
        format_number(Decimal::from(commits.len()), 0, false),
        table(&["Date", "Repo", "Author", "Message", "SHA", "Changes"], &rows)
    )
}

pub fn leaderboard(entries: &[LeaderboardEntry]) -> String {
    let rows: String = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                r#"<tr><td>{}</td><td><a href="https://github.com/{user}" rel="noopener">{user}</a></td><td>{}</td></tr>"#,
                i + 1,
                format_number(Decimal::from(entry.commits), 0, false),
                user = escape(&entry.username),
            )
        })
        .collect();
    table(&["#", "Developer", "Commits"], &rows)
}

pub fn commits_chart(chart_id: &str, points: &[Datapoint], total_commits: &str) -> String {
    let json = serde_json::to_string(points).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"<p class="total">{} commits</p>{}"#,
        escape(total_commits),
        line_chart(chart_id, "Commits", &json)
    )
}

pub fn owners(owners: &[OwnerSummary]) -> String {
    let rows: String = owners
        .iter()
        .map(|owner| {
            format!(
                r#"<tr><td><a hx-get="/components/build/repos/?owner_name={name}" hx-target="closest section .fragment" hx-swap="outerHTML">{name}</a></td><td>{}</td></tr>"#,
                owner.repo_count,
                name = escape(&owner.owner_name),
            )
        })
        .collect();
    table(&["Owner", "Repos"], &rows)
}

pub fn repos(
    owners: &[&str],
    repos: &[github_repos::Model],
    org: Option<&GithubOrg>,
    releases: &HashMap<String, String>,
) -> String {
    let options: String = owners
        .iter()
        .map(|owner| format!(r#"<option value="{0}">{0}</option>"#, escape(owner)))
        .collect();
    let filter = format!(
        r#"<select name="owner_name" hx-get="/components/build/repos/" hx-target="closest .fragment" hx-swap="outerHTML"><option value="">All owners</option>{}</select>"#,
        options
    );
    let profile = org
        .map(|org| {
            format!(
                r#"<p class="org"><a href="{}" rel="noopener">{}</a> · {} public repos{}</p>"#,
                escape(&org.html_url),
                escape(org.display_name()),
                org.public_repos,
                org.description
                    .as_deref()
                    .map(|d| format!(" · {}", escape(d)))
                    .unwrap_or_default(),
            )
        })
        .unwrap_or_default();
    let rows: String = repos
        .iter()
        .map(|repo| {
            format!(
                r#"<tr><td><a href="https://github.com/{owner}/{name}" rel="noopener">{name}</a></td><td>{owner}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                escape(repo.language.as_deref().unwrap_or("-")),
                escape(repo.license.as_deref().unwrap_or("-")),
                format_number(Decimal::from(repo.total_commits), 0, false),
                escape(releases.get(&repo.name).map(String::as_str).unwrap_or("-")),
                datetime(repo.pushed_at),
                owner = escape(&repo.owner_name),
                name = escape(&repo.name),
            )
        })
        .collect();
    fragment(
        "repos",
        &format!(
            "{}{}{}",
            filter,
            profile,
            table(
                &["Name", "Owner", "Language", "License", "Commits", "Latest Release", "Last Push"],
                &rows
            )
        ),
    )
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Callable functions of a contract ABI; event logs are left out.
pub fn score_api(entries: &[ScoreApiEntry]) -> String {
    let rows: String = entries
        .iter()
        .filter(|entry| entry.is_function())
        .map(|entry| {
            let inputs: Vec<&str> = entry
                .inputs
                .iter()
                .filter_map(|input| input.get("name").and_then(|n| n.as_str()))
                .collect();
            format!(
                "<tr><td class=\"mono\">{}</td><td>{}</td><td>{}</td></tr>",
                escape(&entry.name),
                escape(&inputs.join(", ")),
                if entry.is_readonly() { "Read" } else { "Write" },
            )
        })
        .collect();
    table(&["Method", "Inputs", "Kind"], &rows)
}

pub fn contracts(contracts: &[Contract], page: u64, limit: u64, token_standard: Option<&str>) -> String {
    let rows: String = contracts
        .iter()
        .map(|c| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                link(&format!("/contract/{}/", c.address), &c.name),
                format!(r#"<span class="mono">{}</span>"#, escape(&abbreviate(&c.address))),
                escape(&c.token_standard),
                escape(&c.status),
                c.transaction_count.formatted,
                c.created_timestamp.formatted.format("%Y-%m-%d"),
            )
        })
        .collect();
    let base = match token_standard {
        Some(standard) => format!("/components/contracts/?token_standard={}", standard),
        None => "/components/contracts/".to_string(),
    };
    fragment(
        "contracts",
        &format!(
            "{}{}",
            table(&["Name", "Address", "Standard", "Status", "Transactions", "Created"], &rows),
            pager(&base, page, limit, contracts.len() as u64 >= limit)
        ),
    )
}

// ---------------------------------------------------------------------------
// Governance
// ---------------------------------------------------------------------------

pub fn iiss_overview(overview: &IissOverview) -> String {
    format!(
        r#"<div class="modules">{}{}{}{}{}{}</div>
<dl class="details">
  <dt>Bond Requirement</dt><dd>{}</dd>
  <dt>Average Bond</dt><dd>{} ICX</dd>
  <dt>Total Power</dt><dd>{}</dd>
  <dt>Staking APY</dt><dd>{}</dd>
  <dt>Reward Split</dt><dd>Validators {}% · Voters {}% · CPS {}% · Relay {}%</dd>
</dl>"#,
        module("validator-count", "Validators", &overview.validator_count.to_string()),
        module("main-validator-count", "Main", &overview.main_validator_count.to_string()),
        module("sub-validator-count", "Sub", &overview.sub_validator_count.to_string()),
        module("total-staked", "Staked ICX", &overview.total_staked_icx),
        module("total-delegated", "Delegated ICX", &overview.total_delegated_icx),
        module("i-global", "Monthly Rewards", &overview.i_global),
        escape(&overview.bond_requirement),
        escape(&overview.average_bond),
        escape(&overview.total_power),
        escape(&overview.staking_apy),
        overview.i_prep,
        overview.i_voter,
        overview.i_cps,
        overview.i_relay,
    )
}

fn validators_sort_header(label: &str, key: ValidatorSort, current: ValidatorSort, dir: SortDirection) -> String {
    let next_dir = if key == current && dir == SortDirection::Asc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    format!(
        r#"<th><a hx-get="/components/governance/validators/?sort_by={}&amp;sort_dir={}" hx-target="closest .fragment" hx-swap="outerHTML">{}</a></th>"#,
        key.as_str(),
        next_dir.as_str(),
        label
    )
}

pub fn validators(validators: &[Validator], sort_by: ValidatorSort, sort_dir: SortDirection) -> String {
    let header: String = [
        ("Rank", ValidatorSort::Rank),
        ("Name", ValidatorSort::Name),
        ("CPS", ValidatorSort::Cps),
        ("Delegation", ValidatorSort::Delegation),
        ("Power", ValidatorSort::Power),
        ("Bond", ValidatorSort::Bond),
        ("Productivity", ValidatorSort::Productivity),
        ("Rewards", ValidatorSort::Rewards),
    ]
    .iter()
    .map(|(label, key)| validators_sort_header(label, *key, sort_by, sort_dir))
    .collect();

    let rows: String = validators
        .iter()
        .map(|v| {
            let node = match v.node_status {
                Some(true) => r#"<span class="node up" title="Node up"></span>"#,
                Some(false) => r#"<span class="node down" title="Node down"></span>"#,
                None => "",
            };
            format!(
                r#"<tr class="{grade}"><td>{rank}</td><td>{node}<img src="/assets/validators/{address}.png" width="20" height="20" alt=""> {name} <span class="flag" title="{country}">{flag}</span></td><td>{cps}</td><td>{delegated}</td><td>{power}</td><td>{bonded_ratio}</td><td>{productivity}</td><td>{monthly} ICX<br><small>${monthly_usd}</small></td></tr>"#,
                grade = grade_name(v.grade.default),
                rank = v.rank,
                node = node,
                address = escape(&v.address),
                name = link(&format!("/validator/{}/", v.address), &v.name),
                country = escape(&v.country.default),
                flag = escape(&v.country.formatted),
                cps = if v.cps { "✓" } else { "" },
                delegated = v.delegated.formatted,
                power = v.power.formatted,
                bonded_ratio = v.bonded_ratio.formatted,
                productivity = v.productivity.formatted,
                monthly = v.monthly_reward.formatted,
                monthly_usd = v.monthly_reward_usd.formatted,
            )
        })
        .collect();

    let body = if rows.is_empty() {
        EMPTY_ROW.to_string()
    } else {
        format!(
            r#"<table class="table"><thead><tr>{}</tr></thead><tbody>{}</tbody></table>"#,
            header, rows
        )
    };
    fragment("validators", &body)
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

pub fn block_stream(blocks: &[RecentBlock]) -> String {
    let items: String = blocks
        .iter()
        .map(|b| {
            format!(
                r#"<li class="block"><a href="/block/{}/">#{}</a><span class="mono">{}</span></li>"#,
                b.number.default,
                b.number.formatted,
                escape(&abbreviate(&b.hash))
            )
        })
        .collect();
    if items.is_empty() {
        return EMPTY_ROW.to_string();
    }
    format!(r#"<ul class="block-stream">{}</ul>"#, items)
}

pub fn latest_token_transfers(transfers: &[TokenTransfer]) -> String {
    let rows: String = transfers
        .iter()
        .map(|t| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{} {}</td></tr>",
                tx_link(&t.transaction_hash),
                escape(t.block_timestamp.relative.as_deref().unwrap_or_default()),
                raw_address_link(&t.from_address),
                raw_address_link(&t.to_address),
                t.value_decimal.formatted,
                link(
                    &format!("/contract/{}/", t.token_contract_address),
                    &t.token_contract_symbol
                ),
            )
        })
        .collect();
    table(&["Hash", "Age", "From", "To", "Amount"], &rows)
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

pub fn transactions(transactions: &[Transaction], page: u64, limit: u64, refresh: bool) -> String {
    let base = format!("/components/transactions/?refresh={}", refresh);
    fragment(
        "transactions",
        &format!(
            "{}{}",
            transactions_table(transactions),
            pager(&base, page, limit, transactions.len() as u64 >= limit)
        ),
    )
}

pub fn confirmations(formatted: &str) -> String {
    format!(r#"<span class="confirmations">{}</span>"#, escape(formatted))
}

pub fn transaction_logs(logs: &[TransactionLog]) -> String {
    if logs.is_empty() {
        return r#"<p class="empty">No logs.</p>"#.to_string();
    }
    logs.iter()
        .map(|log| {
            let indexed = serde_json::to_string_pretty(&log.indexed).unwrap_or_default();
            let data = log.data.formatted.as_deref().unwrap_or("[]");
            format!(
                r#"<div class="log">
  <dl class="details">
    <dt>Index</dt><dd>{index}</dd>
    <dt>Contract</dt><dd>{contract}</dd>
    <dt>Method</dt><dd>{method}</dd>
  </dl>
  <pre class="indexed">{indexed}</pre>
  <pre class="data">{data}</pre>
</div>"#,
                index = log.log_index,
                contract = raw_address_link(&log.address),
                method = escape(&log.method),
                indexed = escape(&indexed),
                data = escape(data),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// I-Score claims made by `address`.
pub fn staking_claims(address: &str, claims: &[Transaction]) -> String {
    let rows: String = claims
        .iter()
        .map(|tx| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                tx_link(&tx.hash),
                block_link(tx.block_number.default, &tx.block_number.formatted),
                datetime(tx.block_timestamp.formatted),
                tx.transaction_fee.formatted,
            )
        })
        .collect();
    format!(
        r#"<p>{} claims by <span class="mono">{}</span></p>{}"#,
        claims.len(),
        escape(address),
        table(&["Transaction", "Block", "Date", "Fee"], &rows)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::formatted::{Formatted, Timestamp};

    #[test]
    fn test_module_escapes_body() {
        let html = module("icx-usd-price", "ICX Price", "<$0.25>");
        assert!(html.contains(r#"id="icx-usd-price""#));
        assert!(html.contains("&lt;$0.25&gt;"));
    }

    #[test]
    fn test_address_link_prefers_known_name() {
        let unnamed = AddressField::new(Some(format!("hx{}", "1".repeat(40))));
        let html = address_link(&unnamed);
        assert!(html.contains(r#"href="/address/hx1111"#));

        let contract = AddressField::new(Some(format!("cx{}", "2".repeat(40))));
        assert!(address_link(&contract).contains(r#"href="/contract/cx2222"#));

        assert_eq!(address_link(&AddressField::new(None)), "-");
    }

    #[test]
    fn test_address_book_escapes_names() {
        let entries = vec![(
            format!("hx{}", "a".repeat(40)),
            "<script>alert(1)</script>".to_string(),
        )];
        let html = address_book(&entries);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(address_book(&[]).contains("No saved addresses"));
    }

    #[test]
    fn test_pager_links() {
        let html = pager("/components/transactions/?refresh=true", 2, 50, true);
        assert!(html.contains("refresh=true&amp;page=1&amp;limit=50"));
        assert!(html.contains("page=3&amp;limit=50"));

        let first = pager("/components/contracts/", 1, 100, false);
        assert!(!first.contains("Prev"));
        assert!(!first.contains("Next"));
        assert!(first.contains("Page 1"));

        let next = pager("/components/contracts/", 1, 100, true);
        assert!(next.contains(r#"hx-get="/components/contracts/?page=2&amp;limit=100""#));
    }

    #[test]
    fn test_loans_sort_header_toggles_direction() {
        let html = loans(&[], "0", LoanSort::Ratio, SortDirection::Asc, false);
        assert!(html.contains("0 loans"));
        assert!(html.contains("Nothing to show yet"));

        let header = loans_sort_header("Ratio", LoanSort::Ratio, LoanSort::Ratio, SortDirection::Asc, false);
        assert!(header.contains("sort_by=ratio&amp;sort_dir=desc"));
        let header = loans_sort_header("ID", LoanSort::Id, LoanSort::Ratio, SortDirection::Desc, true);
        assert!(header.contains("sort_by=id&amp;sort_dir=asc&amp;show_liquidated=true"));
    }

    #[test]
    fn test_block_stream() {
        let blocks = vec![RecentBlock::new(10_000, "0xabcdef0123456789".to_string())];
        let html = block_stream(&blocks);
        assert!(html.contains(r#"href="/block/10000/""#));
        assert!(block_stream(&[]).contains("empty"));
    }

    #[test]
    fn test_bnusd_chart_embeds_points() {
        let points = vec![PricePoint {
            x: "2022-06-01T12:00".to_string(),
            y: Decimal::ONE,
        }];
        let html = bnusd_price_chart(&points);
        assert!(html.contains("2022-06-01T12:00"));
        assert!(html.contains("&quot;x&quot;"));
        assert!(bnusd_price_chart(&[]).contains("empty"));
    }

    #[test]
    fn test_transaction_logs() {
        assert!(transaction_logs(&[]).contains("No logs"));
        let log = TransactionLog {
            address: format!("cx{}", "3".repeat(40)),
            block_number: Formatted::count(1),
            block_timestamp: Timestamp::from_micros(1_640_995_200_000_000),
            data: crate::models::formatted::JsonData::parse(r#"["0x1"]"#, true),
            data_int: None,
            indexed: vec![serde_json::json!("Transfer(Address,Address,int,bytes)")],
            log_index: 0,
            method: "Transfer".to_string(),
            tx_hash: format!("0x{}", "f".repeat(64)),
        };
        let html = transaction_logs(&[log]);
        assert!(html.contains("Transfer"));
        assert!(html.contains("0x1"));
    }
}
