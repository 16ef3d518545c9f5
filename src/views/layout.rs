use super::escape;

const NAV_LINKS: [(&str, &str); 8] = [
    ("/", "Home"),
    ("/transactions/", "Transactions"),
    ("/contracts/", "Contracts"),
    ("/tokens/", "Tokens"),
    ("/governance/", "Governance"),
    ("/dapps/", "dApps"),
    ("/build/", "Build"),
    ("/btp/", "BTP"),
];

fn nav() -> String {
    let links: String = NAV_LINKS
        .iter()
        .map(|(href, label)| format!(r#"<a class="nav-link" href="{}">{}</a>"#, href, label))
        .collect();
    format!(
        r#"<nav class="nav">
  <a class="brand" href="/">RHIZOME Tracker</a>
  {links}
  <form class="search" hx-post="/search/" hx-trigger="submit">
    <input type="text" name="search" placeholder="Search by address, contract, tx hash or block" autocomplete="off">
  </form>
</nav>"#
    )
}

/// Wraps `body` in the site shell.
pub fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <link rel="stylesheet" href="/assets/css/main.css">
  <script src="/assets/js/htmx.min.js"></script>
  <script src="/assets/js/chart.min.js"></script>
</head>
<body>
{nav}
<main class="container">
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        nav = nav(),
        body = body,
    )
}

/// Placeholder swapped for the fragment at `url` once `trigger` fires.
pub fn lazy(url: &str, trigger: &str) -> String {
    format!(
        r#"<div hx-get="{}" hx-trigger="{}" hx-swap="innerHTML"><span class="loading">Loading…</span></div>"#,
        escape(url),
        escape(trigger)
    )
}

/// Fragment that loads once and, when `refresh` is set, polls every `seconds`.
pub fn lazy_refresh(url: &str, refresh: bool, seconds: u32) -> String {
    if refresh {
        lazy(url, &format!("load, every {}s", seconds))
    } else {
        lazy(url, "load")
    }
}
