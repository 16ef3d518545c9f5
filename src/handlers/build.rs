use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::Html,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Deserialize;

use super::or_empty;
use crate::AppState;
use crate::config::github;
use crate::entities::{github_commits, github_repos};
use crate::error::{AppError, AppResult};
use crate::models::github::{
    HOURLY_BUCKET, MONTHLY_BUCKET, commit_leaderboard, group_commit_dates, owner_summaries,
};
use crate::utils::format_number;
use crate::views::components;

fn now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Commit dates in `[start, end]`, oldest first, ignored repos excluded.
async fn commit_dates(
    db: &DatabaseConnection,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> AppResult<Vec<NaiveDateTime>> {
    let rows: Vec<(NaiveDateTime, i64)> = github_commits::Entity::find()
        .select_only()
        .column(github_commits::Column::Date)
        .column(github_commits::Column::RepoId)
        .filter(github_commits::Column::Date.gte(start))
        .filter(github_commits::Column::Date.lte(end))
        .order_by_asc(github_commits::Column::Date)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .filter(|(_, repo_id)| !github::is_ignored(*repo_id))
        .map(|(date, _)| date)
        .collect())
}

pub async fn commits(State(state): State<AppState>) -> Html<String> {
    let end = now();
    let start = end - Duration::days(30);
    let commits: Vec<github_commits::Model> = or_empty(
        github_commits::Entity::find()
            .filter(github_commits::Column::Date.gte(start))
            .filter(github_commits::Column::Date.lte(end))
            .order_by_desc(github_commits::Column::Date)
            .all(state.db.as_ref())
            .await
            .map_err(AppError::from),
        "stored commits",
    )
    .into_iter()
    .filter(|commit| !github::is_ignored(commit.repo_id))
    .collect();
    Html(components::commits(
        &commits,
        start.and_utc().timestamp(),
        end.and_utc().timestamp(),
    ))
}

pub async fn leaderboard(State(state): State<AppState>) -> Html<String> {
    let authors: Vec<Option<String>> = or_empty(
        github_commits::Entity::find()
            .select_only()
            .column(github_commits::Column::AuthorUsername)
            .into_tuple()
            .all(state.db.as_ref())
            .await
            .map_err(AppError::from),
        "commit authors",
    );
    let entries = commit_leaderboard(authors.iter().map(|a| a.as_deref()));
    Html(components::leaderboard(&entries))
}

pub async fn commits_7d_chart(State(state): State<AppState>) -> Html<String> {
    let end = now();
    let dates = or_empty(
        commit_dates(state.db.as_ref(), end - Duration::days(7), end).await,
        "weekly commits",
    );
    let points = group_commit_dates(&dates, HOURLY_BUCKET);
    let total = format_number(Decimal::from(dates.len()), 0, false);
    Html(components::commits_chart("commits-7d", &points, &total))
}

pub async fn commits_ytd_chart(State(state): State<AppState>) -> Html<String> {
    let year = Utc::now().year();
    let (Some(start), Some(end)) = (
        NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
        NaiveDate::from_ymd_opt(year, 12, 31).and_then(|d| d.and_hms_opt(23, 59, 59)),
    ) else {
        return Html(components::commits_chart("commits-ytd", &[], "0"));
    };
    let dates = or_empty(commit_dates(state.db.as_ref(), start, end).await, "yearly commits");
    let points = group_commit_dates(&dates, MONTHLY_BUCKET);
    let total = format_number(Decimal::from(dates.len()), 0, false);
    Html(components::commits_chart("commits-ytd", &points, &total))
}

async fn tracked_repos(db: &DatabaseConnection, owner_name: Option<&str>) -> AppResult<Vec<github_repos::Model>> {
    let mut select = github_repos::Entity::find();
    if let Some(owner) = owner_name {
        select = select.filter(github_repos::Column::OwnerName.eq(owner.to_lowercase()));
    }
    let mut repos: Vec<github_repos::Model> = select
        .all(db)
        .await?
        .into_iter()
        .filter(|repo| !github::is_ignored(repo.id))
        .collect();
    repos.sort_by_key(|repo| repo.name.to_lowercase());
    Ok(repos)
}

pub async fn owners(State(state): State<AppState>) -> Html<String> {
    let repos = or_empty(tracked_repos(state.db.as_ref(), None).await, "stored repos");
    let owners = owner_summaries(repos.iter().map(|repo| repo.owner_name.as_str()));
    Html(components::owners(&owners))
}

#[derive(Debug, Deserialize)]
pub struct ReposQuery {
    pub owner_name: Option<String>,
}

/// Rejects owners outside the tracked list.
pub fn check_owner(owner_name: Option<&str>) -> AppResult<()> {
    match owner_name {
        Some(owner) if !github::is_tracked_owner(owner) => Err(AppError::Unprocessable(format!(
            "Sorry, {} could not be found. Valid owner names are {}.",
            owner,
            github::USERNAMES.join(", ")
        ))),
        _ => Ok(()),
    }
}

pub async fn repos(
    State(state): State<AppState>,
    Query(query): Query<ReposQuery>,
) -> AppResult<Html<String>> {
    let owner_name = query.owner_name.as_deref().filter(|o| !o.is_empty());
    check_owner(owner_name)?;
    let repos = or_empty(tracked_repos(state.db.as_ref(), owner_name).await, "stored repos");

    // Per-repo release lookups only for a single owner's listing.
    let (org, releases) = match owner_name {
        Some(owner) => {
            let names: Vec<String> = repos.iter().map(|repo| repo.name.clone()).collect();
            let (org, releases) = tokio::join!(
                state.github.get_org(owner),
                state
                    .github
                    .get_latest_release_tags(owner, &names, state.config.max_workers),
            );
            if let Err(e) = &org {
                tracing::debug!(%owner, error = %e, "Organization profile unavailable");
            }
            (org.ok(), releases)
        }
        None => (None, HashMap::new()),
    };
    Ok(Html(components::repos(
        &github::USERNAMES,
        &repos,
        org.as_ref(),
        &releases,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_owner() {
        assert!(check_owner(None).is_ok());
        assert!(check_owner(Some(github::USERNAMES[0])).is_ok());
        let err = check_owner(Some("octocat")).unwrap_err();
        assert!(matches!(err, AppError::Unprocessable(msg) if msg.contains("octocat")));
    }

    #[test]
    fn test_now_has_no_subseconds() {
        assert_eq!(now().and_utc().timestamp_subsec_nanos(), 0);
    }
}
