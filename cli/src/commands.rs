use anyhow::{Context as _, Result};
use bidboard_business::{Bid, FetchUsers, HttpBidModule, HttpUsersModule, SubmitBid, User};
use bidboard_states::StateCtx;
use serde_json::Value;
use tracing::instrument;

async fn fetch_users(ctx: &mut StateCtx) -> Result<()> {
    ctx.dispatch::<HttpUsersModule, _>(FetchUsers)
        .await
        .context("Failed to fetch registered users")
}

/// Fetches the directory and returns its ids in directory order.
#[instrument(skip_all, name = "users")]
pub async fn list_users(ctx: &mut StateCtx) -> Result<Vec<String>> {
    fetch_users(ctx).await?;

    Ok(ctx
        .getters::<HttpUsersModule>()
        .user_names()
        .map(str::to_owned)
        .collect())
}

/// Fetches the directory and looks `name` up.
///
/// An unknown name is not an error: the result has every field empty.
#[instrument(skip_all, name = "user", fields(name = %name))]
pub async fn lookup_user(ctx: &mut StateCtx, name: &str) -> Result<User> {
    fetch_users(ctx).await?;

    Ok(ctx.getters::<HttpUsersModule>().user_by_name(name).clone())
}

/// Submits the bid in `json` and returns how many bids the log holds after it.
#[instrument(skip_all, name = "bid")]
pub async fn submit_bid(ctx: &mut StateCtx, json: &str) -> Result<usize> {
    let payload: Value = serde_json::from_str(json).context("Bid must be valid JSON")?;

    ctx.dispatch::<HttpBidModule, _>(SubmitBid::new(Bid::from(payload)))
        .await
        .context("Bid was not accepted")?;

    Ok(ctx.getters::<HttpBidModule>().len())
}
