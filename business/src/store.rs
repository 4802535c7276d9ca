//! Root store composition.

use bidboard_states::{Error, StateCtx};

use crate::{
    AuctionApi, BidModule, BusinessConfig, HttpAuctionApi, HttpLoginApi, LoginApi, UsersModule,
};

pub type HttpBidModule = BidModule<HttpAuctionApi>;
pub type HttpUsersModule = UsersModule<HttpLoginApi>;

/// Composes the bid and users modules into one store.
pub fn build_store<A, L>(auction: A, login: L) -> Result<StateCtx, Error>
where
    A: AuctionApi,
    L: LoginApi,
{
    let mut ctx = StateCtx::new();
    ctx.register(BidModule::new(auction))?;
    ctx.register(UsersModule::new(login))?;
    Ok(ctx)
}

/// A store whose modules talk to the API described by `config`.
pub fn build_http_store(config: &BusinessConfig) -> Result<StateCtx, Error> {
    let client = reqwest::Client::new();
    build_store(
        HttpAuctionApi::with_client(client.clone(), config.clone()),
        HttpLoginApi::with_client(client, config.clone()),
    )
}
