use crate::store::UserStore;
use routecontract::{Context, Describe};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct ListUsersReq {
    pub offset: String,
    pub limit: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Describe)]
pub struct OneListedUser {
    pub login: String,
    pub name: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct ListUserRes {
    pub users: Vec<OneListedUser>,
}

/// Missing or unparsable `offset`/`limit` count as 0; a zero limit lists everything.
pub fn list_users(store: &UserStore, _ctx: &Context, req: ListUsersReq) -> anyhow::Result<ListUserRes> {
    let offset = req.offset.parse::<usize>().unwrap_or(0);
    let limit = match req.limit.parse::<usize>().unwrap_or(0) {
        0 => usize::MAX,
        n => n,
    };
    let users = store
        .list_users()?
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|u| OneListedUser {
            login: u.login,
            name: u.name,
        })
        .collect();
    Ok(ListUserRes { users })
}
