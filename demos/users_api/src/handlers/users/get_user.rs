use crate::handlers::parse_flag;
use crate::store::UserStore;
use anyhow::anyhow;
use routecontract::{Context, Describe};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct GetUserReq {
    pub id: String,
    #[param(query)]
    pub public: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, Describe)]
pub struct UserRec {
    pub login: String,
    pub name: String,
    pub email: String,
}

/// Email is hidden unless `public=false` is passed.
pub fn get_user(store: &UserStore, _ctx: &Context, req: GetUserReq) -> anyhow::Result<UserRec> {
    let user = store.get_user(&req.id)?;
    let public =
        parse_flag(&req.public).ok_or_else(|| anyhow!("invalid value for parameter public"))?;
    Ok(UserRec {
        login: user.login,
        name: user.name,
        email: if public { String::new() } else { user.email },
    })
}
