use super::UserRec;
use crate::store::UserStore;
use routecontract::{Context, Describe};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct UpdateUserReq {
    pub id: String,
    pub name: String,
}

pub fn update_user(store: &UserStore, _ctx: &Context, req: UpdateUserReq) -> anyhow::Result<UserRec> {
    let mut user = store.get_user(&req.id)?;
    user.name = req.name;
    store.update_user(user.clone())?;
    Ok(UserRec {
        login: user.login,
        name: user.name,
        email: user.email,
    })
}
