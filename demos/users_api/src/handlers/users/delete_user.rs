use crate::store::UserStore;
use routecontract::{Context, Describe, ErrorResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct DeleteUserReq {
    pub id: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct DeleteUserRes {}

pub fn delete_user(store: &UserStore, _ctx: &Context, req: DeleteUserReq) -> anyhow::Result<DeleteUserRes> {
    store
        .delete_user(&req.id)
        .map_err(|e| ErrorResult::new(400, e.to_string()))?;
    Ok(DeleteUserRes {})
}
