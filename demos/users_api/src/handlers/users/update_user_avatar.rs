use crate::handlers::parse_flag;
use crate::models::Avatar;
use crate::store::UserStore;
use anyhow::{anyhow, Context as _};
use routecontract::server::RawRequest;
use routecontract::{Context, Describe, FilePart};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct UpdateUserAvatarReq {
    pub id: String,
    #[param(query)]
    pub force: String,
    pub avatar: Option<FilePart>,
}

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct UpdateUserAvatarRes {
    pub forced: bool,
}

pub fn update_user_avatar(
    store: &UserStore,
    _ctx: &Context,
    req: UpdateUserAvatarReq,
    _raw: &dyn RawRequest,
) -> anyhow::Result<UpdateUserAvatarRes> {
    let forced =
        parse_flag(&req.force).ok_or_else(|| anyhow!("invalid value for parameter force"))?;
    let avatar = req.avatar.ok_or_else(|| anyhow!("cannot open avatar file: no file uploaded"))?;
    store
        .save_avatar(&req.id, Avatar { data: avatar.data })
        .context("cannot save uploaded avatar")?;
    Ok(UpdateUserAvatarRes { forced })
}
