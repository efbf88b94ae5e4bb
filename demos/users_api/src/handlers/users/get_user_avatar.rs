use crate::store::UserStore;
use routecontract::server::{RawRequest, ResponseWriter};
use routecontract::{Context, Describe};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct GetUserAvatarReq {
    pub id: String,
}

/// Writes the raw avatar bytes.
pub fn get_user_avatar(
    store: &UserStore,
    _ctx: &Context,
    req: GetUserAvatarReq,
    _raw: &dyn RawRequest,
    out: &mut dyn ResponseWriter,
) -> anyhow::Result<()> {
    let avatar = store.get_avatar(&req.id)?;
    out.set_status(200);
    out.set_header("content-type", "application/octet-stream".to_string());
    out.write_body(&avatar.data);
    Ok(())
}
