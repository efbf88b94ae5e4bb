use crate::models::{Avatar, User};
use crate::store::UserStore;
use anyhow::Context as _;
use routecontract::server::RawRequest;
use routecontract::{Context, Describe, FilePart};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct CreateUserReq {
    pub login: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<FilePart>,
    pub docs: Vec<FilePart>,
}

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct CreateUserRes {
    pub id: String,
    pub docs_count: usize,
    pub additional_found: bool,
}

pub fn create_user(
    store: &UserStore,
    _ctx: &Context,
    req: CreateUserReq,
    raw: &dyn RawRequest,
) -> anyhow::Result<CreateUserRes> {
    let id = store.create_user(User {
        login: req.login,
        email: req.email,
        name: req.name,
        password: req.password,
        ..User::default()
    })?;
    if let Some(avatar) = req.avatar {
        store
            .save_avatar(&id, Avatar { data: avatar.data })
            .context("cannot save uploaded avatar")?;
    }
    // declared on the route only, so it never reaches the record
    let additional_found = raw
        .multipart_form()
        .map(|form| form.file("custom_file").is_some())
        .unwrap_or(false);
    Ok(CreateUserRes {
        id,
        docs_count: req.docs.len(),
        additional_found,
    })
}
