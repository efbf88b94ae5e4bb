mod create_user;
mod delete_user;
mod get_user;
mod get_user_avatar;
mod list_users;
mod update_user;
mod update_user_avatar;

pub use create_user::{create_user, CreateUserReq, CreateUserRes};
pub use delete_user::{delete_user, DeleteUserReq, DeleteUserRes};
pub use get_user::{get_user, GetUserReq, UserRec};
pub use get_user_avatar::{get_user_avatar, GetUserAvatarReq};
pub use list_users::{list_users, ListUserRes, ListUsersReq, OneListedUser};
pub use update_user::{update_user, UpdateUserReq};
pub use update_user_avatar::{update_user_avatar, UpdateUserAvatarReq, UpdateUserAvatarRes};
