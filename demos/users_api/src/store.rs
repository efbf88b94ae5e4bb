use crate::models::{Avatar, User};
use anyhow::{anyhow, bail};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    login_to_id: HashMap<String, String>,
    avatars: HashMap<String, Avatar>,
}

/// In-memory user store shared by every handler.
#[derive(Default)]
pub struct UserStore {
    tables: Mutex<Tables>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> anyhow::Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("user store lock poisoned"))
    }

    /// Insert `user` under a fresh id and return that id.
    pub fn create_user(&self, mut user: User) -> anyhow::Result<String> {
        let mut t = self.tables()?;
        if t.login_to_id.contains_key(&user.login) {
            bail!("login duplicated");
        }
        let id = uuid::Uuid::new_v4().to_string();
        user.id = id.clone();
        t.login_to_id.insert(user.login.clone(), id.clone());
        t.users.insert(id.clone(), user);
        Ok(id)
    }

    pub fn get_user(&self, id: &str) -> anyhow::Result<User> {
        self.tables()?
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("user not found"))
    }

    pub fn update_user(&self, user: User) -> anyhow::Result<()> {
        let mut t = self.tables()?;
        match t.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user;
                Ok(())
            }
            None => bail!("user not found"),
        }
    }

    /// Users ordered by login.
    pub fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let mut users: Vec<User> = self.tables()?.users.values().cloned().collect();
        users.sort_by(|a, b| a.login.cmp(&b.login));
        Ok(users)
    }

    pub fn delete_user(&self, id: &str) -> anyhow::Result<()> {
        let mut t = self.tables()?;
        let user = t.users.remove(id).ok_or_else(|| anyhow!("user not found"))?;
        t.login_to_id.remove(&user.login);
        t.avatars.remove(id);
        Ok(())
    }

    pub fn save_avatar(&self, id: &str, avatar: Avatar) -> anyhow::Result<()> {
        self.tables()?.avatars.insert(id.to_string(), avatar);
        Ok(())
    }

    pub fn get_avatar(&self, id: &str) -> anyhow::Result<Avatar> {
        self.tables()?
            .avatars
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("avatar for user not defined"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_login_rejected() {
        let store = UserStore::new();
        let user = User {
            login: "ann".into(),
            ..User::default()
        };
        store.create_user(user.clone()).unwrap();
        let err = store.create_user(user).unwrap_err();
        assert_eq!(err.to_string(), "login duplicated");
    }

    #[test]
    fn test_delete_frees_login() {
        let store = UserStore::new();
        let user = User {
            login: "bob".into(),
            ..User::default()
        };
        let id = store.create_user(user.clone()).unwrap();
        store.delete_user(&id).unwrap();
        assert!(store.get_user(&id).is_err());
        assert!(store.create_user(user).is_ok());
    }
}
