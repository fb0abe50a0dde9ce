//! CSV adapter for `data/users.csv`. Header: `id,name`.

use std::path::{Path, PathBuf};

use fleet_core::error::FleetError;
use fleet_core::user::User;
use parking_lot::Mutex;

use crate::csv_util;

/// CSV-backed store for registered users.
pub struct UserStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl UserStore {
    pub fn open(data_dir: &Path) -> Self {
        Self { path: data_dir.join("users.csv"), write_lock: Mutex::new(()) }
    }

    pub fn load_all(&self) -> Result<Vec<User>, FleetError> {
        csv_util::read_all::<User>(&self.path)
    }

    pub fn save_all(&self, users: &[User]) -> Result<(), FleetError> {
        csv_util::write_all(&self.path, users)
    }

    pub fn save_one(&self, user: &User) -> Result<(), FleetError> {
        let _guard = self.write_lock.lock();
        let mut all = self.load_all()?;
        match all.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => *slot = user.clone(),
            None => all.push(user.clone()),
        }
        self.save_all(&all)
    }

    pub fn find(&self, id: &str) -> Result<Option<User>, FleetError> {
        Ok(self.load_all()?.into_iter().find(|u| u.id == id))
    }
}
