use parsec_server::directory::GroupDirectory;
use parsec_server::errors::directory_error::DirectoryError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Plain-text directory so registry tests skip password hashing
#[derive(Default)]
pub struct MemoryDirectory {
    groups: Mutex<HashMap<String, (i32, String, String)>>,
}

impl GroupDirectory for MemoryDirectory {
    fn create(
        &self,
        name: &str,
        password: &str,
        admin_password: &str,
    ) -> Result<i32, DirectoryError> {
        let mut groups = self.groups.lock().unwrap();
        if groups.contains_key(name) {
            return Err(DirectoryError::NameTaken);
        }

        let id = groups.len() as i32 + 1;
        groups.insert(
            name.to_string(),
            (id, password.to_string(), admin_password.to_string()),
        );
        Ok(id)
    }

    fn delete(&self, name: &str, admin_password: &str) -> Result<(), DirectoryError> {
        let mut groups = self.groups.lock().unwrap();
        match groups.get(name) {
            Some((_, _, admin)) if admin == admin_password => {
                groups.remove(name);
                Ok(())
            }
            _ => Err(DirectoryError::InvalidCredentials),
        }
    }

    fn authenticate(&self, name: &str, password: &str) -> Result<Option<i32>, DirectoryError> {
        let groups = self.groups.lock().unwrap();
        Ok(groups
            .get(name)
            .filter(|(_, group_password, _)| group_password == password)
            .map(|(id, _, _)| *id))
    }
}
