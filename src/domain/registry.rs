use chrono::{DateTime, Utc};
use thiserror::Error;

use super::entities::{Client, Project};

/// Validation failures of registry operations. A failed operation leaves the collection untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Name can't be empty")]
    EmptyName,
    #[error("'{name}' already exists")]
    DuplicateName { name: String },
}

/// Checks that `name` isn't blank and doesn't collide with any of `existing` ignoring case.
/// Returns the trimmed name.
fn validate_name<'a>(
    name: &str,
    mut existing: impl Iterator<Item = &'a str>,
) -> Result<String, RegistryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RegistryError::EmptyName);
    }
    let lowered = name.to_lowercase();
    if existing.any(|v| v.to_lowercase() == lowered) {
        return Err(RegistryError::DuplicateName {
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

pub fn add_project(
    projects: &mut Vec<Project>,
    name: &str,
    client: &str,
    now: DateTime<Utc>,
) -> Result<(), RegistryError> {
    let name = validate_name(name, projects.iter().map(|v| v.name.as_str()))?;
    projects.insert(
        0,
        Project {
            name,
            client: client.trim().to_string(),
            created_at: now,
        },
    );
    Ok(())
}

/// Removes projects with exactly this name. Unlike [add_project] the comparison is case
/// sensitive. Returns how many projects were removed.
pub fn remove_project(projects: &mut Vec<Project>, name: &str) -> usize {
    let before = projects.len();
    projects.retain(|v| v.name != name);
    before - projects.len()
}

pub fn add_client(
    clients: &mut Vec<Client>,
    name: &str,
    now: DateTime<Utc>,
) -> Result<(), RegistryError> {
    let name = validate_name(name, clients.iter().map(|v| v.name.as_str()))?;
    clients.insert(
        0,
        Client {
            name,
            created_at: now,
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{add_client, add_project, remove_project, RegistryError};

    #[test]
    fn test_duplicate_project_ignores_case() {
        let mut projects = vec![];
        add_project(&mut projects, "Foo", "", Utc::now()).unwrap();
        let result = add_project(&mut projects, "foo", "", Utc::now());
        assert_eq!(
            result,
            Err(RegistryError::DuplicateName { name: "foo".into() })
        );
        assert_eq!(projects.len(), 1);
    }

    #[test]
    fn test_empty_project_name() {
        let mut projects = vec![];
        assert_eq!(
            add_project(&mut projects, "", "", Utc::now()),
            Err(RegistryError::EmptyName)
        );
        assert_eq!(
            add_project(&mut projects, "   ", "Acme", Utc::now()),
            Err(RegistryError::EmptyName)
        );
        assert!(projects.is_empty());
    }

    #[test]
    fn test_projects_inserted_at_front() {
        let mut projects = vec![];
        add_project(&mut projects, "First", "", Utc::now()).unwrap();
        add_project(&mut projects, " Second ", " Acme ", Utc::now()).unwrap();
        assert_eq!(projects[0].name, "Second");
        assert_eq!(projects[0].client, "Acme");
        assert_eq!(projects[1].name, "First");
    }

    #[test]
    fn test_remove_missing_project() {
        let mut projects = vec![];
        add_project(&mut projects, "Bar", "", Utc::now()).unwrap();
        let before = projects.clone();
        assert_eq!(remove_project(&mut projects, "Foo"), 0);
        assert_eq!(projects, before);
    }

    #[test]
    fn test_remove_project_is_case_sensitive() {
        let mut projects = vec![];
        add_project(&mut projects, "Foo", "", Utc::now()).unwrap();
        assert_eq!(remove_project(&mut projects, "foo"), 0);
        assert_eq!(projects.len(), 1);
        assert_eq!(remove_project(&mut projects, "Foo"), 1);
        assert!(projects.is_empty());
    }

    #[test]
    fn test_client_validation() {
        let mut clients = vec![];
        add_client(&mut clients, "Acme", Utc::now()).unwrap();
        add_client(&mut clients, "Beta", Utc::now()).unwrap();
        assert_eq!(
            add_client(&mut clients, "ACME", Utc::now()),
            Err(RegistryError::DuplicateName {
                name: "ACME".into()
            })
        );
        assert_eq!(
            add_client(&mut clients, " ", Utc::now()),
            Err(RegistryError::EmptyName)
        );
        assert_eq!(clients[0].name, "Beta");
        assert_eq!(clients.len(), 2);
    }
}
