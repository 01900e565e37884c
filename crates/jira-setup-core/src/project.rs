use crate::board::ProjectSpec;
use crate::client::{NewProject, ProjectRef, TrackerApi};
use crate::error::{Result, SetupError};
use crate::types::Disposition;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnsuredProject {
    pub project: ProjectRef,
    pub disposition: Disposition,
}

/// Look a project up by key. `Ok(None)` only when Jira reports it missing;
/// any other failure is returned as-is.
pub fn lookup_project(api: &dyn TrackerApi, key: &str) -> Result<Option<ProjectRef>> {
    match api.get_project(key) {
        Ok(project) => Ok(Some(project)),
        Err(SetupError::ProjectNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Create the project if its key is unused.
///
/// An existing project is returned untouched even when its name or
/// description differ from `spec`. Creation needs a lead, so the credential
/// owner's account is looked up first.
pub fn ensure_project(api: &dyn TrackerApi, spec: &ProjectSpec) -> Result<EnsuredProject> {
    if let Some(project) = lookup_project(api, &spec.key)? {
        info!(key = %project.key, id = %project.id, "project already exists");
        return Ok(EnsuredProject {
            project,
            disposition: Disposition::Existing,
        });
    }

    let lead_account_id = api.current_account_id()?;
    let project = api.create_project(&NewProject {
        key: spec.key.clone(),
        name: spec.name.clone(),
        description: spec.description.clone(),
        lead_account_id,
    })?;
    info!(key = %project.key, id = %project.id, "created project");
    Ok(EnsuredProject {
        project,
        disposition: Disposition::Created,
    })
}
