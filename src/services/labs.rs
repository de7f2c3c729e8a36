//! Lab service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        activity::{Entity, NewActivity},
        enums::Role,
        lab::{CreateLab, Lab, LabDetails, LabQuery, UpdateLab},
        user::UserClaims,
    },
    repository::Repository,
    services::activity::ActivityService,
};

#[derive(Clone)]
pub struct LabsService {
    repository: Repository,
    activity: ActivityService,
}

impl LabsService {
    pub fn new(repository: Repository, activity: ActivityService) -> Self {
        Self { repository, activity }
    }

    /// Labs ordered by department and name; HODs only see their department
    pub async fn list(&self, claims: &UserClaims, query: &LabQuery) -> AppResult<Vec<LabDetails>> {
        let department_id = match claims.role {
            Role::Hod => Some(claims.require_department()?),
            _ => query.department_id,
        };
        self.repository.labs_list(department_id).await
    }

    /// Single lab; HODs only see labs of their department, as in [`Self::list`]
    pub async fn get(&self, claims: &UserClaims, id: Uuid) -> AppResult<LabDetails> {
        let details = self.repository.labs_get_details(id).await?;
        if !lab_in_scope(claims, &details.lab) {
            return Err(AppError::NotFound(format!("Lab {} not found", id)));
        }
        Ok(details)
    }

    pub async fn create(&self, claims: &UserClaims, data: CreateLab) -> AppResult<Lab> {
        let lab = self.repository.labs_create(&data).await?;

        self.activity
            .record(
                NewActivity::new(claims.user_id, "CREATE", Entity::Lab, lab.id)
                    .details(format!("{} ({})", lab.name, lab.code))
                    .department(Some(lab.department_id))
                    .lab(Some(lab.id)),
            )
            .await;
        Ok(lab)
    }

    /// Partial update; an HOD may only edit labs of their own department and
    /// cannot move a lab elsewhere
    pub async fn update(&self, claims: &UserClaims, id: Uuid, data: UpdateLab) -> AppResult<Lab> {
        if claims.role == Role::Hod {
            let department_id = claims.require_department()?;
            let lab = self.repository.labs_get_by_id(id).await?;
            let moves_out = data.department_id.is_some_and(|d| d != department_id);
            if lab.department_id != department_id || moves_out {
                return Err(AppError::Authorization(
                    "Labs of other departments cannot be modified".to_string(),
                ));
            }
        }

        let lab = self.repository.labs_update(id, &data).await?;

        self.activity
            .record(
                NewActivity::new(claims.user_id, "UPDATE", Entity::Lab, lab.id)
                    .department(Some(lab.department_id))
                    .lab(Some(lab.id)),
            )
            .await;
        Ok(lab)
    }

    /// Assets, tickets and users of the lab keep existing without it
    pub async fn delete(&self, claims: &UserClaims, id: Uuid) -> AppResult<()> {
        let lab = self.repository.labs_get_by_id(id).await?;
        self.repository.labs_delete(id).await?;

        self.activity
            .record(
                NewActivity::new(claims.user_id, "DELETE", Entity::Lab, id)
                    .details(format!("{} ({})", lab.name, lab.code))
                    .department(Some(lab.department_id)),
            )
            .await;
        Ok(())
    }
}

fn lab_in_scope(claims: &UserClaims, lab: &Lab) -> bool {
    claims.role != Role::Hod || claims.department_id == Some(lab.department_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, department_id: Option<Uuid>) -> UserClaims {
        UserClaims {
            sub: "staff@example.edu".to_string(),
            user_id: Uuid::new_v4(),
            role,
            department_id,
            lab_id: None,
            exp: 0,
            iat: 0,
        }
    }

    fn lab(department_id: Uuid) -> Lab {
        let now = chrono::Utc::now();
        Lab {
            id: Uuid::new_v4(),
            name: "Networks Lab".to_string(),
            code: "CSE-L2".to_string(),
            department_id,
            incharge_id: None,
            capacity: 30,
            location: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn hod_reads_only_own_department_labs() {
        let dept = Uuid::new_v4();
        let hod = claims(Role::Hod, Some(dept));
        assert!(lab_in_scope(&hod, &lab(dept)));
        assert!(!lab_in_scope(&hod, &lab(Uuid::new_v4())));
        assert!(!lab_in_scope(&claims(Role::Hod, None), &lab(dept)));
    }

    #[test]
    fn other_roles_read_any_lab() {
        for role in [Role::Admin, Role::Dean, Role::LabIncharge] {
            assert!(lab_in_scope(&claims(role, None), &lab(Uuid::new_v4())));
        }
    }
}
