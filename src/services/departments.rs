//! Department service

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        activity::{Entity, NewActivity},
        department::{CreateDepartment, Department, DepartmentSummary, UpdateDepartment},
        user::UserClaims,
    },
    repository::Repository,
    services::activity::ActivityService,
};

#[derive(Clone)]
pub struct DepartmentsService {
    repository: Repository,
    activity: ActivityService,
}

impl DepartmentsService {
    pub fn new(repository: Repository, activity: ActivityService) -> Self {
        Self { repository, activity }
    }

    pub async fn list(&self) -> AppResult<Vec<DepartmentSummary>> {
        self.repository.departments_list().await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<DepartmentSummary> {
        self.repository.departments_get_summary(id).await
    }

    pub async fn create(&self, claims: &UserClaims, data: CreateDepartment) -> AppResult<Department> {
        let data = CreateDepartment {
            name: data.name.trim().to_string(),
            code: data.code.trim().to_uppercase(),
            ..data
        };
        let department = self
            .repository
            .departments_insert(&self.repository.pool, &data)
            .await?;

        self.activity
            .record(
                NewActivity::new(claims.user_id, "CREATE", Entity::Department, department.id)
                    .details(format!("{} ({})", department.name, department.code))
                    .department(Some(department.id)),
            )
            .await;
        Ok(department)
    }

    pub async fn update(&self, claims: &UserClaims, id: Uuid, mut data: UpdateDepartment) -> AppResult<Department> {
        if let Some(code) = data.code.as_mut() {
            *code = code.trim().to_uppercase();
        }
        let department = self.repository.departments_update(id, &data).await?;

        self.activity
            .record(
                NewActivity::new(claims.user_id, "UPDATE", Entity::Department, id).department(Some(id)),
            )
            .await;
        Ok(department)
    }

    /// Fails with 409 while labs, assets, tickets or requests still reference it
    pub async fn delete(&self, claims: &UserClaims, id: Uuid) -> AppResult<()> {
        let department = self.repository.departments_get_by_id(id).await?;
        self.repository.departments_delete(id).await?;

        self.activity
            .record(
                NewActivity::new(claims.user_id, "DELETE", Entity::Department, id)
                    .details(format!("{} ({})", department.name, department.code)),
            )
            .await;
        Ok(())
    }
}
