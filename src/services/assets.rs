//! Asset inventory service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        activity::{Entity, NewActivity},
        asset::{Asset, AssetDetails, AssetPage, AssetQuery, CreateAsset, UpdateAsset},
        enums::Role,
        user::UserClaims,
    },
    repository::Repository,
    services::activity::ActivityService,
};

/// Tickets shown on an asset page
const RECENT_TICKETS: i64 = 5;

#[derive(Clone)]
pub struct AssetsService {
    repository: Repository,
    activity: ActivityService,
}

impl AssetsService {
    pub fn new(repository: Repository, activity: ActivityService) -> Self {
        Self { repository, activity }
    }

    /// Search assets; HODs are held to their department and lab incharges to their lab
    pub async fn search(&self, claims: &UserClaims, query: AssetQuery) -> AppResult<AssetPage> {
        let query = scoped_query(claims, query)?;
        let (items, total) = self.repository.assets_search(&query).await?;
        Ok(AssetPage::new(items, total, query.page(), query.per_page()))
    }

    /// Single asset, held to the same scope as [`Self::search`]
    pub async fn get(&self, claims: &UserClaims, id: Uuid) -> AppResult<AssetDetails> {
        let asset = self.repository.assets_get_listing(id).await?;
        if !asset_in_scope(claims, &asset.asset) {
            return Err(AppError::NotFound(format!("Asset {} not found", id)));
        }
        let recent_tickets = self.repository.assets_recent_tickets(id, RECENT_TICKETS).await?;
        Ok(AssetDetails { asset, recent_tickets })
    }

    pub async fn create(&self, claims: &UserClaims, mut data: CreateAsset) -> AppResult<Asset> {
        data.asset_number = data.asset_number.trim().to_string();
        if self.repository.assets_number_exists(&data.asset_number, None).await? {
            return Err(AppError::Conflict(format!(
                "Asset number {} already exists",
                data.asset_number
            )));
        }

        let asset = self.repository.assets_create(&data).await?;

        self.activity
            .record(
                NewActivity::new(claims.user_id, "CREATE", Entity::Asset, asset.id)
                    .details(format!("{} ({})", asset.name, asset.asset_number))
                    .department(Some(asset.department_id))
                    .lab(asset.lab_id),
            )
            .await;
        Ok(asset)
    }

    pub async fn update(&self, claims: &UserClaims, id: Uuid, mut data: UpdateAsset) -> AppResult<Asset> {
        if let Some(number) = data.asset_number.as_mut() {
            *number = number.trim().to_string();
            if self.repository.assets_number_exists(number, Some(id)).await? {
                return Err(AppError::Conflict(format!("Asset number {} already exists", number)));
            }
        }

        let asset = self.repository.assets_update(id, &data).await?;

        self.activity
            .record(
                NewActivity::new(claims.user_id, "UPDATE", Entity::Asset, asset.id)
                    .details(format!("{} ({})", asset.name, asset.asset_number))
                    .department(Some(asset.department_id))
                    .lab(asset.lab_id),
            )
            .await;
        Ok(asset)
    }

    pub async fn delete(&self, claims: &UserClaims, id: Uuid) -> AppResult<()> {
        let asset = self.repository.assets_get_by_id(id).await?;
        self.repository.assets_delete(id).await?;

        self.activity
            .record(
                NewActivity::new(claims.user_id, "DELETE", Entity::Asset, id)
                    .details(format!("{} ({})", asset.name, asset.asset_number))
                    .department(Some(asset.department_id))
                    .lab(asset.lab_id),
            )
            .await;
        Ok(())
    }
}

/// Force the role's scope onto the filters the client sent
fn scoped_query(claims: &UserClaims, mut query: AssetQuery) -> AppResult<AssetQuery> {
    match claims.role {
        Role::Hod => query.department_id = Some(claims.require_department()?),
        Role::LabIncharge => query.lab_id = Some(claims.require_lab()?),
        Role::Admin | Role::Dean => {}
    }
    Ok(query)
}

fn asset_in_scope(claims: &UserClaims, asset: &Asset) -> bool {
    match claims.role {
        Role::Hod => claims.department_id == Some(asset.department_id),
        Role::LabIncharge => claims.lab_id.is_some() && claims.lab_id == asset.lab_id,
        Role::Admin | Role::Dean => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, department_id: Option<Uuid>, lab_id: Option<Uuid>) -> UserClaims {
        UserClaims {
            sub: "staff@example.edu".to_string(),
            user_id: Uuid::new_v4(),
            role,
            department_id,
            lab_id,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn hod_filter_is_forced_to_own_department() {
        let own = Uuid::new_v4();
        let query = AssetQuery { department_id: Some(Uuid::new_v4()), ..Default::default() };
        let scoped = scoped_query(&claims(Role::Hod, Some(own), None), query).unwrap();
        assert_eq!(scoped.department_id, Some(own));
    }

    #[test]
    fn lab_incharge_without_lab_is_rejected() {
        let err = scoped_query(&claims(Role::LabIncharge, None, None), AssetQuery::default()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    fn asset(department_id: Uuid, lab_id: Option<Uuid>) -> Asset {
        let now = chrono::Utc::now();
        Asset {
            id: Uuid::new_v4(),
            name: "Workstation".to_string(),
            asset_number: "CSE-DT-0001".to_string(),
            asset_type: crate::models::enums::AssetType::Desktop,
            brand: None,
            model: None,
            serial_number: None,
            mac_address: None,
            status: crate::models::enums::AssetStatus::Active,
            department_id,
            lab_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn single_asset_reads_follow_list_scope() {
        let (dept, lab) = (Uuid::new_v4(), Uuid::new_v4());
        let own = asset(dept, Some(lab));
        let elsewhere = asset(Uuid::new_v4(), Some(Uuid::new_v4()));
        let unplaced = asset(dept, None);

        let hod = claims(Role::Hod, Some(dept), None);
        assert!(asset_in_scope(&hod, &own));
        assert!(asset_in_scope(&hod, &unplaced));
        assert!(!asset_in_scope(&hod, &elsewhere));

        let incharge = claims(Role::LabIncharge, Some(dept), Some(lab));
        assert!(asset_in_scope(&incharge, &own));
        assert!(!asset_in_scope(&incharge, &unplaced));
        assert!(!asset_in_scope(&incharge, &elsewhere));

        assert!(!asset_in_scope(&claims(Role::LabIncharge, None, None), &unplaced));
        assert!(asset_in_scope(&claims(Role::Admin, None, None), &elsewhere));
    }

    #[test]
    fn dean_filters_pass_through() {
        let lab = Uuid::new_v4();
        let query = AssetQuery { lab_id: Some(lab), ..Default::default() };
        let scoped = scoped_query(&claims(Role::Dean, None, None), query).unwrap();
        assert_eq!(scoped.lab_id, Some(lab));
        assert_eq!(scoped.department_id, None);
    }
}
