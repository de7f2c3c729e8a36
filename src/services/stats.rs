//! Role-dependent dashboard figures

use std::sync::Arc;

use crate::{
    api::stats::{AdminStats, DashboardStats, DeanStats, HodStats, LabInchargeStats},
    error::AppResult,
    models::{enums::Role, user::UserClaims},
    repository::{stats::DeanCounts, Repository},
    services::inventory::InventorySource,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    inventory: Arc<dyn InventorySource>,
}

impl StatsService {
    pub fn new(repository: Repository, inventory: Arc<dyn InventorySource>) -> Self {
        Self { repository, inventory }
    }

    pub async fn for_principal(&self, claims: &UserClaims) -> AppResult<DashboardStats> {
        match claims.role {
            Role::Dean => {
                let counts = self.repository.stats_dean().await?;
                Ok(DashboardStats::Dean(dean_stats(self.inventory.as_ref(), counts).await))
            }
            Role::Hod => {
                let department_id = claims.require_department()?;
                let c = self.repository.stats_hod(department_id).await?;
                Ok(DashboardStats::Hod(HodStats {
                    total_systems: c.total_systems,
                    working_systems: c.working_systems,
                    under_maintenance: c.under_maintenance,
                    active_requests: c.active_requests,
                    pending_requests: c.pending_requests,
                    approved_requests: c.approved_requests,
                }))
            }
            Role::Admin => {
                let c = self.repository.stats_admin().await?;
                Ok(DashboardStats::Admin(AdminStats {
                    total_systems: c.total_systems,
                    total_servers: c.total_servers,
                    total_routers: c.total_routers,
                    pending_tickets: c.pending_tickets,
                    in_progress_tickets: c.in_progress_tickets,
                    completed_today: c.completed_today,
                }))
            }
            Role::LabIncharge => {
                let lab_id = claims.require_lab()?;
                let c = self.repository.stats_lab(lab_id, claims.user_id).await?;
                Ok(DashboardStats::LabIncharge(LabInchargeStats {
                    total_systems: c.total_systems,
                    working_systems: c.working_systems,
                    issues: c.issues,
                    my_tickets: c.my_tickets,
                    pending_tickets: c.pending_tickets,
                }))
            }
        }
    }
}

/// Dean figures; the inventory sheet wins over the asset table when it answers
async fn dean_stats(inventory: &dyn InventorySource, counts: DeanCounts) -> DeanStats {
    let (total_systems, last_sync) = match inventory.total_systems().await {
        Ok(Some(sheet)) => (sheet.total, Some(sheet.fetched_at)),
        Ok(None) => (counts.assets, None),
        Err(e) => {
            tracing::warn!("Inventory source failed, using asset count: {}", e);
            (counts.assets, None)
        }
    };

    DeanStats {
        total_systems,
        ready_for_use: counts.ready_for_use,
        service: counts.service,
        priority_tasks: counts.open_tickets + counts.pending_requests,
        departments: counts.departments,
        labs: counts.labs,
        pending_requests: counts.pending_requests,
        last_sync,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        error::AppError,
        services::inventory::{InventoryCount, MockInventorySource},
    };

    fn counts() -> DeanCounts {
        DeanCounts {
            assets: 42,
            ready_for_use: 30,
            service: 5,
            open_tickets: 3,
            pending_requests: 2,
            departments: 4,
            labs: 9,
        }
    }

    #[tokio::test]
    async fn sheet_count_takes_precedence() {
        let fetched_at = Utc::now();
        let mut inventory = MockInventorySource::new();
        inventory
            .expect_total_systems()
            .times(1)
            .returning(move || Ok(Some(InventoryCount { total: 120, fetched_at })));

        let stats = dean_stats(&inventory, counts()).await;
        assert_eq!(stats.total_systems, 120);
        assert_eq!(stats.last_sync, Some(fetched_at));
        assert_eq!(stats.priority_tasks, 5);
    }

    #[tokio::test]
    async fn falls_back_to_asset_count() {
        let mut inventory = MockInventorySource::new();
        inventory.expect_total_systems().returning(|| Ok(None));
        let stats = dean_stats(&inventory, counts()).await;
        assert_eq!(stats.total_systems, 42);
        assert_eq!(stats.last_sync, None);

        let mut failing = MockInventorySource::new();
        failing
            .expect_total_systems()
            .returning(|| Err(AppError::Internal("sheet unreachable".to_string())));
        let stats = dean_stats(&failing, counts()).await;
        assert_eq!(stats.total_systems, 42);
    }
}
