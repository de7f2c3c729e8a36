//! Business logic services

pub mod activity;
pub mod assets;
pub mod auth;
pub mod departments;
pub mod inventory;
pub mod labs;
pub mod requests;
pub mod stats;
pub mod tickets;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

use auth::{AccountPrincipals, PrincipalSource};
use inventory::{CsvInventorySource, InventorySource, NoInventorySource};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub activity: activity::ActivityService,
    pub auth: auth::AuthService,
    /// Resolves bearer tokens to the caller's current role and scope
    pub principals: Arc<dyn PrincipalSource>,
    pub users: users::UsersService,
    pub departments: departments::DepartmentsService,
    pub labs: labs::LabsService,
    pub assets: assets::AssetsService,
    pub tickets: tickets::TicketsService,
    pub requests: requests::RequestsService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let inventory: Arc<dyn InventorySource> = match &config.inventory.csv_url {
            Some(url) if !url.trim().is_empty() => {
                tracing::info!("Inventory sheet configured at {}", url);
                Arc::new(CsvInventorySource::new(url.trim().to_string(), &config.inventory)?)
            }
            _ => Arc::new(NoInventorySource),
        };

        let activity = activity::ActivityService::new(repository.clone());

        Ok(Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone(), activity.clone()),
            principals: Arc::new(AccountPrincipals::new(repository.clone())),
            users: users::UsersService::new(repository.clone(), activity.clone()),
            departments: departments::DepartmentsService::new(repository.clone(), activity.clone()),
            labs: labs::LabsService::new(repository.clone(), activity.clone()),
            assets: assets::AssetsService::new(repository.clone(), activity.clone()),
            tickets: tickets::TicketsService::new(repository.clone(), activity.clone()),
            requests: requests::RequestsService::new(repository.clone(), activity.clone()),
            stats: stats::StatsService::new(repository.clone(), inventory),
            activity,
            repository,
        })
    }

    /// Replace how bearer tokens are resolved to principals
    pub fn with_principals(mut self, principals: Arc<dyn PrincipalSource>) -> Self {
        self.principals = principals;
        self
    }
}
