//! Application state shared across handlers

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::{
    authenticator::{Authenticator, LocalAuthenticator},
    jwt::{JwtConfig, JwtService},
    middleware::{Guard, Requirement},
    repositories::{
        AttendanceRepository, EmployeeRepository, LeaveRepository, SettingsRepository,
        UserRepository,
    },
    session::SessionManager,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub users: UserRepository,
    pub employees: EmployeeRepository,
    pub attendance: AttendanceRepository,
    pub leave: LeaveRepository,
    pub settings: SettingsRepository,
    pub authenticator: Arc<dyn Authenticator>,
    pub sessions: SessionManager,
}

impl AppState {
    /// Wire repositories, the local authenticator and the session manager over `pool`
    pub fn new(pool: SqlitePool, jwt_config: &JwtConfig) -> Self {
        let users = UserRepository::new(pool.clone());
        let store = Arc::new(users.clone());
        let authenticator: Arc<dyn Authenticator> = Arc::new(LocalAuthenticator::new(
            store.clone(),
            JwtService::new(jwt_config),
        ));
        let sessions = SessionManager::new(authenticator.clone(), store);

        Self {
            users,
            employees: EmployeeRepository::new(pool.clone()),
            attendance: AttendanceRepository::new(pool.clone()),
            leave: LeaveRepository::new(pool.clone()),
            settings: SettingsRepository::new(pool.clone()),
            authenticator,
            sessions,
            pool,
        }
    }

    /// Guard state for a route group with the given requirement
    pub fn guard(&self, requirement: Requirement) -> Guard {
        Guard::new(self.authenticator.clone(), requirement)
    }
}
