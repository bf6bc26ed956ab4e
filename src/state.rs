use std::sync::Arc;
use std::time::Duration;

use crate::auth::SessionResolver;
use crate::notify::Notifier;
use crate::repository::{AuthRepository, ProjectRepository, TaskRepository, UserRepository};
use crate::services::{AccountService, ProjectService, ServiceSettings, TaskService, UserService};

/// The persistence ports the application is wired against.
#[derive(Clone)]
pub struct Ports {
    pub users: Arc<dyn UserRepository>,
    pub auth: Arc<dyn AuthRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub tasks: Arc<dyn TaskRepository>,
}

impl Ports {
    /// Serves every port from one store.
    pub fn shared<R>(store: Arc<R>) -> Self
    where
        R: UserRepository + AuthRepository + ProjectRepository + TaskRepository + 'static,
    {
        Self {
            users: store.clone(),
            auth: store.clone(),
            projects: store.clone(),
            tasks: store,
        }
    }

    /// Replaces the user port, e.g. with a cached decorator.
    pub fn with_users(mut self, users: Arc<dyn UserRepository>) -> Self {
        self.users = users;
        self
    }
}

/// Shared application state handed to every handler through `web::Data`.
pub struct AppState {
    pub sessions: SessionResolver,
    pub accounts: AccountService,
    pub users: UserService,
    pub projects: ProjectService,
    pub tasks: TaskService,
    pub session_ttl: Duration,
}

impl AppState {
    pub fn new(ports: Ports, notifier: Arc<dyn Notifier>, settings: ServiceSettings) -> Self {
        let timeout = settings.request_timeout;
        Self {
            sessions: SessionResolver::new(
                ports.auth.clone(),
                ports.users.clone(),
                settings.session_ttl,
                timeout,
            ),
            users: UserService::new(ports.users.clone(), timeout),
            projects: ProjectService::new(ports.projects.clone(), ports.users.clone(), timeout),
            tasks: TaskService::new(ports.tasks, ports.projects, timeout),
            session_ttl: settings.session_ttl,
            accounts: AccountService::new(ports.users, ports.auth, notifier, settings),
        }
    }
}
