//! Builders wiring repository adapters into the HTTP state.
//!
//! A configured database URL selects the Diesel adapters, after migrations
//! have been applied. Without one every port is served from a single
//! in-memory store.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use healthcare_backend::domain::ports::{
    DoctorRepository, MappingRepository, PatientRepository, UserRepository,
};
use healthcare_backend::domain::{AccountService, DoctorService, MappingService, PatientService};
use healthcare_backend::inbound::http::state::HttpState;
use healthcare_backend::outbound::memory::InMemoryStore;
use healthcare_backend::outbound::persistence::{
    DbPool, DieselDoctorRepository, DieselMappingRepository, DieselPatientRepository,
    DieselUserRepository, MigrationError, PoolConfig, PoolError, run_migrations,
};
use healthcare_backend::outbound::security::{Argon2PasswordHasher, JwtTokenIssuer};

use super::ServerConfig;

/// Failures raised while assembling the HTTP state.
#[derive(Debug, thiserror::Error)]
pub enum StateBuildError {
    #[error(transparent)]
    Migrations(#[from] MigrationError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("password hasher could not be configured: {0}")]
    Hasher(String),
}

struct Repositories<U, P, D, M> {
    users: Arc<U>,
    patients: Arc<P>,
    doctors: Arc<D>,
    mappings: Arc<M>,
}

fn assemble<U, P, D, M>(
    config: &ServerConfig,
    repos: Repositories<U, P, D, M>,
) -> Result<HttpState, StateBuildError>
where
    U: UserRepository + 'static,
    P: PatientRepository + 'static,
    D: DoctorRepository + 'static,
    M: MappingRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher =
        Argon2PasswordHasher::new().map_err(|err| StateBuildError::Hasher(err.to_string()))?;
    let tokens = JwtTokenIssuer::new(config.token_key.secret(), clock.clone())
        .with_lifetimes(config.access_ttl, config.refresh_ttl);
    let accounts = AccountService::new(repos.users, Arc::new(hasher), Arc::new(tokens))
        .with_policy(config.password_policy.clone());

    Ok(HttpState::from_services(
        Arc::new(accounts),
        Arc::new(PatientService::new(repos.patients.clone(), clock.clone())),
        Arc::new(DoctorService::new(repos.doctors.clone(), clock.clone())),
        Arc::new(MappingService::new(
            repos.mappings,
            repos.patients,
            repos.doctors,
            clock,
        )),
    ))
}

async fn connect(database: &PoolConfig) -> Result<DbPool, StateBuildError> {
    let applied = run_migrations(database.database_url()).await?;
    info!(applied, "schema is up to date");
    Ok(DbPool::new(database.clone()).await?)
}

/// Build the HTTP state for `config`.
///
/// # Errors
///
/// Returns [`StateBuildError`] when migrations fail, the pool cannot be
/// built or the password hasher rejects its parameters.
pub async fn build_http_state(config: &ServerConfig) -> Result<HttpState, StateBuildError> {
    match &config.database {
        Some(database) => {
            let pool = connect(database).await?;
            assemble(
                config,
                Repositories {
                    users: Arc::new(DieselUserRepository::new(pool.clone())),
                    patients: Arc::new(DieselPatientRepository::new(pool.clone())),
                    doctors: Arc::new(DieselDoctorRepository::new(pool.clone())),
                    mappings: Arc::new(DieselMappingRepository::new(pool)),
                },
            )
        }
        None => {
            warn!("no database configured; records will not survive a restart");
            let store = Arc::new(InMemoryStore::new());
            assemble(
                config,
                Repositories {
                    users: store.clone(),
                    patients: store.clone(),
                    doctors: store.clone(),
                    mappings: store,
                },
            )
        }
    }
}
