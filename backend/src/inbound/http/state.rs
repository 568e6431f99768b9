//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    DoctorCommand, DoctorQuery, LoginService, MappingCommand, MappingQuery, PatientCommand,
    PatientQuery, RegistrationService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<dyn RegistrationService>,
    pub login: Arc<dyn LoginService>,
    pub patients: Arc<dyn PatientQuery>,
    pub patient_commands: Arc<dyn PatientCommand>,
    pub doctors: Arc<dyn DoctorQuery>,
    pub doctor_commands: Arc<dyn DoctorCommand>,
    pub mappings: Arc<dyn MappingQuery>,
    pub mapping_commands: Arc<dyn MappingCommand>,
}

impl HttpState {
    /// Build state from services that each implement both halves of their
    /// resource's driving ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use argon2::Params;
    /// use healthcare_backend::domain::{
    ///     AccountService, DoctorService, MappingService, PatientService,
    /// };
    /// use healthcare_backend::inbound::http::state::HttpState;
    /// use healthcare_backend::outbound::memory::InMemoryStore;
    /// use healthcare_backend::outbound::security::{Argon2PasswordHasher, JwtTokenIssuer};
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let clock = Arc::new(DefaultClock);
    /// let hasher = Argon2PasswordHasher::with_params(Params::default()).unwrap();
    /// let tokens = JwtTokenIssuer::new(b"a-signing-secret-of-thirty-two-bytes", clock.clone());
    /// let state = HttpState::from_services(
    ///     Arc::new(AccountService::new(store.clone(), Arc::new(hasher), Arc::new(tokens))),
    ///     Arc::new(PatientService::new(store.clone(), clock.clone())),
    ///     Arc::new(DoctorService::new(store.clone(), clock.clone())),
    ///     Arc::new(MappingService::new(store.clone(), store.clone(), store, clock)),
    /// );
    /// let _login = state.login.clone();
    /// ```
    pub fn from_services<A, P, D, M>(
        accounts: Arc<A>,
        patients: Arc<P>,
        doctors: Arc<D>,
        mappings: Arc<M>,
    ) -> Self
    where
        A: RegistrationService + LoginService + 'static,
        P: PatientQuery + PatientCommand + 'static,
        D: DoctorQuery + DoctorCommand + 'static,
        M: MappingQuery + MappingCommand + 'static,
    {
        Self {
            registration: accounts.clone(),
            login: accounts,
            patients: patients.clone(),
            patient_commands: patients,
            doctors: doctors.clone(),
            doctor_commands: doctors,
            mappings: mappings.clone(),
            mapping_commands: mappings,
        }
    }
}
