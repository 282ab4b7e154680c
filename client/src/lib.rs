//! Authenticated API clients for the Agent Identity service.
//!
//! One parameterized transport ([`transport::ApiClient`]) carries the
//! whole authorization policy — bearer attachment, telemetry, the
//! 401-refresh-retry state machine, forced logout — and every domain
//! facade in [`clients`] is a thin typed surface over it. Credentials
//! come from one of the two auth flows in [`provider`] and fan out to
//! all facades through [`provision::ApiSet`].

pub mod analytics;
pub mod clients;
pub mod provider;
pub mod provision;
pub mod session;
pub mod transport;

pub use analytics::Analytics;
pub use provision::ApiSet;
pub use session::{LogoutOptions, SessionHandlers};
pub use transport::{ApiClient, AuthPolicy, ClientError, RequestSpec};
