use thiserror::Error;

use super::routing::RoutingError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Routing(#[from] RoutingError),
}
