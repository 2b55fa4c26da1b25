//! Change propagation handling

use crate::client::{GetDomainStatusRequest, Gtm, ResponseStatus};
use crate::error::{GtmError, Operation, Result};
use std::time::Duration;

pub const PROPAGATION_COMPLETE: &str = "COMPLETE";
pub const PROPAGATION_DENIED: &str = "DENIED";

/// How often, and how many times, the domain status is checked while
/// waiting for a change to propagate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPoll {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for StatusPoll {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_polls: 120,
        }
    }
}

/// Fail when the change was denied
pub fn check_denied(kind: &'static str, operation: Operation, status: &ResponseStatus) -> Result<()> {
    if status.propagation_status == PROPAGATION_DENIED {
        return Err(GtmError::Denied {
            kind,
            operation,
            message: status.message.clone(),
        });
    }
    Ok(())
}

/// Poll the domain status until the last change is `COMPLETE`
pub async fn wait_for_completion(
    client: &dyn Gtm,
    kind: &'static str,
    domain: &str,
    poll: &StatusPoll,
) -> Result<()> {
    for attempt in 1..=poll.max_polls {
        let status = client
            .get_domain_status(GetDomainStatusRequest {
                domain_name: domain.to_string(),
            })
            .await
            .map_err(GtmError::api(kind, Operation::WaitForCompletion))?;

        tracing::debug!(
            domain,
            attempt,
            status = %status.propagation_status,
            "domain propagation status"
        );

        if status.propagation_status == PROPAGATION_COMPLETE {
            return Ok(());
        }
        check_denied(kind, Operation::WaitForCompletion, &status)?;

        if attempt < poll.max_polls {
            tokio::time::sleep(poll.interval).await;
        }
    }

    Err(GtmError::PropagationTimeout {
        domain: domain.to_string(),
        polls: poll.max_polls,
    })
}
