// Retry convention shared by every remote action: a failure is reported
// with full context (message plus the raw server response), then someone
// decides whether to try again. Interactively that someone is the operator;
// in tests it is a scripted policy. The loop is deliberately unbounded and
// has no backoff: it exists to let a human correct transient issues (a
// mistyped key, a server mid-restart) without losing the session.

use crate::response::ApiFailure;
use dialoguer::Confirm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retry,
    Abort,
}

/// Decides what happens after a classified failure. Implementations own the
/// reporting as well as the choice, so an automated policy stays silent.
pub trait RetryPolicy {
    fn on_failure(&mut self, action: &str, failure: &ApiFailure) -> Decision;
}

/// The interactive policy: print the failure the way the console always
/// has, then ask the operator.
pub struct PromptPolicy;

impl RetryPolicy for PromptPolicy {
    fn on_failure(&mut self, action: &str, failure: &ApiFailure) -> Decision {
        println!("Error occurred in {}. Error: {}", action, failure);
        println!("Server response: {}", failure.raw_body_display());
        let retry = Confirm::new()
            .with_prompt("Retry?")
            .default(false)
            .interact()
            .unwrap_or(false);
        println!();
        if retry {
            Decision::Retry
        } else {
            Decision::Abort
        }
    }
}

/// Run `op` until it succeeds or the policy aborts. `None` means the action
/// was abandoned; the session and credential are untouched either way.
pub fn run_retryable<T, F>(action: &str, policy: &mut dyn RetryPolicy, mut op: F) -> Option<T>
where
    F: FnMut() -> Result<T, ApiFailure>,
{
    loop {
        match op() {
            Ok(value) => return Some(value),
            Err(failure) => match policy.on_failure(action, &failure) {
                Decision::Retry => continue,
                Decision::Abort => return None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{classify_text, FailureKind};

    /// Replays a fixed list of decisions and records every failure it saw.
    struct ScriptedPolicy {
        decisions: Vec<Decision>,
        seen: Vec<(FailureKind, String)>,
    }

    impl ScriptedPolicy {
        fn new(decisions: Vec<Decision>) -> Self {
            ScriptedPolicy {
                decisions,
                seen: Vec::new(),
            }
        }
    }

    impl RetryPolicy for ScriptedPolicy {
        fn on_failure(&mut self, _action: &str, failure: &ApiFailure) -> Decision {
            self.seen.push((failure.kind, failure.message.clone()));
            self.decisions.remove(0)
        }
    }

    #[test]
    fn wrong_key_then_retry_with_correct_key_succeeds() {
        // Mirrors the authentication handshake: the first attempt is
        // rejected, the operator retries, the second attempt goes through.
        let mut responses = vec!["ERROR: Invalid access key", "SUCCESS"].into_iter();
        let mut policy = ScriptedPolicy::new(vec![Decision::Retry]);

        let result = run_retryable("authenticating with server", &mut policy, || {
            classify_text(responses.next().unwrap())
        });

        assert_eq!(result.as_deref(), Some("SUCCESS"));
        assert_eq!(
            policy.seen,
            vec![(FailureKind::Operational, "Invalid access key".to_string())]
        );
    }

    #[test]
    fn declining_abandons_the_action() {
        let mut policy = ScriptedPolicy::new(vec![Decision::Abort]);
        let result: Option<String> = run_retryable("retrieving analytics", &mut policy, || {
            classify_text("ERROR: Analytics disabled")
        });

        assert!(result.is_none());
        assert_eq!(policy.seen.len(), 1);
    }

    #[test]
    fn repeated_attempts_classify_identically() {
        // With unchanged remote state, every retry of the same input must
        // produce the same classification.
        let mut policy = ScriptedPolicy::new(vec![Decision::Retry, Decision::Retry, Decision::Abort]);
        let result: Option<String> = run_retryable("deleting admin account", &mut policy, || {
            classify_text("UERROR: No admin with that username")
        });

        assert!(result.is_none());
        assert_eq!(policy.seen.len(), 3);
        assert!(policy
            .seen
            .iter()
            .all(|entry| *entry == (FailureKind::Validation, "No admin with that username".to_string())));
    }

    #[test]
    fn immediate_success_never_consults_the_policy() {
        let mut policy = ScriptedPolicy::new(vec![]);
        let result = run_retryable("toggling analytics", &mut policy, || {
            classify_text("SUCCESS: Analytics now enabled.")
        });

        assert_eq!(result.as_deref(), Some("SUCCESS: Analytics now enabled."));
        assert!(policy.seen.is_empty());
    }
}
