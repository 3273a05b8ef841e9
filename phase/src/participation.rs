//! Participation button phase.
//!
//! Merges the survey, wallet/session signals, the eligibility fetch and the
//! survey's time window into the single phase of the survey's main button.

use gate_types::{EligibilityState, StrategyId, Survey, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::PhaseError;

/// Snapshot of everything the button depends on. `now` is explicit so the
/// resolver stays pure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipationInput {
    /// `None` until the survey is loaded.
    pub survey: Option<Survey>,
    pub is_connected: bool,
    pub connected_address: Option<WalletAddress>,
    pub is_authenticated: bool,
    /// A sign-in call is in flight.
    pub is_authenticating: bool,
    /// Last eligibility result, if any.
    pub eligibility: Option<EligibilityState>,
    pub is_checking_eligibility: bool,
    /// User-safe summary of the last failed eligibility fetch.
    pub eligibility_error: Option<String>,
    /// Remediation the caller has started and not yet seen conclude.
    pub verifying: Option<StrategyId>,
    pub now: Timestamp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ButtonPhase {
    Resolving,
    Completed,
    CheckResults,
    ConnectWallet,
    CheckingEligibility,
    EligibilityError,
    NotEligible,
    Verify(StrategyId),
    Verifying(StrategyId),
    NotStartedYet,
    Ended,
    Authenticate,
    Authenticating,
    Start,
    Continue,
}

impl ButtonPhase {
    const FIXED: [ButtonPhase; 13] = [
        ButtonPhase::Resolving,
        ButtonPhase::Completed,
        ButtonPhase::CheckResults,
        ButtonPhase::ConnectWallet,
        ButtonPhase::CheckingEligibility,
        ButtonPhase::EligibilityError,
        ButtonPhase::NotEligible,
        ButtonPhase::NotStartedYet,
        ButtonPhase::Ended,
        ButtonPhase::Authenticate,
        ButtonPhase::Authenticating,
        ButtonPhase::Start,
        ButtonPhase::Continue,
    ];

    /// Every phase, remediation phases expanded per remediable strategy.
    pub fn all() -> Vec<ButtonPhase> {
        let mut phases = ButtonPhase::FIXED.to_vec();
        for id in StrategyId::ALL.into_iter().filter(StrategyId::supports_remediation) {
            phases.push(ButtonPhase::Verify(id));
            phases.push(ButtonPhase::Verifying(id));
        }
        phases
    }

    fn fixed_name(&self) -> Option<&'static str> {
        let name = match self {
            ButtonPhase::Resolving => "resolving",
            ButtonPhase::Completed => "completed",
            ButtonPhase::CheckResults => "check_results",
            ButtonPhase::ConnectWallet => "connect_wallet",
            ButtonPhase::CheckingEligibility => "checking_eligibility",
            ButtonPhase::EligibilityError => "eligibility_error",
            ButtonPhase::NotEligible => "not_eligible",
            ButtonPhase::NotStartedYet => "not_started_yet",
            ButtonPhase::Ended => "ended",
            ButtonPhase::Authenticate => "authenticate",
            ButtonPhase::Authenticating => "authenticating",
            ButtonPhase::Start => "start",
            ButtonPhase::Continue => "continue",
            ButtonPhase::Verify(_) | ButtonPhase::Verifying(_) => return None,
        };
        Some(name)
    }
}

impl fmt::Display for ButtonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonPhase::Verify(id) => write!(f, "verify_{id}"),
            ButtonPhase::Verifying(id) => write!(f, "verifying_{id}"),
            other => f.write_str(other.fixed_name().unwrap_or_default()),
        }
    }
}

impl FromStr for ButtonPhase {
    type Err = PhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(phase) = ButtonPhase::FIXED
            .into_iter()
            .find(|p| p.fixed_name() == Some(s))
        {
            return Ok(phase);
        }
        let unknown = || PhaseError::UnknownPhase(s.to_string());
        if let Some(id) = s.strip_prefix("verifying_") {
            return id.parse().map(ButtonPhase::Verifying).map_err(|_| unknown());
        }
        if let Some(id) = s.strip_prefix("verify_") {
            return id.parse().map(ButtonPhase::Verify).map_err(|_| unknown());
        }
        Err(unknown())
    }
}

impl From<ButtonPhase> for String {
    fn from(phase: ButtonPhase) -> Self {
        phase.to_string()
    }
}

impl TryFrom<String> for ButtonPhase {
    type Error = PhaseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Resolve the button phase. The order of the checks is the contract.
pub fn resolve_participation_phase(input: &ParticipationInput) -> ButtonPhase {
    // 1. Nothing to show until the survey is known.
    let Some(survey) = &input.survey else {
        return ButtonPhase::Resolving;
    };
    let eligibility = input.eligibility.as_ref();

    // 2. Completion wins over everything, even a disconnected wallet, except
    // that finished time-boxed surveys let the user sign in to see results.
    if eligibility.is_some_and(|e| e.has_completed) {
        let results_open = survey.kind.is_time_boxed()
            && survey.end_time.is_some_and(|end| end.is_before(input.now));
        if results_open && input.is_connected && !input.is_authenticated {
            return if input.is_authenticating {
                ButtonPhase::Authenticating
            } else {
                ButtonPhase::CheckResults
            };
        }
        return ButtonPhase::Completed;
    }

    // 3.
    if !input.is_connected {
        return ButtonPhase::ConnectWallet;
    }

    // 4.
    if input.is_checking_eligibility && input.connected_address.is_some() {
        return ButtonPhase::CheckingEligibility;
    }

    // 5.
    if let Some(state) = eligibility.filter(|e| !e.is_eligible) {
        return match state.remediable_failure() {
            Some((id, result)) if input.verifying == Some(id) || result.verification_pending => {
                ButtonPhase::Verifying(id)
            }
            Some((id, _)) => ButtonPhase::Verify(id),
            None => ButtonPhase::NotEligible,
        };
    }

    // 6.
    if survey.start_time.is_some_and(|start| start.is_after(input.now)) {
        return ButtonPhase::NotStartedYet;
    }
    if survey.end_time.is_some_and(|end| end.is_before(input.now)) {
        return ButtonPhase::Ended;
    }

    // 7.
    if !input.is_authenticated {
        return if input.is_authenticating {
            ButtonPhase::Authenticating
        } else {
            ButtonPhase::Authenticate
        };
    }

    // 8.
    let Some(state) = eligibility else {
        return if input.eligibility_error.is_some() && !input.is_checking_eligibility {
            ButtonPhase::EligibilityError
        } else {
            ButtonPhase::Resolving
        };
    };

    // 9.
    if state.has_started {
        ButtonPhase::Continue
    } else {
        ButtonPhase::Start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate_types::{StrategyResult, SurveyKind};

    fn wallet() -> WalletAddress {
        WalletAddress::new("0xabc").unwrap()
    }

    fn ready() -> ParticipationInput {
        ParticipationInput {
            survey: Some(Survey::new("s1")),
            is_connected: true,
            connected_address: Some(wallet()),
            is_authenticated: true,
            eligibility: Some(EligibilityState::open()),
            now: Timestamp::new(1_000),
            ..Default::default()
        }
    }

    fn bringid_failure(pending: bool) -> EligibilityState {
        let mut state = EligibilityState {
            is_eligible: false,
            ..EligibilityState::open()
        };
        state.per_strategy_results.insert(
            StrategyId::BringId,
            StrategyResult {
                passed: false,
                requires_humanity_verification: true,
                verification_pending: pending,
                ..Default::default()
            },
        );
        state
    }

    #[test]
    fn unloaded_survey_resolves() {
        let input = ParticipationInput {
            survey: None,
            ..ready()
        };
        assert_eq!(resolve_participation_phase(&input), ButtonPhase::Resolving);
    }

    #[test]
    fn completed_even_when_disconnected() {
        let mut input = ready();
        input.is_connected = false;
        input.is_authenticated = false;
        input.connected_address = None;
        input.eligibility = Some(EligibilityState {
            has_completed: true,
            is_eligible: false,
            ..EligibilityState::open()
        });
        assert_eq!(resolve_participation_phase(&input), ButtonPhase::Completed);
    }

    #[test]
    fn finished_prediction_lets_user_sign_in_for_results() {
        let mut input = ready();
        input.survey = Some(
            Survey::new("p1")
                .with_kind(SurveyKind::Prediction)
                .with_window(None, Some(Timestamp::new(500))),
        );
        input.is_authenticated = false;
        input.eligibility = Some(EligibilityState {
            has_completed: true,
            ..EligibilityState::open()
        });
        assert_eq!(resolve_participation_phase(&input), ButtonPhase::CheckResults);

        input.is_authenticating = true;
        assert_eq!(resolve_participation_phase(&input), ButtonPhase::Authenticating);

        // Results are not open yet before the end time.
        input.now = Timestamp::new(400);
        assert_eq!(resolve_participation_phase(&input), ButtonPhase::Completed);
    }

    #[test]
    fn disconnected_wallet_beats_ineligible_result() {
        let mut input = ready();
        input.is_connected = false;
        input.eligibility = Some(EligibilityState {
            is_eligible: false,
            reason: Some("not on the access list".into()),
            ..EligibilityState::open()
        });
        assert_eq!(resolve_participation_phase(&input), ButtonPhase::ConnectWallet);
    }

    #[test]
    fn in_flight_check_needs_an_address() {
        let mut input = ready();
        input.is_checking_eligibility = true;
        assert_eq!(
            resolve_participation_phase(&input),
            ButtonPhase::CheckingEligibility
        );

        input.connected_address = None;
        assert_ne!(
            resolve_participation_phase(&input),
            ButtonPhase::CheckingEligibility
        );
    }

    #[test]
    fn humanity_failure_offers_verification() {
        let mut input = ready();
        input.survey = Some(Survey::new("s1").with_access(gate_types::ResourceAccessConfig::new(
            vec![StrategyId::BringId],
            gate_types::CombineMode::And,
        )));
        input.eligibility = Some(bringid_failure(false));
        let phase = resolve_participation_phase(&input);
        assert_eq!(phase, ButtonPhase::Verify(StrategyId::BringId));
        assert_eq!(phase.to_string(), "verify_bringid");
    }

    #[test]
    fn verification_in_progress_from_caller_or_service() {
        let mut input = ready();
        input.eligibility = Some(bringid_failure(false));
        input.verifying = Some(StrategyId::BringId);
        assert_eq!(
            resolve_participation_phase(&input),
            ButtonPhase::Verifying(StrategyId::BringId)
        );

        input.verifying = None;
        input.eligibility = Some(bringid_failure(true));
        assert_eq!(
            resolve_participation_phase(&input),
            ButtonPhase::Verifying(StrategyId::BringId)
        );
    }

    #[test]
    fn plain_denial_is_not_eligible() {
        let mut input = ready();
        input.eligibility = Some(EligibilityState {
            is_eligible: false,
            ..EligibilityState::open()
        });
        assert_eq!(resolve_participation_phase(&input), ButtonPhase::NotEligible);
    }

    #[test]
    fn time_gates() {
        let mut input = ready();
        input.survey = Some(Survey::new("s1").with_window(Some(Timestamp::new(2_000)), None));
        assert_eq!(resolve_participation_phase(&input), ButtonPhase::NotStartedYet);

        input.survey = Some(Survey::new("s1").with_window(None, Some(Timestamp::new(999))));
        assert_eq!(resolve_participation_phase(&input), ButtonPhase::Ended);
    }

    #[test]
    fn unauthenticated_after_time_gates() {
        let mut input = ready();
        input.is_authenticated = false;
        assert_eq!(resolve_participation_phase(&input), ButtonPhase::Authenticate);
        input.is_authenticating = true;
        assert_eq!(resolve_participation_phase(&input), ButtonPhase::Authenticating);
    }

    #[test]
    fn missing_eligibility_data() {
        let mut input = ready();
        input.eligibility = None;
        assert_eq!(resolve_participation_phase(&input), ButtonPhase::Resolving);

        input.eligibility_error = Some("check your connection and retry".into());
        assert_eq!(
            resolve_participation_phase(&input),
            ButtonPhase::EligibilityError
        );
    }

    #[test]
    fn start_or_continue() {
        let mut input = ready();
        assert_eq!(resolve_participation_phase(&input), ButtonPhase::Start);
        input.eligibility = Some(EligibilityState {
            has_started: true,
            ..EligibilityState::open()
        });
        assert_eq!(resolve_participation_phase(&input), ButtonPhase::Continue);
    }

    #[test]
    fn phase_names_round_trip() {
        for phase in ButtonPhase::all() {
            assert_eq!(phase.to_string().parse::<ButtonPhase>().unwrap(), phase);
        }
        assert!("verify_gitcoin".parse::<ButtonPhase>().is_err());
        assert!("dancing".parse::<ButtonPhase>().is_err());
    }

    #[test]
    fn serializes_as_flat_string() {
        let json = serde_json::to_string(&ButtonPhase::Verifying(StrategyId::BringId)).unwrap();
        assert_eq!(json, "\"verifying_bringid\"");
        let back: ButtonPhase = serde_json::from_str("\"not_started_yet\"").unwrap();
        assert_eq!(back, ButtonPhase::NotStartedYet);
    }
}
