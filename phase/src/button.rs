//! Button directives: what each [`ButtonPhase`] looks like and does.

use gate_types::StrategyId;
use serde::Serialize;

use crate::ButtonPhase;

/// Which caller handler a phase binds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "handler", content = "strategy")]
pub enum ButtonAction {
    None,
    Start,
    Connect,
    Authenticate,
    Verify(StrategyId),
}

/// Renderable description of a button, without the bound handler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ButtonDirective {
    pub text: String,
    pub disabled: bool,
    pub loading: bool,
    pub action: ButtonAction,
}

impl ButtonDirective {
    fn active(text: impl Into<String>, action: ButtonAction) -> Self {
        Self {
            text: text.into(),
            disabled: false,
            loading: false,
            action,
        }
    }

    fn inert(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            disabled: true,
            loading: false,
            action: ButtonAction::None,
        }
    }

    fn busy(text: impl Into<String>) -> Self {
        Self {
            loading: true,
            ..Self::inert(text)
        }
    }
}

/// Static lookup from phase to directive.
pub fn button_directive(phase: ButtonPhase) -> ButtonDirective {
    match phase {
        ButtonPhase::Resolving => ButtonDirective::busy("Loading..."),
        ButtonPhase::Completed => ButtonDirective::inert("Completed"),
        ButtonPhase::CheckResults => {
            ButtonDirective::active("Sign in to view results", ButtonAction::Authenticate)
        }
        ButtonPhase::ConnectWallet => ButtonDirective::active("Connect wallet", ButtonAction::Connect),
        ButtonPhase::CheckingEligibility => ButtonDirective::busy("Checking eligibility..."),
        ButtonPhase::EligibilityError => ButtonDirective::inert("Eligibility check failed"),
        ButtonPhase::NotEligible => ButtonDirective::inert("Not eligible"),
        ButtonPhase::Verify(id) => ButtonDirective::active(
            format!("Verify with {}", id.display_name()),
            ButtonAction::Verify(id),
        ),
        ButtonPhase::Verifying(id) => {
            ButtonDirective::busy(format!("Verifying with {}...", id.display_name()))
        }
        ButtonPhase::NotStartedYet => ButtonDirective::inert("Not started yet"),
        ButtonPhase::Ended => ButtonDirective::inert("Survey ended"),
        ButtonPhase::Authenticate => ButtonDirective::active("Sign in", ButtonAction::Authenticate),
        ButtonPhase::Authenticating => ButtonDirective::busy("Signing in..."),
        ButtonPhase::Start => ButtonDirective::active("Start survey", ButtonAction::Start),
        ButtonPhase::Continue => ButtonDirective::active("Continue survey", ButtonAction::Start),
    }
}

/// Caller-supplied handlers.
pub struct ButtonHandlers<'a> {
    pub on_start: &'a dyn Fn(),
    pub on_connect: &'a dyn Fn(),
    pub on_authenticate: &'a dyn Fn(),
    pub on_verify: &'a dyn Fn(StrategyId),
}

/// A directive with its handler bound.
pub struct ButtonConfig<'a> {
    pub text: String,
    pub disabled: bool,
    pub loading: bool,
    pub action: ButtonAction,
    pub handler: Box<dyn Fn() + 'a>,
}

impl std::fmt::Debug for ButtonConfig<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ButtonConfig")
            .field("text", &self.text)
            .field("disabled", &self.disabled)
            .field("loading", &self.loading)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

/// Bind `phase` to one of `handlers`. Phases without an action get a no-op.
pub fn button_config<'a>(phase: ButtonPhase, handlers: &ButtonHandlers<'a>) -> ButtonConfig<'a> {
    let directive = button_directive(phase);
    let handler: Box<dyn Fn() + 'a> = match directive.action {
        ButtonAction::None => Box::new(|| {}),
        ButtonAction::Start => Box::new(handlers.on_start),
        ButtonAction::Connect => Box::new(handlers.on_connect),
        ButtonAction::Authenticate => Box::new(handlers.on_authenticate),
        ButtonAction::Verify(id) => {
            let on_verify = handlers.on_verify;
            Box::new(move || on_verify(id))
        }
    };
    ButtonConfig {
        text: directive.text,
        disabled: directive.disabled,
        loading: directive.loading,
        action: directive.action,
        handler,
    }
}
