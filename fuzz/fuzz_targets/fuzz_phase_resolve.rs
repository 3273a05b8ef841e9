#![no_main]

use gate_phase::{
    button_directive, resolve_admin_auth_phase, resolve_participation_phase, AdminAuthInput,
    ButtonAction, ButtonPhase, ParticipationInput,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any snapshot that deserializes must resolve to exactly one phase,
    // and resolving twice must agree.
    if let Ok(input) = serde_json::from_slice::<AdminAuthInput>(data) {
        let phase = resolve_admin_auth_phase(&input);
        assert_eq!(phase, resolve_admin_auth_phase(&input));
        let _ = phase.effect();
    }

    if let Ok(input) = serde_json::from_slice::<ParticipationInput>(data) {
        let phase = resolve_participation_phase(&input);
        assert_eq!(phase, resolve_participation_phase(&input));
        let directive = button_directive(phase);
        assert!(!directive.text.is_empty());
        // A button is clickable exactly when it carries an action.
        assert_eq!(directive.disabled, directive.action == ButtonAction::None);
        if directive.loading {
            assert!(directive.disabled);
        }
        if matches!(phase, ButtonPhase::Completed | ButtonPhase::Resolving) {
            assert!(directive.disabled);
        }
    }
});
