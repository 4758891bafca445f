use otp_hooks::{
    email::LogEmailSender,
    otp::{
        arbiter::{decide, Decision},
        verifier::answers_match,
        ChallengeAttempt, Config, Hooks, Phase, CUSTOM_CHALLENGE,
    },
};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

fn attempt() -> impl Strategy<Value = ChallengeAttempt> {
    (
        prop_oneof![Just(CUSTOM_CHALLENGE.to_string()), "[A-Z_]{1,16}"],
        any::<bool>(),
    )
        .prop_map(|(name, result)| ChallengeAttempt::new(&name, result))
}

fn history() -> impl Strategy<Value = Vec<ChallengeAttempt>> {
    prop::collection::vec(attempt(), 0..8)
}

fn other_challenge() -> impl Strategy<Value = String> {
    "[A-Z_]{1,16}".prop_filter("not the custom challenge", |name| name != CUSTOM_CHALLENGE)
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z0-9@._ ]{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z:_]{1,10}", inner, 0..4)
                .prop_map(|fields| Value::Object(fields.into_iter().collect())),
        ]
    })
}

fn unknown_trigger() -> impl Strategy<Value = String> {
    "[A-Za-z_]{0,32}".prop_filter("unhandled trigger", |source| {
        Phase::from_trigger_source(source) == Phase::Unknown
    })
}

proptest! {
    #[test]
    fn last_custom_success_issues_tokens(mut session in history(), max_attempts in 0u32..5) {
        session.push(ChallengeAttempt::new(CUSTOM_CHALLENGE, true));
        prop_assert_eq!(decide(&session, max_attempts), Decision::IssueTokens);
    }

    #[test]
    fn last_custom_failure_rechallenges(mut session in history()) {
        session.push(ChallengeAttempt::new(CUSTOM_CHALLENGE, false));
        prop_assert_eq!(decide(&session, 0), Decision::Challenge);
    }

    #[test]
    fn last_other_challenge_rechallenges(
        mut session in history(),
        name in other_challenge(),
        result in any::<bool>(),
    ) {
        session.push(ChallengeAttempt::new(&name, result));
        prop_assert_eq!(decide(&session, 0), Decision::Challenge);
    }

    #[test]
    fn cap_fails_once_enough_custom_rounds_failed(session in history(), max_attempts in 1u32..5) {
        let last_succeeded = session
            .last()
            .is_some_and(|last| last.is_custom() && last.challenge_result);
        let failed = session
            .iter()
            .filter(|attempt| attempt.is_custom() && !attempt.challenge_result)
            .count();

        let expected = if last_succeeded {
            Decision::IssueTokens
        } else if failed >= max_attempts as usize {
            Decision::Fail
        } else {
            Decision::Challenge
        };
        prop_assert_eq!(decide(&session, max_attempts), expected);
    }

    #[test]
    fn answers_match_iff_equal(stored in "[0-9]{0,10}", submitted in "[0-9]{0,10}") {
        prop_assert_eq!(answers_match(Some(stored.as_str()), &submitted), stored == submitted);
        prop_assert!(!answers_match(None, &submitted));
    }

    #[test]
    fn answers_match_itself(code in "[0-9]{4,10}") {
        prop_assert!(answers_match(Some(code.as_str()), &code));
    }

    #[test]
    fn unknown_trigger_event_is_returned_unchanged(
        trigger in unknown_trigger(),
        request in json_value(),
        response in json_value(),
        extra in json_value(),
    ) {
        let hooks = Hooks::new(Config::default(), Arc::new(LogEmailSender));
        let raw = json!({
            "triggerSource": trigger,
            "request": request,
            "response": response,
            "callerContext": extra,
        });

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let out = runtime.block_on(hooks.handle_value(raw.clone()));

        prop_assert_eq!(out.ok(), Some(raw));
    }
}
