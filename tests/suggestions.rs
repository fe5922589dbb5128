//! Debounce, length gate and staleness behaviour of search-as-you-type.

use std::sync::Arc;
use std::time::Duration;

use github_profile::test_utils::{
    init_test_logging, search_json, search_url, test_config, user_json, ScriptedDirectory,
    TEST_API_BASE,
};
use github_profile::{Candidate, Controller, HttpError};
use tokio::time::sleep;

fn logins(candidates: &[Candidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.identifier.as_str()).collect()
}

fn setup() -> (Arc<ScriptedDirectory>, Controller<ScriptedDirectory>) {
    init_test_logging(None);
    let directory = Arc::new(ScriptedDirectory::new());
    let controller = Controller::new(Arc::clone(&directory), &test_config());
    (directory, controller)
}

#[tokio::test(start_paused = true)]
async fn short_input_clears_candidates_without_a_request() {
    let (directory, controller) = setup();
    directory.respond(search_url("oct"), search_json(&["octocat", "octo-org"]));

    controller.on_query_changed("oct");
    sleep(Duration::from_millis(300)).await;
    assert_eq!(
        logins(&controller.state().snapshot().candidates),
        ["octocat", "octo-org"]
    );

    controller.on_query_changed("oc");
    // Cleared right away, not after the quiet period.
    assert!(controller.state().snapshot().candidates.is_empty());

    sleep(Duration::from_secs(1)).await;
    assert!(controller.state().snapshot().candidates.is_empty());
    assert_eq!(directory.calls(), vec![search_url("oct")]);
}

#[tokio::test(start_paused = true)]
async fn inputs_below_the_gate_never_dispatch() {
    let (directory, controller) = setup();
    directory.mount_user("octocat", 1, 1, 1);
    directory.respond_after(
        format!("{TEST_API_BASE}users/octocat"),
        Duration::from_secs(5),
        user_json("octocat"),
    );
    let short_inputs = ["", "o", "oc", "ü", "üb"];

    for input in short_inputs {
        controller.on_query_changed(input);
        sleep(Duration::from_millis(500)).await;
    }

    // Dark theme.
    controller.toggle_theme();
    for input in short_inputs {
        controller.on_query_changed(input);
        assert!(controller.state().snapshot().candidates.is_empty());
        sleep(Duration::from_millis(500)).await;
    }

    // With a confirmed search still in flight.
    controller.on_suggestion_picked("octocat");
    let search = controller.on_search_confirmed();
    for input in short_inputs {
        controller.on_query_changed(input);
        assert!(controller.state().snapshot().candidates.is_empty());
        sleep(Duration::from_millis(500)).await;
    }
    assert!(controller.state().snapshot().loading);

    search.await.unwrap();
    for input in short_inputs {
        controller.on_query_changed(input);
        sleep(Duration::from_millis(500)).await;
    }

    assert!(directory.calls_containing("search/users").is_empty());
    assert_eq!(
        directory.calls_containing("users/octocat").len(),
        4,
        "only the confirmed profile lookup reached the directory"
    );
    assert!(controller.state().snapshot().candidates.is_empty());
}

#[tokio::test(start_paused = true)]
async fn rapid_typing_coalesces_into_one_request() {
    let (directory, controller) = setup();
    directory.respond(search_url("octoc"), search_json(&["octocat"]));

    for input in ["oct", "octo", "octoc"] {
        controller.on_query_changed(input);
        sleep(Duration::from_millis(50)).await;
    }
    assert!(directory.calls().is_empty());

    sleep(Duration::from_millis(500)).await;
    assert_eq!(directory.calls(), vec![search_url("octoc")]);
    assert_eq!(
        logins(&controller.state().snapshot().candidates),
        ["octocat"]
    );
}

#[tokio::test(start_paused = true)]
async fn request_fires_only_after_the_quiet_period() {
    let (directory, controller) = setup();
    directory.respond(search_url("octo"), search_json(&["octocat"]));

    controller.on_query_changed("octo");
    sleep(Duration::from_millis(199)).await;
    assert!(directory.calls().is_empty());

    sleep(Duration::from_millis(2)).await;
    assert_eq!(directory.calls(), vec![search_url("octo")]);
}

#[tokio::test(start_paused = true)]
async fn slow_older_response_never_overwrites_newer_one() {
    let (directory, controller) = setup();
    directory.respond_after(
        search_url("octo"),
        Duration::from_secs(2),
        search_json(&["stale-result"]),
    );
    directory.respond(search_url("octocat"), search_json(&["octocat"]));

    controller.on_query_changed("octo");
    // Past the quiet period: the slow request for "octo" is in flight.
    sleep(Duration::from_millis(250)).await;
    controller.on_query_changed("octocat");

    sleep(Duration::from_secs(5)).await;
    assert_eq!(
        directory.calls(),
        vec![search_url("octo"), search_url("octocat")]
    );
    assert_eq!(
        logins(&controller.state().snapshot().candidates),
        ["octocat"]
    );
}

#[tokio::test(start_paused = true)]
async fn at_most_five_candidates_in_remote_order() {
    let (directory, controller) = setup();
    directory.respond(
        search_url("user"),
        search_json(&["user-z", "user-a", "user-m", "user-b", "user-y", "user-c", "user-x"]),
    );

    controller.on_query_changed("user");
    sleep(Duration::from_millis(300)).await;

    let state = controller.state().snapshot();
    assert_eq!(
        logins(&state.candidates),
        ["user-z", "user-a", "user-m", "user-b", "user-y"]
    );
    assert!(state
        .candidates
        .iter()
        .all(|c| c.identifier == c.display_label));
}

#[tokio::test(start_paused = true)]
async fn failed_lookup_keeps_previous_candidates_and_shows_no_error() {
    let (directory, controller) = setup();
    directory.respond(search_url("octo"), search_json(&["octocat"]));
    directory.fail(search_url("octoz"), HttpError::Status { status: 403 });

    controller.on_query_changed("octo");
    sleep(Duration::from_millis(300)).await;
    controller.on_query_changed("octoz");
    sleep(Duration::from_millis(300)).await;

    let state = controller.state().snapshot();
    assert_eq!(directory.calls().len(), 2);
    assert_eq!(logins(&state.candidates), ["octocat"]);
    assert!(state.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn picking_sets_query_and_clears_without_a_new_search() {
    let (directory, controller) = setup();
    directory.respond(search_url("octo"), search_json(&["octocat", "octo-org"]));

    controller.on_query_changed("octo");
    sleep(Duration::from_millis(300)).await;
    assert_eq!(controller.state().snapshot().candidates.len(), 2);

    controller.on_suggestion_picked("octo-org");
    let state = controller.state().snapshot();
    assert_eq!(state.query, "octo-org");
    assert!(state.candidates.is_empty());

    sleep(Duration::from_secs(1)).await;
    assert_eq!(directory.calls(), vec![search_url("octo")]);
    assert!(controller.state().snapshot().candidates.is_empty());
}

#[tokio::test(start_paused = true)]
async fn picking_cancels_a_pending_lookup() {
    let (directory, controller) = setup();
    directory.respond(search_url("octo"), search_json(&["octocat"]));

    controller.on_query_changed("octo");
    sleep(Duration::from_millis(100)).await;
    controller.on_suggestion_picked("octocat");

    sleep(Duration::from_secs(1)).await;
    assert!(directory.calls().is_empty());
    assert!(controller.state().snapshot().candidates.is_empty());
}

#[tokio::test(start_paused = true)]
async fn picking_discards_an_in_flight_lookup() {
    let (directory, controller) = setup();
    directory.respond_after(
        search_url("octo"),
        Duration::from_secs(1),
        search_json(&["octocat"]),
    );

    controller.on_query_changed("octo");
    sleep(Duration::from_millis(250)).await;
    assert_eq!(directory.calls().len(), 1);
    controller.on_suggestion_picked("octocat");

    sleep(Duration::from_secs(2)).await;
    assert!(controller.state().snapshot().candidates.is_empty());
}
