use std::sync::Arc;

use drill_core::model::{BatchRequest, DrillMode, Identity, NEWCOMER, PROBLEM_SOLVER};
use drill_core::time::fixed_clock;
use services::{AppServices, AuthError, ProfileView, TableExerciseSource};
use storage::Storage;

fn services(storage: &Storage) -> AppServices {
    AppServices::from_storage(storage, fixed_clock(), Arc::new(TableExerciseSource))
        .with_password_cost(4)
}

#[tokio::test]
async fn register_login_play_and_view_profile() {
    let storage = Storage::in_memory();
    let app = services(&storage);
    let auth = app.auth();

    let user_id = auth.register("jo", "pw").await.unwrap();
    assert!(matches!(
        auth.register("jo", "pw").await,
        Err(AuthError::UsernameTaken)
    ));

    let mut identity = app.restore_identity().await;
    assert_eq!(identity.identity(), Identity::Unauthenticated);
    let logged_in = auth.login("jo", "pw").await.unwrap();
    assert_eq!(logged_in, user_id);
    identity.sign_in(logged_in).await.unwrap();

    let drill = app.drill();
    let mut state = services::SessionState::new();
    let request = BatchRequest::new(DrillMode::new("table:3").unwrap(), 10).unwrap();
    drill.start_batch(&mut state, &request).await.unwrap();
    let answers: Vec<i64> = state.batch().iter().map(|ex| ex.product()).collect();
    for (i, answer) in answers.into_iter().enumerate() {
        state.record_answer(i, answer);
    }
    let outcome = drill.grade(&mut state, &identity.identity()).unwrap();
    assert!(outcome.score.is_perfect());
    outcome.persistence.unwrap().join().await;

    let view = app.profiles().profile(&identity.identity()).await.unwrap();
    let ProfileView::Registered(profile) = view else {
        panic!("expected registered profile");
    };
    assert_eq!(profile.username, "jo");
    assert_eq!(profile.total_score, 10);
    assert_eq!(profile.level, 2);
    assert!(profile.achievement(NEWCOMER).is_some());
    assert!(profile.achievement(PROBLEM_SOLVER).unwrap().progress.is_complete());
}

#[tokio::test]
async fn identity_is_restored_until_logout() {
    let storage = Storage::in_memory();
    let app = services(&storage);
    let user_id = app.auth().register("kim", "pw").await.unwrap();

    let mut first_run = app.restore_identity().await;
    first_run.sign_in(user_id).await.unwrap();

    let mut second_run = app.restore_identity().await;
    assert_eq!(second_run.identity(), Identity::Registered(user_id));

    second_run.logout().await.unwrap();
    let third_run = app.restore_identity().await;
    assert_eq!(third_run.identity(), Identity::Unauthenticated);
}

#[tokio::test]
async fn guest_profile_is_a_placeholder() {
    let storage = Storage::in_memory();
    let app = services(&storage);
    let mut identity = app.restore_identity().await;
    identity.continue_as_guest().unwrap();

    let view = app.profiles().profile(&identity.identity()).await.unwrap();
    assert!(matches!(view, ProfileView::Guest(_)));
    assert_eq!(view.profile().username, "Guest");
    assert!(view.profile().achievements.is_empty());
}
