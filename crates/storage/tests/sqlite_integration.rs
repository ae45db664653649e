use drill_core::model::{AchievementProgress, NEWCOMER, PROBLEM_SOLVER, Progress, UserId};
use drill_core::time::fixed_now;
use storage::Storage;
use storage::repository::{
    AchievementRepository, NewUserRecord, ProfileRepository, ScoreRecord, ScoreRepository,
    StorageError, UserRepository,
};
use storage::sqlite::SqliteRepository;

async fn repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn new_user(name: &str) -> NewUserRecord {
    NewUserRecord {
        username: name.to_owned(),
        password_hash: "$2b$04$placeholder".to_owned(),
        created_at: fixed_now(),
    }
}

#[tokio::test]
async fn sqlite_registration_seeds_profile_and_rejects_duplicates() {
    let repo = repo("memdb_register").await;

    let id = repo.insert_user(&new_user("ann")).await.unwrap();
    let found = repo.find_by_username("ann").await.unwrap().expect("user");
    assert_eq!(found.id, id);
    assert_eq!(found.created_at, fixed_now());
    assert!(repo.find_by_username("nobody").await.unwrap().is_none());

    let profile = repo.get_profile(id).await.unwrap();
    assert_eq!(profile.username, "ann");
    assert_eq!(profile.level, 1);
    assert_eq!(profile.total_score, 0);
    assert_eq!(profile.achievement(NEWCOMER).unwrap().progress, Progress::ZERO);

    let dup = repo.insert_user(&new_user("ann")).await;
    assert!(matches!(dup, Err(StorageError::Conflict)));
}

#[tokio::test]
async fn sqlite_scores_and_achievements_update_profile() {
    let repo = repo("memdb_scores").await;
    let id = repo.insert_user(&new_user("bo")).await.unwrap();

    for score in [7, 10] {
        repo.append_score(&ScoreRecord {
            user_id: id,
            score,
            recorded_at: fixed_now(),
        })
        .await
        .unwrap();
    }

    let seventy = AchievementProgress::new(PROBLEM_SOLVER, Progress::new(70).unwrap()).unwrap();
    assert!(!repo.upsert_progress(id, &seventy).await.unwrap().leveled_up);
    let full = AchievementProgress::new(PROBLEM_SOLVER, Progress::COMPLETE).unwrap();
    assert!(repo.upsert_progress(id, &full).await.unwrap().leveled_up);

    let profile = repo.get_profile(id).await.unwrap();
    assert_eq!(profile.total_score, 17);
    assert_eq!(profile.level, 2);
    assert_eq!(profile.achievements.len(), 2);
    assert_eq!(
        profile.achievement(PROBLEM_SOLVER).unwrap().progress,
        Progress::COMPLETE
    );

    let scores = repo.list_scores(id, 10).await.unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].score, 10);
}

#[tokio::test]
async fn sqlite_writes_for_missing_user_are_not_found() {
    let repo = repo("memdb_missing").await;
    let ghost = UserId::new(404);

    let score = repo
        .append_score(&ScoreRecord {
            user_id: ghost,
            score: 1,
            recorded_at: fixed_now(),
        })
        .await;
    assert!(matches!(score, Err(StorageError::NotFound)));

    let progress = AchievementProgress::new(PROBLEM_SOLVER, Progress::ZERO).unwrap();
    assert!(matches!(
        repo.upsert_progress(ghost, &progress).await,
        Err(StorageError::NotFound)
    ));
    assert!(matches!(
        repo.get_profile(ghost).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_identity_token_survives_reconnect() {
    let url = "sqlite:file:memdb_token?mode=memory&cache=shared";
    let storage = Storage::sqlite(url).await.expect("storage");
    let id = storage.users.insert_user(&new_user("cy")).await.unwrap();

    storage.identity_tokens.save_token(id).await.unwrap();

    // The first pool keeps the shared in-memory database alive.
    let again = Storage::sqlite(url).await.expect("reopen");
    assert_eq!(again.identity_tokens.load_token().await.unwrap(), Some(id));

    again.identity_tokens.clear_token().await.unwrap();
    assert_eq!(storage.identity_tokens.load_token().await.unwrap(), None);
}
