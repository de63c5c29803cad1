use mathbank_core::db::migrations::latest_version;
use mathbank_core::db::open_db_in_memory;
use mathbank_core::{
    ProblemListQuery, ProblemRepository, ProblemService, RepoError, SqliteProblemRepository,
};
use rusqlite::Connection;

#[test]
fn create_and_get_roundtrip() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProblemRepository::try_new(&mut conn).unwrap();

    let pid = repo.create_problem("Find x.").unwrap();

    let loaded = repo.get_problem(pid).unwrap().unwrap();
    assert_eq!(loaded.pid, pid);
    assert_eq!(loaded.content, "Find x.");
    assert_eq!(loaded.ordinal, 1);
    assert!(loaded.keywords.is_empty());
}

#[test]
fn create_appends_to_end_of_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProblemRepository::try_new(&mut conn).unwrap();

    let first = repo.create_problem("first").unwrap();
    let second = repo.create_problem("second").unwrap();
    let third = repo.create_problem("third").unwrap();

    let listed = repo.list_problems(&ProblemListQuery::default()).unwrap();
    let pids: Vec<_> = listed.iter().map(|problem| problem.pid).collect();
    assert_eq!(pids, vec![first, second, third]);
    let ordinals: Vec<_> = listed.iter().map(|problem| problem.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2, 3]);
}

#[test]
fn update_replaces_content() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProblemRepository::try_new(&mut conn).unwrap();

    let pid = repo.create_problem("draft").unwrap();
    repo.update_problem(pid, "Solve for y.").unwrap();

    let loaded = repo.get_problem(pid).unwrap().unwrap();
    assert_eq!(loaded.content, "Solve for y.");
}

#[test]
fn update_missing_problem_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteProblemRepository::try_new(&mut conn).unwrap();

    let err = repo.update_problem(404, "nope").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(404)));
}

#[test]
fn update_trashed_problem_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProblemRepository::try_new(&mut conn).unwrap();

    let pid = repo.create_problem("soon gone").unwrap();
    repo.trash_problem(pid).unwrap();

    let err = repo.update_problem(pid, "too late").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(p) if p == pid));
}

#[test]
fn get_excludes_trashed_problems() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProblemRepository::try_new(&mut conn).unwrap();

    let pid = repo.create_problem("hide me").unwrap();
    repo.trash_problem(pid).unwrap();

    assert!(repo.get_problem(pid).unwrap().is_none());
}

#[test]
fn list_pagination_with_limit_and_offset_is_stable() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProblemRepository::try_new(&mut conn).unwrap();

    for idx in 0..5 {
        repo.create_problem(&format!("problem {idx}")).unwrap();
    }

    let query = ProblemListQuery {
        limit: Some(2),
        offset: 1,
    };
    let page = repo.list_problems(&query).unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].content, "problem 1");
    assert_eq!(page[1].content, "problem 2");
}

#[test]
fn service_list_normalizes_page_size() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteProblemRepository::try_new(&mut conn).unwrap();
    let mut service = ProblemService::new(repo);

    for idx in 0..60 {
        service.create_problem(format!("problem {idx}")).unwrap();
    }

    let defaulted = service.list_problems(1, None).unwrap();
    assert_eq!(defaulted.applied_page_size, 10);
    assert_eq!(defaulted.items.len(), 10);

    let capped = service.list_problems(1, Some(500)).unwrap();
    assert_eq!(capped.applied_page_size, 50);
    assert_eq!(capped.items.len(), 50);

    let second_page = service.list_problems(2, Some(10)).unwrap();
    assert_eq!(second_page.items[0].content, "problem 10");
}

#[test]
fn service_create_reads_back_created_record() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteProblemRepository::try_new(&mut conn).unwrap();
    let mut service = ProblemService::new(repo);

    let created = service.create_problem("from service").unwrap();
    assert_eq!(created.content, "from service");
    assert!(created.keywords.is_empty());

    let fetched = service.get_problem(created.pid).unwrap().unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let mut conn = Connection::open_in_memory().unwrap();

    let result = SqliteProblemRepository::try_new(&mut conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_problems_table() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteProblemRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("problems"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_problems_column() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE problems (
            pid INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteProblemRepository::try_new(&mut conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "problems",
            column: "ordinal"
        })
    ));
}
