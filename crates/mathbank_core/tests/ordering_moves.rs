use mathbank_core::db::open_db_in_memory;
use mathbank_core::{
    MoveDirection, ProblemId, ProblemListQuery, ProblemRepository, RepoError,
    SqliteProblemRepository,
};

fn listed_pids(repo: &SqliteProblemRepository<'_>) -> Vec<ProblemId> {
    repo.list_problems(&ProblemListQuery::default())
        .unwrap()
        .into_iter()
        .map(|problem| problem.pid)
        .collect()
}

#[test]
fn move_up_swaps_with_previous_neighbor() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProblemRepository::try_new(&mut conn).unwrap();

    let a = repo.create_problem("a").unwrap();
    let b = repo.create_problem("b").unwrap();
    let c = repo.create_problem("c").unwrap();

    repo.move_problem(b, MoveDirection::Up).unwrap();
    assert_eq!(listed_pids(&repo), vec![b, a, c]);
}

#[test]
fn move_down_swaps_with_next_neighbor() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProblemRepository::try_new(&mut conn).unwrap();

    let a = repo.create_problem("a").unwrap();
    let b = repo.create_problem("b").unwrap();
    let c = repo.create_problem("c").unwrap();

    repo.move_problem(b, MoveDirection::Down).unwrap();
    assert_eq!(listed_pids(&repo), vec![a, c, b]);
}

#[test]
fn move_is_a_noop_at_list_boundaries() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProblemRepository::try_new(&mut conn).unwrap();

    let a = repo.create_problem("a").unwrap();
    let b = repo.create_problem("b").unwrap();

    repo.move_problem(a, MoveDirection::Up).unwrap();
    repo.move_problem(b, MoveDirection::Down).unwrap();
    assert_eq!(listed_pids(&repo), vec![a, b]);
}

#[test]
fn move_up_then_down_restores_original_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProblemRepository::try_new(&mut conn).unwrap();

    let a = repo.create_problem("a").unwrap();
    let b = repo.create_problem("b").unwrap();
    let c = repo.create_problem("c").unwrap();
    let original = listed_pids(&repo);

    repo.move_problem(b, MoveDirection::Up).unwrap();
    repo.move_problem(b, MoveDirection::Down).unwrap();
    assert_eq!(listed_pids(&repo), original);

    repo.move_problem(c, MoveDirection::Down).unwrap();
    repo.move_problem(c, MoveDirection::Up).unwrap();
    assert_eq!(listed_pids(&repo), vec![a, b, c]);
}

#[test]
fn move_skips_trashed_neighbors() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProblemRepository::try_new(&mut conn).unwrap();

    let a = repo.create_problem("a").unwrap();
    let b = repo.create_problem("b").unwrap();
    let c = repo.create_problem("c").unwrap();

    repo.trash_problem(b).unwrap();
    repo.move_problem(c, MoveDirection::Up).unwrap();

    assert_eq!(listed_pids(&repo), vec![c, a]);
}

#[test]
fn move_missing_or_trashed_problem_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProblemRepository::try_new(&mut conn).unwrap();

    let err = repo.move_problem(404, MoveDirection::Up).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(404)));

    let pid = repo.create_problem("trashed").unwrap();
    repo.trash_problem(pid).unwrap();
    let err = repo.move_problem(pid, MoveDirection::Down).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(p) if p == pid));
}
