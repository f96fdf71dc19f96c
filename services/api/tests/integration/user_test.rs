use uuid::Uuid;

use rately_api::domain::types::{UserFilter, UserSort};
use rately_api::error::ApiError;
use rately_api::usecase::auth::verify_password;
use rately_api::usecase::user::{
    CreateUserInput, CreateUserUseCase, GetUserUseCase, ListUsersUseCase, UpdatePasswordInput,
    UpdatePasswordUseCase,
};
use rately_domain::{ListParams, PageInfo, Role};

use crate::helpers::{
    TestWorld, query, test_rating, test_store, test_user, test_user_with_password,
};

fn create_input() -> CreateUserInput {
    CreateUserInput {
        name: "Margaret Elizabeth Chen".to_owned(),
        email: "margaret@example.com".to_owned(),
        password: "Secret#99".to_owned(),
        address: None,
        role: "user".to_owned(),
    }
}

// ── ListUsersUseCase ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_filter_users_by_name_substring() {
    let world = TestWorld::new();
    world.insert_user(test_user(
        "Benjamin Cartwright Ellis",
        "benjamin@example.com",
        Role::User,
    ));
    world.insert_user(test_user(
        "Alexandra Humphrey Woods",
        "alexandra@example.com",
        Role::User,
    ));
    world.insert_user(test_user(
        "Alexis Monroe Fairbanks",
        "alexis@example.com",
        Role::User,
    ));
    let uc = ListUsersUseCase { users: world.user_repo() };

    let params = ListParams::resolve(&query(&[("name", "alex")]));
    let output = uc.execute(&params).await.unwrap();

    assert_eq!(output.total, 2);
    let names: Vec<&str> = output.users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Alexandra Humphrey Woods", "Alexis Monroe Fairbanks"]);
}

#[tokio::test]
async fn should_match_filters_case_insensitively() {
    let world = TestWorld::new();
    world.insert_user(test_user(
        "Alexandra Humphrey Woods",
        "alexandra@example.com",
        Role::User,
    ));
    world.insert_user(test_user(
        "Benjamin Cartwright Ellis",
        "benjamin@example.com",
        Role::User,
    ));
    let uc = ListUsersUseCase { users: world.user_repo() };

    let params = ListParams::resolve(&query(&[("name", "ALEX")]));
    let output = uc.execute(&params).await.unwrap();

    assert_eq!(output.total, 1);
    assert_eq!(output.users[0].name, "Alexandra Humphrey Woods");
}

#[tokio::test]
async fn should_return_no_rows_when_no_filter_matches() {
    let world = TestWorld::new();
    world.insert_user(test_user(
        "Alexandra Humphrey Woods",
        "alexandra@example.com",
        Role::User,
    ));
    let uc = ListUsersUseCase { users: world.user_repo() };

    let params = ListParams::resolve(&query(&[("name", "zzz")]));
    let output = uc.execute(&params).await.unwrap();

    assert!(output.users.is_empty());
    assert_eq!(output.total, 0);
}

#[tokio::test]
async fn should_filter_users_by_role() {
    let world = TestWorld::new();
    world.insert_user(test_user(
        "Alexandra Humphrey Woods",
        "alexandra@example.com",
        Role::Admin,
    ));
    world.insert_user(test_user(
        "Benjamin Cartwright Ellis",
        "benjamin@example.com",
        Role::User,
    ));
    let uc = ListUsersUseCase { users: world.user_repo() };

    let params = ListParams::resolve(&query(&[("role", "admin")]));
    let output = uc.execute(&params).await.unwrap();

    assert_eq!(output.total, 1);
    assert_eq!(output.users[0].role, Role::Admin);
}

#[tokio::test]
async fn should_fall_back_to_name_sort_on_unlisted_column() {
    let world = TestWorld::new();
    world.insert_user(test_user(
        "Benjamin Cartwright Ellis",
        "benjamin@example.com",
        Role::User,
    ));
    world.insert_user(test_user(
        "Alexandra Humphrey Woods",
        "alexandra@example.com",
        Role::User,
    ));
    let uc = ListUsersUseCase { users: world.user_repo() };

    // `password` is not a sortable column; the request still succeeds.
    let params: ListParams<UserFilter, UserSort> =
        ListParams::resolve(&query(&[("sortBy", "password")]));
    assert_eq!(params.sort_by, UserSort::Name);

    let output = uc.execute(&params).await.unwrap();
    assert_eq!(output.users[0].name, "Alexandra Humphrey Woods");
}

#[tokio::test]
async fn should_paginate_user_listing() {
    let world = TestWorld::new();
    for i in 0..25 {
        world.insert_user(test_user(
            &format!("Listing Fixture Person {i:02}"),
            &format!("person{i:02}@example.com"),
            Role::User,
        ));
    }
    let uc = ListUsersUseCase { users: world.user_repo() };

    let params = ListParams::resolve(&query(&[("page", "3"), ("limit", "10")]));
    let output = uc.execute(&params).await.unwrap();

    // 25 rows at 10 per page: the third page holds the last 5.
    assert_eq!(output.users.len(), 5);
    assert_eq!(output.users[0].name, "Listing Fixture Person 20");
    assert_eq!(output.total, 25);

    let info = PageInfo::new(params.page, output.total);
    assert_eq!(info.page, 3);
    assert_eq!(info.pages, 3);
}

#[tokio::test]
async fn should_return_empty_page_beyond_range() {
    let world = TestWorld::new();
    for i in 0..25 {
        world.insert_user(test_user(
            &format!("Listing Fixture Person {i:02}"),
            &format!("person{i:02}@example.com"),
            Role::User,
        ));
    }
    let uc = ListUsersUseCase { users: world.user_repo() };

    let params = ListParams::resolve(&query(&[("page", "9"), ("limit", "10")]));
    let output = uc.execute(&params).await.unwrap();

    assert!(output.users.is_empty());
    assert_eq!(output.total, 25);
}

// ── GetUserUseCase ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_average_ratings_across_owned_stores() {
    let world = TestWorld::new();
    let owner = test_user(
        "Patricia Whitmore Danvers",
        "patricia@example.com",
        Role::StoreOwner,
    );
    let first = test_store("Corner Grocery", "grocery@example.com", Some(owner.id));
    let second = test_store("Corner Bakery", "bakery@example.com", Some(owner.id));
    world.insert_user(owner.clone());
    world.insert_store(first.clone());
    world.insert_store(second.clone());

    let raters: Vec<_> = (0..2)
        .map(|i| {
            test_user(
                &format!("Rating Fixture Person {i}"),
                &format!("rater{i}@example.com"),
                Role::User,
            )
        })
        .collect();
    for rater in &raters {
        world.insert_user(rater.clone());
    }
    world.insert_rating(test_rating(raters[0].id, first.id, 5));
    world.insert_rating(test_rating(raters[1].id, first.id, 4));
    world.insert_rating(test_rating(raters[0].id, second.id, 4));
    world.insert_rating(test_rating(raters[1].id, second.id, 2));
    let uc = GetUserUseCase { users: world.user_repo() };

    let detail = uc.execute(owner.id).await.unwrap();

    // (5 + 4 + 4 + 2) / 4 across both stores.
    assert_eq!(detail.average_rating, 3.75);
    assert_eq!(detail.role, Role::StoreOwner);
}

#[tokio::test]
async fn should_report_zero_average_without_ratings() {
    let world = TestWorld::new();
    let user = test_user(
        "Margaret Elizabeth Chen",
        "margaret@example.com",
        Role::User,
    );
    world.insert_user(user.clone());
    let uc = GetUserUseCase { users: world.user_repo() };

    let detail = uc.execute(user.id).await.unwrap();

    assert_eq!(detail.average_rating, 0.0);
}

#[tokio::test]
async fn should_fail_get_for_unknown_user() {
    let world = TestWorld::new();
    let uc = GetUserUseCase { users: world.user_repo() };

    let result = uc.execute(Uuid::new_v4()).await;

    assert!(
        matches!(result, Err(ApiError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
}

// ── CreateUserUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_user_with_explicit_role() {
    let world = TestWorld::new();
    let uc = CreateUserUseCase { users: world.user_repo() };

    let user = uc
        .execute(CreateUserInput {
            role: "admin".to_owned(),
            ..create_input()
        })
        .await
        .unwrap();

    assert_eq!(user.role, Role::Admin);
    let users = world.users.lock().unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn should_reject_unknown_role() {
    let world = TestWorld::new();
    let uc = CreateUserUseCase { users: world.user_repo() };

    let result = uc
        .execute(CreateUserInput {
            role: "superadmin".to_owned(),
            ..create_input()
        })
        .await;

    assert!(
        matches!(result, Err(ApiError::InvalidInput(_))),
        "expected InvalidInput, got {result:?}"
    );
    assert!(world.users.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_create_with_duplicate_email() {
    let world = TestWorld::new();
    world.insert_user(test_user(
        "Margaret Elizabeth Chen",
        "margaret@example.com",
        Role::User,
    ));
    let uc = CreateUserUseCase { users: world.user_repo() };

    let result = uc.execute(create_input()).await;

    assert!(
        matches!(result, Err(ApiError::UserAlreadyExists)),
        "expected UserAlreadyExists, got {result:?}"
    );
}

// ── UpdatePasswordUseCase ────────────────────────────────────────────────────

#[tokio::test]
async fn should_update_password_with_correct_current() {
    let world = TestWorld::new();
    let user = test_user_with_password(
        "Margaret Elizabeth Chen",
        "margaret@example.com",
        "Secret#99",
    );
    world.insert_user(user.clone());
    let uc = UpdatePasswordUseCase { users: world.user_repo() };

    uc.execute(
        user.id,
        UpdatePasswordInput {
            current_password: "Secret#99".to_owned(),
            new_password: "Fresh#Pass1".to_owned(),
        },
    )
    .await
    .unwrap();

    let users = world.users.lock().unwrap();
    assert!(verify_password("Fresh#Pass1", &users[0].password_hash));
    assert!(!verify_password("Secret#99", &users[0].password_hash));
}

#[tokio::test]
async fn should_reject_wrong_current_password() {
    let world = TestWorld::new();
    let user = test_user_with_password(
        "Margaret Elizabeth Chen",
        "margaret@example.com",
        "Secret#99",
    );
    world.insert_user(user.clone());
    let uc = UpdatePasswordUseCase { users: world.user_repo() };

    let result = uc
        .execute(
            user.id,
            UpdatePasswordInput {
                current_password: "Wrong#999".to_owned(),
                new_password: "Fresh#Pass1".to_owned(),
            },
        )
        .await;

    assert!(
        matches!(result, Err(ApiError::WrongPassword)),
        "expected WrongPassword, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_weak_new_password() {
    let world = TestWorld::new();
    let user = test_user_with_password(
        "Margaret Elizabeth Chen",
        "margaret@example.com",
        "Secret#99",
    );
    world.insert_user(user.clone());
    let uc = UpdatePasswordUseCase { users: world.user_repo() };

    let result = uc
        .execute(
            user.id,
            UpdatePasswordInput {
                current_password: "Secret#99".to_owned(),
                new_password: "weak".to_owned(),
            },
        )
        .await;

    assert!(
        matches!(result, Err(ApiError::InvalidInput(_))),
        "expected InvalidInput, got {result:?}"
    );
}

#[tokio::test]
async fn should_fail_update_for_unknown_user() {
    let world = TestWorld::new();
    let uc = UpdatePasswordUseCase { users: world.user_repo() };

    let result = uc
        .execute(
            Uuid::new_v4(),
            UpdatePasswordInput {
                current_password: "Secret#99".to_owned(),
                new_password: "Fresh#Pass1".to_owned(),
            },
        )
        .await;

    assert!(
        matches!(result, Err(ApiError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
}
