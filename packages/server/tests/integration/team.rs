use crate::common::{TestApp, routes};
use serde_json::json;

mod team_creation {
    use super::*;

    #[tokio::test]
    async fn creator_becomes_first_member() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("ctf1", "team").await;
        let alice = app.create_user("alice").await;

        let res = app
            .post(
                &routes::competition_teams(competition_id),
                &json!({ "name": "T1", "creator_id": alice }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["name"], "T1");
        assert_eq!(res.body["score"], 0);
        assert_eq!(res.body["member_ids"], json!([alice]));
    }

    #[tokio::test]
    async fn individual_competition_has_no_teams() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("solo", "user").await;
        let alice = app.create_user("alice").await;

        let res = app
            .post(
                &routes::competition_teams(competition_id),
                &json!({ "name": "T1", "creator_id": alice }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn creator_already_in_a_team_is_conflict() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("ctf1", "team").await;
        let alice = app.create_user("alice").await;
        app.create_team(competition_id, "T1", alice).await;

        let res = app
            .post(
                &routes::competition_teams(competition_id),
                &json!({ "name": "T2", "creator_id": alice }),
            )
            .await;

        assert_eq!(res.status, 409);
        // The failed create must not leave an empty team behind.
        let teams = app.get(&routes::competition_teams(competition_id)).await;
        assert_eq!(teams.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_competition_is_404() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app
            .post(
                &routes::competition_teams(999_999),
                &json!({ "name": "T1", "creator_id": alice }),
            )
            .await;

        assert_eq!(res.status, 404);
    }
}

mod membership {
    use super::*;

    #[tokio::test]
    async fn join_adds_member() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("ctf1", "team").await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let team_id = app.create_team(competition_id, "T1", alice).await;

        app.join_team(team_id, bob).await;
        let res = app.get(&routes::team(team_id)).await;

        assert_eq!(res.status, 200);
        let members = res.body["member_ids"].as_array().unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.contains(&json!(bob)));
    }

    #[tokio::test]
    async fn one_team_per_competition() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("ctf1", "team").await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        app.create_team(competition_id, "T1", alice).await;
        let other = app.create_team(competition_id, "T2", bob).await;

        let res = app
            .post(&routes::team_join(other), &json!({ "user_id": alice }))
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "CONFLICT");
    }

    #[tokio::test]
    async fn same_user_can_play_in_two_competitions() {
        let app = TestApp::spawn().await;
        let first = app.create_competition("ctf1", "team").await;
        let second = app.create_competition("ctf2", "team").await;
        let alice = app.create_user("alice").await;

        app.create_team(first, "T1", alice).await;
        app.create_team(second, "T1", alice).await;

        let teams = app.get(&routes::competition_teams(second)).await;
        assert_eq!(teams.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn leaving_twice_is_404() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("ctf1", "team").await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let team_id = app.create_team(competition_id, "T1", alice).await;
        app.join_team(team_id, bob).await;

        let first = app.delete(&routes::team_member(team_id, bob)).await;
        let second = app.delete(&routes::team_member(team_id, bob)).await;

        assert_eq!(first.status, 204);
        assert_eq!(second.status, 404);
    }

    #[tokio::test]
    async fn user_who_left_is_no_longer_eligible() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("ctf1", "team").await;
        let exercise_id = app.create_exercise("pwn1", "CTF{x}", 100).await;
        app.link_exercise(competition_id, exercise_id).await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let team_id = app.create_team(competition_id, "T1", alice).await;
        app.join_team(team_id, bob).await;
        app.delete(&routes::team_member(team_id, bob)).await;

        let res = app.submit(bob, exercise_id, competition_id, "CTF{x}").await;

        assert_eq!(res.status, 403);
        assert_eq!(res.code(), "NOT_ELIGIBLE");
    }
}
