use crate::common::{TestApp, routes};
use serde_json::json;

fn valid_competition_body(name: &str, scoring_mode: &str) -> serde_json::Value {
    json!({
        "name": name,
        "organizer": "Security Club",
        "start_date": "2099-01-01T00:00:00Z",
        "end_date": "2099-01-02T00:00:00Z",
        "scoring_mode": scoring_mode,
    })
}

mod competition_creation {
    use super::*;

    #[tokio::test]
    async fn creates_with_generated_invite_code() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::COMPETITIONS, &valid_competition_body("ctf1", "team"))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["name"], "ctf1");
        assert_eq!(res.body["scoring_mode"], "team");
        assert_eq!(res.body["status"], "created");
        assert_eq!(res.body["invite_code"].as_str().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn duplicate_invite_code_is_conflict() {
        let app = TestApp::spawn().await;
        let mut body = valid_competition_body("ctf1", "team");
        body["invite_code"] = json!("SAMECODE");
        let res = app.post(routes::COMPETITIONS, &body).await;
        assert_eq!(res.status, 201, "{}", res.text);

        body["name"] = json!("ctf2");
        let res = app.post(routes::COMPETITIONS, &body).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "CONFLICT");
    }

    #[tokio::test]
    async fn end_before_start_is_rejected() {
        let app = TestApp::spawn().await;
        let mut body = valid_competition_body("ctf1", "team");
        body["end_date"] = json!("2098-01-01T00:00:00Z");

        let res = app.post(routes::COMPETITIONS, &body).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_scoring_mode_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::COMPETITIONS, &valid_competition_body("ctf1", "clan"))
            .await;

        assert_eq!(res.status, 400);
    }
}

mod competition_update {
    use super::*;

    #[tokio::test]
    async fn renames_competition() {
        let app = TestApp::spawn().await;
        let id = app.create_competition("ctf1", "team").await;

        let res = app
            .patch(&routes::competition(id), &json!({ "name": "ctf-final" }))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "ctf-final");
    }

    #[tokio::test]
    async fn scoring_mode_is_immutable() {
        let app = TestApp::spawn().await;
        let id = app.create_competition("ctf1", "team").await;

        let same = app
            .patch(&routes::competition(id), &json!({ "scoring_mode": "team" }))
            .await;
        assert_eq!(same.status, 200, "{}", same.text);

        let changed = app
            .patch(&routes::competition(id), &json!({ "scoring_mode": "user" }))
            .await;
        assert_eq!(changed.status, 400);
        assert_eq!(changed.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn end_date_is_checked_against_stored_start() {
        let app = TestApp::spawn().await;
        let id = app.create_competition("ctf1", "team").await;

        let res = app
            .patch(
                &routes::competition(id),
                &json!({ "end_date": "2019-01-01T00:00:00Z" }),
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn missing_competition_is_404() {
        let app = TestApp::spawn().await;

        let res = app
            .patch(&routes::competition(999_999), &json!({ "name": "x" }))
            .await;

        assert_eq!(res.status, 404);
    }
}

mod competition_listing {
    use super::*;

    #[tokio::test]
    async fn paginates_and_searches() {
        let app = TestApp::spawn().await;
        for name in ["Spring CTF", "Summer CTF", "Autumn Quals"] {
            app.create_competition(name, "team").await;
        }

        let res = app
            .get(&format!("{}?per_page=2", routes::COMPETITIONS))
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
        assert_eq!(res.body["pagination"]["total"], 3);
        assert_eq!(res.body["pagination"]["total_pages"], 2);

        let res = app
            .get(&format!("{}?search=ctf", routes::COMPETITIONS))
            .await;
        assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn bad_query_is_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .get(&format!("{}?page=abc", routes::COMPETITIONS))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }
}

mod registration {
    use super::*;

    #[tokio::test]
    async fn registers_once() {
        let app = TestApp::spawn().await;
        let id = app.create_competition("solo", "user").await;
        let user_id = app.create_user("carol").await;

        app.register_user(id, user_id).await;
        let again = app
            .post(&routes::register(id), &json!({ "user_id": user_id }))
            .await;

        assert_eq!(again.status, 409);
        assert_eq!(again.code(), "CONFLICT");
    }

    #[tokio::test]
    async fn unknown_user_is_404() {
        let app = TestApp::spawn().await;
        let id = app.create_competition("solo", "user").await;

        let res = app
            .post(&routes::register(id), &json!({ "user_id": 999_999 }))
            .await;

        assert_eq!(res.status, 404);
    }
}

mod exercise_links {
    use super::*;

    #[tokio::test]
    async fn lists_linked_exercises_without_flags() {
        let app = TestApp::spawn().await;
        let id = app.create_competition("ctf1", "team").await;
        let exercise_id = app.create_exercise("pwn1", "CTF{x}", 100).await;
        app.link_exercise(id, exercise_id).await;

        let res = app.get(&routes::competition_exercises(id)).await;

        assert_eq!(res.status, 200);
        let list = res.body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["id"], exercise_id);
        assert!(list[0].get("flag").is_none());
    }

    #[tokio::test]
    async fn linking_twice_is_conflict() {
        let app = TestApp::spawn().await;
        let id = app.create_competition("ctf1", "team").await;
        let exercise_id = app.create_exercise("pwn1", "CTF{x}", 100).await;
        app.link_exercise(id, exercise_id).await;

        let res = app
            .post_empty(&routes::competition_exercise(id, exercise_id))
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn unlinks_unsolved_exercise() {
        let app = TestApp::spawn().await;
        let id = app.create_competition("ctf1", "team").await;
        let exercise_id = app.create_exercise("pwn1", "CTF{x}", 100).await;
        app.link_exercise(id, exercise_id).await;

        let res = app
            .delete(&routes::competition_exercise(id, exercise_id))
            .await;
        assert_eq!(res.status, 204);

        let list = app.get(&routes::competition_exercises(id)).await;
        assert!(list.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn refuses_to_unlink_solved_exercise() {
        let app = TestApp::spawn().await;
        let id = app.create_competition("ctf1", "team").await;
        let exercise_id = app.create_exercise("pwn1", "CTF{x}", 100).await;
        app.link_exercise(id, exercise_id).await;
        let alice = app.create_user("alice").await;
        app.create_team(id, "T1", alice).await;
        app.submit(alice, exercise_id, id, "CTF{x}").await;

        let res = app
            .delete(&routes::competition_exercise(id, exercise_id))
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "CONFLICT");
    }
}

mod competition_deletion {
    use super::*;

    #[tokio::test]
    async fn cascades_to_teams_and_solves() {
        let app = TestApp::spawn().await;
        let id = app.create_competition("ctf1", "team").await;
        let exercise_id = app.create_exercise("pwn1", "CTF{x}", 100).await;
        app.link_exercise(id, exercise_id).await;
        let alice = app.create_user("alice").await;
        let team_id = app.create_team(id, "T1", alice).await;
        app.submit(alice, exercise_id, id, "CTF{x}").await;

        let res = app.delete(&routes::competition(id)).await;
        assert_eq!(res.status, 204);

        assert_eq!(app.get(&routes::competition(id)).await.status, 404);
        assert_eq!(app.get(&routes::team(team_id)).await.status, 404);
        assert_eq!(app.solve_count(id).await, 0);
        // Exercises outlive the competitions they were used in.
        assert_eq!(app.get(&routes::exercise(exercise_id)).await.status, 200);
    }
}
