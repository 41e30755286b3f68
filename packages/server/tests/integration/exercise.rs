use crate::common::{TestApp, routes};
use serde_json::json;

mod exercise_crud {
    use super::*;

    #[tokio::test]
    async fn response_never_contains_the_flag() {
        let app = TestApp::spawn().await;
        let id = app.create_exercise("pwn1", "CTF{x}", 100).await;

        let res = app.get(&routes::exercise(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"], "pwn1");
        assert_eq!(res.body["points"], 100);
        assert_eq!(res.body["is_active"], true);
        assert!(res.body.get("flag").is_none());
        assert!(!res.text.contains("CTF{x}"));
    }

    #[tokio::test]
    async fn non_positive_points_are_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::EXERCISES,
                &json!({
                    "name": "pwn1",
                    "category": "pwn",
                    "difficulty": "easy",
                    "flag": "CTF{x}",
                    "points": 0,
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn padded_flag_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::EXERCISES,
                &json!({
                    "name": "pwn1",
                    "category": "pwn",
                    "difficulty": "easy",
                    "flag": " CTF{x} ",
                    "points": 100,
                }),
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn description_can_be_cleared_with_null() {
        let app = TestApp::spawn().await;
        let id = app.create_exercise("pwn1", "CTF{x}", 100).await;
        app.patch(&routes::exercise(id), &json!({ "description": "smash it" }))
            .await;

        let res = app
            .patch(&routes::exercise(id), &json!({ "description": null }))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["description"].is_null());
    }

    #[tokio::test]
    async fn filters_by_category() {
        let app = TestApp::spawn().await;
        app.create_exercise("pwn1", "CTF{a}", 100).await;
        app.post(
            routes::EXERCISES,
            &json!({
                "name": "web1",
                "category": "web",
                "difficulty": "hard",
                "flag": "CTF{b}",
                "points": 200,
            }),
        )
        .await;

        let res = app
            .get(&format!("{}?category=web", routes::EXERCISES))
            .await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"], "web1");
    }
}

mod flag_changes {
    use super::*;

    #[tokio::test]
    async fn blocked_while_linked_competition_is_running() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("ctf1", "team").await;
        let id = app.create_exercise("pwn1", "CTF{x}", 100).await;
        app.link_exercise(competition_id, id).await;

        let res = app
            .patch(&routes::exercise(id), &json!({ "flag": "CTF{new}" }))
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.code(), "CONFLICT");
    }

    #[tokio::test]
    async fn allowed_when_no_linked_competition_is_running() {
        let app = TestApp::spawn().await;
        let competition_id = app
            .post(
                routes::COMPETITIONS,
                &json!({
                    "name": "future",
                    "organizer": "Security Club",
                    "start_date": "2099-01-01T00:00:00Z",
                    "end_date": "2099-01-02T00:00:00Z",
                    "scoring_mode": "team",
                }),
            )
            .await
            .id();
        let id = app.create_exercise("pwn1", "CTF{x}", 100).await;
        app.link_exercise(competition_id, id).await;

        let res = app
            .patch(&routes::exercise(id), &json!({ "flag": "CTF{new}" }))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
    }

    #[tokio::test]
    async fn resending_the_same_flag_is_not_a_change() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("ctf1", "team").await;
        let id = app.create_exercise("pwn1", "CTF{x}", 100).await;
        app.link_exercise(competition_id, id).await;

        let res = app
            .patch(
                &routes::exercise(id),
                &json!({ "flag": "CTF{x}", "name": "pwn-one" }),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "pwn-one");
    }
}

mod exercise_deletion {
    use super::*;

    #[tokio::test]
    async fn revokes_points_from_team_scores() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("ctf1", "team").await;
        let doomed = app.create_exercise("pwn1", "CTF{x}", 100).await;
        let kept = app.create_exercise("web1", "CTF{w}", 40).await;
        app.link_exercise(competition_id, doomed).await;
        app.link_exercise(competition_id, kept).await;
        let alice = app.create_user("alice").await;
        let team_id = app.create_team(competition_id, "T1", alice).await;
        app.submit(alice, doomed, competition_id, "CTF{x}").await;
        app.submit(alice, kept, competition_id, "CTF{w}").await;
        assert_eq!(app.team_score(team_id).await, 140);

        let res = app.delete(&routes::exercise(doomed)).await;
        assert_eq!(res.status, 204);

        assert_eq!(app.team_score(team_id).await, 40);
        assert_eq!(app.solve_sum(competition_id, "team", team_id).await, 40);
        assert_eq!(app.get(&routes::exercise(doomed)).await.status, 404);
    }

    #[tokio::test]
    async fn missing_exercise_is_404() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::exercise(999_999)).await;

        assert_eq!(res.status, 404);
    }
}

mod tagging {
    use super::*;

    async fn create_tag(app: &TestApp, name: &str) -> i32 {
        let res = app.post(routes::TAGS, &json!({ "name": name })).await;
        assert_eq!(res.status, 201, "create_tag failed: {}", res.text);
        res.id()
    }

    #[tokio::test]
    async fn attach_filter_and_detach() {
        let app = TestApp::spawn().await;
        let tagged = app.create_exercise("pwn1", "CTF{a}", 100).await;
        app.create_exercise("pwn2", "CTF{b}", 100).await;
        let tag_id = create_tag(&app, "Heap").await;

        let res = app.post_empty(&routes::exercise_tag(tagged, tag_id)).await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["tags"], json!(["heap"]));

        let res = app
            .get(&format!("{}?tag_id={tag_id}", routes::EXERCISES))
            .await;
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["id"], tagged);

        let res = app.delete(&routes::exercise_tag(tagged, tag_id)).await;
        assert_eq!(res.status, 204);
        let res = app.delete(&routes::exercise_tag(tagged, tag_id)).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn attaching_twice_is_conflict() {
        let app = TestApp::spawn().await;
        let id = app.create_exercise("pwn1", "CTF{a}", 100).await;
        let tag_id = create_tag(&app, "web").await;
        app.post_empty(&routes::exercise_tag(id, tag_id)).await;

        let res = app.post_empty(&routes::exercise_tag(id, tag_id)).await;

        assert_eq!(res.status, 409);
    }
}
