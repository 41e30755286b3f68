use crate::common::{TestApp, routes};

fn ranks(body: &serde_json::Value) -> Vec<(String, i64, i64)> {
    body["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["entity_name"].as_str().unwrap().to_string(),
                e["score"].as_i64().unwrap(),
                e["rank"].as_i64().unwrap(),
            )
        })
        .collect()
}

mod team_mode {
    use super::*;

    #[tokio::test]
    async fn lists_every_team_including_zero_scores() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("ctf1", "team").await;
        let exercise_id = app.create_exercise("pwn1", "CTF{x}", 100).await;
        app.link_exercise(competition_id, exercise_id).await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        app.create_team(competition_id, "T1", alice).await;
        app.create_team(competition_id, "T2", bob).await;

        app.submit(alice, exercise_id, competition_id, "CTF{x}").await;
        let res = app.get(&routes::scoreboard(competition_id)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["scoring_mode"], "team");
        assert_eq!(
            ranks(&res.body),
            vec![("T1".into(), 100, 1), ("T2".into(), 0, 2)]
        );
    }

    #[tokio::test]
    async fn ties_share_rank_and_break_by_name() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("ctf1", "team").await;
        let big = app.create_exercise("big", "CTF{big}", 300).await;
        let small = app.create_exercise("small", "CTF{small}", 100).await;
        app.link_exercise(competition_id, big).await;
        app.link_exercise(competition_id, small).await;

        let mut captains = Vec::new();
        for (user, team) in [("u1", "delta"), ("u2", "bravo"), ("u3", "alpha"), ("u4", "charlie")] {
            let user_id = app.create_user(user).await;
            app.create_team(competition_id, team, user_id).await;
            captains.push(user_id);
        }

        // delta 300, bravo 100, alpha 100, charlie 0
        app.submit(captains[0], big, competition_id, "CTF{big}").await;
        app.submit(captains[1], small, competition_id, "CTF{small}").await;
        app.submit(captains[2], small, competition_id, "CTF{small}").await;

        let res = app.get(&routes::scoreboard(competition_id)).await;

        assert_eq!(
            ranks(&res.body),
            vec![
                ("delta".into(), 300, 1),
                ("alpha".into(), 100, 2),
                ("bravo".into(), 100, 2),
                ("charlie".into(), 0, 4),
            ]
        );
    }

    #[tokio::test]
    async fn empty_competition_has_empty_scoreboard() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("ctf1", "team").await;

        let res = app.get(&routes::scoreboard(competition_id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["entries"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unknown_competition_is_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::scoreboard(999_999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn member_leaving_keeps_team_score() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("ctf1", "team").await;
        let exercise_id = app.create_exercise("pwn1", "CTF{x}", 100).await;
        app.link_exercise(competition_id, exercise_id).await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let team_id = app.create_team(competition_id, "T1", alice).await;
        app.join_team(team_id, bob).await;

        app.submit(bob, exercise_id, competition_id, "CTF{x}").await;
        let res = app.delete(&routes::team_member(team_id, bob)).await;
        assert_eq!(res.status, 204);

        let res = app.get(&routes::scoreboard(competition_id)).await;
        assert_eq!(ranks(&res.body), vec![("T1".into(), 100, 1)]);
    }
}

mod user_mode {
    use super::*;

    #[tokio::test]
    async fn scores_are_derived_from_solves() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("solo", "user").await;
        let first = app.create_exercise("rev1", "CTF{r}", 50).await;
        let second = app.create_exercise("web1", "CTF{w}", 150).await;
        app.link_exercise(competition_id, first).await;
        app.link_exercise(competition_id, second).await;

        let carol = app.create_user("carol").await;
        let dave = app.create_user("dave").await;
        let erin = app.create_user("erin").await;
        for user_id in [carol, dave, erin] {
            app.register_user(competition_id, user_id).await;
        }

        let res = app.submit(carol, first, competition_id, "CTF{r}").await;
        assert_eq!(res.body["outcome"], "accepted");
        assert_eq!(res.body["entity_kind"], "user");
        assert_eq!(res.body["entity_id"], carol);
        app.submit(dave, first, competition_id, "CTF{r}").await;
        let res = app.submit(dave, second, competition_id, "CTF{w}").await;
        assert_eq!(res.body["entity_score"], 200);

        let res = app.get(&routes::scoreboard(competition_id)).await;

        assert_eq!(res.body["scoring_mode"], "user");
        assert_eq!(
            ranks(&res.body),
            vec![
                ("dave".into(), 200, 1),
                ("carol".into(), 50, 2),
                ("erin".into(), 0, 3),
            ]
        );
        assert_eq!(app.solve_sum(competition_id, "user", dave).await, 200);
    }

    #[tokio::test]
    async fn solves_are_per_user() {
        let app = TestApp::spawn().await;
        let competition_id = app.create_competition("solo", "user").await;
        let exercise_id = app.create_exercise("rev1", "CTF{r}", 50).await;
        app.link_exercise(competition_id, exercise_id).await;
        let carol = app.create_user("carol").await;
        let dave = app.create_user("dave").await;
        app.register_user(competition_id, carol).await;
        app.register_user(competition_id, dave).await;

        let a = app.submit(carol, exercise_id, competition_id, "CTF{r}").await;
        let b = app.submit(dave, exercise_id, competition_id, "CTF{r}").await;
        let c = app.submit(carol, exercise_id, competition_id, "CTF{r}").await;

        assert_eq!(a.body["outcome"], "accepted");
        assert_eq!(b.body["outcome"], "accepted");
        assert_eq!(c.body["outcome"], "already_solved");
        assert_eq!(app.solve_count(competition_id).await, 2);
    }
}
