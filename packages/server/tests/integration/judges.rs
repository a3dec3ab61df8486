use crate::common::{TestApp, routes};
use judging_server::config::LimitsConfig;
use serde_json::json;

mod invitations {
    use super::*;

    #[tokio::test]
    async fn invite_accept_and_list() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let id = app.create_hackathon(&organizer, "Judged", json!([])).await;

        let res = app
            .post_with_token(
                &routes::judges(id),
                &json!({ "user_id": 10, "username": "grace" }),
                &organizer,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["user_id"], 10);
        assert!(res.body["accepted_at"].is_null());

        let judge = app.token(10, "grace", "judge");
        let res = app
            .post_with_token(&routes::judges_accept(id), &json!({}), &judge)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let accepted_at = res.body["accepted_at"].clone();
        assert!(accepted_at.is_string());

        // Accepting again changes nothing.
        let res = app
            .post_with_token(&routes::judges_accept(id), &json!({}), &judge)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["accepted_at"], accepted_at);

        let res = app.get_with_token(&routes::judges(id), &organizer).await;
        assert_eq!(res.status, 200);
        let judges = res.body.as_array().unwrap();
        assert_eq!(judges.len(), 1);
        assert_eq!(judges[0]["username"], "grace");

        let res = app.get_with_token(&routes::judges(id), &judge).await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn duplicate_invitation_conflicts() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let id = app.create_hackathon(&organizer, "Judged", json!([])).await;
        let body = json!({ "user_id": 10, "username": "grace" });

        let res = app.post_with_token(&routes::judges(id), &body, &organizer).await;
        assert_eq!(res.status, 201);
        let res = app.post_with_token(&routes::judges(id), &body, &organizer).await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn accept_without_invitation() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let id = app.create_hackathon(&organizer, "Judged", json!([])).await;

        let uninvited = app.token(11, "mallory", "judge");
        let res = app
            .post_with_token(&routes::judges_accept(id), &json!({}), &uninvited)
            .await;
        assert_eq!(res.status, 404);

        let participant = app.participant_token(100);
        let res = app
            .post_with_token(&routes::judges_accept(id), &json!({}), &participant)
            .await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn invite_validation() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let id = app.create_hackathon(&organizer, "Judged", json!([])).await;

        let res = app
            .post_with_token(
                &routes::judges(id),
                &json!({ "user_id": 0, "username": "nobody" }),
                &organizer,
            )
            .await;
        assert_eq!(res.status, 400);

        let res = app
            .post_with_token(
                &routes::judges(id),
                &json!({ "user_id": 10, "username": "" }),
                &organizer,
            )
            .await;
        assert_eq!(res.status, 400);
    }
}

mod limits {
    use super::*;

    #[tokio::test]
    async fn judge_limit_is_a_plan_limit() {
        let app = TestApp::spawn_with_limits(LimitsConfig {
            max_judges_per_hackathon: 2,
            max_criteria: 20,
        })
        .await;
        let organizer = app.organizer_token();
        let id = app.create_hackathon(&organizer, "Small plan", json!([])).await;

        for user_id in [10, 11] {
            let res = app
                .post_with_token(
                    &routes::judges(id),
                    &json!({ "user_id": user_id, "username": format!("judge{user_id}") }),
                    &organizer,
                )
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
        }

        let res = app
            .post_with_token(
                &routes::judges(id),
                &json!({ "user_id": 12, "username": "judge12" }),
                &organizer,
            )
            .await;
        assert_eq!(res.status, 402);
        assert_eq!(res.body["code"], "PLAN_LIMIT_REACHED");

        // Removing a judge frees the slot.
        let res = app.delete_with_token(&routes::judge(id, 10), &organizer).await;
        assert_eq!(res.status, 204);
        let res = app
            .post_with_token(
                &routes::judges(id),
                &json!({ "user_id": 12, "username": "judge12" }),
                &organizer,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }
}

mod removal {
    use super::*;

    #[tokio::test]
    async fn remove_unknown_judge() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let id = app.create_hackathon(&organizer, "Judged", json!([])).await;

        let res = app.delete_with_token(&routes::judge(id, 99), &organizer).await;
        assert_eq!(res.status, 404);
    }
}
