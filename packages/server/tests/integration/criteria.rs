use crate::common::{TestApp, four_even_criteria, routes};
use judging_server::config::LimitsConfig;
use serde_json::json;

fn ids_of(body: &serde_json::Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect()
}

mod crud {
    use super::*;

    #[tokio::test]
    async fn add_update_and_remove() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();
        let id = app.create_hackathon(&token, "Criteria", json!([])).await;

        let res = app
            .post_with_token(
                &routes::criteria(id),
                &json!({ "name": "Innovation", "description": "How new is it?", "weight": 40 }),
                &token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        let innovation = res.id();
        assert_eq!(res.body["max_score"], 10);

        let res = app
            .post_with_token(&routes::criteria(id), &json!({ "name": "Design" }), &token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        let design = res.id();

        let res = app
            .patch_with_token(
                &routes::criterion(id, design),
                &json!({ "weight": 60, "max_score": 5 }),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["weight"], 60.0);
        assert_eq!(res.body["max_score"], 5);

        // `null` clears the weight back to the default.
        let res = app
            .patch_with_token(&routes::criterion(id, design), &json!({ "weight": null }), &token)
            .await;
        assert_eq!(res.status, 200);
        assert!(res.body["weight"].is_null());

        let res = app
            .delete_with_token(&routes::criterion(id, innovation), &token)
            .await;
        assert_eq!(res.status, 204);

        let res = app.get_with_token(&routes::criteria(id), &token).await;
        assert_eq!(ids_of(&res.body), vec![design as i64]);

        let res = app
            .delete_with_token(&routes::criterion(id, innovation), &token)
            .await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn rejects_invalid_criterion() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();
        let id = app.create_hackathon(&token, "Criteria", json!([])).await;

        for body in [
            json!({ "name": "   " }),
            json!({ "name": "Negative", "weight": -5 }),
            json!({ "name": "Scale", "max_score": 0 }),
        ] {
            let res = app.post_with_token(&routes::criteria(id), &body, &token).await;
            assert_eq!(res.status, 400, "{body}: {}", res.text);
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn keeps_total_weight_positive() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();
        let id = app
            .create_hackathon(
                &token,
                "Weights",
                json!([{ "name": "Only", "weight": 100 }, { "name": "Bonus", "weight": 0 }]),
            )
            .await;
        let res = app.get_with_token(&routes::criteria(id), &token).await;
        let ids = ids_of(&res.body);

        let res = app
            .patch_with_token(
                &routes::criterion(id, ids[0] as i32),
                &json!({ "weight": 0 }),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let res = app
            .delete_with_token(&routes::criterion(id, ids[0] as i32), &token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod reorder {
    use super::*;

    #[tokio::test]
    async fn moves_criteria_to_requested_order() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();
        let id = app.create_hackathon(&token, "Order", four_even_criteria()).await;
        let res = app.get_with_token(&routes::criteria(id), &token).await;
        let mut ids = ids_of(&res.body);
        ids.reverse();

        let res = app
            .put_with_token(
                &routes::criteria_reorder(id),
                &json!({ "criterion_ids": ids }),
                &token,
            )
            .await;
        assert_eq!(res.status, 204, "{}", res.text);

        let res = app.get_with_token(&routes::criteria(id), &token).await;
        assert_eq!(ids_of(&res.body), ids);
        assert_eq!(res.body[0]["name"], "Impact");

        let res = app
            .put_with_token(
                &routes::criteria_reorder(id),
                &json!({ "criterion_ids": &ids[..3] }),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);

        let res = app
            .put_with_token(
                &routes::criteria_reorder(id),
                &json!({ "criterion_ids": [ids[0], ids[0], ids[1], ids[2]] }),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);
    }
}

mod access {
    use super::*;

    #[tokio::test]
    async fn locked_once_judging_starts() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();
        let id = app.create_hackathon(&token, "Locked", four_even_criteria()).await;
        let res = app.get_with_token(&routes::criteria(id), &token).await;
        let first = ids_of(&res.body)[0] as i32;

        app.set_status(&token, id, "judging").await;

        let res = app
            .post_with_token(&routes::criteria(id), &json!({ "name": "Late" }), &token)
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "PHASE_CLOSED");

        let res = app
            .patch_with_token(&routes::criterion(id, first), &json!({ "name": "Renamed" }), &token)
            .await;
        assert_eq!(res.status, 409);

        let res = app.delete_with_token(&routes::criterion(id, first), &token).await;
        assert_eq!(res.status, 409);

        // Reading is unaffected.
        let res = app.get_with_token(&routes::criteria(id), &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn only_managers_edit() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();
        let id = app.create_hackathon(&token, "Guarded", json!([])).await;
        app.set_status(&token, id, "registration-open").await;

        let participant = app.participant_token(100);
        let res = app
            .post_with_token(&routes::criteria(id), &json!({ "name": "Sneaky" }), &participant)
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");

        let res = app.get_with_token(&routes::criteria(id), &participant).await;
        assert_eq!(res.status, 200);
    }
}

mod limits {
    use super::*;

    #[tokio::test]
    async fn plan_limit_on_add() {
        let app = TestApp::spawn_with_limits(LimitsConfig {
            max_judges_per_hackathon: 10,
            max_criteria: 4,
        })
        .await;
        let token = app.organizer_token();
        let id = app.create_hackathon(&token, "Full", four_even_criteria()).await;

        let res = app
            .post_with_token(&routes::criteria(id), &json!({ "name": "Fifth" }), &token)
            .await;
        assert_eq!(res.status, 402);
        assert_eq!(res.body["code"], "PLAN_LIMIT_REACHED");
    }
}
