use crate::common::{TestApp, four_even_criteria, routes};
use serde_json::json;

mod create {
    use super::*;

    #[tokio::test]
    async fn organizer_creates_draft_with_criteria() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();

        let res = app
            .post_with_token(
                routes::HACKATHONS,
                &json!({
                    "title": "  Spring Hack  ",
                    "description": "Build something.",
                    "hacking_starts_at": "2026-03-01T09:00:00Z",
                    "submission_deadline": "2026-03-02T17:00:00Z",
                    "judging_criteria": [
                        { "name": "Innovation", "weight": 60 },
                        { "name": "Design", "max_score": 5 },
                    ],
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["title"], "Spring Hack");
        assert_eq!(res.body["status"], "draft");
        assert_eq!(res.body["owner_id"], 1);
        assert_eq!(res.body["hacking_starts_at"], "2026-03-01T09:00:00Z");

        let criteria = res.body["judging_criteria"].as_array().unwrap();
        assert_eq!(criteria.len(), 2);
        assert_eq!(criteria[0]["name"], "Innovation");
        assert_eq!(criteria[0]["max_score"], 10);
        assert_eq!(criteria[1]["max_score"], 5);
        assert!(criteria[1]["weight"].is_null());
    }

    #[tokio::test]
    async fn participant_cannot_create() {
        let app = TestApp::spawn().await;
        let token = app.participant_token(100);

        let res = app
            .post_with_token(
                routes::HACKATHONS,
                &json!({ "title": "Nope", "description": "" }),
                &token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn requires_token() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::HACKATHONS, &json!({ "title": "x", "description": "" }))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn rejects_zero_total_weight() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();

        let res = app
            .post_with_token(
                routes::HACKATHONS,
                &json!({
                    "title": "Weightless",
                    "description": "",
                    "judging_criteria": [
                        { "name": "A", "weight": 0 },
                        { "name": "B", "weight": 0 },
                    ],
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_weight_above_a_hundred() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();

        let res = app
            .post_with_token(
                routes::HACKATHONS,
                &json!({
                    "title": "Heavy",
                    "description": "",
                    "judging_criteria": [
                        { "name": "A", "weight": 1e308 },
                        { "name": "B", "weight": 1e308 },
                    ],
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "Criterion weight must be between 0 and 100");
    }

    #[tokio::test]
    async fn rejects_out_of_order_schedule() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();

        let res = app
            .post_with_token(
                routes::HACKATHONS,
                &json!({
                    "title": "Backwards",
                    "description": "",
                    "hacking_starts_at": "2026-03-05T09:00:00Z",
                    "submission_deadline": "2026-03-02T17:00:00Z",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn too_many_criteria_hits_plan_limit() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();
        let criteria: Vec<_> = (0..21)
            .map(|i| json!({ "name": format!("C{i}"), "weight": 1 }))
            .collect();

        let res = app
            .post_with_token(
                routes::HACKATHONS,
                &json!({ "title": "Big", "description": "", "judging_criteria": criteria }),
                &token,
            )
            .await;

        assert_eq!(res.status, 402);
        assert_eq!(res.body["code"], "PLAN_LIMIT_REACHED");
    }
}

mod visibility {
    use super::*;

    #[tokio::test]
    async fn draft_is_hidden_from_participants() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let participant = app.participant_token(100);
        let id = app.create_hackathon(&organizer, "Secret", json!([])).await;

        let res = app.get_with_token(&routes::hackathon(id), &participant).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");

        let res = app.get_with_token(routes::HACKATHONS, &participant).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 0);

        app.set_status(&organizer, id, "registration-open").await;

        let res = app.get_with_token(&routes::hackathon(id), &participant).await;
        assert_eq!(res.status, 200);
        let res = app.get_with_token(routes::HACKATHONS, &participant).await;
        assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn list_filters_by_search_and_status() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let a = app.create_hackathon(&organizer, "Climate Hack", json!([])).await;
        app.create_hackathon(&organizer, "Fintech Jam", json!([])).await;
        app.set_status(&organizer, a, "hacking").await;

        let res = app
            .get_with_token(&format!("{}?search=climate", routes::HACKATHONS), &organizer)
            .await;
        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["title"], "Climate Hack");

        let res = app
            .get_with_token(&format!("{}?status=draft", routes::HACKATHONS), &organizer)
            .await;
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["title"], "Fintech Jam");
    }

    #[tokio::test]
    async fn huge_page_is_empty_not_an_error() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        app.create_hackathon(&organizer, "Climate Hack", json!([])).await;

        let res = app
            .get_with_token(
                &format!("{}?page={}&per_page=100", routes::HACKATHONS, u64::MAX),
                &organizer,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["data"].as_array().unwrap().is_empty());
        assert_eq!(res.body["pagination"]["total"], 1);
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn other_organizer_cannot_update() {
        let app = TestApp::spawn().await;
        let owner = app.organizer_token();
        let other = app.token(2, "rival", "organizer");
        let id = app.create_hackathon(&owner, "Mine", json!([])).await;
        app.set_status(&owner, id, "registration-open").await;

        let res = app
            .patch_with_token(&routes::hackathon(id), &json!({ "title": "Ours" }), &other)
            .await;
        assert_eq!(res.status, 403);

        let admin = app.token(3, "root", "admin");
        let res = app
            .patch_with_token(&routes::hackathon(id), &json!({ "title": "Ours" }), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "Ours");
    }

    #[tokio::test]
    async fn empty_patch_returns_current() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();
        let id = app.create_hackathon(&token, "Same", four_even_criteria()).await;

        let res = app.patch_with_token(&routes::hackathon(id), &json!({}), &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Same");
        assert_eq!(res.body["judging_criteria"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn criteria_replace_until_judging() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();
        let id = app.create_hackathon(&token, "Evolving", four_even_criteria()).await;

        let res = app
            .patch_with_token(
                &routes::hackathon(id),
                &json!({ "judging_criteria": [{ "name": "Overall", "weight": 100 }] }),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        let criteria = res.body["judging_criteria"].as_array().unwrap();
        assert_eq!(criteria.len(), 1);
        assert_eq!(criteria[0]["name"], "Overall");

        app.set_status(&token, id, "judging").await;

        let res = app
            .patch_with_token(
                &routes::hackathon(id),
                &json!({ "judging_criteria": [{ "name": "Changed", "weight": 100 }] }),
                &token,
            )
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "PHASE_CLOSED");

        // Status moves are still allowed, in either direction.
        app.set_status(&token, id, "submission").await;
    }

    #[tokio::test]
    async fn schedule_merge_must_stay_ordered() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();
        let id = app.create_hackathon(&token, "Timed", json!([])).await;

        let res = app
            .patch_with_token(
                &routes::hackathon(id),
                &json!({ "submission_deadline": "2026-03-02T17:00:00Z" }),
                &token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app
            .patch_with_token(
                &routes::hackathon(id),
                &json!({ "hacking_starts_at": "2026-03-03T09:00:00Z" }),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod phase {
    use super::*;

    #[tokio::test]
    async fn reports_permissions_for_status() {
        let app = TestApp::spawn().await;
        let token = app.organizer_token();
        let id = app.create_hackathon(&token, "Gated", json!([])).await;

        let res = app.get_with_token(&routes::phase(id), &token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "draft");
        assert_eq!(res.body["permissions"]["can_form_teams"], true);
        assert_eq!(res.body["permissions"]["can_judge"], false);

        app.set_status(&token, id, "judging").await;

        let res = app.get_with_token(&routes::phase(id), &token).await;
        let permissions = &res.body["permissions"];
        assert_eq!(permissions["can_form_teams"], false);
        assert_eq!(permissions["can_submit_projects"], false);
        assert_eq!(permissions["can_judge"], true);
        assert_eq!(permissions["can_view_results"], false);

        let denied = res.body["denied"].as_array().unwrap();
        assert_eq!(denied.len(), 3);
        assert!(
            denied
                .iter()
                .any(|d| d["action"] == "view_results"
                    && d["message"] == "Results are available once judging completes")
        );
        assert_eq!(res.body["timeline"].as_array().unwrap().len(), 5);
    }
}
