use crate::common::{TestApp, routes};
use serde_json::json;

mod create {
    use super::*;

    #[tokio::test]
    async fn team_member_submits_during_hacking() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let id = app.create_hackathon(&organizer, "Ship it", json!([])).await;
        app.set_status(&organizer, id, "hacking").await;

        let alice = app.participant_token(100);
        let team_id = app.create_team(&alice, id, "Solar").await;

        let res = app
            .post_with_token(
                &routes::hackathon_submissions(id),
                &json!({
                    "team_id": team_id,
                    "project_name": "Solar Sense",
                    "description": "Panels that talk.",
                    "track": " Climate ",
                    "repository_url": "https://example.com/solar-sense",
                }),
                &alice,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "submitted");
        assert_eq!(res.body["track"], "Climate");
        assert_eq!(res.body["team_name"], "Solar");
        assert_eq!(res.body["review_count"], 0);
        assert!(res.body["average_score"].is_null());
    }

    #[tokio::test]
    async fn closed_before_hacking_and_after_submission() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let id = app.create_hackathon(&organizer, "Ship it", json!([])).await;
        app.set_status(&organizer, id, "registration-open").await;

        let alice = app.participant_token(100);
        let team_id = app.create_team(&alice, id, "Solar").await;
        let body = json!({ "team_id": team_id, "project_name": "Early", "track": "Climate" });

        let res = app
            .post_with_token(&routes::hackathon_submissions(id), &body, &alice)
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "PHASE_CLOSED");
        assert_eq!(res.body["message"], "Project submissions are not open yet");

        app.set_status(&organizer, id, "judging").await;

        let res = app
            .post_with_token(&routes::hackathon_submissions(id), &body, &alice)
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["message"], "The submission deadline has passed");
    }

    #[tokio::test]
    async fn one_submission_per_team() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let id = app.create_hackathon(&organizer, "Ship it", json!([])).await;
        app.set_status(&organizer, id, "hacking").await;

        let alice = app.participant_token(100);
        let team_id = app.create_team(&alice, id, "Solar").await;
        app.create_submission(&alice, id, team_id, "First", "Climate")
            .await;

        app.set_status(&organizer, id, "submission").await;
        let res = app
            .post_with_token(
                &routes::hackathon_submissions(id),
                &json!({ "team_id": team_id, "project_name": "Second", "track": "Climate" }),
                &alice,
            )
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn only_members_submit_for_their_team() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let id = app.create_hackathon(&organizer, "Ship it", json!([])).await;
        app.set_status(&organizer, id, "hacking").await;

        let alice = app.participant_token(100);
        let bob = app.participant_token(101);
        let team_id = app.create_team(&alice, id, "Solar").await;
        let body = json!({ "team_id": team_id, "project_name": "Hijack", "track": "Climate" });

        let res = app
            .post_with_token(&routes::hackathon_submissions(id), &body, &bob)
            .await;
        assert_eq!(res.status, 403);

        let res = app
            .post_with_token(
                &routes::hackathon_submissions(id),
                &json!({ "team_id": 999, "project_name": "Ghost", "track": "Climate" }),
                &alice,
            )
            .await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn rejects_bad_repository_url() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let id = app.create_hackathon(&organizer, "Ship it", json!([])).await;
        app.set_status(&organizer, id, "hacking").await;

        let alice = app.participant_token(100);
        let team_id = app.create_team(&alice, id, "Solar").await;

        let res = app
            .post_with_token(
                &routes::hackathon_submissions(id),
                &json!({
                    "team_id": team_id,
                    "project_name": "Solar Sense",
                    "track": "Climate",
                    "repository_url": "ftp://example.com/repo",
                }),
                &alice,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn participants_only_see_their_team() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let id = app.create_hackathon(&organizer, "Ship it", json!([])).await;
        let ids = app
            .seed_submissions(&organizer, id, &["Climate", "Health", "Climate"])
            .await;

        let res = app
            .get_with_token(&routes::hackathon_submissions(id), &organizer)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 3);
        assert_eq!(res.body["pagination"]["total"], 3);

        let res = app
            .get_with_token(
                &format!("{}?track=Climate&per_page=1", routes::hackathon_submissions(id)),
                &organizer,
            )
            .await;
        assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["pagination"]["total"], 2);
        assert_eq!(res.body["pagination"]["total_pages"], 2);

        // seed_submissions gives user 101 the second submission.
        let participant = app.participant_token(101);
        let res = app
            .get_with_token(&routes::hackathon_submissions(id), &participant)
            .await;
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["id"], ids[1]);

        let res = app.get_with_token(&routes::submission(ids[1]), &participant).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["project_name"], "Project 1");

        let res = app.get_with_token(&routes::submission(ids[0]), &participant).await;
        assert_eq!(res.status, 404);

    }

    #[tokio::test]
    async fn judges_only_see_hackathons_they_judge() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let id = app.create_hackathon(&organizer, "Ship it", json!([])).await;
        let ids = app
            .seed_submissions(&organizer, id, &["Climate", "Health"])
            .await;

        let outsider = app.token(55, "mallory", "judge");
        let res = app.get_with_token(&routes::submission(ids[0]), &outsider).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
        let res = app
            .get_with_token(&routes::hackathon_submissions(id), &outsider)
            .await;
        assert_eq!(res.status, 200);
        assert!(res.body["data"].as_array().unwrap().is_empty());

        let judge = app.add_judge(&organizer, id, 10).await;
        let res = app.get_with_token(&routes::submission(ids[0]), &judge).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["project_name"], "Project 0");
        let res = app
            .get_with_token(&routes::hackathon_submissions(id), &judge)
            .await;
        assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
    }
}

mod status {
    use super::*;

    #[tokio::test]
    async fn organizer_sets_status() {
        let app = TestApp::spawn().await;
        let organizer = app.organizer_token();
        let id = app.create_hackathon(&organizer, "Ship it", json!([])).await;
        let ids = app.seed_submissions(&organizer, id, &["Climate"]).await;

        let res = app
            .patch_with_token(
                &routes::submission_status(ids[0]),
                &json!({ "status": "draft" }),
                &organizer,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["status"], "draft");

        let participant = app.participant_token(100);
        let res = app
            .patch_with_token(
                &routes::submission_status(ids[0]),
                &json!({ "status": "winner" }),
                &participant,
            )
            .await;
        assert_eq!(res.status, 403);

        let res = app
            .patch_with_token(
                &routes::submission_status(ids[0]),
                &json!({ "status": "champion" }),
                &organizer,
            )
            .await;
        assert_eq!(res.status, 400);
    }
}
