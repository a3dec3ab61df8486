use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/hackathons", hackathon_routes())
        .nest("/submissions", submission_routes())
}

fn hackathon_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::hackathon::list_hackathons,
            handlers::hackathon::create_hackathon
        ))
        .routes(routes!(
            handlers::hackathon::get_hackathon,
            handlers::hackathon::update_hackathon
        ))
        .routes(routes!(handlers::hackathon::get_phase))
        .routes(routes!(handlers::hackathon::get_progress))
        .routes(routes!(handlers::hackathon::publish_results))
        .routes(routes!(handlers::hackathon::get_leaderboard))
        .merge(criteria_routes())
        .merge(judge_routes())
        .merge(team_routes())
        .routes(routes!(
            handlers::submission::list_submissions,
            handlers::submission::create_submission
        ))
}

fn criteria_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::criteria::list_criteria,
            handlers::criteria::add_criterion
        ))
        .routes(routes!(handlers::criteria::reorder_criteria))
        .routes(routes!(
            handlers::criteria::update_criterion,
            handlers::criteria::remove_criterion
        ))
}

fn judge_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::judge::list_judges,
            handlers::judge::invite_judge
        ))
        .routes(routes!(handlers::judge::accept_invitation))
        .routes(routes!(handlers::judge::remove_judge))
}

fn team_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::team::list_teams,
            handlers::team::create_team
        ))
        .routes(routes!(handlers::team::join_team))
}

fn submission_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::submission::get_submission))
        .routes(routes!(handlers::submission::update_submission_status))
        .routes(routes!(
            handlers::review::list_reviews,
            handlers::review::submit_review
        ))
}
