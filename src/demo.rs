// In-memory queue registry served by the binary
// Exercises every router path without an external queue backend

use board_router::{ApiError, AppRoute, HandlerError, HandlerResult, RequestContext};
use hyper::StatusCode;
use serde::Serialize;
use serde_json::json;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: String,
    pub name: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Queue {
    pub name: String,
    pub paused: bool,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Default)]
pub struct Queues {
    queues: RwLock<Vec<Queue>>,
}

impl Queues {
    pub fn sample() -> Self {
        let job = |id: u32, state: &str| Job {
            id: id.to_string(),
            name: format!("send-email-{id}"),
            state: state.to_string(),
        };
        Self {
            queues: RwLock::new(vec![
                Queue {
                    name: "mail".to_string(),
                    paused: false,
                    jobs: vec![job(1, "completed"), job(2, "failed"), job(3, "waiting")],
                },
                Queue {
                    name: "billing".to_string(),
                    paused: true,
                    jobs: Vec::new(),
                },
            ]),
        }
    }
}

type Ctx = RequestContext<Queues>;

fn queue_name(ctx: &Ctx) -> Result<String, HandlerError> {
    ctx.param("queueName")
        .map(ToString::to_string)
        .ok_or_else(|| ApiError::bad_request("queueName is required").into())
}

async fn list_queues(ctx: Ctx) -> Result<HandlerResult, HandlerError> {
    let queues = ctx.queues.queues.read().await;
    let state_filter = ctx.query("status");
    let body: Vec<_> = queues
        .iter()
        .map(|q| {
            let jobs: Vec<&Job> = q
                .jobs
                .iter()
                .filter(|j| state_filter.map_or(true, |s| j.state == s))
                .collect();
            json!({"name": q.name, "isPaused": q.paused, "jobs": jobs})
        })
        .collect();
    Ok(HandlerResult::ok(json!({ "queues": body })))
}

async fn get_queue(ctx: Ctx) -> Result<HandlerResult, HandlerError> {
    let name = queue_name(&ctx)?;
    let queues = ctx.queues.queues.read().await;
    let queue = queues
        .iter()
        .find(|q| q.name == name)
        .ok_or_else(|| ApiError::not_found(format!("queue {name} not found")))?;
    Ok(HandlerResult::ok(json!(queue)))
}

async fn set_paused(ctx: Ctx, paused: bool) -> Result<HandlerResult, HandlerError> {
    let name = queue_name(&ctx)?;
    let mut queues = ctx.queues.queues.write().await;
    let queue = queues
        .iter_mut()
        .find(|q| q.name == name)
        .ok_or_else(|| ApiError::not_found(format!("queue {name} not found")))?;
    queue.paused = paused;
    Ok(HandlerResult::no_content())
}

async fn pause_queue(ctx: Ctx) -> Result<HandlerResult, HandlerError> {
    set_paused(ctx, true).await
}

async fn resume_queue(ctx: Ctx) -> Result<HandlerResult, HandlerError> {
    set_paused(ctx, false).await
}

async fn clean_queue(ctx: Ctx) -> Result<HandlerResult, HandlerError> {
    let name = queue_name(&ctx)?;
    let Some(state) = ctx.body.get("state").and_then(|s| s.as_str()) else {
        return Err(ApiError::bad_request("body must name a job state to clean").into());
    };
    let mut queues = ctx.queues.queues.write().await;
    let queue = queues
        .iter_mut()
        .find(|q| q.name == name)
        .ok_or_else(|| ApiError::not_found(format!("queue {name} not found")))?;
    let before = queue.jobs.len();
    queue.jobs.retain(|j| j.state != state);
    Ok(HandlerResult::with_status(
        StatusCode::OK,
        json!({ "removed": before - queue.jobs.len() }),
    ))
}

async fn remove_job(ctx: Ctx) -> Result<HandlerResult, HandlerError> {
    let name = queue_name(&ctx)?;
    let job_id = ctx.param("jobId").unwrap_or_default().to_string();
    let mut queues = ctx.queues.queues.write().await;
    let queue = queues
        .iter_mut()
        .find(|q| q.name == name)
        .ok_or_else(|| ApiError::not_found(format!("queue {name} not found")))?;
    let before = queue.jobs.len();
    queue.jobs.retain(|j| j.id != job_id);
    if queue.jobs.len() == before {
        return Err(ApiError::not_found(format!("job {job_id} not found")).into());
    }
    Ok(HandlerResult::no_content())
}

pub fn routes() -> Vec<AppRoute<Queues>> {
    vec![
        AppRoute::get("/queues", list_queues),
        AppRoute::get("/queues/:queueName", get_queue),
        AppRoute::put("/queues/:queueName/pause", pause_queue),
        AppRoute::put("/queues/:queueName/resume", resume_queue),
        AppRoute::put("/queues/:queueName/clean", clean_queue),
        AppRoute::delete("/queues/:queueName/jobs/:jobId", remove_job),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_router::{default_entry_route, default_error_handler, Router};
    use http_body_util::BodyExt;
    use hyper::{Method, Request};
    use serde_json::Value;

    struct Board {
        _dir: tempfile::TempDir,
        router: Router<Queues>,
    }

    fn board() -> Board {
        let dir = tempfile::tempdir().unwrap();
        let router = Router::<Queues>::builder()
            .set_static_path("/static", dir.path())
            .set_views_path(dir.path())
            .set_ui_config(json!({}))
            .set_entry_route(default_entry_route())
            .set_queues(Queues::sample())
            .set_error_handler(default_error_handler)
            .set_api_routes(routes())
            .unwrap()
            .build()
            .unwrap();
        Board { _dir: dir, router }
    }

    async fn send(board: &Board, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(body.to_string())
            .unwrap();
        let resp = board.router.handle(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let board = board();
        let (status, body) = send(&board, Method::GET, "/api/queues?status=failed", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["queues"][0]["name"], "mail");
        let failed = json!([{"id": "2", "name": "send-email-2", "state": "failed"}]);
        assert_eq!(body["queues"][0]["jobs"], failed);
        assert_eq!(body["queues"][1]["isPaused"], true);
    }

    #[tokio::test]
    async fn test_pause_and_resume() {
        let board = board();
        let (status, _) = send(&board, Method::PUT, "/api/queues/mail/pause", "").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, queue) = send(&board, Method::GET, "/api/queues/mail", "").await;
        assert_eq!(queue["paused"], true);

        let (status, _) = send(&board, Method::PUT, "/api/queues/mail/resume", "").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, queue) = send(&board, Method::GET, "/api/queues/mail", "").await;
        assert_eq!(queue["paused"], false);
    }

    #[tokio::test]
    async fn test_unknown_queue_is_404() {
        let board = board();
        let (status, body) = send(&board, Method::PUT, "/api/queues/nope/pause", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "queue nope not found");
    }

    #[tokio::test]
    async fn test_clean_removes_jobs_in_state() {
        let board = board();
        let (status, body) = send(
            &board,
            Method::PUT,
            "/api/queues/mail/clean",
            r#"{"state": "completed"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"removed": 1}));

        let (status, body) = send(&board, Method::PUT, "/api/queues/mail/clean", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "body must name a job state to clean");
    }

    #[tokio::test]
    async fn test_remove_job() {
        let board = board();
        let (status, _) = send(&board, Method::DELETE, "/api/queues/mail/jobs/3", "").await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&board, Method::DELETE, "/api/queues/mail/jobs/3", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "job 3 not found");
    }
}
