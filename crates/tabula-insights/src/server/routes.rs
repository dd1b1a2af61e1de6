//! Route handlers for the insight API.

use actix_multipart::form::MultipartForm;
use actix_multipart::form::tempfile::TempFile;
use actix_web::{HttpResponse, delete, get, post, web};
use serde_json::json;
use tracing::{error, info};

use super::AppState;
use crate::agents::AgentRegistry;
use crate::error::PipelineError;

/// Multipart payload for [`analyze`]: one CSV file under the `file`
/// field.
#[derive(Debug, MultipartForm)]
struct AnalyzeUpload {
    file: TempFile,
}

/// Register every route on the given service config.
pub(super) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyze)
        .service(list_reports)
        .service(view_report)
        .service(download_report)
        .service(delete_report)
        .service(agent_status)
        .service(health);
}

#[post("/analyze")]
async fn analyze(
    MultipartForm(form): MultipartForm<AnalyzeUpload>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let filename = form
        .file
        .file_name
        .clone()
        .unwrap_or_else(|| "upload.csv".to_string());

    if !filename.to_lowercase().ends_with(".csv") {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "Only CSV files are supported.",
        }));
    }

    info!("Received upload '{filename}' ({} bytes)", form.file.size);

    let pipeline = state.pipeline.clone();
    let source_name = filename.clone();
    // `form` moves into the closure, so the temp file is deleted as soon
    // as processing ends, on the error paths included.
    let outcome = web::block(move || {
        let path = form.file.file.path().to_path_buf();
        pipeline.process(&path, &source_name)
    })
    .await;

    let analysis = match outcome {
        Ok(Ok(analysis)) => analysis,
        Ok(Err(e)) => {
            error!("Analysis of '{filename}' failed: {e}");
            return HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": e.to_string(),
            }));
        }
        Err(e) => {
            error!("Analysis task for '{filename}' did not complete: {e}");
            return HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Analysis task failed to run",
            }));
        }
    };

    let report = &analysis.report;
    let mut insights = report.insights();
    if let serde_json::Value::Object(map) = &mut insights {
        map.insert(
            "html_report".to_string(),
            json!({
                "report_id": report.report_id,
                "report_url": format!("/reports/{}", report.report_id),
            }),
        );
    }

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Analysis completed successfully for {filename}"),
        "insights": insights,
        "summary": report.summary_text.as_deref().unwrap_or("No summary available"),
        "processing_steps": report.stage_results,
    }))
}

#[get("/reports")]
async fn list_reports(state: web::Data<AppState>) -> HttpResponse {
    match state.pipeline.store().list() {
        Ok(reports) => {
            let entries: Vec<_> = reports
                .iter()
                .map(|r| {
                    json!({
                        "report_id": r.report_id,
                        "filename": r.filename,
                        "created_at": r.created_at,
                        "size_bytes": r.size_bytes,
                        "view_url": format!("/reports/{}", r.report_id),
                    })
                })
                .collect();
            HttpResponse::Ok().json(json!({
                "reports": entries,
                "total": entries.len(),
            }))
        }
        Err(e) => {
            error!("Failed to list reports: {e}");
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

#[get("/reports/{report_id}")]
async fn view_report(path: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    let report_id = path.into_inner();
    match state.pipeline.store().get(&report_id) {
        Ok(html) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(e) => report_error_response(&report_id, &e),
    }
}

#[get("/reports/{report_id}/download")]
async fn download_report(path: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    let report_id = path.into_inner();
    match state.pipeline.store().get(&report_id) {
        Ok(html) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .insert_header((
                actix_web::http::header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{report_id}.html\""),
            ))
            .body(html),
        Err(e) => report_error_response(&report_id, &e),
    }
}

#[delete("/reports/{report_id}")]
async fn delete_report(path: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    let report_id = path.into_inner();
    match state.pipeline.store().delete(&report_id) {
        Ok(()) => {
            info!("Deleted report '{report_id}'");
            HttpResponse::Ok().json(json!({
                "success": true,
                "message": format!("Report {report_id} deleted"),
            }))
        }
        Err(e) => report_error_response(&report_id, &e),
    }
}

#[get("/agents/status")]
async fn agent_status() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "agents": AgentRegistry::agents(),
        "total_agents": AgentRegistry::count(),
    }))
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "tabula-insights",
        "agents_count": AgentRegistry::count(),
        "agents": AgentRegistry::names(),
    }))
}

/// Unknown and invalid ids both answer 404; anything else from the
/// store is a 500.
fn report_error_response(report_id: &str, e: &PipelineError) -> HttpResponse {
    if e.is_not_found() {
        HttpResponse::NotFound().json(json!({ "error": "Report not found" }))
    } else {
        error!("Report store failure for '{report_id}': {e}");
        HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
    }
}
