use actix_multipart::form::bytes::Bytes as UploadedFile;
use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse};
use log::{error, info};
use shared::PestLabel;

use crate::classifier::Classifier;
use crate::config::AppConfig;
use crate::recommend::RecommendationTable;
use crate::render;

pub const NO_FILE_MESSAGE: &str = "⚠️ No file selected.";
pub const INVALID_TYPE_MESSAGE: &str =
    "⚠️ Invalid file type. Please upload a PNG or JPG image.";

/// The upload form: zero or more file parts named `image`; the first one
/// is diagnosed. Size limits are enforced by the multipart layer before
/// the handler runs.
#[derive(MultipartForm)]
pub struct UploadForm {
    image: Vec<UploadedFile>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(index))
            .route(web::post().to(diagnose)),
    );
}

async fn index() -> HttpResponse {
    page(None)
}

async fn diagnose(
    form: MultipartForm<UploadForm>,
    classifier: web::Data<Classifier>,
    table: web::Data<RecommendationTable>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    let result = diagnose_upload(&form.image, &classifier, &table, &config.allowed_extensions);
    page(Some(&result))
}

fn page(result: Option<&str>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render::render_page(result))
}

/// Runs the upload validation sequence and, when it passes, classification.
/// Every outcome is a user-facing message; nothing here escapes as a
/// non-200 response.
fn diagnose_upload(
    parts: &[UploadedFile],
    classifier: &Classifier,
    table: &RecommendationTable,
    allowed_extensions: &[String],
) -> String {
    let Some(upload) = parts.first() else {
        return NO_FILE_MESSAGE.to_string();
    };
    let file_name = upload.file_name.as_deref().unwrap_or_default();
    if file_name.is_empty() {
        return NO_FILE_MESSAGE.to_string();
    }
    if !has_allowed_extension(file_name, allowed_extensions) {
        return INVALID_TYPE_MESSAGE.to_string();
    }

    match classifier.predict(&upload.data) {
        Ok(scores) => {
            let index = argmax(&scores);
            match PestLabel::from_index(index) {
                Some(label) => {
                    info!(
                        "Predicted '{}' (p={:.3}) for upload {}",
                        label, scores[index], file_name
                    );
                    table.advisory(label)
                }
                None => {
                    error!(
                        "Classifier returned {} scores, arg-max {} has no label",
                        scores.len(),
                        index
                    );
                    format!("⚠️ Error processing image: class index {} is unknown", index)
                }
            }
        }
        Err(e) => {
            error!("Failed to process upload {}: {}", file_name, e);
            format!("⚠️ Error processing image: {}", e)
        }
    }
}

/// Case-insensitive check of the `.`-suffix against the configured set.
/// Names without an extension never match.
fn has_allowed_extension(file_name: &str, allowed: &[String]) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

fn argmax(scores: &[f32]) -> usize {
    scores
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
