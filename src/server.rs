use actix_cors::Cors;
use actix_multipart::{Field, Multipart};
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, guard, middleware::Logger, web};
use anyhow::Result;
use futures_util::TryStreamExt;
use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::dto::{AudioUpload, ProcessForm};
use crate::error::RelayError;
use crate::fireworks::config::FireworksConfig;
use crate::fireworks::corrector::FireworksCorrector;
use crate::fireworks::transcriber::FireworksTranscriber;
use crate::pipeline::{CorrectionPipeline, ProcessInput};

// Urlencoded text gets the same headroom as a multipart upload.
const FORM_LIMIT: usize = 50 * 1024 * 1024; // 50MB

pub struct AppState {
    pub pipeline: CorrectionPipeline,
}

#[get("/health")]
pub async fn health_check() -> impl Responder {
    debug!("Health check endpoint called");
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "Text correction relay is running"
    }))
}

pub async fn process_multipart(
    data: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, RelayError> {
    debug!("Multipart process request received");

    let mut input = ProcessInput::default();

    loop {
        let field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed multipart body: {e}");
                return Err(RelayError::InvalidInput(format!("Malformed form data: {e}")));
            }
        };

        match field.name() {
            Some("text") => {
                let bytes = read_field(field).await?;
                let text = String::from_utf8(bytes).map_err(|_| {
                    RelayError::InvalidInput("Text must be valid UTF-8".to_string())
                })?;
                debug!("Text field received: {} characters", text.len());
                input.text = Some(text);
            }
            Some("file") => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or_default()
                    .to_string();
                let content_type = field.content_type().map(|mime| mime.to_string());
                let bytes = read_field(field).await?;

                if filename.is_empty() && bytes.is_empty() {
                    debug!("Ignoring empty file field");
                    continue;
                }

                debug!("Audio file received: '{filename}', {} bytes", bytes.len());
                input.audio = Some(AudioUpload {
                    bytes,
                    filename,
                    content_type,
                });
            }
            _ => {
                read_field(field).await?;
            }
        }
    }

    respond(&data.pipeline, input).await
}

pub async fn process_form(
    data: web::Data<AppState>,
    form: web::Form<ProcessForm>,
) -> Result<HttpResponse, RelayError> {
    debug!("Urlencoded process request received");
    let input = ProcessInput {
        text: form.into_inner().text,
        audio: None,
    };
    respond(&data.pipeline, input).await
}

async fn respond(
    pipeline: &CorrectionPipeline,
    input: ProcessInput,
) -> Result<HttpResponse, RelayError> {
    match pipeline.run(input).await {
        Ok(dto) => {
            info!("Request processed: {} characters of output", dto.result.len());
            Ok(HttpResponse::Ok().json(dto))
        }
        Err(e) => {
            error!("Request failed: {e}");
            Err(e)
        }
    }
}

async fn read_field(mut field: Field) -> Result<Vec<u8>, RelayError> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| RelayError::InvalidInput(format!("Failed to read form field: {e}")))?
    {
        data.extend_from_slice(&chunk);
    }
    debug!("Read field data: {} bytes", data.len());
    Ok(data)
}

fn is_urlencoded(ctx: &guard::GuardContext) -> bool {
    ctx.head()
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// Registers every route; shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().limit(FORM_LIMIT))
        .service(health_check)
        .service(
            web::resource("/process")
                .route(
                    web::post()
                        .guard(guard::fn_guard(is_urlencoded))
                        .to(process_form),
                )
                .route(web::post().to(process_multipart)),
        );
}

pub async fn run_server(host: String, port: u16) -> Result<()> {
    info!("Starting text correction relay");

    let config = FireworksConfig::from_env()?;
    info!(
        "Using upstreams: transcription={}, llm={} (timeout {:?})",
        config.transcription.endpoint, config.correction.endpoint, config.correction.timeout
    );

    let pipeline = CorrectionPipeline::new(
        Arc::new(FireworksTranscriber::new(config.transcription)),
        Arc::new(FireworksCorrector::new(config.correction)?),
    );
    let app_state = web::Data::new(AppState { pipeline });

    info!("Starting HTTP server on {host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::CorrectionDto;
    use crate::fireworks::corrector::CorrectionError;
    use crate::fireworks::transcriber::TranscriptionError;
    use crate::pipeline::fakes::*;
    use actix_web::test;

    const BOUNDARY: &str = "relay-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart_body(parts: &[Part]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Part::File(name, filename, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                             Content-Type: audio/wav\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(parts: &[Part]) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/process")
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(parts))
    }

    fn state(
        transcribe: fn() -> Result<String, TranscriptionError>,
        correct: fn(&str) -> Result<CorrectionDto, CorrectionError>,
    ) -> (web::Data<AppState>, CallLog) {
        let log = CallLog::default();
        let pipeline = CorrectionPipeline::new(
            Arc::new(FakeTranscriber {
                log: log.clone(),
                reply: transcribe,
            }),
            Arc::new(FakeCorrector {
                log: log.clone(),
                reply: correct,
            }),
        );
        (web::Data::new(AppState { pipeline }), log)
    }

    async fn call(
        data: web::Data<AppState>,
        req: test::TestRequest,
    ) -> (u16, serde_json::Value) {
        let app = test::init_service(App::new().app_data(data).configure(configure)).await;
        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status().as_u16();
        let body = test::read_body(resp).await;
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[actix_web::test]
    async fn health_reports_ok() {
        let (data, _) = state(transcript, echo);
        let (status, json) = call(data, test::TestRequest::get().uri("/health")).await;

        assert_eq!(status, 200);
        assert_eq!(json["status"], "ok");
    }

    #[actix_web::test]
    async fn neither_text_nor_file_is_bad_request() {
        let (data, log) = state(transcript, echo);
        let (status, json) = call(data, multipart_request(&[])).await;

        assert_eq!(status, 400);
        assert!(json["detail"].is_string());
        assert!(log.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn unrelated_fields_alone_are_bad_request() {
        let (data, _) = state(transcript, echo);
        let (status, _) = call(data, multipart_request(&[Part::Text("lang", "en")])).await;

        assert_eq!(status, 400);
    }

    #[actix_web::test]
    async fn empty_text_is_bad_request() {
        let (data, _) = state(transcript, echo);
        let (status, json) = call(data, multipart_request(&[Part::Text("text", "")])).await;

        assert_eq!(status, 400);
        assert_eq!(json["detail"], "Text must not be empty");
    }

    #[actix_web::test]
    async fn text_only_returns_correction() {
        let (data, log) = state(transcript, echo);
        let (status, json) = call(data, multipart_request(&[Part::Text("text", "I has")])).await;

        assert_eq!(status, 200);
        assert_eq!(json, serde_json::json!({ "result": "corrected[I has]" }));
        assert_eq!(*log.lock().unwrap(), vec!["correct:I has".to_string()]);
    }

    #[actix_web::test]
    async fn urlencoded_text_is_accepted() {
        let (data, log) = state(transcript, echo);
        let req = test::TestRequest::post()
            .uri("/process")
            .insert_header((CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .set_payload("text=He+like+it");
        let (status, json) = call(data, req).await;

        assert_eq!(status, 200);
        assert_eq!(json["result"], "corrected[He like it]");
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn long_urlencoded_text_is_accepted() {
        let (data, log) = state(transcript, echo);
        let text = "a".repeat(20 * 1024);
        let req = test::TestRequest::post()
            .uri("/process")
            .insert_header((CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .set_payload(format!("text={text}"));
        let (status, json) = call(data, req).await;

        assert_eq!(status, 200);
        assert_eq!(json["result"], format!("corrected[{text}]"));
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn empty_urlencoded_body_is_bad_request() {
        let (data, _) = state(transcript, echo);
        let req = test::TestRequest::post()
            .uri("/process")
            .insert_header((CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .set_payload("");
        let (status, _) = call(data, req).await;

        assert_eq!(status, 400);
    }

    #[actix_web::test]
    async fn file_takes_precedence_and_is_transcribed_first() {
        let (data, log) = state(transcript, echo);
        let req = multipart_request(&[
            Part::Text("text", "typed"),
            Part::File("file", "note.wav", b"\x00\x01audio"),
        ]);
        let (status, json) = call(data, req).await;

        assert_eq!(status, 200);
        assert_eq!(json["result"], "corrected[ I has a dog ]");
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "transcribe:note.wav".to_string(),
                "correct: I has a dog ".to_string(),
            ]
        );
    }

    #[actix_web::test]
    async fn blank_file_field_falls_back_to_text() {
        let (data, log) = state(transcript, echo);
        let req = multipart_request(&[Part::File("file", "", b""), Part::Text("text", "hi")]);
        let (status, _) = call(data, req).await;

        assert_eq!(status, 200);
        assert_eq!(*log.lock().unwrap(), vec!["correct:hi".to_string()]);
    }

    #[actix_web::test]
    async fn llm_errors_map_to_statuses() {
        let cases: [(fn(&str) -> Result<CorrectionDto, CorrectionError>, u16); 4] = [
            (|_| Err(CorrectionError::Unauthorized), 403),
            (
                |_| {
                    Err(CorrectionError::Upstream {
                        status: 503,
                        body: "busy".to_string(),
                    })
                },
                500,
            ),
            (|_| Err(CorrectionError::Timeout), 504),
            (|_| Err(CorrectionError::Unknown("reset".to_string())), 500),
        ];

        for (correct, expected) in cases {
            let (data, _) = state(transcript, correct);
            let (status, json) =
                call(data, multipart_request(&[Part::Text("text", "hello")])).await;
            assert_eq!(status, expected);
            assert!(json["detail"].is_string());
        }
    }

    #[actix_web::test]
    async fn upstream_error_detail_includes_status_and_body() {
        let (data, _) = state(transcript, |_| {
            Err(CorrectionError::Upstream {
                status: 503,
                body: "busy".to_string(),
            })
        });
        let (_, json) = call(data, multipart_request(&[Part::Text("text", "hello")])).await;

        assert_eq!(json["detail"], "LLM error: 503 busy");
    }

    #[actix_web::test]
    async fn transcription_failure_is_bad_gateway() {
        let (data, log) = state(
            || {
                Err(TranscriptionError::Status {
                    status: 500,
                    body: "model offline".to_string(),
                })
            },
            echo,
        );
        let req = multipart_request(&[Part::File("file", "a.wav", b"abc")]);
        let (status, json) = call(data, req).await;

        assert_eq!(status, 502);
        assert_eq!(json["detail"], "Transcription error: 500 model offline");
        assert_eq!(log.lock().unwrap().len(), 1);
    }
}
