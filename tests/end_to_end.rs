use base64::Engine;
use blendviz::{
    default_output_path, BlendError, Composer, Config, ImageFormat, InputSet, Strategy,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: [u8; 16] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

fn config_for(server: &MockServer) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("GOOGLE_API_KEY", "integration-key".to_string()),
        (blendviz::BASE_URL_ENV, server.uri()),
    ]);
    Config::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

fn write_inputs(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    [("avatar.png", b"avatar".as_slice()), ("shirt.jpg", b"shirt")]
        .iter()
        .map(|(name, bytes)| {
            let path = dir.join(name);
            std::fs::write(&path, bytes).unwrap();
            path
        })
        .collect()
}

#[tokio::test]
async fn two_step_describes_then_renders() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "integration-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"text": "A cartoon avatar wearing a navy shirt."}]},
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/imagen-3.0-generate-002:predict"))
        .and(header("x-goog-api-key", "integration-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [{
                "bytesBase64Encoded": base64::engine::general_purpose::STANDARD.encode(PNG_BYTES),
                "mimeType": "image/png"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let inputs = InputSet::load(write_inputs(dir.path()).as_slice()).unwrap();
    let config = config_for(&server);
    let composer = Composer::two_step(
        Box::new(config.describer().unwrap()),
        Box::new(config.imagen().unwrap()),
    );

    let result = composer.compose(&inputs).await.unwrap();
    assert_eq!(
        result.prompt.as_deref(),
        Some("A cartoon avatar wearing a navy shirt.")
    );

    let output = dir.path().join("generated_result.png");
    result.image.save(&output).unwrap();
    assert_eq!(std::fs::read(&output).unwrap(), PNG_BYTES);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let describe: Value = requests[0].body_json().unwrap();
    let parts = describe["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[2]["inlineData"]["mimeType"], "image/jpeg");

    let predict: Value = requests[1].body_json().unwrap();
    assert_eq!(
        predict["instances"][0]["prompt"],
        "A cartoon avatar wearing a navy shirt."
    );
    assert_eq!(predict["parameters"]["sampleCount"], 1);
}

#[tokio::test]
async fn imagen_failure_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "A prompt"}]}}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/imagen-3.0-generate-002:predict"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let inputs = InputSet::load(write_inputs(dir.path()).as_slice()).unwrap();
    let config = config_for(&server);
    let composer = Composer::two_step(
        Box::new(config.describer().unwrap()),
        Box::new(config.imagen().unwrap()),
    );

    let err = composer.compose(&inputs).await.unwrap_err();
    match err {
        BlendError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "overloaded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn direct_mode_single_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash-image:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"inlineData": {
                    "mimeType": "image/png",
                    "data": base64::engine::general_purpose::STANDARD.encode(PNG_BYTES)
                }}]},
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let inputs = InputSet::load(write_inputs(dir.path()).as_slice()).unwrap();
    let composer = Composer::direct(Box::new(config_for(&server).gemini_image().unwrap()));

    let result = composer.compose(&inputs).await.unwrap();
    assert!(result.prompt.is_none());
    assert_eq!(result.image.format, ImageFormat::Png);
    assert_eq!(
        default_output_path(Strategy::Direct, result.image.format),
        std::path::PathBuf::from("generated_style.png")
    );

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 3);
    assert!(parts[2]["text"].is_string());
}
