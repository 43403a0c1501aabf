//! Speech endpoint tests: /stt upload handling and cleanup, /tts voice selection and audio response.

#![allow(missing_docs)]

mod gateway_support;

use axum::http::StatusCode;
use parlemoi_gateway::TranscriptionLanguage;
use parlemoi_gateway::test_support::{SCRIPTED_AUDIO, SCRIPTED_TRANSCRIPT};
use tempfile::TempDir;
use tower::ServiceExt;

use gateway_support::{
    body_bytes, body_json, dir_entries, json_request, options, stt_request, test_gateway,
};

const WEBM_BYTES: &[u8] = b"\x1a\x45\xdf\xa3fake-webm-payload";

#[tokio::test]
async fn stt_transcribes_and_removes_upload() {
    let tmp = TempDir::new().expect("tempdir");
    let gw = test_gateway(options(tmp.path()));

    let response = gw
        .app
        .oneshot(stt_request(
            Some(("recording.webm", "audio/webm", WEBM_BYTES)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["transcription"], SCRIPTED_TRANSCRIPT);
    assert!(body["timestamp"].is_string());

    let calls = gw.provider.transcription_calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert!(call.file_existed, "upload must exist while the provider runs");
    assert_eq!(call.audio_bytes, WEBM_BYTES);
    assert_eq!(call.file_name, "recording.webm");
    assert_eq!(call.mime_type.as_deref(), Some("audio/webm"));
    assert_eq!(call.language, TranscriptionLanguage::French);
    assert!(call.audio_path.starts_with(tmp.path()));
    assert_eq!(call.audio_path.extension().and_then(|e| e.to_str()), Some("webm"));

    assert!(!call.audio_path.exists());
    assert_eq!(dir_entries(tmp.path()), 0);
}

#[tokio::test]
async fn stt_passes_english_language_hint() {
    let tmp = TempDir::new().expect("tempdir");
    let gw = test_gateway(options(tmp.path()));

    let response = gw
        .app
        .oneshot(stt_request(
            Some(("memo.mp3", "audio/mpeg", &b"ID3fake"[..])),
            Some("en"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        gw.provider.transcription_calls()[0].language,
        TranscriptionLanguage::English
    );
}

#[tokio::test]
async fn stt_accepts_allowed_extension_with_generic_mime() {
    let tmp = TempDir::new().expect("tempdir");
    let gw = test_gateway(options(tmp.path()));

    let response = gw
        .app
        .oneshot(stt_request(
            Some(("voice.m4a", "application/octet-stream", &b"m4a-bytes"[..])),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(dir_entries(tmp.path()), 0);
}

#[tokio::test]
async fn stt_returns_400_without_audio_file() {
    let tmp = TempDir::new().expect("tempdir");
    let gw = test_gateway(options(tmp.path()));

    let response = gw
        .app
        .oneshot(stt_request(None, Some("fr")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Fichier audio requis");
    assert!(gw.provider.transcription_calls().is_empty());
}

#[tokio::test]
async fn stt_rejects_unsupported_type_before_storage() {
    let tmp = TempDir::new().expect("tempdir");
    let gw = test_gateway(options(tmp.path()));

    let response = gw
        .app
        .oneshot(stt_request(
            Some(("notes.txt", "text/plain", &b"not audio"[..])),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Format audio non supporté");
    assert!(gw.provider.transcription_calls().is_empty());
    assert_eq!(dir_entries(tmp.path()), 0);
}

#[tokio::test]
async fn stt_rejects_oversized_upload() {
    let tmp = TempDir::new().expect("tempdir");
    let gw = test_gateway(options(tmp.path()));
    let oversized = vec![0_u8; 64 * 1024 + 1];

    let response = gw
        .app
        .oneshot(stt_request(
            Some(("long.wav", "audio/wav", oversized.as_slice())),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Fichier audio trop volumineux");
    assert!(gw.provider.transcription_calls().is_empty());
    assert_eq!(dir_entries(tmp.path()), 0);
}

#[tokio::test]
async fn stt_provider_failure_returns_500_and_removes_upload() {
    let tmp = TempDir::new().expect("tempdir");
    let gw = test_gateway(options(tmp.path()));
    gw.provider.set_fail_transcription(true);

    let response = gw
        .app
        .oneshot(stt_request(
            Some(("recording.webm", "audio/webm", WEBM_BYTES)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Erreur lors de la transcription");
    assert!(body["details"].is_string());

    let calls = gw.provider.transcription_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].file_existed);
    assert_eq!(dir_entries(tmp.path()), 0);
}

#[tokio::test]
async fn tts_forces_primary_voice_for_french() {
    let tmp = TempDir::new().expect("tempdir");
    let gw = test_gateway(options(tmp.path()));

    let response = gw
        .app
        .oneshot(json_request(
            "POST",
            "/tts",
            r#"{"text":"Je suis là pour vous","voice":"echo","language":"fr"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "audio/mpeg");
    assert_eq!(
        response.headers().get("content-length").unwrap(),
        SCRIPTED_AUDIO.len().to_string().as_str()
    );
    assert_eq!(body_bytes(response).await, SCRIPTED_AUDIO);

    let calls = gw.provider.speech_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].voice, "nova");
    assert_eq!(calls[0].input, "Je suis là pour vous");
    assert!((calls[0].speed - 0.95).abs() < f32::EPSILON);
}

#[tokio::test]
async fn tts_defaults_to_french_voice_without_language() {
    let tmp = TempDir::new().expect("tempdir");
    let gw = test_gateway(options(tmp.path()));

    let response = gw
        .app
        .oneshot(json_request("POST", "/tts", r#"{"text":"Bonjour"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(gw.provider.speech_calls()[0].voice, "nova");
}

#[tokio::test]
async fn tts_english_uses_requested_or_default_voice() {
    let tmp = TempDir::new().expect("tempdir");
    let gw = test_gateway(options(tmp.path()));

    for body in [
        r#"{"text":"Hello","voice":"echo","language":"en"}"#,
        r#"{"text":"Hello","language":"en"}"#,
    ] {
        let response = gw
            .app
            .clone()
            .oneshot(json_request("POST", "/tts", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let voices: Vec<String> = gw
        .provider
        .speech_calls()
        .into_iter()
        .map(|call| call.voice)
        .collect();
    assert_eq!(voices, vec!["echo".to_string(), "alloy".to_string()]);
}

#[tokio::test]
async fn tts_returns_400_for_blank_text() {
    let tmp = TempDir::new().expect("tempdir");
    let gw = test_gateway(options(tmp.path()));

    let response = gw
        .app
        .oneshot(json_request("POST", "/tts", r#"{"text":"  ","voice":"nova"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Texte requis");
    assert!(gw.provider.speech_calls().is_empty());
}

#[tokio::test]
async fn tts_provider_failure_returns_500_json() {
    let tmp = TempDir::new().expect("tempdir");
    let gw = test_gateway(options(tmp.path()));
    gw.provider.set_fail_speech(true);

    let response = gw
        .app
        .oneshot(json_request("POST", "/tts", r#"{"text":"Bonjour"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Erreur lors de la synthèse vocale");
    assert!(body["details"].is_string());
}
