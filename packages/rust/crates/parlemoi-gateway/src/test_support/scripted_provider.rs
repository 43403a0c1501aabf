use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::language::TranscriptionLanguage;
use crate::provider::{
    ChatMessage, Provider, ProviderError, SamplingParams, SpeechRequest, TranscriptionRequest,
};

pub const SCRIPTED_TRANSCRIPT: &str = "je me sens un peu perdu";
pub const SCRIPTED_AUDIO: &[u8] = b"ID3\x04scripted-mpeg-frames";

/// What the provider observed during one transcription call.
#[derive(Debug, Clone)]
pub struct RecordedTranscription {
    pub audio_path: PathBuf,
    /// Whether the stored upload existed while the provider was running.
    pub file_existed: bool,
    pub audio_bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub language: TranscriptionLanguage,
}

/// Recording provider. Chat replies are `"reply-1"`, `"reply-2"`, ... in call order.
#[derive(Default)]
pub struct ScriptedProvider {
    fail_chat: AtomicBool,
    panic_next_chat: AtomicBool,
    fail_transcription: AtomicBool,
    fail_speech: AtomicBool,
    chat_counter: AtomicUsize,
    chat_calls: Mutex<Vec<(Vec<ChatMessage>, SamplingParams)>>,
    transcription_calls: Mutex<Vec<RecordedTranscription>>,
    speech_calls: Mutex<Vec<SpeechRequest>>,
}

fn scripted_failure(operation: &str) -> ProviderError {
    ProviderError::Status {
        status: 503,
        body: format!("scripted {operation} failure"),
    }
}

impl ScriptedProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_chat(&self, fail: bool) {
        self.fail_chat.store(fail, Ordering::SeqCst);
    }

    /// Make the next `complete` call panic; later calls behave normally.
    pub fn panic_on_next_chat(&self) {
        self.panic_next_chat.store(true, Ordering::SeqCst);
    }

    pub fn set_fail_transcription(&self, fail: bool) {
        self.fail_transcription.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_speech(&self, fail: bool) {
        self.fail_speech.store(fail, Ordering::SeqCst);
    }

    /// Message sequences passed to `complete`, in call order.
    #[must_use]
    pub fn chat_calls(&self) -> Vec<Vec<ChatMessage>> {
        self.chat_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(messages, _)| messages.clone())
            .collect()
    }

    #[must_use]
    pub fn chat_sampling(&self) -> Vec<SamplingParams> {
        self.chat_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, sampling)| *sampling)
            .collect()
    }

    #[must_use]
    pub fn transcription_calls(&self) -> Vec<RecordedTranscription> {
        self.transcription_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn speech_calls(&self) -> Vec<SpeechRequest> {
        self.speech_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        sampling: SamplingParams,
    ) -> Result<String, ProviderError> {
        self.chat_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((messages, sampling));
        if self.panic_next_chat.swap(false, Ordering::SeqCst) {
            panic!("scripted chat panic");
        }
        if self.fail_chat.load(Ordering::SeqCst) {
            return Err(scripted_failure("chat"));
        }
        let n = self.chat_counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("reply-{n}"))
    }

    async fn transcribe(&self, request: TranscriptionRequest<'_>) -> Result<String, ProviderError> {
        let stored = tokio::fs::read(request.audio_path).await.ok();
        self.transcription_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedTranscription {
                audio_path: request.audio_path.to_path_buf(),
                file_existed: stored.is_some(),
                audio_bytes: stored.unwrap_or_default(),
                file_name: request.file_name.to_string(),
                mime_type: request.mime_type.map(ToString::to_string),
                language: request.language,
            });
        if self.fail_transcription.load(Ordering::SeqCst) {
            return Err(scripted_failure("transcription"));
        }
        Ok(SCRIPTED_TRANSCRIPT.to_string())
    }

    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, ProviderError> {
        self.speech_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        if self.fail_speech.load(Ordering::SeqCst) {
            return Err(scripted_failure("speech"));
        }
        Ok(SCRIPTED_AUDIO.to_vec())
    }
}
