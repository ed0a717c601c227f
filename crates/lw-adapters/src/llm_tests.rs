// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_adapter_replies_with_scripted_text() {
    let adapter = FakeLlmAdapter::scripted("hello there");
    let reply = adapter
        .chat(
            "flagship",
            vec![ChatMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            None,
        )
        .await
        .unwrap();
    assert_eq!(reply.text, "hello there");
    assert_eq!(adapter.calls().len(), 1);
}

#[tokio::test]
async fn fake_adapter_can_be_scripted_to_fail() {
    let adapter = FakeLlmAdapter::failing(|| LlmError::Unavailable("provider down".to_string()));
    let err = adapter.chat("flagship", vec![], None).await.unwrap_err();
    assert_eq!(err.kind(), LlmErrorKind::Unavailable);
}

#[test]
fn http_adapter_rejects_unconfigured_model_alias() {
    let adapter = HttpLlmAdapter::new(reqwest::Client::new(), HashMap::new());
    let err = adapter.route("no-such-model").unwrap_err();
    assert_eq!(err.kind(), LlmErrorKind::Protocol);
}
