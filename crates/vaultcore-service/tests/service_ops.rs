//! End-to-end tests for the service boundary.
//!
//! Drives the full stack (boundary validation, cancellation, worker
//! dispatch, key store, rotation) over the in-memory secret store.

use std::sync::Arc;

use vaultcore_keystore::{MemorySecretStore, SecretStore};
use vaultcore_service::{
    CancelToken, CryptoService, ErrorCategory, LinkState, ServiceError,
};

fn fixture() -> (CryptoService, Arc<MemorySecretStore>) {
    let backend = Arc::new(MemorySecretStore::new());
    let collaborator: Arc<dyn SecretStore> = backend.clone();
    (CryptoService::new(collaborator, "memory"), backend)
}

#[tokio::test]
async fn encrypt_decrypt_roundtrip_through_the_boundary() {
    let (service, _) = fixture();
    let cancel = CancelToken::new();

    let key = service.generate_key(256, &cancel).await.unwrap();
    assert_eq!(key.len(), 32);

    let plaintext = b"boundary round trip".to_vec();
    let envelope = service.encrypt(plaintext.clone(), key.clone(), &cancel).await.unwrap();
    assert_eq!(envelope.len(), 28 + plaintext.len());

    let decrypted = service.decrypt(envelope, key, &cancel).await.unwrap();
    assert_eq!(decrypted, plaintext);
}

#[tokio::test]
async fn concrete_scenario_33_byte_envelope() {
    let (service, _) = fixture();
    let cancel = CancelToken::new();

    let key: Vec<u8> = (0x00..=0x1F).collect();
    let plaintext = vec![0x01, 0x02, 0x03, 0x04, 0x05];

    let envelope = service.encrypt(plaintext.clone(), key.clone(), &cancel).await.unwrap();
    assert_eq!(envelope.len(), 33);

    let decrypted = service.decrypt(envelope, key, &cancel).await.unwrap();
    assert_eq!(decrypted, plaintext);
}

#[tokio::test]
async fn tampered_envelope_is_rejected_with_decryption_failed() {
    let (service, _) = fixture();
    let cancel = CancelToken::new();

    let key = service.generate_key(128, &cancel).await.unwrap();
    let mut envelope = service.encrypt(b"data".to_vec(), key.clone(), &cancel).await.unwrap();
    let last = envelope.len() - 1;
    envelope[last] ^= 0x80;

    let err = service.decrypt(envelope, key, &cancel).await.unwrap_err();
    assert_eq!(err.to_wire().category, ErrorCategory::DecryptionFailed);
}

#[tokio::test]
async fn short_envelope_is_rejected_synchronously() {
    let (service, _) = fixture();
    let cancel = CancelToken::new();
    let key = service.generate_key(128, &cancel).await.unwrap();

    let err = service.decrypt(vec![0u8; 27], key, &cancel).await.unwrap_err();
    assert_eq!(err.to_wire().category, ErrorCategory::DecryptionFailed);
}

#[tokio::test]
async fn generate_key_validates_bit_length() {
    let (service, _) = fixture();
    let cancel = CancelToken::new();

    assert_eq!(service.generate_key(128, &cancel).await.unwrap().len(), 16);
    assert_eq!(service.generate_key(256, &cancel).await.unwrap().len(), 32);

    for bad in [0u32, 64, 123, 192, 512] {
        let err = service.generate_key(bad, &cancel).await.unwrap_err();
        assert_eq!(err.to_wire().category, ErrorCategory::InvalidKeySize, "bits {bad}");
    }
}

#[tokio::test]
async fn generate_random_validates_length() {
    let (service, _) = fixture();
    let cancel = CancelToken::new();

    let bytes = service.generate_random(12, &cancel).await.unwrap();
    assert_eq!(bytes.len(), 12);

    let err = service.generate_random(0, &cancel).await.unwrap_err();
    assert_eq!(err.to_wire().category, ErrorCategory::InvalidLength);
}

#[tokio::test]
async fn credential_store_semantics() {
    let (service, _) = fixture();
    let cancel = CancelToken::new();

    service.store_credential("api-token", b"s3cret".to_vec(), &cancel).await.unwrap();

    // Duplicate add fails
    let err = service
        .store_credential("api-token", b"other".to_vec(), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::DuplicateKey { identifier: "api-token".into() });

    // Retrieval returns the original secret
    let secret = service.retrieve_credential("api-token", &cancel).await.unwrap();
    assert_eq!(secret, b"s3cret");

    // Missing identifiers fail with KeyNotFound
    let err = service.retrieve_credential("missing", &cancel).await.unwrap_err();
    assert_eq!(err, ServiceError::KeyNotFound { identifier: "missing".into() });

    let err = service.delete_credential("missing", &cancel).await.unwrap_err();
    assert_eq!(err, ServiceError::KeyNotFound { identifier: "missing".into() });

    // Delete then retrieve fails
    service.delete_credential("api-token", &cancel).await.unwrap();
    let err = service.retrieve_credential("api-token", &cancel).await.unwrap_err();
    assert_eq!(err, ServiceError::KeyNotFound { identifier: "api-token".into() });
}

#[tokio::test]
async fn empty_identifier_fails_before_any_dispatch() {
    let (service, backend) = fixture();
    let cancel = CancelToken::new();

    for bad in ["", "  "] {
        let err = service
            .store_credential(bad, b"secret".to_vec(), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::InvalidCredentialIdentifier, "identifier {bad:?}");
    }
    assert!(backend.is_empty().await);
}

#[tokio::test]
async fn rotation_preserves_plaintext_and_replaces_the_key() {
    let (service, _) = fixture();
    let cancel = CancelToken::new();

    let old_key = service.generate_key(256, &cancel).await.unwrap();
    service.store_credential("master", old_key.clone(), &cancel).await.unwrap();

    let plaintext = b"long-lived secret".to_vec();
    let envelope = service.encrypt(plaintext.clone(), old_key.clone(), &cancel).await.unwrap();

    let rotated = service.rotate_key("master", Some(envelope), &cancel).await.unwrap();
    assert_eq!(rotated.new_key.len(), 32);
    assert_ne!(rotated.new_key, old_key);

    // Re-encrypted envelope decrypts under the new key to the original
    let reencrypted = rotated.reencrypted.unwrap();
    let recovered = service.decrypt(reencrypted, rotated.new_key.clone(), &cancel).await.unwrap();
    assert_eq!(recovered, plaintext);

    // The stored key is the new one
    let stored = service.retrieve_credential("master", &cancel).await.unwrap();
    assert_eq!(stored, rotated.new_key);
}

#[tokio::test]
async fn failed_rotation_leaves_the_old_key_authoritative() {
    let (service, _) = fixture();
    let cancel = CancelToken::new();

    let old_key = service.generate_key(256, &cancel).await.unwrap();
    service.store_credential("master", old_key.clone(), &cancel).await.unwrap();

    // Envelope sealed under an unrelated key cannot be re-encrypted
    let other_key = service.generate_key(256, &cancel).await.unwrap();
    let envelope = service.encrypt(b"data".to_vec(), other_key, &cancel).await.unwrap();

    let err = service.rotate_key("master", Some(envelope), &cancel).await.unwrap_err();
    assert_eq!(err.to_wire().category, ErrorCategory::DecryptionFailed);

    let stored = service.retrieve_credential("master", &cancel).await.unwrap();
    assert_eq!(stored, old_key);
}

#[tokio::test]
async fn rotate_missing_identifier_fails() {
    let (service, _) = fixture();
    let cancel = CancelToken::new();

    let err = service.rotate_key("missing", None, &cancel).await.unwrap_err();
    assert_eq!(err, ServiceError::KeyNotFound { identifier: "missing".into() });
}

#[tokio::test]
async fn cancelled_before_dispatch_is_a_no_op() {
    let (service, backend) = fixture();

    let cancel = CancelToken::new();
    cancel.cancel();

    let err = service
        .store_credential("never-stored", b"secret".to_vec(), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::Cancelled);

    // No observable side effects: the backend was never touched
    assert!(backend.is_empty().await);

    let err = service.generate_key(256, &cancel).await.unwrap_err();
    assert_eq!(err, ServiceError::Cancelled);

    let err = service.rotate_key("any", None, &cancel).await.unwrap_err();
    assert_eq!(err, ServiceError::Cancelled);
}

#[tokio::test]
async fn cancellation_does_not_affect_other_tokens() {
    let (service, _) = fixture();

    let cancelled = CancelToken::new();
    cancelled.cancel();
    let live = CancelToken::new();

    assert!(service.generate_key(256, &cancelled).await.is_err());
    assert!(service.generate_key(256, &live).await.is_ok());
}

#[tokio::test]
async fn wire_errors_serialize_with_stable_categories() {
    let (service, _) = fixture();
    let cancel = CancelToken::new();

    let err = service.retrieve_credential("missing", &cancel).await.unwrap_err();
    let wire = err.to_wire();

    let json = serde_json::to_value(&wire).unwrap();
    assert_eq!(json["category"], "key_not_found");
    assert_eq!(json["message"], "key not found: missing");

    let roundtrip: vaultcore_service::WireError = serde_json::from_value(json).unwrap();
    assert_eq!(roundtrip, wire);
}

#[tokio::test]
async fn connection_invalidation_clears_cached_state() {
    let (service, _) = fixture();

    assert!(service.needs_reconnect().await);

    service.connection_established(7).await;
    assert_eq!(service.connection_state().await, LinkState::Ready);
    assert!(!service.needs_reconnect().await);

    service.connection_invalidated().await;
    assert_eq!(service.connection_state().await, LinkState::Invalidated);
    assert!(service.needs_reconnect().await);

    // A later establish recovers without any internal retry having fired
    service.connection_established(8).await;
    assert_eq!(service.connection_state().await, LinkState::Ready);
}

#[tokio::test]
async fn concurrent_requests_on_different_identifiers_complete() {
    let (service, _) = fixture();
    let cancel = CancelToken::new();

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        let cancel = cancel.clone();
        handles.push(tokio::spawn(async move {
            let id = format!("cred-{i}");
            service.store_credential(&id, vec![i as u8; 16], &cancel).await?;
            service.retrieve_credential(&id, &cancel).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let secret = handle.await.unwrap().unwrap();
        assert_eq!(secret, vec![i as u8; 16]);
    }
}
