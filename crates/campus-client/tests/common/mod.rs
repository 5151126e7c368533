//! Shared fixtures for client integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use campus_client::{
    CampusClient, CredentialStore, MemoryCredentialStore, Notifier, SessionRedirect, Severity,
};
use wiremock::MockServer;

/// Notifier that remembers everything it was asked to show.
#[derive(Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<(String, Severity)> {
        self.shown.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.with_severity(Severity::Error)
    }

    pub fn successes(&self) -> Vec<String> {
        self.with_severity(Severity::Success)
    }

    fn with_severity(&self, severity: Severity) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|(_, s)| *s == severity)
            .map(|(m, _)| m)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, message: &str, severity: Severity) {
        self.shown
            .lock()
            .unwrap()
            .push((message.to_string(), severity));
    }
}

/// Redirect that counts how often it fired.
#[derive(Default)]
pub struct CountingRedirect {
    count: AtomicUsize,
}

impl CountingRedirect {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl SessionRedirect for CountingRedirect {
    fn redirect_to_sign_in(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// A client wired to a mock server and recording collaborators.
pub struct Harness {
    pub client: CampusClient,
    pub store: Arc<MemoryCredentialStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub redirect: Arc<CountingRedirect>,
}

impl Harness {
    pub fn new(server: &MockServer, store: MemoryCredentialStore) -> Self {
        Self::with_single_flight(server, store, false)
    }

    pub fn with_single_flight(
        server: &MockServer,
        store: MemoryCredentialStore,
        single_flight: bool,
    ) -> Self {
        Self::for_uri(&server.uri(), store, single_flight)
    }

    pub fn for_uri(uri: &str, store: MemoryCredentialStore, single_flight: bool) -> Self {
        let store = Arc::new(store);
        let notifier = Arc::new(RecordingNotifier::default());
        let redirect = Arc::new(CountingRedirect::default());

        let client = CampusClient::builder()
            .base_url(uri)
            .credential_store(store.clone() as Arc<dyn CredentialStore>)
            .notifier(notifier.clone() as Arc<dyn Notifier>)
            .redirect(redirect.clone() as Arc<dyn SessionRedirect>)
            .single_flight_refresh(single_flight)
            .build()
            .expect("client should build");

        Self {
            client,
            store,
            notifier,
            redirect,
        }
    }
}
