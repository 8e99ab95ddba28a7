//! In-process backend for tests and offline runs
//!
//! Mirrors the observable contract of the hosted backend closely enough for
//! the data-access layer: accounts and a single current session, documents
//! filtered by the supported queries, and files. Every call is journaled so
//! tests can assert on call shapes.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use common::{BackendError, BackendResult};
use reqwest::Url;
use serde_json::{Map, Value};

use crate::{
    backend::Backend,
    client::resource_url,
    id::ID,
    models::{Account, File, FileAsset, RawDocument, RawDocumentList, Session},
    query::{Query, QueryMethod},
    storage::{PreviewOptions, file_path},
};

const ENDPOINT: &str = "http://localhost/v1";
const PROJECT_ID: &str = "memory";

/// Backend operation, as recorded in the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAccount,
    CreateSession,
    GetAccount,
    DeleteSession,
    CreateDocument,
    ListDocuments,
    CreateFile,
    DeleteFile,
    GetFileView,
    GetFilePreview,
    GetInitials,
}

/// One journaled call with the arguments tests care about
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateAccount { user_id: String, email: String, name: String },
    CreateSession { email: String },
    GetAccount,
    DeleteSession { session_id: String },
    CreateDocument { collection_id: String, document_id: String, data: Value },
    ListDocuments { collection_id: String, queries: Vec<Query> },
    CreateFile { file_id: String, name: String },
    DeleteFile { file_id: String },
    GetFileView { file_id: String },
    GetFilePreview { file_id: String, options: PreviewOptions },
    GetInitials { name: String },
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Call::CreateAccount { .. } => Operation::CreateAccount,
            Call::CreateSession { .. } => Operation::CreateSession,
            Call::GetAccount => Operation::GetAccount,
            Call::DeleteSession { .. } => Operation::DeleteSession,
            Call::CreateDocument { .. } => Operation::CreateDocument,
            Call::ListDocuments { .. } => Operation::ListDocuments,
            Call::CreateFile { .. } => Operation::CreateFile,
            Call::DeleteFile { .. } => Operation::DeleteFile,
            Call::GetFileView { .. } => Operation::GetFileView,
            Call::GetFilePreview { .. } => Operation::GetFilePreview,
            Call::GetInitials { .. } => Operation::GetInitials,
        }
    }
}

#[derive(Debug, Clone)]
struct Failure {
    code: u16,
    message: String,
}

impl Failure {
    fn to_error(&self) -> BackendError {
        BackendError::from_status(self.code, self.message.clone())
    }
}

struct StoredAccount {
    account: Account,
    password: String,
}

#[derive(Default)]
struct State {
    accounts: Vec<StoredAccount>,
    current_session: Option<Session>,
    documents: HashMap<(String, String), Vec<RawDocument>>,
    files: HashMap<(String, String), File>,
    calls: Vec<Call>,
    failures: HashMap<Operation, Failure>,
    upload_failures: HashMap<String, Failure>,
    uploads_in_flight: usize,
    max_uploads_in_flight: usize,
    sequence: i64,
}

impl State {
    /// Strictly increasing timestamps so creation order is observable
    fn next_timestamp(&mut self, base: DateTime<Utc>) -> DateTime<Utc> {
        self.sequence += 1;
        base + TimeDelta::milliseconds(self.sequence)
    }

    fn take_failure(&mut self, operation: Operation) -> BackendResult<()> {
        match self.failures.remove(&operation) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

/// In-memory [`Backend`]
pub struct MemoryBackend {
    state: Mutex<State>,
    upload_latency: Duration,
    epoch: DateTime<Utc>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            upload_latency: Duration::ZERO,
            epoch: Utc::now(),
        }
    }

    /// Delay every upload, so concurrent uploads overlap observably
    pub fn with_upload_latency(mut self, latency: Duration) -> Self {
        self.upload_latency = latency;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next call of `operation` fail with the given HTTP status
    pub fn fail_next(&self, operation: Operation, code: u16, message: &str) {
        self.state().failures.insert(
            operation,
            Failure {
                code,
                message: message.to_string(),
            },
        );
    }

    /// Make the next upload of a file named `file_name` fail
    pub fn fail_upload_of(&self, file_name: &str, code: u16, message: &str) {
        self.state().upload_failures.insert(
            file_name.to_string(),
            Failure {
                code,
                message: message.to_string(),
            },
        );
    }

    /// Journal of every call, in order
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Number of journaled calls of one operation
    pub fn count(&self, operation: Operation) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Highest number of uploads observed in flight at the same time
    pub fn max_concurrent_uploads(&self) -> usize {
        self.state().max_uploads_in_flight
    }

    /// Files currently stored in a bucket
    pub fn files(&self, bucket_id: &str) -> Vec<File> {
        let mut files: Vec<File> = self
            .state()
            .files
            .iter()
            .filter(|((bucket, _), _)| bucket == bucket_id)
            .map(|(_, file)| file.clone())
            .collect();
        files.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        files
    }

    /// Documents currently stored in a collection, oldest first
    pub fn documents(&self, database_id: &str, collection_id: &str) -> Vec<RawDocument> {
        self.state()
            .documents
            .get(&(database_id.to_string(), collection_id.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a session is currently active
    pub fn has_session(&self) -> bool {
        self.state().current_session.is_some()
    }
}

fn field_text(document: &RawDocument, attribute: &str) -> Option<String> {
    match attribute {
        "$id" => Some(document.id.clone()),
        "$createdAt" => Some(document.created_at.to_rfc3339()),
        "$updatedAt" => Some(document.updated_at.to_rfc3339()),
        _ => match document.data.get(attribute)? {
            Value::String(text) => Some(text.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        },
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn matches_filter(document: &RawDocument, query: &Query) -> bool {
    let Some(attribute) = query.attribute() else {
        return true;
    };

    match query.method() {
        QueryMethod::Equal => {
            let actual = match attribute {
                "$id" | "$createdAt" | "$updatedAt" => field_text(document, attribute).map(Value::from),
                _ => document.data.get(attribute).cloned(),
            };
            actual.is_some_and(|actual| query.values().contains(&actual))
        }
        QueryMethod::Search => {
            let haystack = field_text(document, attribute)
                .map(|text| words(&text))
                .unwrap_or_default();
            let needles: Vec<String> = query
                .values()
                .iter()
                .filter_map(Value::as_str)
                .flat_map(words)
                .collect();
            !needles.is_empty() && needles.iter().all(|needle| haystack.contains(needle))
        }
        _ => true,
    }
}

fn apply_queries(mut documents: Vec<RawDocument>, queries: &[Query]) -> (u64, Vec<RawDocument>) {
    documents.retain(|document| queries.iter().all(|query| matches_filter(document, query)));
    let total = documents.len() as u64;

    for query in queries.iter().rev() {
        let Some(attribute) = query.attribute() else {
            continue;
        };
        match query.method() {
            QueryMethod::OrderAsc => documents.sort_by(|a, b| {
                sort_key(a, attribute).cmp(&sort_key(b, attribute))
            }),
            QueryMethod::OrderDesc => documents.sort_by(|a, b| {
                sort_key(b, attribute).cmp(&sort_key(a, attribute))
            }),
            _ => {}
        }
    }

    let offset = queries
        .iter()
        .filter(|query| query.method() == QueryMethod::Offset)
        .find_map(Query::as_count)
        .unwrap_or(0);
    let limit = queries
        .iter()
        .filter(|query| query.method() == QueryMethod::Limit)
        .find_map(Query::as_count)
        .unwrap_or(usize::MAX);

    let page = documents.into_iter().skip(offset).take(limit).collect();
    (total, page)
}

/// Sort key: timestamps compare chronologically, everything else as text
fn sort_key(document: &RawDocument, attribute: &str) -> (Option<DateTime<Utc>>, Option<String>) {
    match attribute {
        "$createdAt" => (Some(document.created_at), None),
        "$updatedAt" => (Some(document.updated_at), None),
        _ => (None, field_text(document, attribute)),
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> BackendResult<Account> {
        let mut state = self.state();
        state.calls.push(Call::CreateAccount {
            user_id: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
        });
        state.take_failure(Operation::CreateAccount)?;

        if state
            .accounts
            .iter()
            .any(|stored| stored.account.id == user_id || stored.account.email == email)
        {
            return Err(BackendError::Conflict(
                "A user with the same id, email, or phone already exists in this project."
                    .to_string(),
            ));
        }

        let now = state.next_timestamp(self.epoch);
        let account = Account {
            id: user_id.to_string(),
            created_at: now,
            updated_at: now,
            name: name.to_string(),
            email: email.to_string(),
            status: true,
            email_verification: false,
        };
        state.accounts.push(StoredAccount {
            account: account.clone(),
            password: password.to_string(),
        });

        Ok(account)
    }

    async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> BackendResult<Session> {
        let mut state = self.state();
        state.calls.push(Call::CreateSession {
            email: email.to_string(),
        });
        state.take_failure(Operation::CreateSession)?;

        if state.current_session.is_some() {
            return Err(BackendError::Unauthorized(
                "Creation of a session is prohibited when a session is active.".to_string(),
            ));
        }

        let user_id = state
            .accounts
            .iter()
            .find(|stored| stored.account.email == email && stored.password == password)
            .map(|stored| stored.account.id.clone())
            .ok_or_else(|| {
                BackendError::Unauthorized(
                    "Invalid credentials. Please check the email and password.".to_string(),
                )
            })?;

        let now = state.next_timestamp(self.epoch);
        let session = Session {
            id: ID::unique(),
            created_at: now,
            user_id,
            expire: now + TimeDelta::days(365),
            provider: "email".to_string(),
            current: true,
        };
        state.current_session = Some(session.clone());

        Ok(session)
    }

    async fn get_account(&self) -> BackendResult<Account> {
        let mut state = self.state();
        state.calls.push(Call::GetAccount);
        state.take_failure(Operation::GetAccount)?;

        let user_id = state
            .current_session
            .as_ref()
            .map(|session| session.user_id.clone())
            .ok_or_else(|| {
                BackendError::Unauthorized(
                    "User (role: guests) missing scope (account)".to_string(),
                )
            })?;

        state
            .accounts
            .iter()
            .find(|stored| stored.account.id == user_id)
            .map(|stored| stored.account.clone())
            .ok_or_else(|| BackendError::NotFound(format!("User {} not found", user_id)))
    }

    async fn delete_session(&self, session_id: &str) -> BackendResult<()> {
        let mut state = self.state();
        state.calls.push(Call::DeleteSession {
            session_id: session_id.to_string(),
        });
        state.take_failure(Operation::DeleteSession)?;

        let current_id = state
            .current_session
            .as_ref()
            .map(|session| session.id.clone())
            .ok_or_else(|| {
                BackendError::Unauthorized(
                    "User (role: guests) missing scope (account)".to_string(),
                )
            })?;

        if session_id != "current" && session_id != current_id {
            return Err(BackendError::NotFound(format!(
                "Session {} not found",
                session_id
            )));
        }

        state.current_session = None;
        Ok(())
    }

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> BackendResult<RawDocument> {
        let mut state = self.state();
        state.calls.push(Call::CreateDocument {
            collection_id: collection_id.to_string(),
            document_id: document_id.to_string(),
            data: data.clone(),
        });
        state.take_failure(Operation::CreateDocument)?;

        let Value::Object(data) = data else {
            return Err(BackendError::Validation(
                "Invalid document structure: expected an object".to_string(),
            ));
        };

        let key = (database_id.to_string(), collection_id.to_string());
        if state
            .documents
            .get(&key)
            .is_some_and(|documents| documents.iter().any(|doc| doc.id == document_id))
        {
            return Err(BackendError::Conflict(format!(
                "Document with the requested ID {} already exists.",
                document_id
            )));
        }

        let now = state.next_timestamp(self.epoch);
        let document = RawDocument {
            id: document_id.to_string(),
            collection_id: collection_id.to_string(),
            database_id: database_id.to_string(),
            created_at: now,
            updated_at: now,
            permissions: Vec::new(),
            data,
        };
        state
            .documents
            .entry(key)
            .or_default()
            .push(document.clone());

        Ok(document)
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> BackendResult<RawDocumentList> {
        let mut state = self.state();
        state.calls.push(Call::ListDocuments {
            collection_id: collection_id.to_string(),
            queries: queries.to_vec(),
        });
        state.take_failure(Operation::ListDocuments)?;

        let documents = state
            .documents
            .get(&(database_id.to_string(), collection_id.to_string()))
            .cloned()
            .unwrap_or_default();
        let (total, documents) = apply_queries(documents, queries);

        Ok(RawDocumentList { total, documents })
    }

    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: &FileAsset,
    ) -> BackendResult<File> {
        let failure = {
            let mut state = self.state();
            state.calls.push(Call::CreateFile {
                file_id: file_id.to_string(),
                name: file.name.clone(),
            });
            state.uploads_in_flight += 1;
            state.max_uploads_in_flight = state.max_uploads_in_flight.max(state.uploads_in_flight);
            let injected = state.failures.remove(&Operation::CreateFile);
            match injected {
                Some(failure) => Some(failure),
                None => state.upload_failures.remove(&file.name),
            }
        };

        if !self.upload_latency.is_zero() {
            tokio::time::sleep(self.upload_latency).await;
        }

        let mut state = self.state();
        state.uploads_in_flight -= 1;
        if let Some(failure) = failure {
            return Err(failure.to_error());
        }

        let key = (bucket_id.to_string(), file_id.to_string());
        if state.files.contains_key(&key) {
            return Err(BackendError::Conflict(format!(
                "A storage file with the requested ID {} already exists.",
                file_id
            )));
        }

        let now = state.next_timestamp(self.epoch);
        let stored = File {
            id: file_id.to_string(),
            bucket_id: bucket_id.to_string(),
            created_at: now,
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size_original: file.size() as u64,
            chunks_total: 1,
            chunks_uploaded: 1,
        };
        state.files.insert(key, stored.clone());

        Ok(stored)
    }

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> BackendResult<()> {
        let mut state = self.state();
        state.calls.push(Call::DeleteFile {
            file_id: file_id.to_string(),
        });
        state.take_failure(Operation::DeleteFile)?;

        state
            .files
            .remove(&(bucket_id.to_string(), file_id.to_string()))
            .map(|_| ())
            .ok_or_else(|| {
                BackendError::NotFound(format!("The requested file {} could not be found.", file_id))
            })
    }

    fn get_file_view(&self, bucket_id: &str, file_id: &str) -> BackendResult<Url> {
        let mut state = self.state();
        state.calls.push(Call::GetFileView {
            file_id: file_id.to_string(),
        });
        state.take_failure(Operation::GetFileView)?;

        resource_url(
            ENDPOINT,
            PROJECT_ID,
            &format!("{}/view", file_path(bucket_id, file_id)),
            &[],
        )
    }

    fn get_file_preview(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: &PreviewOptions,
    ) -> BackendResult<Url> {
        let mut state = self.state();
        state.calls.push(Call::GetFilePreview {
            file_id: file_id.to_string(),
            options: options.clone(),
        });
        state.take_failure(Operation::GetFilePreview)?;

        resource_url(
            ENDPOINT,
            PROJECT_ID,
            &format!("{}/preview", file_path(bucket_id, file_id)),
            &options.to_params(),
        )
    }

    fn get_initials(&self, name: &str) -> BackendResult<Url> {
        let mut state = self.state();
        state.calls.push(Call::GetInitials {
            name: name.to_string(),
        });
        state.take_failure(Operation::GetInitials)?;

        resource_url(
            ENDPOINT,
            PROJECT_ID,
            "/avatars/initials",
            &[("name", name.to_string())],
        )
    }
}
